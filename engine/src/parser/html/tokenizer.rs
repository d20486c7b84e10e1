// Markup tokenizer.
//
// A single left-to-right scan with two states: in-text and in-tag. Text
// between tags is emitted verbatim; the interior of each `<...>` is split
// on whitespace into a tag name and attribute pairs. There is no
// character-reference decoding and no raw-text handling for script/style.
// Attribute values may not contain whitespace, quoted or not.

use std::collections::HashMap;

use log::trace;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<name attr=value ...>`, or `<name .../>` with `self_closing` set.
    StartTag {
        name: String,
        attributes: HashMap<String, String>,
        self_closing: bool,
    },
    /// `</name>`
    EndTag { name: String },
    /// `<!...>`: doctypes and comments, passed through unparsed.
    Declaration(String),
    /// Literal text between tags, whitespace preserved.
    Text(String),
    Eof,
}

impl Token {
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Token::StartTag { name, .. } | Token::EndTag { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_self_closing(&self) -> bool {
        matches!(self, Token::StartTag { self_closing: true, .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenizerState {
    Text,
    Tag,
}

pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    state: TokenizerState,
    buffer: String,
    done: bool,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            state: TokenizerState::Text,
            buffer: String::new(),
            done: false,
        }
    }

    pub fn state(&self) -> TokenizerState {
        self.state
    }

    fn set_state(&mut self, state: TokenizerState) {
        trace!("tokenizer state {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Returns the next token, `Eof` once, then `None`.
    pub fn next_token(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        while let Some(&c) = self.input.get(self.pos) {
            self.pos += 1;
            match (self.state, c) {
                (TokenizerState::Text, '<') => {
                    self.set_state(TokenizerState::Tag);
                    if !self.buffer.is_empty() {
                        return Some(Token::Text(std::mem::take(&mut self.buffer)));
                    }
                }
                (TokenizerState::Tag, '>') => {
                    self.set_state(TokenizerState::Text);
                    let raw = std::mem::take(&mut self.buffer);
                    if let Some(token) = parse_tag(&raw) {
                        return Some(token);
                    }
                }
                _ => self.buffer.push(c),
            }
        }

        // Trailing text is kept; an unterminated tag is dropped.
        let rest = std::mem::take(&mut self.buffer);
        if self.state == TokenizerState::Text && !rest.is_empty() {
            return Some(Token::Text(rest));
        }
        if !rest.is_empty() {
            trace!("dropping unterminated tag {:?}", rest);
        }
        self.done = true;
        Some(Token::Eof)
    }

    /// Tokenize the entire input, excluding the trailing `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            if token == Token::Eof {
                break;
            }
            tokens.push(token);
        }
        tokens
    }
}

/// Interpret the text between `<` and `>`. Returns `None` for an empty tag.
fn parse_tag(raw: &str) -> Option<Token> {
    let raw = raw.trim();
    if raw.starts_with('!') {
        return Some(Token::Declaration(raw[1..].to_string()));
    }
    if let Some(rest) = raw.strip_prefix('/') {
        let name = rest.split_whitespace().next().unwrap_or("");
        return Some(Token::EndTag { name: name.to_lowercase() });
    }

    let (raw, self_closing) = match raw.strip_suffix('/') {
        Some(inner) => (inner, true),
        None => (raw, false),
    };
    let mut parts = raw.split_whitespace();
    let name = parts.next()?.to_lowercase();
    let attributes = parts.map(parse_attribute).collect();
    Some(Token::StartTag { name, attributes, self_closing })
}

fn parse_attribute(pair: &str) -> (String, String) {
    match pair.split_once('=') {
        Some((key, value)) => (key.to_lowercase(), unquote(value).to_string()),
        None => (pair.to_lowercase(), String::new()),
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
