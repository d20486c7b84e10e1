// Tree construction.
//
// Best-effort recovery, not the HTML5 insertion-mode algorithm. An
// implicit `document` element sits at the bottom of the open-element
// stack. A close tag pops whatever element is innermost, regardless of
// its name, and appends it to the new innermost element. A close tag with
// nothing above the implicit root is dropped. Elements still open at end
// of input are closed in stack order.

use std::collections::HashMap;

use log::{debug, trace};

use super::tokenizer::{Token, Tokenizer};
use crate::dom::{Dom, NodeId};

/// Elements that never take a close tag and never get children.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Tag name of the synthesized root.
pub const IMPLICIT_ROOT: &str = "document";

pub struct HtmlParser {
    tokenizer: Tokenizer,
    dom: Dom,
    /// Open elements, innermost last. Never empty: index 0 is the implicit root.
    unfinished: Vec<NodeId>,
}

impl HtmlParser {
    pub fn new(input: &str) -> Self {
        let mut dom = Dom::new();
        let document = dom.create_element(IMPLICIT_ROOT, HashMap::new(), None);
        Self {
            tokenizer: Tokenizer::new(input),
            dom,
            unfinished: vec![document],
        }
    }

    pub fn parse(mut self) -> Dom {
        let mut token_count = 0usize;
        while let Some(token) = self.tokenizer.next_token() {
            trace!("token: {:?}", token);
            token_count += 1;
            match token {
                Token::Eof => break,
                Token::Text(text) => self.add_text(&text),
                Token::Declaration(_) => {}
                Token::EndTag { name } => self.close_element(&name),
                Token::StartTag { name, attributes, self_closing } => {
                    if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
                        self.add_void_element(&name, attributes);
                    } else {
                        self.open_element(&name, attributes);
                    }
                }
            }
        }
        let dom = self.finish();
        debug!("parsed {} tokens into {} nodes", token_count, dom.len());
        dom
    }

    fn current(&self) -> NodeId {
        self.unfinished[self.unfinished.len() - 1]
    }

    fn add_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        let parent = self.current();
        let node = self.dom.create_text(text, Some(parent));
        self.dom.append_child(parent, node);
    }

    fn add_void_element(&mut self, name: &str, attributes: HashMap<String, String>) {
        let parent = self.current();
        let node = self.dom.create_element(name, attributes, Some(parent));
        self.dom.append_child(parent, node);
    }

    fn open_element(&mut self, name: &str, attributes: HashMap<String, String>) {
        let parent = self.current();
        let node = self.dom.create_element(name, attributes, Some(parent));
        self.unfinished.push(node);
    }

    fn close_element(&mut self, name: &str) {
        if self.unfinished.len() == 1 {
            debug!("dropping stray close tag </{}>", name);
            return;
        }
        self.pop_into_parent();
    }

    fn pop_into_parent(&mut self) {
        if let Some(node) = self.unfinished.pop() {
            let parent = self.current();
            self.dom.append_child(parent, node);
        }
    }

    fn finish(mut self) -> Dom {
        while self.unfinished.len() > 1 {
            self.pop_into_parent();
        }
        let document = self.unfinished[0];

        // A document with exactly one top-level element is rooted at it.
        let root = match self.dom.children(document) {
            [only] if !self.dom.node(*only).is_text() => *only,
            _ => document,
        };
        self.dom.set_root(root);
        self.dom
    }
}
