pub mod tokenizer;
pub mod tree_builder;

pub use tokenizer::{Token, Tokenizer};
pub use tree_builder::{HtmlParser, IMPLICIT_ROOT, VOID_ELEMENTS};

use crate::dom::Dom;

/// Parse markup into a DOM with exactly one root.
pub fn parse_html(markup: &str) -> Dom {
    HtmlParser::new(markup).parse()
}
