// engine/src/layout/mod.rs
//
// Box tree construction and geometry. Every box takes x and width from
// its parent before its children are laid out; y comes from the previous
// sibling's bottom edge (or the parent's y for a first child); height is
// known once the children or the box's own text have been laid out. One
// top-down recursive pass settles all of it.

pub mod inline;

use log::debug;

use crate::dom::{Dom, NodeId, NodeType};
use crate::font::{MetricsError, TypeMetrics};
use crate::paint;
use crate::viewport::Viewport;
use inline::InlineLayout;

/// Multiplier applied above the tallest ascent and below the deepest
/// descent of every line.
pub const LINE_SPACING: f32 = 1.25;

/// Elements whose presence among a node's children puts it in block mode.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "html", "body", "article", "section", "nav", "aside", "h1", "h2", "h3", "h4", "h5", "h6",
    "hgroup", "header", "footer", "address", "p", "hr", "pre", "blockquote", "ol", "ul", "menu",
    "li", "dl", "dt", "dd", "figure", "figcaption", "main", "div", "table", "form", "fieldset",
    "legend", "details", "summary",
];

/// Block boxes nest at most this deep. A box at the limit flows its whole
/// subtree inline, so unclosed block tags cannot exhaust the stack.
pub const MAX_BLOCK_DEPTH: usize = 128;

/// Elements whose content is never laid out.
pub const HIDDEN_ELEMENTS: &[&str] = &["head", "title", "script", "style", "meta", "link"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    /// The single root box, inset from the viewport by the page margins.
    Document,
    Block,
}

/// How a box arranges its content, resolved once per box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// One child box per DOM child, stacked vertically.
    Block,
    /// The DOM subtree flows as wrapped lines of words.
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// One positioned word in the display list. `y` is the top of the word,
/// placed so that every word on a line shares a baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub style: crate::style::FontStyle,
}

/// A box in the layout tree. Boxes hold no parent or sibling links: a
/// block child is placed at the bottom edge of the preceding entry in its
/// parent's `children`.
#[derive(Debug)]
pub struct LayoutBox {
    pub node_id: NodeId,
    pub kind: BoxKind,
    pub mode: LayoutMode,
    pub dimensions: Dimensions,
    pub children: Vec<LayoutBox>,
    /// Page-absolute fragments produced by this box's own inline pass.
    pub fragments: Vec<Fragment>,
}

impl LayoutBox {
    /// Number of boxes in this subtree, including this one.
    pub fn box_count(&self) -> usize {
        1 + self.children.iter().map(LayoutBox::box_count).sum::<usize>()
    }
}

/// Result of laying out one document.
#[derive(Debug)]
pub struct LayoutTree {
    pub root: LayoutBox,
    /// Every fragment in paint order.
    pub fragments: Vec<Fragment>,
    /// Page height including the top and bottom margins.
    pub content_height: f32,
}

/// Lay out the tree rooted at `dom.root()` for the given viewport.
pub fn layout(
    dom: &Dom,
    viewport: &Viewport,
    metrics: &mut dyn TypeMetrics,
) -> Result<LayoutTree, MetricsError> {
    LayoutEngine::new(*viewport).layout(dom, metrics)
}

pub struct LayoutEngine {
    viewport: Viewport,
}

impl LayoutEngine {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    pub fn layout(&self, dom: &Dom, metrics: &mut dyn TypeMetrics) -> Result<LayoutTree, MetricsError> {
        let root_id = dom.root();
        let x = self.viewport.hstep;
        let y = self.viewport.vstep;
        let width = self.viewport.content_width();

        let child = self.layout_box(dom, metrics, root_id, x, y, width, 1)?;
        let document = LayoutBox {
            node_id: root_id,
            kind: BoxKind::Document,
            mode: LayoutMode::Block,
            dimensions: Dimensions { x, y, width, height: child.dimensions.height },
            children: vec![child],
            fragments: Vec::new(),
        };

        let fragments = paint::flatten(&document);
        let content_height = document.dimensions.bottom() + self.viewport.vstep;
        debug!(
            "laid out {} boxes, {} fragments, content height {}",
            document.box_count(),
            fragments.len(),
            content_height
        );
        Ok(LayoutTree { root: document, fragments, content_height })
    }

    fn layout_box(
        &self,
        dom: &Dom,
        metrics: &mut dyn TypeMetrics,
        node_id: NodeId,
        x: f32,
        y: f32,
        width: f32,
        depth: usize,
    ) -> Result<LayoutBox, MetricsError> {
        let mut mode = layout_mode(dom, node_id);
        if mode == LayoutMode::Block && depth >= MAX_BLOCK_DEPTH && !dom.children(node_id).is_empty() {
            debug!("block nesting reached {} at node {}, flowing the rest inline", depth, node_id);
            mode = LayoutMode::Inline;
        }
        let mut children = Vec::new();
        let mut fragments = Vec::new();

        let height = match mode {
            LayoutMode::Block => {
                for &child_id in dom.children(node_id) {
                    if is_hidden(dom, child_id) {
                        continue;
                    }
                    let child_y = children.last().map_or(y, |prev: &LayoutBox| prev.dimensions.bottom());
                    children.push(self.layout_box(dom, metrics, child_id, x, child_y, width, depth + 1)?);
                }
                children.iter().map(|c| c.dimensions.height).sum()
            }
            LayoutMode::Inline => {
                let mut inline = InlineLayout::new(metrics, width, self.viewport.vstep);
                inline.walk(dom, node_id, Default::default())?;
                inline.flush()?;
                let height = inline.cursor_y();
                fragments = inline.into_fragments(x, y);
                height
            }
        };

        Ok(LayoutBox {
            node_id,
            kind: BoxKind::Block,
            mode,
            dimensions: Dimensions { x, y, width, height },
            children,
            fragments,
        })
    }
}

/// Block if any child is a block-level element, inline if there are other
/// children, block (and empty) otherwise. Text is always inline.
pub fn layout_mode(dom: &Dom, node_id: NodeId) -> LayoutMode {
    let node = dom.node(node_id);
    if node.is_text() {
        return LayoutMode::Inline;
    }
    let has_block_child = node.children.iter().any(|&child| {
        dom.node(child)
            .tag_name()
            .is_some_and(|tag| BLOCK_ELEMENTS.contains(&tag))
    });
    if has_block_child {
        LayoutMode::Block
    } else if !node.children.is_empty() {
        LayoutMode::Inline
    } else {
        LayoutMode::Block
    }
}

pub(crate) fn is_hidden(dom: &Dom, node_id: NodeId) -> bool {
    match &dom.node(node_id).node_type {
        NodeType::Element(el) => HIDDEN_ELEMENTS.contains(&el.tag_name.as_str()),
        NodeType::Text(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FixedMetrics;
    use crate::parser::parse_html;

    fn lay_out(markup: &str) -> (Dom, LayoutTree) {
        let dom = parse_html(markup);
        let tree = layout(&dom, &Viewport::default(), &mut FixedMetrics).unwrap();
        (dom, tree)
    }

    #[test]
    fn test_mode_resolution() {
        let dom = parse_html("<ul><li>x</li></ul>");
        let ul = dom.root();
        let li = dom.children(ul)[0];
        let text = dom.children(li)[0];
        assert_eq!(layout_mode(&dom, ul), LayoutMode::Block);
        assert_eq!(layout_mode(&dom, li), LayoutMode::Inline);
        assert_eq!(layout_mode(&dom, text), LayoutMode::Inline);
    }

    #[test]
    fn test_childless_element_is_empty_block() {
        let (_, tree) = lay_out("<div></div>");
        let div = &tree.root.children[0];
        assert_eq!(div.mode, LayoutMode::Block);
        assert_eq!(div.dimensions.height, 0.0);
        assert!(tree.fragments.is_empty());
    }

    #[test]
    fn test_document_box_geometry() {
        let (_, tree) = lay_out("<p>hi</p>");
        let viewport = Viewport::default();
        let doc = &tree.root;
        assert_eq!(doc.kind, BoxKind::Document);
        assert_eq!(doc.dimensions.x, viewport.hstep);
        assert_eq!(doc.dimensions.y, viewport.vstep);
        assert_eq!(doc.dimensions.width, viewport.width - 2.0 * viewport.hstep);
        assert_eq!(doc.dimensions.height, doc.children[0].dimensions.height);
        assert_eq!(tree.content_height, doc.dimensions.height + 2.0 * viewport.vstep);
    }

    #[test]
    fn test_children_inherit_x_and_width() {
        let (_, tree) = lay_out("<div><p>a</p><p>b</p></div>");
        let div = &tree.root.children[0];
        for child in &div.children {
            assert_eq!(child.dimensions.x, div.dimensions.x);
            assert_eq!(child.dimensions.width, div.dimensions.width);
        }
    }

    #[test]
    fn test_block_children_stack() {
        let (_, tree) = lay_out("<div><p>a</p><h1>b</h1><p>c</p></div>");
        let div = &tree.root.children[0];
        assert_eq!(div.children.len(), 3);
        assert_eq!(div.children[0].dimensions.y, div.dimensions.y);
        for pair in div.children.windows(2) {
            assert_eq!(pair[1].dimensions.y, pair[0].dimensions.bottom());
        }
        let sum: f32 = div.children.iter().map(|c| c.dimensions.height).sum();
        assert_eq!(div.dimensions.height, sum);
    }

    #[test]
    fn test_mixed_text_and_blocks_get_own_boxes() {
        let (dom, tree) = lay_out("<div>lead<p>para</p>tail</div>");
        let div = &tree.root.children[0];
        assert_eq!(div.mode, LayoutMode::Block);
        assert_eq!(div.children.len(), 3);
        assert!(dom.node(div.children[0].node_id).is_text());
        assert_eq!(div.children[0].mode, LayoutMode::Inline);
        let words: Vec<&str> = tree.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(words, vec!["lead", "para", "tail"]);
    }

    #[test]
    fn test_hidden_elements_skipped() {
        let (_, tree) = lay_out(
            "<html><head><title>T</title><style>p{}</style></head><body><p>shown</p></body></html>",
        );
        let html = &tree.root.children[0];
        assert_eq!(html.children.len(), 1);
        let words: Vec<&str> = tree.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(words, vec!["shown"]);
    }

    #[test]
    fn test_hidden_element_inside_inline_content() {
        let (_, tree) = lay_out("<span>a<script>var x</script>b</span>");
        let words: Vec<&str> = tree.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(words, vec!["a", "b"]);
    }

    #[test]
    fn test_metrics_failure_propagates() {
        struct NoBold;
        impl TypeMetrics for NoBold {
            fn measure(&mut self, text: &str, style: &crate::style::FontStyle) -> Result<f32, MetricsError> {
                if style.weight == crate::style::Weight::Bold {
                    return Err(MetricsError::Unavailable(*style));
                }
                FixedMetrics.measure(text, style)
            }
            fn metrics(&mut self, style: &crate::style::FontStyle) -> Result<crate::font::FontMetrics, MetricsError> {
                FixedMetrics.metrics(style)
            }
        }

        let dom = parse_html("<p>fine <b>broken</b></p>");
        let err = layout(&dom, &Viewport::default(), &mut NoBold).unwrap_err();
        assert!(matches!(err, MetricsError::Unavailable(style) if style.weight == crate::style::Weight::Bold));
    }
}
