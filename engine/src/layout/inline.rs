//! Inline layout: word wrapping and baseline alignment inside one box.
//!
//! Coordinates are relative to the box's top-left corner until
//! [`InlineLayout::into_fragments`] translates them to the page.

use log::trace;

use super::{is_hidden, Fragment, LINE_SPACING};
use crate::dom::{Dom, NodeId, NodeType};
use crate::font::{MetricsError, TypeMetrics};
use crate::style::FontStyle;

/// A word waiting on the current line.
#[derive(Debug, Clone)]
struct LineItem {
    x: f32,
    word: String,
    style: FontStyle,
}

/// Pending work in [`InlineLayout::walk`].
enum Step<'d> {
    Visit(NodeId, FontStyle),
    Close(&'d str),
}

pub struct InlineLayout<'m, M: TypeMetrics + ?Sized> {
    metrics: &'m mut M,
    width: f32,
    /// Extra gap added after a paragraph.
    paragraph_step: f32,
    cursor_x: f32,
    cursor_y: f32,
    line: Vec<LineItem>,
    fragments: Vec<Fragment>,
}

impl<'m, M: TypeMetrics + ?Sized> InlineLayout<'m, M> {
    pub fn new(metrics: &'m mut M, width: f32, paragraph_step: f32) -> Self {
        Self {
            metrics,
            width,
            paragraph_step,
            cursor_x: 0.0,
            cursor_y: 0.0,
            line: Vec::new(),
            fragments: Vec::new(),
        }
    }

    /// Height consumed so far.
    pub fn cursor_y(&self) -> f32 {
        self.cursor_y
    }

    /// Walk the subtree at `node_id` in document order. The element's own
    /// open and close tags take part, so a `<p>` box ends with paragraph
    /// spacing. Uses an explicit stack, so nesting depth is unbounded.
    pub fn walk(&mut self, dom: &Dom, node_id: NodeId, style: FontStyle) -> Result<(), MetricsError> {
        let mut stack = vec![Step::Visit(node_id, style)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Close(tag) => self.close_tag(tag)?,
                Step::Visit(id, style) => match &dom.node(id).node_type {
                    NodeType::Text(text) => {
                        for word in text.split_whitespace() {
                            self.word(word, style)?;
                        }
                    }
                    NodeType::Element(el) => {
                        if is_hidden(dom, id) {
                            continue;
                        }
                        self.open_tag(&el.tag_name)?;
                        let inner = style.enter(&el.tag_name);
                        stack.push(Step::Close(&el.tag_name));
                        for &child in dom.children(id).iter().rev() {
                            stack.push(Step::Visit(child, inner));
                        }
                    }
                },
            }
        }
        Ok(())
    }

    fn open_tag(&mut self, tag: &str) -> Result<(), MetricsError> {
        if tag == "br" {
            self.flush()?;
        }
        Ok(())
    }

    fn close_tag(&mut self, tag: &str) -> Result<(), MetricsError> {
        if tag == "p" {
            self.flush()?;
            self.cursor_y += self.paragraph_step;
        }
        Ok(())
    }

    /// Place one word, wrapping first if it would overflow. A word wider
    /// than the whole line still goes on a line of its own, unbroken.
    pub fn word(&mut self, word: &str, style: FontStyle) -> Result<(), MetricsError> {
        let width = self.metrics.measure(word, &style)?;
        if self.cursor_x + width > self.width {
            self.flush()?;
        }
        self.line.push(LineItem {
            x: self.cursor_x,
            word: word.to_string(),
            style,
        });
        self.cursor_x += width + self.metrics.measure(" ", &style)?;
        Ok(())
    }

    /// Commit the pending line. Every word's top is placed at the shared
    /// baseline minus its own ascent.
    pub fn flush(&mut self) -> Result<(), MetricsError> {
        if self.line.is_empty() {
            return Ok(());
        }

        let mut placed = Vec::with_capacity(self.line.len());
        let mut max_ascent = 0.0f32;
        let mut max_descent = 0.0f32;
        for item in self.line.drain(..) {
            let m = self.metrics.metrics(&item.style)?;
            max_ascent = max_ascent.max(m.ascent);
            max_descent = max_descent.max(m.descent);
            placed.push((item, m.ascent));
        }

        let baseline = self.cursor_y + LINE_SPACING * max_ascent;
        trace!("flush {} words, baseline {}", placed.len(), baseline);
        for (item, ascent) in placed {
            self.fragments.push(Fragment {
                x: item.x,
                y: baseline - ascent,
                text: item.word,
                style: item.style,
            });
        }

        self.cursor_y = baseline + LINE_SPACING * max_descent;
        self.cursor_x = 0.0;
        Ok(())
    }

    /// Fragments translated to page coordinates for a box at `(x, y)`.
    pub fn into_fragments(self, x: f32, y: f32) -> Vec<Fragment> {
        self.fragments
            .into_iter()
            .map(|f| Fragment { x: x + f.x, y: y + f.y, ..f })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FixedMetrics;
    use crate::parser::parse_html;

    fn run(markup: &str, width: f32) -> (Vec<Fragment>, f32) {
        let dom = parse_html(markup);
        let mut metrics = FixedMetrics;
        let mut inline = InlineLayout::new(&mut metrics, width, 18.0);
        inline.walk(&dom, dom.root(), FontStyle::default()).unwrap();
        inline.flush().unwrap();
        let height = inline.cursor_y();
        (inline.into_fragments(0.0, 0.0), height)
    }

    #[test]
    fn test_flush_on_empty_line_is_noop() {
        let mut metrics = FixedMetrics;
        let mut inline = InlineLayout::new(&mut metrics, 100.0, 18.0);
        inline.flush().unwrap();
        assert_eq!(inline.cursor_y(), 0.0);
        assert!(inline.into_fragments(0.0, 0.0).is_empty());
    }

    #[test]
    fn test_single_line_geometry() {
        // 12pt fixed metrics: ascent 9, descent 3, 6 per character.
        let (fragments, height) = run("<span>ab cd</span>", 500.0);
        assert_eq!(fragments.len(), 2);
        assert_eq!((fragments[0].x, fragments[0].y), (0.0, 11.25 - 9.0));
        assert_eq!(fragments[1].x, 12.0 + 6.0);
        assert_eq!(height, 11.25 + 3.75);
    }

    #[test]
    fn test_mixed_sizes_share_baseline() {
        let (fragments, height) = run("<span>small <big>large</big> small</span>", 1000.0);
        assert_eq!(fragments.len(), 3);
        let mut metrics = FixedMetrics;
        let baselines: Vec<f32> = fragments
            .iter()
            .map(|f| f.y + metrics.metrics(&f.style).unwrap().ascent)
            .collect();
        assert!(baselines.iter().all(|&b| b == baselines[0]));
        // The tallest word (16pt, ascent 12) sets the baseline.
        assert_eq!(baselines[0], 1.25 * 12.0);
        assert_eq!(height, 1.25 * 12.0 + 1.25 * 4.0);
        assert!(fragments[1].y < fragments[0].y);
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        // Each word is 4 chars = 24 wide, plus a 6 wide space.
        // Width 80 fits "aaaa bbbb" (24 + 6 + 24 = 54); "cccc" would end at 84.
        let (fragments, _) = run("<span>aaaa bbbb cccc dddd</span>", 80.0);
        let lines: Vec<(String, f32, f32)> =
            fragments.iter().map(|f| (f.text.clone(), f.x, f.y)).collect();
        assert_eq!(lines[0], ("aaaa".to_string(), 0.0, 2.25));
        assert_eq!(lines[1], ("bbbb".to_string(), 30.0, 2.25));
        assert_eq!(lines[2], ("cccc".to_string(), 0.0, 15.0 + 2.25));
        assert_eq!(lines[3], ("dddd".to_string(), 30.0, 15.0 + 2.25));
    }

    #[test]
    fn test_overlong_word_is_not_split() {
        let (fragments, _) = run("<span>a supercalifragilistic b</span>", 30.0);
        let words: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(words, vec!["a", "supercalifragilistic", "b"]);
        assert_eq!(fragments[1].x, 0.0);
        assert!(fragments[1].y > fragments[0].y);
        assert!(fragments[2].y > fragments[1].y);
    }

    #[test]
    fn test_br_breaks_without_extra_gap() {
        let (fragments, height) = run("<span>one<br>two</span>", 500.0);
        assert_eq!(fragments[1].x, 0.0);
        assert_eq!(fragments[1].y - fragments[0].y, 15.0);
        assert_eq!(height, 30.0);
    }

    #[test]
    fn test_paragraph_end_adds_step() {
        let (fragments, height) = run("<div><p>one</p>two</div>", 500.0);
        assert_eq!(fragments[1].y - fragments[0].y, 15.0 + 18.0);
        assert_eq!(height, 15.0 + 18.0 + 15.0);
    }

    #[test]
    fn test_style_restored_after_element() {
        let (fragments, _) = run("<span><i>a <b>b</b> c</i> d</span>", 500.0);
        let styles: Vec<FontStyle> = fragments.iter().map(|f| f.style).collect();
        let base = FontStyle::default();
        assert_eq!(styles, vec![base.italic(), base.italic().bold(), base.italic(), base]);
    }

    #[test]
    fn test_into_fragments_translates() {
        let dom = parse_html("<span>x</span>");
        let mut metrics = FixedMetrics;
        let mut inline = InlineLayout::new(&mut metrics, 100.0, 18.0);
        inline.walk(&dom, dom.root(), FontStyle::default()).unwrap();
        inline.flush().unwrap();
        let fragments = inline.into_fragments(13.0, 100.0);
        assert_eq!((fragments[0].x, fragments[0].y), (13.0, 102.25));
    }
}
