// Display list construction and the drawing seam.

use crate::layout::{Fragment, LayoutBox};
use crate::style::FontStyle;

/// Fragments in paint order.
pub type DisplayList = Vec<Fragment>;

/// Something that can put text on screen. The pipeline calls `clear` once
/// before each redraw, then `draw_text` for every visible fragment with
/// screen coordinates of the fragment's top-left corner.
pub trait RenderSurface {
    fn clear(&mut self);

    fn draw_text(&mut self, x: f32, y: f32, text: &str, style: &FontStyle);
}

/// Pre-order walk collecting each box's fragments before its children's.
pub fn flatten(root: &LayoutBox) -> DisplayList {
    let mut list = Vec::new();
    collect(root, &mut list);
    list
}

fn collect(layout: &LayoutBox, list: &mut DisplayList) {
    list.extend(layout.fragments.iter().cloned());
    for child in &layout.children {
        collect(child, list);
    }
}
