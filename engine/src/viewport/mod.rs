use log::trace;

use crate::layout::Fragment;

/// Fixed window onto the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Left and right page margin.
    pub hstep: f32,
    /// Top and bottom page margin, paragraph spacing, and the line height
    /// assumed when culling.
    pub vstep: f32,
    /// Distance moved by one scroll event.
    pub scroll_step: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            hstep: 13.0,
            vstep: 18.0,
            scroll_step: 100.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height, ..Self::default() }
    }

    /// Width available to page content between the margins.
    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * self.hstep).max(0.0)
    }

    /// Fragments that intersect the window at `scroll`, moved to screen
    /// coordinates. Only vertical culling is done.
    pub fn project(&self, fragments: &[Fragment], scroll: f32) -> Vec<Fragment> {
        project(fragments, scroll, self.height, self.vstep)
    }
}

/// Keep fragments with `y` in `[scroll - line_height, scroll + height]`
/// and shift them up by `scroll`.
pub fn project(fragments: &[Fragment], scroll: f32, height: f32, line_height: f32) -> Vec<Fragment> {
    let visible: Vec<Fragment> = fragments
        .iter()
        .filter(|f| f.y <= scroll + height && f.y + line_height >= scroll)
        .map(|f| Fragment { y: f.y - scroll, ..f.clone() })
        .collect();
    trace!("projected {} of {} fragments at scroll {}", visible.len(), fragments.len(), scroll);
    visible
}
