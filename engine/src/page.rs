//! One loaded document and its scroll position.
//!
//! Every load rebuilds the DOM, box tree and display list from scratch.
//! Scrolling only changes the offset; each redraw re-projects the stored
//! display list.

use log::{debug, info};

use crate::dom::Dom;
use crate::error::Result;
use crate::font::TypeMetrics;
use crate::layout::{self, Fragment, LayoutBox};
use crate::net::PageSource;
use crate::paint::{DisplayList, RenderSurface};
use crate::parser::parse_html;
use crate::viewport::Viewport;

pub struct Page {
    dom: Dom,
    layout_root: LayoutBox,
    display_list: DisplayList,
    content_height: f32,
    scroll: f32,
    viewport: Viewport,
}

impl Page {
    /// Fetch `address` from `source` and lay it out.
    pub fn load(
        source: &dyn PageSource,
        address: &str,
        metrics: &mut dyn TypeMetrics,
        viewport: Viewport,
    ) -> Result<Self> {
        info!("loading {}", address);
        let markup = source.fetch(address)?;
        Self::from_markup(&markup, metrics, viewport)
    }

    pub fn from_markup(markup: &str, metrics: &mut dyn TypeMetrics, viewport: Viewport) -> Result<Self> {
        let dom = parse_html(markup);
        let tree = layout::layout(&dom, &viewport, metrics)?;
        debug!("display list has {} fragments", tree.fragments.len());
        Ok(Self {
            dom,
            layout_root: tree.root,
            display_list: tree.fragments,
            content_height: tree.content_height,
            scroll: 0.0,
            viewport,
        })
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn layout_root(&self) -> &LayoutBox {
        &self.layout_root
    }

    pub fn display_list(&self) -> &[Fragment] {
        &self.display_list
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn title(&self) -> Option<String> {
        self.dom.title()
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// No upper bound: scrolling past the end shows an empty window.
    pub fn scroll_down(&mut self) {
        self.scroll += self.viewport.scroll_step;
    }

    pub fn scroll_up(&mut self) {
        self.scroll = (self.scroll - self.viewport.scroll_step).max(0.0);
    }

    /// Visible fragments in screen coordinates.
    pub fn visible(&self) -> Vec<Fragment> {
        self.viewport.project(&self.display_list, self.scroll)
    }

    pub fn draw(&self, surface: &mut dyn RenderSurface) {
        surface.clear();
        for fragment in self.visible() {
            surface.draw_text(fragment.x, fragment.y, &fragment.text, &fragment.style);
        }
    }
}
