pub mod dom;
pub mod error;
pub mod font;
pub mod layout;
pub mod net;
pub mod page;
pub mod paint;
pub mod parser;
pub mod style;
pub mod viewport;

pub use error::{Error, Result};
pub use font::{FixedMetrics, FontManager, FontMetrics, MetricsError, TypeMetrics};
pub use layout::{layout, Fragment, LayoutBox, LayoutMode, LayoutTree};
pub use net::{NetworkConfig, NetworkManager, PageSource, StaticSource};
pub use page::Page;
pub use paint::{flatten, DisplayList, RenderSurface};
pub use parser::parse_html;
pub use style::{FontStyle, Slant, Weight};
pub use viewport::{project, Viewport};
