use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, warn};
use rusttype::{point, Font, Scale};
use thiserror::Error;

use crate::style::{FontStyle, Slant, Weight};

/// Points to pixels at 96 DPI.
pub const PIXELS_PER_POINT: f32 = 96.0 / 72.0;

/// Vertical metrics of one style. Both `ascent` and `descent` are
/// distances from the baseline and are non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_spacing: f32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("no font face available for {0}")]
    Unavailable(FontStyle),

    #[error("invalid font data in {0}")]
    InvalidFont(String),
}

/// Text measurement consumed by the layout engine.
///
/// Results must be deterministic for a given style within one run.
/// Methods take `&mut self` so implementations can cache per style.
pub trait TypeMetrics {
    /// Advance width of `text` set in `style`.
    fn measure(&mut self, text: &str, style: &FontStyle) -> Result<f32, MetricsError>;

    fn metrics(&mut self, style: &FontStyle) -> Result<FontMetrics, MetricsError>;
}

/// Metrics derived from the style size alone: every character advances
/// half the size, ascent is three quarters of it and descent one quarter.
///
/// Used for headless runs without font files, and in tests where exact
/// arithmetic matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMetrics;

impl TypeMetrics for FixedMetrics {
    fn measure(&mut self, text: &str, style: &FontStyle) -> Result<f32, MetricsError> {
        Ok(text.chars().count() as f32 * f32::from(style.size) * 0.5)
    }

    fn metrics(&mut self, style: &FontStyle) -> Result<FontMetrics, MetricsError> {
        let size = f32::from(style.size);
        Ok(FontMetrics {
            ascent: size * 0.75,
            descent: size * 0.25,
            line_spacing: size,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Variant {
    weight: Weight,
    slant: Slant,
}

impl Variant {
    const REGULAR: Variant = Variant { weight: Weight::Normal, slant: Slant::Roman };

    fn of(style: &FontStyle) -> Self {
        Self { weight: style.weight, slant: style.slant }
    }
}

/// `rusttype`-backed metrics service.
///
/// One face per weight/slant variant is loaded lazily from the system
/// font directories. A missing variant falls back to the regular face.
/// Vertical metrics are cached per style.
pub struct FontManager {
    faces: HashMap<Variant, Font<'static>>,
    /// Variants already probed on disk without success.
    missing: HashSet<Variant>,
    /// Skip the disk and serve every variant from the regular face.
    pinned: bool,
    cache: HashMap<FontStyle, FontMetrics>,
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            faces: HashMap::new(),
            missing: HashSet::new(),
            pinned: false,
            cache: HashMap::new(),
        }
    }

    /// Use a single font for every style.
    pub fn from_bytes(data: Vec<u8>, origin: &str) -> Result<Self, MetricsError> {
        let font = Font::try_from_vec(data).ok_or_else(|| MetricsError::InvalidFont(origin.to_string()))?;
        let mut manager = Self::new();
        manager.faces.insert(Variant::REGULAR, font);
        manager.pinned = true;
        Ok(manager)
    }

    pub fn from_file(path: &Path) -> Result<Self, MetricsError> {
        let origin = path.display().to_string();
        let data = std::fs::read(path).map_err(|e| {
            warn!("failed to read font {}: {}", origin, e);
            MetricsError::InvalidFont(origin.clone())
        })?;
        Self::from_bytes(data, &origin)
    }

    /// Face and pixel scale to draw `style` with.
    pub fn face(&mut self, style: &FontStyle) -> Result<(&Font<'static>, Scale), MetricsError> {
        let variant = self.resolve(Variant::of(style)).ok_or(MetricsError::Unavailable(*style))?;
        let font = self.faces.get(&variant).ok_or(MetricsError::Unavailable(*style))?;
        Ok((font, Scale::uniform(f32::from(style.size) * PIXELS_PER_POINT)))
    }

    /// Key of a loaded face that can serve `wanted`.
    fn resolve(&mut self, wanted: Variant) -> Option<Variant> {
        if self.faces.contains_key(&wanted) {
            return Some(wanted);
        }
        if !self.pinned && !self.missing.contains(&wanted) {
            match load_system_face(wanted) {
                Some(font) => {
                    self.faces.insert(wanted, font);
                    return Some(wanted);
                }
                None => {
                    debug!("no system face for {:?}", wanted);
                    self.missing.insert(wanted);
                }
            }
        }
        if wanted != Variant::REGULAR {
            return self.resolve(Variant::REGULAR);
        }
        None
    }
}

impl TypeMetrics for FontManager {
    fn measure(&mut self, text: &str, style: &FontStyle) -> Result<f32, MetricsError> {
        let (font, scale) = self.face(style)?;
        let width = font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        Ok(width)
    }

    fn metrics(&mut self, style: &FontStyle) -> Result<FontMetrics, MetricsError> {
        if let Some(metrics) = self.cache.get(style) {
            return Ok(*metrics);
        }
        let (font, scale) = self.face(style)?;
        let v = font.v_metrics(scale);
        let metrics = FontMetrics {
            ascent: v.ascent,
            descent: -v.descent,
            line_spacing: v.ascent - v.descent + v.line_gap,
        };
        self.cache.insert(*style, metrics);
        Ok(metrics)
    }
}

fn load_system_face(variant: Variant) -> Option<Font<'static>> {
    let data = system_font_bytes(variant)?;
    Font::try_from_vec(data)
}

#[cfg(target_os = "windows")]
fn system_font_bytes(variant: Variant) -> Option<Vec<u8>> {
    let fonts_dir = std::env::var("WINDIR").ok().map(|wd| format!("{}\\Fonts", wd))?;
    let filename = match (variant.weight, variant.slant) {
        (Weight::Normal, Slant::Roman) => "times.ttf",
        (Weight::Bold, Slant::Roman) => "timesbd.ttf",
        (Weight::Normal, Slant::Italic) => "timesi.ttf",
        (Weight::Bold, Slant::Italic) => "timesbi.ttf",
    };
    std::fs::read(format!("{}\\{}", fonts_dir, filename)).ok()
}

#[cfg(target_os = "macos")]
fn system_font_bytes(variant: Variant) -> Option<Vec<u8>> {
    let home = std::env::var("HOME").unwrap_or_default();
    let fonts_paths = [
        format!("{}/Library/Fonts", home),
        "/Library/Fonts".to_string(),
        "/System/Library/Fonts/Supplemental".to_string(),
    ];
    let filename = match (variant.weight, variant.slant) {
        (Weight::Normal, Slant::Roman) => "Times New Roman.ttf",
        (Weight::Bold, Slant::Roman) => "Times New Roman Bold.ttf",
        (Weight::Normal, Slant::Italic) => "Times New Roman Italic.ttf",
        (Weight::Bold, Slant::Italic) => "Times New Roman Bold Italic.ttf",
    };
    fonts_paths
        .iter()
        .find_map(|dir| std::fs::read(format!("{}/{}", dir, filename)).ok())
}

#[cfg(target_os = "linux")]
fn system_font_bytes(variant: Variant) -> Option<Vec<u8>> {
    let home_fonts = format!("{}/.local/share/fonts", std::env::var("HOME").unwrap_or_default());
    let fonts_paths = [
        "/usr/share/fonts/truetype",
        "/usr/local/share/fonts/truetype",
        home_fonts.as_str(),
    ];
    let filenames: [&str; 2] = match (variant.weight, variant.slant) {
        (Weight::Normal, Slant::Roman) => {
            ["liberation/LiberationSerif-Regular.ttf", "dejavu/DejaVuSerif.ttf"]
        }
        (Weight::Bold, Slant::Roman) => {
            ["liberation/LiberationSerif-Bold.ttf", "dejavu/DejaVuSerif-Bold.ttf"]
        }
        (Weight::Normal, Slant::Italic) => {
            ["liberation/LiberationSerif-Italic.ttf", "dejavu/DejaVuSerif-Italic.ttf"]
        }
        (Weight::Bold, Slant::Italic) => {
            ["liberation/LiberationSerif-BoldItalic.ttf", "dejavu/DejaVuSerif-BoldItalic.ttf"]
        }
    };
    for dir in fonts_paths {
        for filename in filenames {
            if let Ok(data) = std::fs::read(format!("{}/{}", dir, filename)) {
                return Some(data);
            }
        }
    }
    None
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn system_font_bytes(_variant: Variant) -> Option<Vec<u8>> {
    None
}
