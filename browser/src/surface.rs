use log::warn;
use rusttype::point;

use engine::paint::RenderSurface;
use engine::{FontManager, FontStyle, TypeMetrics};

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const TEXT_COLOR: (u8, u8, u8) = (0, 0, 0);

/// RGBA frame buffer that rasterizes fragments with `rusttype`.
pub struct PixelSurface<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
    fonts: &'a mut FontManager,
}

impl<'a> PixelSurface<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize, fonts: &'a mut FontManager) -> Self {
        Self { frame, width, height, fonts }
    }
}

impl RenderSurface for PixelSurface<'_> {
    fn clear(&mut self) {
        for px in self.frame.chunks_exact_mut(4) {
            px.copy_from_slice(&BACKGROUND);
        }
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, style: &FontStyle) {
        let ascent = match self.fonts.metrics(style) {
            Ok(m) => m.ascent,
            Err(e) => {
                warn!("skipping {:?}: {}", text, e);
                return;
            }
        };
        let (font, scale) = match self.fonts.face(style) {
            Ok(face) => face,
            Err(e) => {
                warn!("skipping {:?}: {}", text, e);
                return;
            }
        };

        let frame = &mut *self.frame;
        let (width, height) = (self.width as i32, self.height as i32);
        let (text_r, text_g, text_b) = TEXT_COLOR;

        for glyph in font.layout(text, scale, point(x, y + ascent)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, v| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px >= width || py >= height {
                    return;
                }
                let idx = (py as usize * width as usize + px as usize) * 4;
                let cov = (v * 255.0) as u32;
                let blend = |bg: u8, fg: u8| ((bg as u32 * (255 - cov) + fg as u32 * cov) / 255) as u8;
                frame[idx] = blend(frame[idx], text_r);
                frame[idx + 1] = blend(frame[idx + 1], text_g);
                frame[idx + 2] = blend(frame[idx + 2], text_b);
                frame[idx + 3] = 255;
            });
        }
    }
}
