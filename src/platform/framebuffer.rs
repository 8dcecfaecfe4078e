//=========================================================================
// Framebuffer
//=========================================================================
//
// CPU implementation of the core's `Surface` trait over a raw RGBA8
// frame, plus dialog-font rasterization.
//
// Everything here is plain pixel pushing: alpha-blended sprite blits with
// edge clipping, and rusttype glyph coverage blended as text. The frame
// slice itself comes from the pixels swapchain each displayed frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::Path;

use rusttype::{point, Font, Scale};

//=== Internal Dependencies ===============================================

use super::PlatformError;
use crate::core::assets::SpriteFrame;
use crate::core::render::{Rgba, Surface, Vec2};

//=== Constants ===========================================================

// Dialog type size in pixels.
const DIALOG_TEXT_SIZE: f32 = 40.0;

//=== DialogFont ==========================================================

/// The one font used for dialog overlays.
///
/// Loaded once at startup from the asset tree; a missing or undecodable
/// font file is fatal, like any other missing asset.
#[derive(Debug)]
pub(crate) struct DialogFont {
    font: Font<'static>,
}

impl DialogFont {
    /// Loads a TTF/OTF font from `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, PlatformError> {
        let bytes = fs::read(path).map_err(|source| PlatformError::FontLoad {
            path: path.to_path_buf(),
            reason: source.to_string(),
        })?;

        let font = Font::try_from_vec(bytes).ok_or_else(|| PlatformError::FontLoad {
            path: path.to_path_buf(),
            reason: "unsupported font format".to_string(),
        })?;

        Ok(Self { font })
    }
}

//=== Painter =============================================================

/// Raw pixel operations over an RGBA8 buffer: clear, blend, clipped blit.
///
/// Kept font-free so the drawing primitives are testable on a plain
/// buffer; `Framebuffer` layers text on top.
struct Painter<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Painter<'a> {
    /// Wraps a `width * height` RGBA8 buffer.
    ///
    /// # Panics
    ///
    /// Panics if the buffer length does not match the dimensions.
    fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        assert_eq!(
            frame.len(),
            (width * height * 4) as usize,
            "frame buffer does not match {}x{} RGBA8",
            width,
            height
        );
        Self {
            frame,
            width,
            height,
        }
    }

    fn fill(&mut self, color: Rgba) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    /// Source-over blend of one pixel; `coverage` in 0..=255. Pixels
    /// outside the buffer are clipped.
    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba, coverage: u32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        if coverage == 0 {
            return;
        }

        let index = ((y as u32 * self.width + x as u32) * 4) as usize;
        let pixel = &mut self.frame[index..index + 4];

        if coverage == 255 {
            pixel[..3].copy_from_slice(&color[..3]);
        } else {
            for channel in 0..3 {
                let src = color[channel] as u32;
                let dst = pixel[channel] as u32;
                pixel[channel] = ((src * coverage + dst * (255 - coverage)) / 255) as u8;
            }
        }
        pixel[3] = 255;
    }

    /// Alpha-blended blit of a sprite frame centered at `center`.
    fn blit_sprite(&mut self, sprite: &SpriteFrame, center: Vec2) {
        let left = (center.x - sprite.width() as f32 / 2.0).round() as i32;
        let top = (center.y - sprite.height() as f32 / 2.0).round() as i32;
        let pixels = sprite.pixels();

        for row in 0..sprite.height() as i32 {
            for col in 0..sprite.width() as i32 {
                let src = ((row as u32 * sprite.width() + col as u32) * 4) as usize;
                let color = [
                    pixels[src],
                    pixels[src + 1],
                    pixels[src + 2],
                    pixels[src + 3],
                ];
                self.blend_pixel(left + col, top + row, color, color[3] as u32);
            }
        }
    }
}

//=== Framebuffer =========================================================

/// One displayed frame's drawing target.
///
/// Borrows the presentation buffer for the duration of a render pass; the
/// scene draws through the `Surface` trait and never sees the platform.
pub(crate) struct Framebuffer<'a> {
    painter: Painter<'a>,
    font: &'a DialogFont,
}

impl<'a> Framebuffer<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32, font: &'a DialogFont) -> Self {
        Self {
            painter: Painter::new(frame, width, height),
            font,
        }
    }
}

impl Surface for Framebuffer<'_> {
    fn size(&self) -> (u32, u32) {
        (self.painter.width, self.painter.height)
    }

    fn clear(&mut self, color: Rgba) {
        self.painter.fill(color);
    }

    fn blit(&mut self, sprite: &SpriteFrame, center: Vec2) {
        self.painter.blit_sprite(sprite, center);
    }

    fn draw_text(&mut self, text: &str, anchor: Vec2, color: Rgba) {
        let scale = Scale::uniform(DIALOG_TEXT_SIZE);
        let ascent = self.font.font.v_metrics(scale).ascent;
        let origin = point(anchor.x, anchor.y + ascent);

        let glyphs: Vec<_> = self.font.font.layout(text, scale, origin).collect();
        for glyph in glyphs {
            let Some(bounds) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let x = bounds.min.x + gx as i32;
                let y = bounds.min.y + gy as i32;
                self.painter
                    .blend_pixel(x, y, color, (coverage * 255.0) as u32);
            });
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
