//! A deterministic face for tests, so nothing depends on a font file being installed.

use std::{cell::Cell, rc::Rc};

use crate::{
    error::{Result, TextError},
    font::{FontBackend, RasterizedGlyph},
};

pub const GLYPH_WIDTH: u32 = 6;
pub const GLYPH_HEIGHT: u32 = 8;
pub const ADVANCE: i32 = 8;
pub const SPACE_ADVANCE: i32 = 5;
pub const WIDE_ADVANCE: i32 = 12;
pub const DESCENDER_HEIGHT: u32 = 10;
pub const NARROW_ADVANCE: i32 = 2;
pub const VERTICAL_ADVANCE: i32 = 4;

/// Printable ASCII rasterizes, space is an empty bitmap, everything else fails.
///
/// `W` is wide, `i` and `l` are narrow, `g` and `y` are tall, `AV` kerns by -2.
/// The vertical tab is empty and only moves the pen up.
#[derive(Clone, Default)]
pub struct MockFace {
    rasterized: Rc<Cell<usize>>,
}

impl MockFace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares the rasterize counter with the face, which moves into a handle.
    pub fn counter(&self) -> Rc<Cell<usize>> {
        self.rasterized.clone()
    }
}

impl FontBackend for MockFace {
    fn rasterize(&self, code: u8, _pixel_size: u32) -> Result<RasterizedGlyph> {
        self.rasterized.set(self.rasterized.get() + 1);

        if code == 0x0b {
            return Ok(RasterizedGlyph {
                advance_y: VERTICAL_ADVANCE,
                ..RasterizedGlyph::blank()
            });
        }

        let (width, height, top, advance_x) = match code {
            b' ' => (0, 0, 0, SPACE_ADVANCE),
            b'W' => (10, GLYPH_HEIGHT, 8, WIDE_ADVANCE),
            b'i' | b'l' => (2, GLYPH_HEIGHT, 8, NARROW_ADVANCE),
            b'g' | b'y' => (GLYPH_WIDTH, DESCENDER_HEIGHT, 7, ADVANCE),
            33..=126 => (GLYPH_WIDTH, GLYPH_HEIGHT, 8, ADVANCE),
            _ => {
                return Err(TextError::GlyphRasterize {
                    code,
                    reason: "not in mock face".into(),
                })
            }
        };

        Ok(RasterizedGlyph {
            width,
            height,
            left: if width == 0 { 0 } else { 1 },
            top,
            advance_x,
            advance_y: 0,
            bitmap: vec![code; (width * height) as usize],
        })
    }

    fn kerning(&self, left: u8, right: u8, _pixel_size: u32) -> (i32, i32) {
        match (left, right) {
            (b'A', b'V') => (-2, 0),
            _ => (0, 0),
        }
    }

    fn line_height(&self, pixel_size: u32) -> i32 {
        pixel_size as i32 * 5 / 4
    }
}
