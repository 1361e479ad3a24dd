use log::debug;

use crate::{
    font::{FontBackend, RasterizedGlyph},
    texture::Texture,
};

/// Number of character codes an atlas covers (single-byte charset).
pub const CHARSET_SIZE: usize = 256;

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Places rects side by side along a single row, in the order they're added.
#[derive(Debug, Default)]
struct RowPacker {
    width: u32,
    height: u32,
}

impl RowPacker {
    fn add(&mut self, w: u32, h: u32) -> Rect {
        let rect = Rect {
            x: self.width,
            y: 0,
            w,
            h,
        };
        self.width += w;
        self.height = self.height.max(h);
        rect
    }
}

/// Placement and spacing of one character inside a [GlyphAtlas].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CharMetric {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    pub advance_x: i32,
    pub advance_y: i32,
    /// Horizontal position in the atlas texture, normalized to [0, 1). Always 0 for empty glyphs.
    pub x_offset: f32,
}

impl CharMetric {
    /// Glyphs without pixels still advance the pen but never produce geometry.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Every character code of one face at one pixel size, rasterized once and packed into a single texture.
#[derive(Debug)]
pub struct GlyphAtlas {
    texture: Texture,
    metrics: Vec<CharMetric>,
    pixel_size: u32,
    line_height: i32,
}

impl GlyphAtlas {
    pub fn build(face: &dyn FontBackend, pixel_size: u32) -> Self {
        let glyphs = (0..=u8::MAX)
            .map(|code| {
                face.rasterize(code, pixel_size).unwrap_or_else(|err| {
                    debug!("Using a blank glyph at {}px: {}", pixel_size, err);
                    RasterizedGlyph::blank()
                })
            })
            .collect::<Vec<_>>();

        let mut packer = RowPacker::default();
        let rects = glyphs
            .iter()
            .map(|glyph| packer.add(glyph.width, glyph.height))
            .collect::<Vec<_>>();

        let mut texture = Texture::blank(packer.width, packer.height);
        for (glyph, rect) in glyphs.iter().zip(&rects) {
            texture.blit(rect.x, rect.y, rect.w, rect.h, &glyph.bitmap);
        }

        let metrics = glyphs
            .iter()
            .zip(&rects)
            .map(|(glyph, rect)| CharMetric {
                width: glyph.width,
                height: glyph.height,
                left: glyph.left,
                top: glyph.top,
                advance_x: glyph.advance_x,
                advance_y: glyph.advance_y,
                // empty glyphs can sit right at the end of the row
                x_offset: if rect.w == 0 || rect.h == 0 {
                    0.0
                } else {
                    rect.x as f32 / packer.width as f32
                },
            })
            .collect();

        debug!(
            "Built {}x{} glyph atlas at {}px",
            texture.width, texture.height, pixel_size
        );

        Self {
            texture,
            metrics,
            pixel_size,
            line_height: face.line_height(pixel_size),
        }
    }

    /// Maps a character onto the atlas charset; anything past 0xFF has no slot.
    pub fn char_code(character: char) -> Option<u8> {
        u8::try_from(character).ok()
    }

    /// Characters outside the charset get a blank metric.
    pub fn metric(&self, character: char) -> CharMetric {
        Self::char_code(character)
            .and_then(|code| self.metrics.get(code as usize))
            .copied()
            .unwrap_or_default()
    }

    pub fn metrics(&self) -> &[CharMetric] {
        &self.metrics
    }

    /// Sum of horizontal advances, kerning not included.
    pub fn advance_width(&self, text: &str) -> i32 {
        text.chars().map(|c| self.metric(c).advance_x).sum()
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn width(&self) -> u32 {
        self.texture.width
    }

    pub fn height(&self) -> u32 {
        self.texture.height
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    pub fn line_height(&self) -> i32 {
        self.line_height
    }
}
