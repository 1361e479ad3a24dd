// text labels:
// - glyphs of a face at a pixel size are rasterized once into a row-packed atlas
// - the layout turns a string into textured quads in normalized device coordinates
// - a label owns the atlases and redoes the whole layout whenever anything changes

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

pub mod label;
pub mod layout;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FontFlags: u32 {
        const LEFT_ALIGNED = 1 << 0;
        const CENTER_ALIGNED = 1 << 1;
        const RIGHT_ALIGNED = 1 << 2;
        /// Wrap words at the label's box width (a width of 0 never wraps).
        const WORD_WRAP = 1 << 3;
        /// Push the first line right by one pixel-size unit.
        const INDENTED = 1 << 4;

        const ALIGNMENT = Self::LEFT_ALIGNED.bits()
            | Self::CENTER_ALIGNED.bits()
            | Self::RIGHT_ALIGNED.bits();
    }
}

impl FontFlags {
    /// Alignment flags are meant to be exclusive; if several are set, center wins over right wins over left.
    pub fn alignment(self) -> Alignment {
        if self.contains(FontFlags::CENTER_ALIGNED) {
            Alignment::Center
        } else if self.contains(FontFlags::RIGHT_ALIGNED) {
            Alignment::Right
        } else {
            Alignment::Left
        }
    }

    pub fn with_alignment(self, alignment: Alignment) -> Self {
        self.difference(FontFlags::ALIGNMENT) | alignment.flag()
    }
}

impl Default for FontFlags {
    fn default() -> Self {
        FontFlags::LEFT_ALIGNED | FontFlags::WORD_WRAP
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn flag(self) -> FontFlags {
        match self {
            Alignment::Left => FontFlags::LEFT_ALIGNED,
            Alignment::Center => FontFlags::CENTER_ALIGNED,
            Alignment::Right => FontFlags::RIGHT_ALIGNED,
        }
    }

    /// How far left of the anchor a line of `line_width` starts.
    pub fn offset(self, line_width: f32) -> f32 {
        match self {
            Alignment::Left => 0.0,
            Alignment::Center => line_width / 2.0,
            Alignment::Right => line_width,
        }
    }
}

/// One vertex of a glyph quad: normalized device position and atlas texture coordinates.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub u: f32,
    pub v: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self { x, y, u, v }
    }
}
