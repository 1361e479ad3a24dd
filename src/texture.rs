use std::path::Path;

use image::GrayImage;

use crate::error::{Result, TextError};

/// Single channel, 8 bits per pixel, row-major with no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; byte_len(width, height)],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(self.offset(x, y)).copied()
    }

    /// Copies a `w * h` bitmap in with its top-left corner at (x, y).
    ///
    /// Rows or columns falling outside the texture are dropped.
    pub fn blit(&mut self, x: u32, y: u32, w: u32, h: u32, bitmap: &[u8]) {
        let columns = w.min(self.width.saturating_sub(x)) as usize;
        if columns == 0 {
            return;
        }
        for row in 0..h.min(self.height.saturating_sub(y)) {
            let src = byte_len(w, row);
            let dst = self.offset(x, y + row);
            let Some(line) = bitmap.get(src..src + columns) else {
                break;
            };
            self.data[dst..dst + columns].copy_from_slice(line);
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        byte_len(self.width, y) + x as usize
    }

    /// Writes the texture out as a grayscale PNG, handy for eyeballing an atlas.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let image = GrayImage::from_raw(self.width, self.height, self.data.clone()).ok_or(
            TextError::GraphicsResource("texture data doesn't match its size".into()),
        )?;
        image
            .save(path.as_ref())
            .map_err(|err| TextError::GraphicsResource(err.to_string()))
    }
}

// in usize, big atlases overflow u32
fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
