use std::{
    fmt,
    fs::File,
    io::{BufReader, Read},
    path::Path,
    rc::Rc,
};

use fontdue::{Font, FontSettings, LineMetrics};
use log::info;

use crate::error::{Result, TextError};

/// A glyph as handed back by a [FontBackend]: an 8-bit coverage bitmap plus placement metrics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RasterizedGlyph {
    pub width: u32,
    pub height: u32,
    /// Offset from the pen to the bitmap's left edge.
    pub left: i32,
    /// Offset from the baseline up to the bitmap's top row.
    pub top: i32,
    pub advance_x: i32,
    pub advance_y: i32,
    /// Row-major, `width * height` bytes.
    pub bitmap: Vec<u8>,
}

impl RasterizedGlyph {
    pub fn blank() -> Self {
        Self::default()
    }
}

/// Everything the atlas and the layout need from a font library.
///
/// Character codes are single bytes; a backend decides how those map onto its own glyphs.
pub trait FontBackend {
    fn rasterize(&self, code: u8, pixel_size: u32) -> Result<RasterizedGlyph>;

    /// Pen adjustment between two adjacent characters, in whole pixels.
    fn kerning(&self, left: u8, right: u8, pixel_size: u32) -> (i32, i32);

    /// Baseline-to-baseline distance in pixels.
    fn line_height(&self, pixel_size: u32) -> i32;
}

pub struct FontdueFace {
    font: Font,
}

impl FontdueFace {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|err| TextError::UnsupportedFormat(err.into()))?;
        Ok(Self { font })
    }
}

impl FontBackend for FontdueFace {
    fn rasterize(&self, code: u8, pixel_size: u32) -> Result<RasterizedGlyph> {
        let character = char::from(code);
        // glyph 0 is .notdef, control codes land here too
        if self.font.lookup_glyph_index(character) == 0 {
            return Err(TextError::GlyphRasterize {
                code,
                reason: "no glyph in face".into(),
            });
        }

        let (metrics, bitmap) = self.font.rasterize(character, pixel_size as f32);
        Ok(RasterizedGlyph {
            width: metrics.width as u32,
            height: metrics.height as u32,
            left: metrics.xmin,
            top: metrics.ymin + metrics.height as i32,
            advance_x: metrics.advance_width.round() as i32,
            advance_y: metrics.advance_height.round() as i32,
            bitmap,
        })
    }

    fn kerning(&self, left: u8, right: u8, pixel_size: u32) -> (i32, i32) {
        let dx = self
            .font
            .horizontal_kern(char::from(left), char::from(right), pixel_size as f32)
            .unwrap_or(0.0);
        (dx.round() as i32, 0)
    }

    fn line_height(&self, pixel_size: u32) -> i32 {
        line_height_from(self.font.horizontal_line_metrics(pixel_size as f32), pixel_size)
    }
}

/// Faces without horizontal line metrics step one pixel size per line.
fn line_height_from(metrics: Option<LineMetrics>, pixel_size: u32) -> i32 {
    metrics
        .map(|metrics| metrics.new_line_size.round() as i32)
        .unwrap_or(pixel_size as i32)
}

/// A parsed font, shared by every label that uses it.
///
/// Cloning is cheap and never re-parses: all clones point at the same face.
#[derive(Clone)]
pub struct FontHandle {
    face: Rc<dyn FontBackend>,
}

impl FontHandle {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let not_found = |source| TextError::FontNotFound {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(not_found)?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).map_err(not_found)?;

        let face = FontdueFace::from_bytes(buf)?;
        info!("Loaded font from {}", path.display());
        Ok(Self::from_backend(face))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self::from_backend(FontdueFace::from_bytes(bytes)?))
    }

    pub fn from_backend<B: FontBackend + 'static>(backend: B) -> Self {
        Self {
            face: Rc::new(backend),
        }
    }

    pub fn face(&self) -> &dyn FontBackend {
        self.face.as_ref()
    }

    pub fn kerning(&self, left: u8, right: u8, pixel_size: u32) -> (i32, i32) {
        self.face.kerning(left, right, pixel_size)
    }

    pub fn line_height(&self, pixel_size: u32) -> i32 {
        self.face.line_height(pixel_size)
    }

    /// True when both handles were cloned from the same parse.
    pub fn shares_face(&self, other: &FontHandle) -> bool {
        Rc::ptr_eq(&self.face, &other.face)
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("face", &Rc::as_ptr(&self.face))
            .finish()
    }
}
