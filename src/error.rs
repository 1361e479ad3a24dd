use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TextError>;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("couldn't read font file {path:?}")]
    FontNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported font data: {0}")]
    UnsupportedFormat(String),

    /// Only ever seen by the atlas, which swaps the glyph for a blank one.
    #[error("couldn't rasterize character code {code}: {reason}")]
    GlyphRasterize { code: u8, reason: String },

    #[error("graphics resource error: {0}")]
    GraphicsResource(String),
}
