pub mod atlas;
pub mod cache;
pub mod error;
pub mod font;
pub mod surface;
pub mod text;
pub mod texture;
pub mod transform;
pub mod window;

#[cfg(test)]
mod testing;

pub use error::{Result, TextError};
pub use font::FontHandle;
pub use text::{label::Label, Alignment, FontFlags, Point};

// what's here:
// font -> atlas (one per pixel size, cached per label) -> layout -> quads -> surface
//
// the label is the only stateful piece. it redoes the whole layout on every change;
// labels change rarely compared to how often they're drawn, so there's no dirty tracking.
//
// things we might want later:
// - a code point keyed atlas instead of 0..=255, once something needs more than latin-1
// - sharing one atlas cache between labels that use the same font
