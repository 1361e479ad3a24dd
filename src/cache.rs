use std::{collections::HashMap, rc::Rc};

use log::debug;

use crate::{atlas::GlyphAtlas, font::FontHandle};

/// Lazily built atlases for one font, keyed by pixel size.
///
/// Nothing is ever evicted. A different font needs a different cache.
#[derive(Debug)]
pub struct AtlasCache {
    font: FontHandle,
    atlases: HashMap<u32, Rc<GlyphAtlas>>,
}

impl AtlasCache {
    pub fn new(font: FontHandle) -> Self {
        Self {
            font,
            atlases: HashMap::new(),
        }
    }

    pub fn atlas_for(&mut self, pixel_size: u32) -> Rc<GlyphAtlas> {
        if let Some(atlas) = self.atlases.get(&pixel_size) {
            debug!("Atlas cache hit for {}px", pixel_size);
            return atlas.clone();
        }

        debug!("Atlas cache miss for {}px", pixel_size);
        let atlas = Rc::new(GlyphAtlas::build(self.font.face(), pixel_size));
        self.atlases.insert(pixel_size, atlas.clone());
        atlas
    }

    pub fn contains(&self, pixel_size: u32) -> bool {
        self.atlases.contains_key(&pixel_size)
    }

    pub fn len(&self) -> usize {
        self.atlases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atlases.is_empty()
    }

    pub fn font(&self) -> &FontHandle {
        &self.font
    }
}
