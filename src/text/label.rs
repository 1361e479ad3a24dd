use std::rc::Rc;

use nalgebra::{Matrix4, Vector3};

use crate::{atlas::GlyphAtlas, cache::AtlasCache, font::FontHandle, transform::LabelTransform};

use super::{
    layout::{layout, LayoutParams},
    Alignment, FontFlags, Point,
};

pub const DEFAULT_PIXEL_SIZE: u32 = 48;

/// A block of text ready to be drawn.
///
/// Every setter that can move a glyph reruns the whole layout before returning, so
/// [vertices][Label::vertices] is always current. Labels change far less often than they
/// are drawn, which makes that cheaper than tracking what went stale.
pub struct Label {
    cache: AtlasCache,
    atlas: Rc<GlyphAtlas>,
    text: String,
    x: f32,
    y: f32,
    width: i32,
    height: i32,
    pixel_size: u32,
    flags: FontFlags,
    window_width: u32,
    window_height: u32,
    color: [f32; 4],
    transform: LabelTransform,
    vertices: Vec<Point>,
}

impl Label {
    pub fn new(font: FontHandle, window_width: u32, window_height: u32) -> Self {
        let mut cache = AtlasCache::new(font);
        let atlas = cache.atlas_for(DEFAULT_PIXEL_SIZE);
        Self {
            cache,
            atlas,
            text: String::new(),
            x: 0.0,
            y: 0.0,
            width: 0,
            height: 0,
            pixel_size: DEFAULT_PIXEL_SIZE,
            flags: FontFlags::default(),
            window_width,
            window_height,
            color: [0.0, 0.0, 0.0, 1.0],
            transform: LabelTransform::new(),
            vertices: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.set_position(x, y);
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.set_size(width, height);
        self
    }

    pub fn with_pixel_size(mut self, pixel_size: u32) -> Self {
        self.set_pixel_size(pixel_size);
        self
    }

    pub fn with_flags(mut self, flags: FontFlags) -> Self {
        self.set_font_flags(flags);
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.set_color(color);
        self
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.recalculate();
    }

    /// Top left of the text block, in window pixels.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.recalculate();
    }

    /// Wrap box in window pixels; 0 leaves that axis unbounded.
    pub fn set_size(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.recalculate();
    }

    /// Switches atlas, building one for this size if the label hasn't used it before.
    pub fn set_pixel_size(&mut self, pixel_size: u32) {
        self.pixel_size = pixel_size;
        self.atlas = self.cache.atlas_for(pixel_size);
        self.recalculate();
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
        self.recalculate();
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.flags = self.flags.with_alignment(alignment);
        self.recalculate();
    }

    pub fn set_font_flags(&mut self, flags: FontFlags) {
        self.flags = flags;
        self.recalculate();
    }

    pub fn append_font_flags(&mut self, flags: FontFlags) {
        self.flags |= flags;
        self.recalculate();
    }

    /// Atlases belong to a face, so the old ones are all dropped.
    pub fn set_font(&mut self, font: FontHandle) {
        self.cache = AtlasCache::new(font);
        self.atlas = self.cache.atlas_for(self.pixel_size);
        self.recalculate();
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }

    pub fn rotate(&mut self, degrees: f32, x: f32, y: f32, z: f32) {
        self.transform.rotate(degrees, Vector3::new(x, y, z));
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.transform.scale(x, y, z);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn font_flags(&self) -> FontFlags {
        self.flags
    }

    pub fn alignment(&self) -> Alignment {
        self.flags.alignment()
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn font(&self) -> &FontHandle {
        self.cache.font()
    }

    pub fn atlas(&self) -> &Rc<GlyphAtlas> {
        &self.atlas
    }

    pub fn atlas_cache(&self) -> &AtlasCache {
        &self.cache
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn mvp(&self) -> Matrix4<f32> {
        self.transform.model_view_projection()
    }

    fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            x: self.x,
            y: self.y,
            box_width: self.width,
            box_height: self.height,
            alignment: self.flags.alignment(),
            word_wrap: self.flags.contains(FontFlags::WORD_WRAP),
            indented: self.flags.contains(FontFlags::INDENTED),
            window_width: self.window_width,
            window_height: self.window_height,
        }
    }

    fn recalculate(&mut self) {
        self.vertices = layout(
            &self.text,
            &self.layout_params(),
            &self.atlas,
            self.cache.font(),
        );
    }
}
