use std::iter;

use itertools::Itertools;
use log::debug;

use crate::{atlas::GlyphAtlas, font::FontHandle};

use super::{Alignment, Point};

/// Where and how a block of text is laid out. Positions and box sizes are in window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    /// Left edge of the block, before alignment.
    pub x: f32,
    /// Top edge of the block.
    pub y: f32,
    /// 0 means unbounded.
    pub box_width: i32,
    /// 0 means unbounded.
    pub box_height: i32,
    pub alignment: Alignment,
    pub word_wrap: bool,
    pub indented: bool,
    pub window_width: u32,
    pub window_height: u32,
}

/// Pixel to normalized-device scale per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
struct NdcScale {
    sx: f32,
    sy: f32,
}

impl NdcScale {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            sx: 2.0 / window_width.max(1) as f32,
            sy: 2.0 / window_height.max(1) as f32,
        }
    }
}

/// Splits after every space, so each word keeps its trailing space and joining them gives back `text`.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_inclusive(' ').collect()
}

/// Greedily packs words into lines of at most `box_width` pixels.
///
/// A word may run over the remaining width by up to one space width before it's moved to
/// the next line. A word too wide for an empty line still closes it, leaving that line empty.
pub fn break_lines<'a>(
    text: &'a str,
    atlas: &GlyphAtlas,
    box_width: i32,
    word_wrap: bool,
) -> Vec<&'a str> {
    let wrap = word_wrap && box_width != 0;
    let space_width = atlas.advance_width(" ");

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_end = 0;
    let mut width_remaining = box_width;

    for word in split_words(text) {
        let word_width = atlas.advance_width(word);

        if wrap && word_width - space_width > width_remaining {
            lines.push(&text[line_start..line_end]);
            line_start = line_end;
            width_remaining = box_width - word_width;
        } else {
            width_remaining -= word_width;
        }
        line_end += word.len();
    }

    if line_end > line_start {
        lines.push(&text[line_start..line_end]);
    }
    lines
}

/// Lays `text` out into glyph quads, six [Point]s per visible glyph.
///
/// Lines past `box_height` are dropped. Never fails: characters the atlas doesn't know are blank.
pub fn layout(
    text: &str,
    params: &LayoutParams,
    atlas: &GlyphAtlas,
    font: &FontHandle,
) -> Vec<Point> {
    let mut points = Vec::new();
    if text.is_empty() {
        return points;
    }

    let lines = break_lines(text, atlas, params.box_width, params.word_wrap);
    let scale = NdcScale::new(params.window_width, params.window_height);
    let line_height = atlas.line_height() as f32;

    let start_y = params.y - line_height;
    let mut y = params.y;
    let mut indent = if params.indented && params.alignment != Alignment::Center {
        atlas.pixel_size() as f32
    } else {
        0.0
    };

    let mut laid_out = 0;
    for line in &lines {
        if params.box_height != 0 && y - start_y > params.box_height as f32 {
            break;
        }

        layout_line(
            line,
            params.x + indent,
            y,
            params.alignment,
            atlas,
            font,
            scale,
            &mut points,
        );
        y += line_height;
        indent = 0.0;
        laid_out += 1;
    }

    debug!(
        "Laid out {} of {} lines into {} vertices",
        laid_out,
        lines.len(),
        points.len()
    );
    points
}

#[allow(clippy::too_many_arguments)]
fn layout_line(
    line: &str,
    x: f32,
    y: f32,
    alignment: Alignment,
    atlas: &GlyphAtlas,
    font: &FontHandle,
    scale: NdcScale,
    points: &mut Vec<Point>,
) {
    let NdcScale { sx, sy } = scale;

    // (x, y) is the top left of the line but glyphs hang off the baseline, so drop a line
    let y = y + atlas.line_height() as f32;
    let x = x - alignment.offset(atlas.advance_width(line) as f32);

    let mut pen_x = -1.0 + x * sx;
    let mut pen_y = 1.0 - y * sy;

    let atlas_width = atlas.width().max(1) as f32;
    let atlas_height = atlas.height().max(1) as f32;

    let pairs = line
        .chars()
        .map(Some)
        .chain(iter::once(None))
        .tuple_windows::<(_, _)>()
        .filter_map(|(current, next)| current.map(|current| (current, next)));

    for (current, next) in pairs {
        let metric = atlas.metric(current);

        let x2 = pen_x + metric.left as f32 * sx;
        let y2 = -pen_y - metric.top as f32 * sy;
        let w = metric.width as f32 * sx;
        let h = metric.height as f32 * sy;

        let kerning = match (
            GlyphAtlas::char_code(current),
            next.and_then(GlyphAtlas::char_code),
        ) {
            (Some(left), Some(right)) => font.kerning(left, right, atlas.pixel_size()),
            _ => (0, 0),
        };

        pen_x += (metric.advance_x + kerning.0) as f32 * sx;
        pen_y += metric.advance_y as f32 * sy;

        if metric.is_empty() {
            continue;
        }

        let u0 = metric.x_offset;
        let u1 = metric.x_offset + metric.width as f32 / atlas_width;
        let v1 = metric.height as f32 / atlas_height;

        points.extend([
            Point::new(x2, -y2, u0, 0.0),
            Point::new(x2 + w, -y2, u1, 0.0),
            Point::new(x2, -y2 - h, u0, v1),
            Point::new(x2 + w, -y2, u1, 0.0),
            Point::new(x2, -y2 - h, u0, v1),
            Point::new(x2 + w, -y2 - h, u1, v1),
        ]);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::testing::{MockFace, ADVANCE, SPACE_ADVANCE, VERTICAL_ADVANCE};

    // one pixel is 0.01 across and 0.02 down
    const WINDOW_WIDTH: u32 = 200;
    const WINDOW_HEIGHT: u32 = 100;

    fn fixture() -> (GlyphAtlas, FontHandle) {
        let font = FontHandle::from_backend(MockFace::new());
        (GlyphAtlas::build(font.face(), 16), font)
    }

    fn params() -> LayoutParams {
        LayoutParams {
            x: 10.0,
            y: 20.0,
            box_width: 0,
            box_height: 0,
            alignment: Alignment::Left,
            word_wrap: true,
            indented: false,
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
        }
    }

    // x of a line's first vertex, for a glyph with a 1px left bearing
    fn first_glyph_x(points: &[Point]) -> f32 {
        points[0].x
    }

    #[test]
    fn split_words_keeps_spaces() {
        assert_eq!(split_words("hello world"), vec!["hello ", "world"]);
        assert_eq!(split_words("a  b "), vec!["a ", " ", "b "]);
        assert_eq!(split_words("single"), vec!["single"]);
        assert!(split_words("").is_empty());

        for text in ["hello world", "  leading", "trailing  ", "a b  c   d", ""] {
            assert_eq!(split_words(text).concat(), text);
        }
    }

    #[test]
    fn unbounded_text_is_one_line() {
        let (atlas, _) = fixture();
        assert_eq!(break_lines("hello world", &atlas, 0, true), vec!["hello world"]);
    }

    #[test]
    fn wraps_after_first_word() {
        let (atlas, _) = fixture();
        let box_width = atlas.advance_width("aa ") + 1;

        assert_eq!(
            break_lines("aa bb ii", &atlas, box_width, true),
            vec!["aa ", "bb ii"]
        );
        // "cc" needs more than the 1px left after "bb "
        assert_eq!(
            break_lines("aa bb cc", &atlas, box_width, true),
            vec!["aa ", "bb ", "cc"]
        );
    }

    #[test]
    fn words_may_overflow_by_one_space() {
        let (atlas, _) = fixture();
        let first = atlas.advance_width("aa ");
        let second = atlas.advance_width("bb");
        let space = atlas.advance_width(" ");

        // exactly at the slack limit the word stays
        let remaining = second - space;
        assert_eq!(
            break_lines("aa bb", &atlas, first + remaining, true),
            vec!["aa bb"]
        );
        // one pixel less and it moves down
        assert_eq!(
            break_lines("aa bb", &atlas, first + remaining - 1, true),
            vec!["aa ", "bb"]
        );
    }

    #[test]
    fn wrapping_needs_the_flag() {
        let (atlas, _) = fixture();
        assert_eq!(break_lines("aa bb cc", &atlas, 10, false), vec!["aa bb cc"]);
    }

    #[test]
    fn oversized_first_word_leaves_an_empty_line() {
        let (atlas, _) = fixture();
        assert_eq!(break_lines("WWWW", &atlas, 5, true), vec!["", "WWWW"]);
    }

    #[test]
    fn lines_cover_the_text() {
        let (atlas, _) = fixture();
        let text = "the quick brown fox jumps over the lazy dog";
        for box_width in [0, 1, 30, 60, 100, 1000] {
            assert_eq!(break_lines(text, &atlas, box_width, true).concat(), text);
        }
    }

    #[test]
    fn empty_text_has_no_quads() {
        let (atlas, font) = fixture();
        assert!(layout("", &params(), &atlas, &font).is_empty());
        assert!(break_lines("", &atlas, 100, true).is_empty());
    }

    #[test]
    fn spaces_only_produce_nothing() {
        let (atlas, font) = fixture();
        assert!(layout("    ", &params(), &atlas, &font).is_empty());
    }

    #[test]
    fn single_glyph_quad() {
        let (atlas, font) = fixture();
        let points = layout("a", &params(), &atlas, &font);
        assert_eq!(points.len(), 6);

        // baseline at 20 + 20px, 'a' is 6x8 with a 1px left bearing and sits on it
        let left = -1.0 + 11.0 * 0.01;
        let right = left + 0.06;
        let top = 1.0 - 40.0 * 0.02 + 8.0 * 0.02;
        let bottom = top - 8.0 * 0.02;
        let u0 = atlas.metric('a').x_offset;
        let u1 = u0 + 6.0 / atlas.width() as f32;
        let v1 = 8.0 / atlas.height() as f32;

        let expected = [
            (left, top, u0, 0.0),
            (right, top, u1, 0.0),
            (left, bottom, u0, v1),
            (right, top, u1, 0.0),
            (left, bottom, u0, v1),
            (right, bottom, u1, v1),
        ];
        for (point, (x, y, u, v)) in points.iter().zip(expected) {
            assert_relative_eq!(point.x, x, epsilon = 1e-5);
            assert_relative_eq!(point.y, y, epsilon = 1e-5);
            assert_relative_eq!(point.u, u, epsilon = 1e-5);
            assert_relative_eq!(point.v, v, epsilon = 1e-5);
        }
    }

    #[test]
    fn empty_glyphs_still_advance() {
        let (atlas, font) = fixture();
        let points = layout("a b", &params(), &atlas, &font);
        assert_eq!(points.len(), 12);

        let step = (ADVANCE + SPACE_ADVANCE) as f32 * 0.01;
        assert_relative_eq!(points[6].x - points[0].x, step, epsilon = 1e-5);
        assert_relative_eq!(points[6].y, points[0].y, epsilon = 1e-5);

        // the vertical tab has no pixels and no horizontal advance, only a vertical one
        let points = layout("a\u{b}b", &params(), &atlas, &font);
        assert_eq!(points.len(), 12);
        assert_relative_eq!(points[6].x - points[0].x, ADVANCE as f32 * 0.01, epsilon = 1e-5);
        assert_relative_eq!(
            points[6].y - points[0].y,
            VERTICAL_ADVANCE as f32 * 0.02,
            epsilon = 1e-5
        );
    }

    #[test]
    fn unknown_characters_are_blank() {
        let (atlas, font) = fixture();
        let points = layout("a\u{1}€b", &params(), &atlas, &font);
        assert_eq!(points.len(), 12);
        // neither blank glyph moved the pen
        assert_relative_eq!(points[6].x - points[0].x, ADVANCE as f32 * 0.01, epsilon = 1e-5);
    }

    #[test]
    fn kerning_moves_the_next_glyph() {
        let (atlas, font) = fixture();
        let kerned = layout("AV", &params(), &atlas, &font);
        let plain = layout("AB", &params(), &atlas, &font);

        assert_relative_eq!(kerned[6].x - kerned[0].x, (ADVANCE - 2) as f32 * 0.01, epsilon = 1e-5);
        assert_relative_eq!(plain[6].x - plain[0].x, ADVANCE as f32 * 0.01, epsilon = 1e-5);
    }

    #[test]
    fn alignment_shifts_the_line_start() {
        let (atlas, font) = fixture();
        let text = "abcd";
        let total = atlas.advance_width(text) as f32;
        let x0 = -1.0 + (10.0 + 1.0) * 0.01;

        let at = |alignment| {
            let params = LayoutParams {
                alignment,
                ..params()
            };
            first_glyph_x(&layout(text, &params, &atlas, &font))
        };

        assert_relative_eq!(at(Alignment::Left), x0, epsilon = 1e-5);
        assert_relative_eq!(at(Alignment::Center), x0 - total / 2.0 * 0.01, epsilon = 1e-5);
        assert_relative_eq!(at(Alignment::Right), x0 - total * 0.01, epsilon = 1e-5);
    }

    #[test]
    fn alignment_ignores_the_box() {
        let (atlas, font) = fixture();
        let unbounded = LayoutParams {
            alignment: Alignment::Right,
            ..params()
        };
        let boxed = LayoutParams {
            box_width: 500,
            ..unbounded
        };
        assert_eq!(
            layout("abc", &unbounded, &atlas, &font),
            layout("abc", &boxed, &atlas, &font)
        );
    }

    #[test]
    fn lines_step_down_by_line_height() {
        let (atlas, font) = fixture();
        let params = LayoutParams {
            box_width: atlas.advance_width("aa ") + 1,
            ..params()
        };
        let points = layout("aa bb", &params, &atlas, &font);
        assert_eq!(points.len(), 24);

        // second line starts back at x with its top 20px lower
        assert_relative_eq!(points[12].x, points[0].x, epsilon = 1e-5);
        assert_relative_eq!(points[0].y - points[12].y, 20.0 * 0.02, epsilon = 1e-5);
    }

    #[test]
    fn box_height_drops_overflowing_lines() {
        let (atlas, font) = fixture();
        let box_width = atlas.advance_width("aa ") + 1;
        let lines_at = |box_height| {
            let params = LayoutParams {
                box_width,
                box_height,
                ..params()
            };
            layout("aa bb cc", &params, &atlas, &font).len() / 12
        };

        assert_eq!(lines_at(0), 3);
        assert_eq!(lines_at(60), 3);
        assert_eq!(lines_at(59), 2);
        assert_eq!(lines_at(20), 1);
        assert_eq!(lines_at(19), 0);
    }

    #[test]
    fn indent_only_applies_to_the_first_line() {
        let (atlas, font) = fixture();
        let params = LayoutParams {
            box_width: atlas.advance_width("aa ") + 1,
            indented: true,
            ..params()
        };
        let points = layout("aa bb", &params, &atlas, &font);

        // 16px at a pixel size of 16
        assert_relative_eq!(points[0].x - points[12].x, 16.0 * 0.01, epsilon = 1e-5);
    }

    #[test]
    fn centered_text_is_never_indented() {
        let (atlas, font) = fixture();
        let centered = LayoutParams {
            alignment: Alignment::Center,
            ..params()
        };
        let indented = LayoutParams {
            indented: true,
            ..centered
        };
        assert_eq!(
            layout("abc", &centered, &atlas, &font),
            layout("abc", &indented, &atlas, &font)
        );
    }

    #[test]
    fn layout_is_repeatable() {
        let (atlas, font) = fixture();
        let params = LayoutParams {
            box_width: 40,
            ..params()
        };
        let text = "some words to wrap around";
        assert_eq!(
            layout(text, &params, &atlas, &font),
            layout(text, &params, &atlas, &font)
        );
    }

    #[test]
    fn zero_window_does_not_blow_up() {
        let (atlas, font) = fixture();
        let params = LayoutParams {
            window_width: 0,
            window_height: 0,
            ..params()
        };
        let points = layout("ab", &params, &atlas, &font);
        assert!(points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}
