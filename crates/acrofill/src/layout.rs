//! Text layout for generated appearances.
//!
//! Pure computations from font metrics and box geometry: no rendering
//! engine is consulted. Font sizing, the vertical baseline placement, the
//! quadding-dependent horizontal offset, comb cell positions and the
//! list-box option window are all derived here and consumed by the
//! appearance synthesizer.
//!
//! Several formulas are reverse-engineered placement rules matched
//! against the output of interactive viewers rather than documented
//! rendering math; they are preserved exactly, quirks included, because
//! changing them changes the visual output of existing documents.

use crate::error::GenError;
use crate::font_metrics::{Font, FontKind};
use acrofill_core::{FillError, Quadding, Rect};

/// Padding applied around a widget's bounding box when deriving the
/// padding edge and content area.
pub const DEFAULT_PADDING: f64 = 1.0;

/// Fixed downward offset between lines of a multi-line value.
pub const MULTILINE_LEADING: f64 = 13.0;

/// Fill color for the selected row of a list box. Interactive viewers use
/// this exact value regardless of any color set in the stream.
pub const HIGHLIGHT_COLOR: &str = "0.600006 0.756866 0.854904 rg";

/// Width of the box with the border line width taken off both sides.
pub fn available_width(bbox: Rect, line_width: f64) -> f64 {
    bbox.width() - 2.0 * line_width
}

/// Height of the box with the border line width taken off both sides.
pub fn available_height(bbox: Rect, line_width: f64) -> f64 {
    bbox.height() - 2.0 * line_width
}

/// Compute the font size for a text field.
///
/// A nonzero declared size wins. Otherwise the size is the largest that
/// fits the available height, additionally capped by the width fit for
/// non-scrolling fields (which must show the whole value at once).
pub fn calculate_font_size(
    font: &Font,
    value: &str,
    bbox: Rect,
    line_width: f64,
    declared_size: f64,
    do_not_scroll: bool,
) -> f64 {
    let mut font_size = declared_size;

    let mut width_based = f64::MAX;
    if do_not_scroll {
        let width_at_size1 = font.string_width(value) / 1000.0;
        if width_at_size1 > 0.0 {
            width_based = available_width(bbox, line_width) / width_at_size1;
        }
    }

    if font_size == 0.0 {
        let height = match font.kind {
            FontKind::Simple => font.metrics.bbox_height(),
            // No bounding box to speak of; assume the font is roughly
            // square and use the average width as the height
            FontKind::Composite => font.metrics.average_width(),
        } / 1000.0;
        font_size = (available_height(bbox, line_width) / height).min(width_based);
    }

    font_size
}

/// Compute the baseline offset from the bottom of the bounding box.
///
/// Multi-line fields place the first line at the top of a whole-row grid.
/// Single-line fields use the empirical centering rule
/// `(boxHeight − (fontBBoxHeight + 2·descent)/1000·size)/2`, which only
/// exists for simple fonts.
///
/// # Errors
///
/// [`FillError::UnsupportedFont`] for composite fonts in the single-line
/// case.
pub fn vertical_offset(
    font: &Font,
    font_size: f64,
    bbox: Rect,
    line_width: f64,
    multiline: bool,
) -> Result<f64, GenError> {
    if multiline {
        let step = font_size.trunc();
        if step <= 0.0 {
            return Ok(0.0);
        }
        let rows = (available_height(bbox, line_width) / step).trunc();
        return Ok(rows * font_size - font_size);
    }

    match font.kind {
        FontKind::Simple => {
            let scaled_height =
                (font.metrics.bbox_height() + 2.0 * font.metrics.descent()) / 1000.0 * font_size;
            Ok((bbox.height() - scaled_height) / 2.0)
        }
        FontKind::Composite => Err(GenError::Core(FillError::UnsupportedFont(format!(
            "cannot compute text position for composite font {}",
            font.name
        )))),
    }
}

/// Shift the value to the bottom when the font's caps are taller than the
/// drawn border edge allows.
pub fn cap_shifted_vertical_offset(
    offset: f64,
    bbox: Rect,
    border_edge: Rect,
    font: &Font,
    font_size: f64,
) -> f64 {
    let font_height = bbox.height() - offset * 2.0;
    if font_height + 2.0 * border_edge.llx > border_edge.height() {
        font.metrics.bbox_height() / 1000.0 * font_size - border_edge.height()
    } else {
        offset
    }
}

/// Left padding derived from the drawn border's inset.
pub fn left_padding(border_edge: Rect) -> f64 {
    (4.0 * border_edge.llx).round().max(2.0)
}

/// Right padding derived from the drawn border's inset.
pub fn right_padding(bbox: Rect, border_edge: Rect) -> f64 {
    (4.0 * (bbox.urx - border_edge.urx)).round().max(2.0)
}

/// Horizontal offset of the text start for a single-line field.
///
/// `text_width` is the value's width at the final font size. A value
/// wider than the border interior always lays out left, regardless of
/// quadding.
pub fn horizontal_offset(
    quadding: Quadding,
    bbox: Rect,
    border_edge: Rect,
    text_width: f64,
) -> f64 {
    let pad_left = left_padding(border_edge);
    let pad_right = right_padding(bbox, border_edge);

    if text_width > border_edge.width() - pad_left - pad_right {
        return pad_left;
    }

    match quadding {
        Quadding::Left => pad_left,
        Quadding::Centered => (bbox.width() - text_width) / 2.0,
        Quadding::Right => bbox.width() - text_width - pad_right,
    }
}

/// One positioned character of a comb field.
///
/// `x` and `y` are relative `Td` moves: the baseline is set by the first
/// cell and stays put afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CombCell {
    pub x: f64,
    pub y: f64,
    pub ch: char,
}

/// Place a value into a comb field's equal-width cells.
///
/// The width divides into `max_len` cells and each glyph is offset inside
/// its cell by the half-width compensation the historical arithmetic
/// uses. Quadding is not honored for comb fields; the fill is always
/// left-to-right.
pub fn comb_cells(
    font: &Font,
    font_size: f64,
    value: &str,
    max_len: usize,
    bbox: Rect,
    padding_edge: Rect,
) -> Vec<CombCell> {
    if max_len == 0 {
        return Vec::new();
    }

    let comb_width = bbox.width() / max_len as f64;
    let ascent_at_size = font.metrics.ascent() / 1000.0 * font_size;
    let mut baseline = padding_edge.lly + (bbox.height() - ascent_at_size) / 2.0;

    let mut cells = Vec::new();
    let mut prev_half_width = 0.0;
    let mut x_offset = comb_width / 2.0;

    for ch in value.chars().take(max_len) {
        let half_width = font.string_width(ch.encode_utf8(&mut [0; 4])) / 1000.0 * font_size / 2.0;
        x_offset = x_offset + prev_half_width / 2.0 - half_width / 2.0;

        cells.push(CombCell {
            x: x_offset,
            y: baseline,
            ch,
        });

        baseline = 0.0;
        prev_half_width = half_width;
        x_offset = comb_width;
    }

    cells
}

/// Compute the font size for a list box.
///
/// A nonzero declared size wins; otherwise the widest option label must
/// fit the available width. With no measurable options the size falls
/// back to the conventional 12.
pub fn listbox_font_size(
    font: &Font,
    options: &[String],
    content_area: Rect,
    line_width: f64,
    declared_size: f64,
) -> f64 {
    if declared_size != 0.0 {
        return declared_size;
    }

    let max_width_at_size1 = options
        .iter()
        .map(|opt| font.string_width(opt) / 1000.0)
        .fold(0.0, f64::max);
    if max_width_at_size1 <= 0.0 {
        return 12.0;
    }

    available_width(content_area, line_width) / max_width_at_size1
}

/// Height of one list-box row at the given size.
pub fn row_height(font: &Font, font_size: f64) -> f64 {
    font.metrics.bbox_height() / 1000.0 * font_size
}

/// The highlight block behind the selected row, relative to the top
/// index of the visible window.
pub fn highlight_rect(padding_edge: Rect, row_height: f64, selected: usize, top: usize) -> Rect {
    let rows_down = (selected.saturating_sub(top) + 1) as f64;
    Rect::from_re_operands(
        padding_edge.llx,
        padding_edge.ury - row_height * rows_down,
        padding_edge.width(),
        row_height,
    )
}

/// Horizontal adjustment for a list box's text start.
///
/// Returns `None` for left quadding (no adjustment is emitted).
pub fn listbox_horizontal_offset(quadding: Quadding, bbox: Rect, text_width: f64) -> Option<f64> {
    let adjust = bbox.width() - text_width - 4.0;
    match quadding {
        Quadding::Left => None,
        Quadding::Centered => Some(adjust / 2.0),
        Quadding::Right => Some(adjust),
    }
}
