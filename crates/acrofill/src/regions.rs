//! Structural landmarks in a flat token sequence.
//!
//! The engine never builds a grammar over an existing appearance stream;
//! it only needs the first `BMC`/`EMC`/`BT`/`ET` positions, the line
//! width in effect before the first text object, and the rectangles drawn
//! with `re` that refine padding or define the list-box clip area.

use crate::error::GenError;
use crate::tokenizer::{Operator, Token};
use acrofill_core::Rect;

/// First occurrence indices of the structural operators.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmarks {
    /// Index of the first `BMC`.
    pub bmc: Option<usize>,
    /// Index of the first `EMC`.
    pub emc: Option<usize>,
    /// Index of the first `BT`.
    pub bt: Option<usize>,
    /// Index of the first `ET`.
    pub et: Option<usize>,
}

impl Landmarks {
    /// Scan a token sequence for the first occurrence of each landmark.
    pub fn scan(tokens: &[Token]) -> Landmarks {
        let mut landmarks = Landmarks::default();
        for (i, token) in tokens.iter().enumerate() {
            let slot = match token {
                Token::Operator(Operator::BeginMarkedContent) => &mut landmarks.bmc,
                Token::Operator(Operator::EndMarkedContent) => &mut landmarks.emc,
                Token::Operator(Operator::BeginText) => &mut landmarks.bt,
                Token::Operator(Operator::EndText) => &mut landmarks.et,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(i);
            }
        }
        landmarks
    }

    /// Returns `true` when the stream carries a marked-content region.
    pub fn has_marked_content(&self) -> bool {
        self.bmc.is_some()
    }

    /// Returns `true` when `EMC` immediately follows `BMC`, meaning the field
    /// interior is empty.
    pub fn markers_adjacent(&self) -> bool {
        matches!((self.bmc, self.emc), (Some(b), Some(e)) if e == b + 1)
    }
}

/// Index of the first occurrence of an operator.
pub fn index_of(tokens: &[Token], op: &Operator) -> Option<usize> {
    tokens.iter().position(|t| t.is_operator(op))
}

/// The line width in effect for the generated text.
///
/// `w` in an appearance stream sets the border line width; it only
/// applies when it appears before the first `BT`. Defaults to 1.
pub fn line_width(tokens: &[Token]) -> f64 {
    let bt = index_of(tokens, &Operator::BeginText);
    let w = index_of(tokens, &Operator::SetLineWidth);
    if let (Some(bt), Some(w)) = (bt, w) {
        if w > 0 && w < bt {
            if let Some(value) = tokens[w - 1].as_number() {
                return value;
            }
        }
    }
    1.0
}

/// The "smallest" rectangle drawn with `re`, used to refine padding
/// against hand-drawn borders.
///
/// The candidate comparison is kept exactly as the historical
/// implementation has it (the current candidate is replaced when its
/// lower-left X is smaller or its upper-right Y is larger than the new
/// rectangle's) rather than corrected to true area minimization, because
/// existing documents were produced against this behavior.
///
/// # Errors
///
/// A `re` without four preceding number tokens is a syntax error; the
/// caller falls back to the full bounding box.
pub fn smallest_drawn_rect(bounding_box: Rect, tokens: &[Token]) -> Result<Rect, GenError> {
    let mut smallest = bounding_box;
    for (i, token) in tokens.iter().enumerate() {
        if !token.is_operator(&Operator::Rectangle) {
            continue;
        }
        let candidate = rect_before(tokens, i).ok_or_else(|| {
            GenError::Syntax("re operator is missing its four numeric operands".to_string())
        })?;
        if smallest.llx < candidate.llx || smallest.ury > candidate.ury {
            smallest = candidate;
        }
    }
    Ok(smallest)
}

/// The inner clip rectangle: the first `re` immediately followed by `W`
/// at or after `start`. List boxes use this as their padding edge.
pub fn clip_rect_after(tokens: &[Token], start: usize) -> Option<Rect> {
    let mut i = start;
    while i + 1 < tokens.len() {
        if tokens[i].is_operator(&Operator::Rectangle)
            && tokens[i + 1].is_operator(&Operator::Clip)
        {
            if let Some(rect) = rect_before(tokens, i) {
                return Some(rect);
            }
        }
        i += 1;
    }
    None
}

/// Read the four `re` operands preceding index `i` as a rectangle.
fn rect_before(tokens: &[Token], i: usize) -> Option<Rect> {
    if i < 4 {
        return None;
    }
    let x = tokens[i - 4].as_number()?;
    let y = tokens[i - 3].as_number()?;
    let width = tokens[i - 2].as_number()?;
    let height = tokens[i - 1].as_number()?;
    Some(Rect::from_re_operands(x, y, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn scan_finds_first_occurrences() {
        let tokens = tokenize(b"/Tx BMC BT ET EMC").unwrap();
        let landmarks = Landmarks::scan(&tokens);
        assert_eq!(landmarks.bmc, Some(1));
        assert_eq!(landmarks.bt, Some(2));
        assert_eq!(landmarks.et, Some(3));
        assert_eq!(landmarks.emc, Some(4));
        assert!(landmarks.has_marked_content());
        assert!(!landmarks.markers_adjacent());
    }

    #[test]
    fn scan_empty_stream() {
        let landmarks = Landmarks::scan(&[]);
        assert_eq!(landmarks, Landmarks::default());
        assert!(!landmarks.has_marked_content());
    }

    #[test]
    fn markers_adjacent_when_interior_empty() {
        let tokens = tokenize(b"/Tx BMC EMC").unwrap();
        assert!(Landmarks::scan(&tokens).markers_adjacent());
    }

    #[test]
    fn line_width_before_first_bt() {
        let tokens = tokenize(b"2 w 0 0 100 20 re S BT ET").unwrap();
        assert_eq!(line_width(&tokens), 2.0);
    }

    #[test]
    fn line_width_defaults_to_one() {
        assert_eq!(line_width(&tokenize(b"BT ET").unwrap()), 1.0);
    }

    #[test]
    fn line_width_after_bt_is_ignored() {
        let tokens = tokenize(b"BT 3 w ET").unwrap();
        assert_eq!(line_width(&tokens), 1.0);
    }

    #[test]
    fn line_width_without_bt_is_ignored() {
        // The w only applies when a text object follows it
        let tokens = tokenize(b"2 w 0 0 10 10 re S").unwrap();
        assert_eq!(line_width(&tokens), 1.0);
    }

    #[test]
    fn smallest_rect_no_re_returns_bounding_box() {
        let bbox = Rect::new(0.0, 0.0, 100.0, 20.0);
        let tokens = tokenize(b"BT ET").unwrap();
        assert_eq!(smallest_drawn_rect(bbox, &tokens).unwrap(), bbox);
    }

    #[test]
    fn smallest_rect_picks_inset_border() {
        let bbox = Rect::new(0.0, 0.0, 100.0, 20.0);
        let tokens = tokenize(b"1 1 98 18 re S BT ET").unwrap();
        let rect = smallest_drawn_rect(bbox, &tokens).unwrap();
        assert_eq!(rect, Rect::new(1.0, 1.0, 99.0, 19.0));
    }

    #[test]
    fn smallest_rect_keeps_historical_comparison() {
        let bbox = Rect::new(0.0, 0.0, 100.0, 20.0);
        // Second rectangle is outset relative to the first; the candidate
        // only advances when the comparison says so
        let tokens = tokenize(b"2 2 96 16 re S 1 1 98 18 re S").unwrap();
        let rect = smallest_drawn_rect(bbox, &tokens).unwrap();
        assert_eq!(rect, Rect::new(2.0, 2.0, 98.0, 18.0));
    }

    #[test]
    fn smallest_rect_malformed_re_is_syntax_error() {
        let bbox = Rect::new(0.0, 0.0, 100.0, 20.0);
        let tokens = tokenize(b"1 1 98 re").unwrap();
        assert!(matches!(
            smallest_drawn_rect(bbox, &tokens),
            Err(GenError::Syntax(_))
        ));
    }

    #[test]
    fn clip_rect_found_after_start() {
        let tokens = tokenize(b"/Tx BMC q 1 1 98 70 re W n BT ET EMC").unwrap();
        let rect = clip_rect_after(&tokens, 1).unwrap();
        assert_eq!(rect, Rect::new(1.0, 1.0, 99.0, 71.0));
    }

    #[test]
    fn clip_rect_requires_w_after_re() {
        let tokens = tokenize(b"1 1 98 70 re S").unwrap();
        assert_eq!(clip_rect_after(&tokens, 0), None);
    }

    #[test]
    fn clip_rect_none_on_empty() {
        assert_eq!(clip_rect_after(&[], 0), None);
    }
}
