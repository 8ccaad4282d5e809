//! Font metrics for layout computation.
//!
//! Extracts `/Widths`, `/FirstChar`, `/LastChar` and `/FontDescriptor`
//! data from a font dictionary into a [`FontMetrics`] value the layout
//! engine can query without any rendering machinery: string widths at
//! size 1000, ascent, descent and the font bounding box. Standard Type1
//! fonts without a `/Widths` array pick up the built-in AFM tables from
//! [`crate::standard_fonts`].

use crate::error::GenError;
use crate::standard_fonts;

/// Default ascent when not specified (1/1000 em units).
const DEFAULT_ASCENT: f64 = 750.0;

/// Default descent when not specified (1/1000 em units).
const DEFAULT_DESCENT: f64 = -250.0;

/// Default glyph width when not specified (1/1000 em units).
const DEFAULT_WIDTH: f64 = 600.0;

/// Whether a font carries per-glyph simple-font metrics.
///
/// Composite (Type0) fonts lack the simple-font descriptor data the
/// single-line placement formula needs; layout decisions match on this
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    /// Type1, TrueType, Type3: one byte per code, widths indexed directly.
    Simple,
    /// Type0/CID: multi-byte codes, no direct simple-font metrics.
    Composite,
}

/// Glyph and descriptor metrics for one font, in 1/1000 em units.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Glyph widths indexed by `char_code - first_char`.
    widths: Vec<f64>,
    /// First character code covered by `widths`.
    first_char: u32,
    /// Last character code covered by `widths`.
    last_char: u32,
    /// Width substituted for codes outside the covered range.
    missing_width: f64,
    /// Ascent above the baseline (positive).
    ascent: f64,
    /// Descent below the baseline (negative).
    descent: f64,
    /// Font bounding box `[llx, lly, urx, ury]`, when known.
    font_bbox: Option<[f64; 4]>,
}

impl FontMetrics {
    pub fn new(
        widths: Vec<f64>,
        first_char: u32,
        last_char: u32,
        missing_width: f64,
        ascent: f64,
        descent: f64,
        font_bbox: Option<[f64; 4]>,
    ) -> Self {
        Self {
            widths,
            first_char,
            last_char,
            missing_width,
            ascent,
            descent,
            font_bbox,
        }
    }

    /// Metrics for when no usable font information exists at all.
    pub fn default_metrics() -> Self {
        Self {
            widths: Vec::new(),
            first_char: 0,
            last_char: 0,
            missing_width: DEFAULT_WIDTH,
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            font_bbox: None,
        }
    }

    /// Metrics from a built-in standard font table.
    pub fn from_standard(data: &standard_fonts::StandardFontData) -> Self {
        Self {
            widths: data.widths.iter().map(|&w| w as f64).collect(),
            first_char: 0,
            last_char: 255,
            missing_width: 0.0,
            ascent: data.ascent as f64,
            descent: data.descent as f64,
            font_bbox: Some([
                data.font_bbox[0] as f64,
                data.font_bbox[1] as f64,
                data.font_bbox[2] as f64,
                data.font_bbox[3] as f64,
            ]),
        }
    }

    /// Width of one character code (1/1000 em units).
    pub fn width(&self, char_code: u32) -> f64 {
        if char_code >= self.first_char && char_code <= self.last_char {
            let index = (char_code - self.first_char) as usize;
            if index < self.widths.len() {
                return self.widths[index];
            }
        }
        self.missing_width
    }

    /// Ascent above the baseline (positive).
    pub fn ascent(&self) -> f64 {
        self.ascent
    }

    /// Descent below the baseline (negative).
    pub fn descent(&self) -> f64 {
        self.descent
    }

    /// Height of the font bounding box, falling back to the ascent/descent
    /// span when no `/FontBBox` is available.
    pub fn bbox_height(&self) -> f64 {
        match self.font_bbox {
            Some(bbox) => bbox[3] - bbox[1],
            None => self.ascent - self.descent,
        }
    }

    /// Mean glyph width over the covered range; used as a stand-in height
    /// factor for fonts without usable bounding box data.
    pub fn average_width(&self) -> f64 {
        let (sum, count) = self
            .widths
            .iter()
            .filter(|w| **w > 0.0)
            .fold((0.0, 0usize), |(s, c), w| (s + w, c + 1));
        if count == 0 {
            self.missing_width
        } else {
            sum / count as f64
        }
    }

    /// Returns `true` when no `/Widths` data was present.
    pub fn has_no_widths(&self) -> bool {
        self.widths.is_empty()
    }
}

/// A resolved font: its name, kind and metrics.
#[derive(Debug, Clone)]
pub struct Font {
    /// The font's own name (`/BaseFont`, subset prefix stripped).
    pub name: String,
    /// Simple or composite.
    pub kind: FontKind,
    /// Layout metrics.
    pub metrics: FontMetrics,
}

impl Font {
    /// Width of a string at font size 1000 (glyph-space units).
    ///
    /// Characters above U+00FF cannot be coded by a simple font's
    /// single-byte codes and measure at the missing width.
    pub fn string_width(&self, text: &str) -> f64 {
        text.chars()
            .map(|c| {
                let code = c as u32;
                if code <= 0xFF {
                    self.metrics.width(code)
                } else {
                    self.metrics.width(u32::MAX)
                }
            })
            .sum()
    }
}

/// Strip a subset tag (`ABCDEF+`) from a base font name.
pub fn strip_subset_prefix(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() > 7 && bytes[6] == b'+' && bytes[..6].iter().all(u8::is_ascii_uppercase) {
        &name[7..]
    } else {
        name
    }
}

/// Load a [`Font`] from a font object (dictionary or reference to one).
pub fn load_font(doc: &lopdf::Document, obj: &lopdf::Object) -> Result<Font, GenError> {
    let dict = resolve(doc, obj)
        .as_dict()
        .map_err(|_| GenError::Structure("font resource is not a dictionary".to_string()))?;

    let subtype = dict
        .get(b"Subtype")
        .ok()
        .and_then(|o| o.as_name().ok())
        .and_then(|b| std::str::from_utf8(b).ok())
        .unwrap_or("");
    let kind = if subtype == "Type0" {
        FontKind::Composite
    } else {
        FontKind::Simple
    };

    let base_font = dict
        .get(b"BaseFont")
        .ok()
        .and_then(|o| o.as_name().ok())
        .and_then(|b| std::str::from_utf8(b).ok())
        .unwrap_or("");
    let name = strip_subset_prefix(base_font).to_string();

    let mut metrics = extract_font_metrics(doc, dict)?;
    if metrics.has_no_widths() {
        if let Some(standard) = standard_fonts::lookup(&name) {
            metrics = FontMetrics::from_standard(standard);
        }
    }

    Ok(Font {
        name,
        kind,
        metrics,
    })
}

/// Extract [`FontMetrics`] from a font dictionary.
///
/// Reads `/Widths`, `/FirstChar`, `/LastChar` from the font dictionary and
/// `/Ascent`, `/Descent`, `/FontBBox`, `/MissingWidth` from its
/// `/FontDescriptor`. Missing fields default rather than fail.
pub fn extract_font_metrics(
    doc: &lopdf::Document,
    font_dict: &lopdf::Dictionary,
) -> Result<FontMetrics, GenError> {
    let first_char = font_dict
        .get(b"FirstChar")
        .ok()
        .and_then(object_to_f64)
        .map(|v| v as u32)
        .unwrap_or(0);

    let last_char = font_dict
        .get(b"LastChar")
        .ok()
        .and_then(object_to_f64)
        .map(|v| v as u32)
        .unwrap_or(0);

    let widths = match font_dict.get(b"Widths") {
        Ok(obj) => match resolve(doc, obj).as_array() {
            Ok(arr) => arr
                .iter()
                .map(|o| object_to_f64(resolve(doc, o)).unwrap_or(0.0))
                .collect(),
            Err(_) => Vec::new(),
        },
        Err(_) => Vec::new(),
    };

    let descriptor = font_dict
        .get(b"FontDescriptor")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok());

    let Some(desc) = descriptor else {
        return Ok(FontMetrics::new(
            widths,
            first_char,
            last_char,
            DEFAULT_WIDTH,
            DEFAULT_ASCENT,
            DEFAULT_DESCENT,
            None,
        ));
    };

    let ascent = desc
        .get(b"Ascent")
        .ok()
        .and_then(object_to_f64)
        .unwrap_or(DEFAULT_ASCENT);
    let descent = desc
        .get(b"Descent")
        .ok()
        .and_then(object_to_f64)
        .unwrap_or(DEFAULT_DESCENT);
    let missing_width = desc
        .get(b"MissingWidth")
        .ok()
        .and_then(object_to_f64)
        .unwrap_or(DEFAULT_WIDTH);

    let font_bbox = desc
        .get(b"FontBBox")
        .ok()
        .and_then(|o| resolve(doc, o).as_array().ok())
        .and_then(|arr| {
            let vals: Vec<f64> = arr.iter().filter_map(|o| object_to_f64(o)).collect();
            if vals.len() == 4 {
                Some([vals[0], vals[1], vals[2], vals[3]])
            } else {
                None
            }
        });

    Ok(FontMetrics::new(
        widths,
        first_char,
        last_char,
        missing_width,
        ascent,
        descent,
        font_bbox,
    ))
}

/// Resolve an indirect reference to the actual object.
pub(crate) fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Convert a numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &lopdf::Object) -> Option<f64> {
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f64),
        lopdf::Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}
