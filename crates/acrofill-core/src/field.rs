//! Form field model: field types, flags, quadding and values.
//!
//! Mirrors the AcroForm field dictionary entries the generation engine
//! consumes: `/FT`, `/Ff`, `/Q` and `/V`.

use crate::error::{FieldWarning, Resolved, WarningCode};

/// Field flag: the text field holds multiple lines (`/Ff` bit 13).
pub const FF_MULTILINE: u32 = 1 << 12;
/// Field flag: the choice field is a combo box, not a list box (`/Ff` bit 18).
pub const FF_COMBO: u32 = 1 << 17;
/// Field flag: the text field never scrolls horizontally (`/Ff` bit 24).
pub const FF_DO_NOT_SCROLL: u32 = 1 << 23;
/// Field flag: the text field is a comb of equal-width cells (`/Ff` bit 25).
/// Only meaningful together with a `/MaxLen` entry.
pub const FF_COMB: u32 = 1 << 24;

/// The type of a form field, from the `/FT` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Text field (`/FT /Tx`).
    Text,
    /// Button field (`/FT /Btn`).
    Button,
    /// Choice field (`/FT /Ch`): combo boxes and list boxes.
    Choice,
    /// Signature field (`/FT /Sig`).
    Signature,
}

impl FieldType {
    /// Parse a field type from its PDF name string.
    pub fn from_pdf_name(name: &str) -> Option<Self> {
        match name {
            "Tx" => Some(Self::Text),
            "Btn" => Some(Self::Button),
            "Ch" => Some(Self::Choice),
            "Sig" => Some(Self::Signature),
            _ => None,
        }
    }

    /// Returns `true` for the field types whose appearance this crate
    /// generates (variable-text fields).
    pub fn is_variable_text(&self) -> bool {
        matches!(self, Self::Text | Self::Choice)
    }
}

/// Horizontal text alignment for a field, from the `/Q` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quadding {
    /// Left-justified (0, the default).
    #[default]
    Left,
    /// Centered (1).
    Centered,
    /// Right-justified (2).
    Right,
}

impl Quadding {
    /// Resolve a raw `/Q` value.
    ///
    /// Unknown values resolve to [`Quadding::Left`] with a
    /// [`WarningCode::UnknownQuadding`] diagnostic rather than failing;
    /// real-world documents carry out-of-range values.
    pub fn resolve(raw: i64) -> Resolved<Quadding> {
        match raw {
            0 => Resolved::Exact(Quadding::Left),
            1 => Resolved::Exact(Quadding::Centered),
            2 => Resolved::Exact(Quadding::Right),
            other => Resolved::Defaulted {
                value: Quadding::Left,
                warning: FieldWarning::with_code(
                    WarningCode::UnknownQuadding,
                    format!("unknown justification value {other}, defaulting to left"),
                ),
            },
        }
    }
}

/// The new value to render into a field's appearance.
///
/// Immutable for the duration of one generation pass. Multi-line text
/// fields split the value on line feeds; everything else shows it whole.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    text: String,
}

impl FieldValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The raw value text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The value split on line feeds.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Returns `true` if the value contains a line feed.
    pub fn has_line_breaks(&self) -> bool {
        self.text.contains('\n')
    }

    /// Number of characters in the value (not bytes).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
