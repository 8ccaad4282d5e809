//! Error and diagnostic types for acrofill.
//!
//! Provides [`FillError`] for fatal errors that abort appearance generation
//! for a field or widget, [`FieldWarning`] for non-fatal issues that are
//! recovered with a documented default, [`Resolved`] for lookups that can
//! succeed either exactly or by falling back, [`FieldReport`] for the
//! outcome of one generation pass, and [`GenerateOptions`] for configuring
//! generation behavior.

use std::fmt;

/// Fatal error types for appearance generation.
///
/// Each error aborts generation for the widget (or field) it occurred on;
/// sibling widgets of the same field keep processing. The previously
/// committed appearance stays intact whenever one of these is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum FillError {
    /// Malformed content-stream bytes (tokenizer or region scan).
    Syntax(String),
    /// Document object model access failed (missing key, wrong type,
    /// dangling reference).
    Structure(String),
    /// Neither the stream's local resources nor the form's default
    /// resources exist.
    MissingResources,
    /// Font resolution exhausted every fallback. Carries the declared
    /// font name from the default appearance string.
    MissingFontResource(String),
    /// The default appearance string could not be parsed at any
    /// inheritance level.
    MalformedDefaultAppearance(String),
    /// Position math was attempted on a font kind that lacks the needed
    /// simple-font metrics (composite fonts in single-line placement).
    UnsupportedFont(String),
    /// No field with the given fully-qualified name exists in the form.
    FieldNotFound(String),
    /// The named field is not a variable-text field (e.g. a push button
    /// or signature).
    UnsupportedFieldType(String),
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillError::Syntax(msg) => write!(f, "content stream syntax error: {msg}"),
            FillError::Structure(msg) => write!(f, "document structure error: {msg}"),
            FillError::MissingResources => {
                write!(f, "unable to generate field appearance: missing required resources")
            }
            FillError::MissingFontResource(name) => {
                write!(f, "unable to generate field appearance: missing font resource: {name}")
            }
            FillError::MalformedDefaultAppearance(msg) => {
                write!(f, "malformed default appearance: {msg}")
            }
            FillError::UnsupportedFont(msg) => write!(f, "unsupported font: {msg}"),
            FillError::FieldNotFound(name) => write!(f, "field not found: {name}"),
            FillError::UnsupportedFieldType(msg) => write!(f, "unsupported field type: {msg}"),
            FillError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FillError {}

/// Machine-readable code categorizing a recovered issue.
#[derive(Debug, Clone, PartialEq)]
pub enum WarningCode {
    /// The field's quadding value was not 0, 1 or 2; layout defaulted to
    /// left alignment.
    UnknownQuadding,
    /// A default appearance string failed to parse and a fallback level
    /// of the inheritance chain was used instead.
    MalformedDefaultAppearance,
    /// The declared font was absent from both resource sets and an
    /// arbitrary form font was linked in its place.
    LinkedFallbackFont,
    /// A drawn rectangle was missing numeric operands; padding refinement
    /// fell back to the full bounding box.
    MalformedRectangle,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl WarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            WarningCode::UnknownQuadding => "UNKNOWN_QUADDING",
            WarningCode::MalformedDefaultAppearance => "MALFORMED_DEFAULT_APPEARANCE",
            WarningCode::LinkedFallbackFont => "LINKED_FALLBACK_FONT",
            WarningCode::MalformedRectangle => "MALFORMED_RECTANGLE",
            WarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue recovered during appearance generation.
///
/// Warnings record the recovery that was taken (defaulted quadding,
/// substituted font, inherited appearance string) so callers can surface
/// them without treating them as failures. Under
/// [`GenerateOptions::strict_mode`] any warning is escalated to a
/// [`FillError`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldWarning {
    /// Machine-readable warning code.
    pub code: WarningCode,
    /// Human-readable description of the recovery.
    pub description: String,
    /// Fully-qualified field name, when known.
    pub field_name: Option<String>,
    /// Font name associated with the warning, if applicable.
    pub font_name: Option<String>,
}

impl FieldWarning {
    /// Create a warning with just a description.
    pub fn new(description: impl Into<String>) -> Self {
        let desc = description.into();
        Self {
            code: WarningCode::Other(desc.clone()),
            description: desc,
            field_name: None,
            font_name: None,
        }
    }

    /// Create a warning with a specific code and description.
    pub fn with_code(code: WarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            field_name: None,
            font_name: None,
        }
    }

    /// Attach the field name this warning belongs to (builder pattern).
    pub fn for_field(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    /// Attach the font name this warning refers to (builder pattern).
    pub fn for_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = Some(font_name.into());
        self
    }

    /// Convert this warning into a [`FillError`].
    ///
    /// Used by strict mode to escalate warnings to errors.
    pub fn to_error(&self) -> FillError {
        FillError::Other(self.to_string())
    }
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(ref field) = self.field_name {
            write!(f, " (field {field})")?;
        }
        if let Some(ref font) = self.font_name {
            write!(f, " [font {font}]")?;
        }
        Ok(())
    }
}

/// Outcome of a lookup that may succeed by substituting a default.
///
/// Distinguishes an exact hit from a recovered one so callers can surface
/// the recovery without treating it as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    /// The requested value was found as-is.
    Exact(T),
    /// A default was substituted; the warning records why.
    Defaulted {
        /// The substituted value.
        value: T,
        /// Diagnostic describing the recovery.
        warning: FieldWarning,
    },
}

impl<T> Resolved<T> {
    /// Borrow the resolved value regardless of how it was obtained.
    pub fn value(&self) -> &T {
        match self {
            Resolved::Exact(v) => v,
            Resolved::Defaulted { value, .. } => value,
        }
    }

    /// Returns `true` for an exact hit.
    pub fn is_exact(&self) -> bool {
        matches!(self, Resolved::Exact(_))
    }

    /// Split into the value and the warning, if any.
    pub fn into_parts(self) -> (T, Option<FieldWarning>) {
        match self {
            Resolved::Exact(v) => (v, None),
            Resolved::Defaulted { value, warning } => (value, Some(warning)),
        }
    }
}

/// A failure on one widget of a multi-widget field.
///
/// Widget failures never abort sibling widgets; they are collected here
/// and surfaced through the [`FieldReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetFailure {
    /// 0-based index of the widget in the field's fan-out order.
    pub widget_index: usize,
    /// The error that stopped generation for this widget.
    pub error: FillError,
}

/// Outcome of one appearance-generation pass over a field.
#[derive(Debug, Clone, Default)]
pub struct FieldReport {
    /// Fully-qualified name of the field that was processed.
    pub field_name: String,
    /// Number of widgets whose appearance was regenerated.
    pub widgets_updated: usize,
    /// Number of widgets skipped because a format action defers rendering
    /// to the viewer.
    pub widgets_skipped: usize,
    /// Non-fatal diagnostics collected across all widgets.
    pub warnings: Vec<FieldWarning>,
    /// Per-widget failures; sibling widgets were still processed.
    pub failures: Vec<WidgetFailure>,
}

impl FieldReport {
    /// Returns `true` if no warnings and no failures were recorded.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.failures.is_empty()
    }
}

/// Options controlling appearance generation.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// When the declared font is absent from both resource sets, link an
    /// arbitrary font from the form's default resources instead of
    /// continuing to the name-scan fallback (default: false).
    ///
    /// This reproduces the historical best-effort behavior; the substituted
    /// font is reported as [`WarningCode::LinkedFallbackFont`].
    pub link_leftover_resources: bool,
    /// When true, any warning is escalated to an error (default: false).
    pub strict_mode: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            link_leftover_resources: false,
            strict_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- FillError tests ---

    #[test]
    fn fill_error_syntax_display() {
        let err = FillError::Syntax("unterminated string".to_string());
        assert_eq!(
            err.to_string(),
            "content stream syntax error: unterminated string"
        );
    }

    #[test]
    fn fill_error_missing_resources_display() {
        assert_eq!(
            FillError::MissingResources.to_string(),
            "unable to generate field appearance: missing required resources"
        );
    }

    #[test]
    fn fill_error_missing_font_resource_carries_name() {
        let err = FillError::MissingFontResource("Helv".to_string());
        assert!(err.to_string().contains("Helv"));
    }

    #[test]
    fn fill_error_field_not_found_display() {
        let err = FillError::FieldNotFound("form.name".to_string());
        assert_eq!(err.to_string(), "field not found: form.name");
    }

    #[test]
    fn fill_error_clone_and_eq() {
        let err1 = FillError::UnsupportedFont("Type0".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn fill_error_implements_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(FillError::Structure("missing /Rect".to_string()));
        assert_eq!(err.to_string(), "document structure error: missing /Rect");
    }

    // --- WarningCode tests ---

    #[test]
    fn warning_code_tags() {
        assert_eq!(WarningCode::UnknownQuadding.as_str(), "UNKNOWN_QUADDING");
        assert_eq!(
            WarningCode::MalformedDefaultAppearance.as_str(),
            "MALFORMED_DEFAULT_APPEARANCE"
        );
        assert_eq!(
            WarningCode::LinkedFallbackFont.as_str(),
            "LINKED_FALLBACK_FONT"
        );
        assert_eq!(
            WarningCode::MalformedRectangle.as_str(),
            "MALFORMED_RECTANGLE"
        );
        assert_eq!(WarningCode::Other("x".to_string()).as_str(), "OTHER");
    }

    // --- FieldWarning tests ---

    #[test]
    fn warning_new_defaults_to_other_code() {
        let w = FieldWarning::new("something odd");
        assert!(matches!(w.code, WarningCode::Other(_)));
        assert_eq!(w.to_string(), "[OTHER] something odd");
    }

    #[test]
    fn warning_display_with_field_and_font() {
        let w = FieldWarning::with_code(WarningCode::UnknownQuadding, "quadding 7, using left")
            .for_field("order.qty")
            .for_font("Helv");
        assert_eq!(
            w.to_string(),
            "[UNKNOWN_QUADDING] quadding 7, using left (field order.qty) [font Helv]"
        );
    }

    #[test]
    fn warning_to_error_keeps_description() {
        let w = FieldWarning::with_code(WarningCode::LinkedFallbackFont, "linked /F1 for /Helv");
        let err = w.to_error();
        assert!(matches!(err, FillError::Other(_)));
        assert!(err.to_string().contains("linked /F1"));
    }

    #[test]
    fn warning_clone_and_eq() {
        let w1 = FieldWarning::new("test").for_field("a.b");
        let w2 = w1.clone();
        assert_eq!(w1, w2);
    }

    // --- Resolved tests ---

    #[test]
    fn resolved_exact() {
        let r = Resolved::Exact(42);
        assert!(r.is_exact());
        assert_eq!(*r.value(), 42);
        let (v, w) = r.into_parts();
        assert_eq!(v, 42);
        assert!(w.is_none());
    }

    #[test]
    fn resolved_defaulted_carries_warning() {
        let r = Resolved::Defaulted {
            value: 0,
            warning: FieldWarning::with_code(WarningCode::UnknownQuadding, "quadding 9"),
        };
        assert!(!r.is_exact());
        let (v, w) = r.into_parts();
        assert_eq!(v, 0);
        assert_eq!(w.unwrap().code, WarningCode::UnknownQuadding);
    }

    // --- FieldReport tests ---

    #[test]
    fn report_default_is_clean() {
        let report = FieldReport::default();
        assert!(report.is_clean());
        assert_eq!(report.widgets_updated, 0);
    }

    #[test]
    fn report_with_failure_not_clean() {
        let mut report = FieldReport::default();
        report.failures.push(WidgetFailure {
            widget_index: 1,
            error: FillError::MissingResources,
        });
        assert!(!report.is_clean());
    }

    // --- GenerateOptions tests ---

    #[test]
    fn options_defaults() {
        let opts = GenerateOptions::default();
        assert!(!opts.link_leftover_resources);
        assert!(!opts.strict_mode);
    }
}
