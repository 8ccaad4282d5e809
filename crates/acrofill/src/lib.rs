//! acrofill: AcroForm field appearance-stream regeneration.
//!
//! Setting a form field's `/V` entry changes the value a viewer reports,
//! but not what renders on the page; that comes from the widget's normal
//! appearance stream. This crate re-derives that stream from the new
//! value: it tokenizes the existing content, locates the marked-content
//! region and any drawn borders, resolves the field's font, computes the
//! layout purely from font metrics, and splices a freshly generated block
//! into the stream while preserving decorative drawing byte-for-byte.
//!
//! The single entry point is [`fill_field`]:
//!
//! ```ignore
//! let mut doc = lopdf::Document::load("form.pdf")?;
//! let report = acrofill::fill_field(&mut doc, "applicant.name", "Ada", &Default::default())?;
//! for warning in &report.warnings {
//!     eprintln!("recovered: {warning}");
//! }
//! doc.save("filled.pdf")?;
//! ```
//!
//! # Concurrency
//!
//! Generation is single-threaded and synchronous; [`fill_field`] takes
//! `&mut lopdf::Document`, so the borrow checker enforces the
//! one-generation-at-a-time rule per document (including the shared
//! default-resource copy-in). Distinct documents can be processed in
//! parallel freely.

pub mod acroform;
pub mod appearance;
pub mod default_appearance;
pub mod error;
pub mod font_metrics;
pub mod layout;
pub mod regions;
pub mod resources;
pub mod standard_fonts;
pub mod tokenizer;
pub mod writer;

pub use acrofill_core::{
    FieldReport, FieldType, FieldValue, FieldWarning, FillError, GenerateOptions, Quadding, Rect,
    Resolved, WarningCode, WidgetFailure,
};
pub use appearance::AppearanceGenerator;
pub use error::GenError;

use acroform::AcroForm;

/// Set a field's value and regenerate its appearance streams.
///
/// Looks the field up by fully-qualified name, writes the new `/V` (and
/// `/I` for choice fields whose value matches an option), and rebuilds
/// the normal appearance of every widget the field fans out to.
///
/// Failures on individual widgets are collected in the returned
/// [`FieldReport`] without aborting their siblings; the call returns an
/// error only for field-level problems (unknown field, unsupported type,
/// broken document structure) or when no widget could be generated.
pub fn fill_field(
    doc: &mut lopdf::Document,
    field_name: &str,
    value: &str,
    options: &GenerateOptions,
) -> Result<FieldReport, FillError> {
    let form = AcroForm::find(doc)
        .map_err(FillError::from)?
        .ok_or_else(|| FillError::Structure("document has no AcroForm".to_string()))?;
    let field_id = form
        .find_field(doc, field_name)
        .ok_or_else(|| FillError::FieldNotFound(field_name.to_string()))?;

    let field_type = acroform::field_type(doc, field_id)
        .ok_or_else(|| FillError::Structure(format!("field {field_name} has no /FT")))?;
    if !field_type.is_variable_text() {
        return Err(FillError::UnsupportedFieldType(format!(
            "{field_name} is a {:?} field",
            field_type
        )));
    }

    acroform::set_field_value(doc, field_id, value).map_err(FillError::from)?;
    if field_type == FieldType::Choice {
        let choices = acroform::choice_options(doc, field_id);
        if let Some(index) = choices.iter().position(|option| option == value) {
            acroform::set_selected_indices(doc, field_id, &[index]).map_err(FillError::from)?;
        }
    }

    let field_value = FieldValue::new(value);
    let mut generator = AppearanceGenerator::new(doc, form, options.clone());
    generator.generate(field_id, field_name, &field_value)
}
