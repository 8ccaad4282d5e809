//! acrofill-core: backend-independent data types for acrofill.
//!
//! This crate provides the foundational types shared by the appearance
//! generation engine: rectangle geometry, the form field model (types,
//! flags, quadding, values), the fatal error taxonomy and the non-fatal
//! diagnostic types. It has no external dependencies; all functionality
//! is pure Rust.

pub mod error;
pub mod field;
pub mod geometry;

pub use error::{
    FieldReport, FieldWarning, FillError, GenerateOptions, Resolved, WarningCode, WidgetFailure,
};
pub use field::{
    FF_COMB, FF_COMBO, FF_DO_NOT_SCROLL, FF_MULTILINE, FieldType, FieldValue, Quadding,
};
pub use geometry::Rect;
