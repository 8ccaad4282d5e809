//! Resource sets and font resolution.
//!
//! A field's appearance stream carries its own `/Resources /Font`
//! dictionary, and the form carries shared defaults in `/DR`. Real-world
//! documents routinely violate the nominal linking contract between the
//! `/DA` string and these dictionaries, so resolution walks a documented
//! fallback chain instead of a single lookup:
//!
//! 1. exact name in the stream's local set;
//! 2. exact name in the form's shared set, copied into the local set;
//! 3. (opt-in) any font the shared set still has;
//! 4. any font in either set whose own `/BaseFont` equals the declared
//!    name, for documents whose `/DA` names the font instead of the
//!    resource key.
//!
//! Copying only ever flows shared → local, and an existing local entry is
//! never overwritten.

use crate::error::GenError;
use crate::font_metrics::{Font, load_font};
use acrofill_core::{FieldWarning, FillError, Resolved, WarningCode};

/// An ordered name → font-object mapping from a `/Font` dictionary.
///
/// Entries hold the raw objects (usually references) so a copy between
/// sets is a dictionary-entry copy, not a font duplication.
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    entries: Vec<(String, lopdf::Object)>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a `/Font` dictionary.
    pub fn from_font_dict(dict: &lopdf::Dictionary) -> Self {
        let entries = dict
            .iter()
            .map(|(k, v)| (String::from_utf8_lossy(k).into_owned(), v.clone()))
            .collect();
        Self { entries }
    }

    /// Look up a font object by resource name.
    pub fn get(&self, name: &str) -> Option<&lopdf::Object> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Insert unless the name already exists locally.
    ///
    /// Returns `true` if the entry was inserted. An existing entry always
    /// wins; the shared defaults never replace a stream-local font.
    pub fn insert_if_absent(&mut self, name: &str, obj: lopdf::Object) -> bool {
        if self.get(name).is_some() {
            return false;
        }
        self.entries.push((name.to_string(), obj));
        true
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &lopdf::Object)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Rebuild a `/Font` dictionary from the entries.
    pub fn to_dictionary(&self) -> lopdf::Dictionary {
        let mut dict = lopdf::Dictionary::new();
        for (name, obj) in &self.entries {
            dict.set(name.as_bytes().to_vec(), obj.clone());
        }
        dict
    }
}

/// Resolve the declared font through the fallback chain.
///
/// On success the winning entry has been copied into `local` under the
/// declared name (steps 2 and 3; step 1 already has it, step 4 copies
/// when the match came from the shared set). Step 3 runs only when
/// `link_leftover` is set and reports a [`WarningCode::LinkedFallbackFont`]
/// diagnostic.
///
/// # Errors
///
/// [`FillError::MissingFontResource`] when every step fails.
pub fn resolve_font(
    doc: &lopdf::Document,
    local: &mut ResourceSet,
    shared: &ResourceSet,
    declared_name: &str,
    link_leftover: bool,
) -> Result<Resolved<Font>, GenError> {
    // 1. Exact hit in the stream's own resources.
    if let Some(obj) = local.get(declared_name) {
        return Ok(Resolved::Exact(load_font(doc, obj)?));
    }

    // 2. Exact hit in the form's defaults: copy in, local entry wins.
    if let Some(obj) = shared.get(declared_name) {
        let obj = obj.clone();
        let font = load_font(doc, &obj)?;
        local.insert_if_absent(declared_name, obj);
        return Ok(Resolved::Exact(font));
    }

    // 3. Best-effort: link whatever the form still has, if asked to.
    if link_leftover {
        if let Some((name, obj)) = shared.iter().next() {
            let substituted = name.to_string();
            let obj = obj.clone();
            let font = load_font(doc, &obj)?;
            local.insert_if_absent(declared_name, obj);
            return Ok(Resolved::Defaulted {
                value: font,
                warning: FieldWarning::with_code(
                    WarningCode::LinkedFallbackFont,
                    format!("font {declared_name} not found, linked form resource {substituted}"),
                )
                .for_font(declared_name),
            });
        }
    }

    // 4. The /DA may name the font itself instead of the resource key.
    for (_, obj) in local.iter() {
        let font = load_font(doc, obj)?;
        if font.name == declared_name {
            return Ok(Resolved::Exact(font));
        }
    }
    for (_, obj) in shared.iter() {
        let obj = obj.clone();
        let font = load_font(doc, &obj)?;
        if font.name == declared_name {
            local.insert_if_absent(declared_name, obj);
            return Ok(Resolved::Exact(font));
        }
    }

    Err(GenError::Core(FillError::MissingFontResource(
        declared_name.to_string(),
    )))
}
