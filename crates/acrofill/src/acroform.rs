//! AcroForm dictionary access.
//!
//! Thin wrappers over the lopdf object model for the entries appearance
//! generation consumes: the form's `/DA` and `/DR`, field dictionaries
//! (`/FT`, `/Ff`, `/Q`, `/MaxLen`, `/Opt`, `/I`, `/TI`, `/Kids`), widget
//! rectangles and the `/AP /N` appearance stream. Inheritable entries walk
//! the `/Parent` chain; the default appearance additionally falls back to
//! the first kid and then the form itself.

use crate::error::GenError;
use crate::font_metrics::resolve;
use crate::resources::ResourceSet;
use acrofill_core::{FieldType, Rect};
use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};

/// A snapshot of the form-level defaults.
///
/// Read once per generation pass; the shared defaults are never mutated
/// (font copy-in only ever flows into the stream's local resources).
#[derive(Debug, Clone)]
pub struct AcroForm {
    dict: Dictionary,
}

impl AcroForm {
    /// Locate the document's AcroForm dictionary.
    pub fn find(doc: &Document) -> Result<Option<AcroForm>, GenError> {
        let root_id = doc
            .trailer
            .get(b"Root")
            .and_then(|o| o.as_reference())
            .map_err(|e| GenError::Structure(format!("invalid document catalog: {e}")))?;
        let catalog = doc
            .get_object(root_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| GenError::Structure(format!("invalid document catalog: {e}")))?;

        let Ok(form_obj) = catalog.get(b"AcroForm") else {
            return Ok(None);
        };
        let dict = resolve(doc, form_obj)
            .as_dict()
            .map_err(|_| GenError::Structure("/AcroForm is not a dictionary".to_string()))?
            .clone();
        Ok(Some(AcroForm { dict }))
    }

    /// The form-level `/DA` string, the last stop of the inheritance chase.
    pub fn default_appearance(&self) -> Option<Vec<u8>> {
        string_bytes(self.dict.get(b"DA").ok()?).map(<[u8]>::to_vec)
    }

    /// The form's shared font resources (`/DR /Font`), if any.
    pub fn default_resources(&self, doc: &Document) -> Option<ResourceSet> {
        let dr = resolve(doc, self.dict.get(b"DR").ok()?).as_dict().ok()?;
        let fonts = resolve(doc, dr.get(b"Font").ok()?).as_dict().ok()?;
        Some(ResourceSet::from_font_dict(fonts))
    }

    /// Returns `true` when the form carries a `/DR` dictionary at all.
    pub fn has_default_resources(&self, doc: &Document) -> bool {
        self.dict
            .get(b"DR")
            .ok()
            .map(|o| resolve(doc, o).as_dict().is_ok())
            .unwrap_or(false)
    }

    /// Find a field by fully-qualified name (partial names joined with `.`).
    pub fn find_field(&self, doc: &Document, name: &str) -> Option<ObjectId> {
        let fields = resolve(doc, self.dict.get(b"Fields").ok()?).as_array().ok()?;
        for obj in fields {
            if let Ok(id) = obj.as_reference() {
                if let Some(found) = find_field_in(doc, id, "", name) {
                    return Some(found);
                }
            }
        }
        None
    }
}

fn find_field_in(doc: &Document, id: ObjectId, prefix: &str, target: &str) -> Option<ObjectId> {
    let dict = doc.get_object(id).ok()?.as_dict().ok()?;
    let partial = dict
        .get(b"T")
        .ok()
        .and_then(string_bytes)
        .map(decode_pdf_string);

    let qualified = match &partial {
        Some(name) if prefix.is_empty() => name.clone(),
        Some(name) => format!("{prefix}.{name}"),
        None => prefix.to_string(),
    };

    if partial.is_some() && qualified == target {
        return Some(id);
    }

    if let Ok(kids) = dict.get(b"Kids") {
        if let Ok(kids) = resolve(doc, kids).as_array() {
            for kid in kids {
                if let Ok(kid_id) = kid.as_reference() {
                    if let Some(found) = find_field_in(doc, kid_id, &qualified, target) {
                        return Some(found);
                    }
                }
            }
        }
    }

    None
}

/// Look up a key on a field dictionary, walking the `/Parent` chain when
/// the field itself does not carry it.
pub(crate) fn inherited<'a>(doc: &'a Document, id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = id;
    loop {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        match dict.get(b"Parent") {
            Ok(parent) => current = parent.as_reference().ok()?,
            Err(_) => return None,
        }
    }
}

/// The field's type from its (possibly inherited) `/FT` entry.
pub fn field_type(doc: &Document, id: ObjectId) -> Option<FieldType> {
    inherited(doc, id, b"FT")
        .and_then(|o| o.as_name().ok())
        .and_then(|b| std::str::from_utf8(b).ok())
        .and_then(FieldType::from_pdf_name)
}

/// The field's flags from its (possibly inherited) `/Ff` entry.
pub fn field_flags(doc: &Document, id: ObjectId) -> u32 {
    inherited(doc, id, b"Ff")
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(0) as u32
}

/// The raw `/Q` quadding value: on the field, else on its first kid,
/// else inherited, else 0.
pub fn quadding_value(doc: &Document, id: ObjectId) -> i64 {
    let dict = match doc.get_object(id).and_then(|o| o.as_dict()) {
        Ok(d) => d,
        Err(_) => return 0,
    };
    if let Ok(q) = dict.get(b"Q") {
        if let Ok(q) = q.as_i64() {
            return q;
        }
    }
    if let Some(first_kid) = first_kid_dict(doc, dict) {
        if let Ok(q) = first_kid.get(b"Q") {
            if let Ok(q) = q.as_i64() {
                return q;
            }
        }
    }
    inherited(doc, id, b"Q")
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(0)
}

/// The `/DA` inheritance chain for a field, nearest level first:
/// the field's own entry, its first kid's, then the form default.
///
/// Returned as a chain (rather than the first hit) so the caller can
/// fall through to the next level when one fails to parse.
pub fn default_appearance_chain(doc: &Document, id: ObjectId, form: &AcroForm) -> Vec<Vec<u8>> {
    let mut chain = Vec::new();
    if let Ok(dict) = doc.get_object(id).and_then(|o| o.as_dict()) {
        if let Some(bytes) = dict.get(b"DA").ok().and_then(string_bytes) {
            chain.push(bytes.to_vec());
        }
        if let Some(first_kid) = first_kid_dict(doc, dict) {
            if let Some(bytes) = first_kid.get(b"DA").ok().and_then(string_bytes) {
                chain.push(bytes.to_vec());
            }
        }
    }
    if let Some(bytes) = form.default_appearance() {
        chain.push(bytes);
    }
    chain
}

/// The first usable `/DA` bytes for a field, through the same chain.
pub fn default_appearance_bytes(
    doc: &Document,
    id: ObjectId,
    form: &AcroForm,
) -> Option<Vec<u8>> {
    default_appearance_chain(doc, id, form).into_iter().next()
}

fn first_kid_dict<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    let kids = resolve(doc, dict.get(b"Kids").ok()?).as_array().ok()?;
    resolve(doc, kids.first()?).as_dict().ok()
}

/// The `/MaxLen` entry (inheritable), required for comb layout.
pub fn max_len(doc: &Document, id: ObjectId) -> Option<usize> {
    inherited(doc, id, b"MaxLen")
        .and_then(|o| o.as_i64().ok())
        .and_then(|v| usize::try_from(v).ok())
}

/// Choice field option display labels from `/Opt`.
///
/// An option is either a plain string or an `[export, display]` pair;
/// the display label (second entry) is what renders.
pub fn choice_options(doc: &Document, id: ObjectId) -> Vec<String> {
    let Some(opt) = inherited(doc, id, b"Opt") else {
        return Vec::new();
    };
    let Ok(array) = resolve(doc, opt).as_array() else {
        return Vec::new();
    };
    array
        .iter()
        .filter_map(|entry| match resolve(doc, entry) {
            Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
            Object::Array(pair) => pair
                .get(1)
                .or_else(|| pair.first())
                .and_then(string_bytes)
                .map(decode_pdf_string),
            _ => None,
        })
        .collect()
}

/// Selected option indices from `/I`, sorted ascending.
pub fn selected_indices(doc: &Document, id: ObjectId) -> Vec<usize> {
    let Some(indices) = inherited(doc, id, b"I") else {
        return Vec::new();
    };
    let Ok(array) = resolve(doc, indices).as_array() else {
        return Vec::new();
    };
    let mut out: Vec<usize> = array
        .iter()
        .filter_map(|o| o.as_i64().ok())
        .filter_map(|v| usize::try_from(v).ok())
        .collect();
    out.sort_unstable();
    out
}

/// The first visible option index from `/TI`, default 0.
pub fn top_index(doc: &Document, id: ObjectId) -> usize {
    inherited(doc, id, b"TI")
        .and_then(|o| o.as_i64().ok())
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(0)
}

/// Returns `true` when the field binds a format action (`/AA /F`).
///
/// Such fields are formatted by the viewing application; generation is
/// skipped unless an appearance already exists.
pub fn has_format_action(doc: &Document, id: ObjectId) -> bool {
    let Some(aa) = inherited(doc, id, b"AA") else {
        return false;
    };
    resolve(doc, aa)
        .as_dict()
        .map(|d| d.has(b"F"))
        .unwrap_or(false)
}

/// Returns `true` when the widget carries an `/AP` entry.
pub fn has_appearance(doc: &Document, widget_id: ObjectId) -> bool {
    doc.get_object(widget_id)
        .and_then(|o| o.as_dict())
        .map(|d| d.has(b"AP"))
        .unwrap_or(false)
}

/// The widget annotations a field fans out to: its `/Kids`, or the field
/// itself when field and widget share one dictionary.
pub fn widget_ids(doc: &Document, field_id: ObjectId) -> Vec<ObjectId> {
    let kids = doc
        .get_object(field_id)
        .and_then(|o| o.as_dict())
        .ok()
        .and_then(|d| d.get(b"Kids").ok())
        .and_then(|o| resolve(doc, o).as_array().ok());
    match kids {
        Some(kids) if !kids.is_empty() => kids
            .iter()
            .filter_map(|o| o.as_reference().ok())
            .collect(),
        _ => vec![field_id],
    }
}

/// The widget's `/Rect`, normalized.
pub fn widget_rect(doc: &Document, widget_id: ObjectId) -> Result<Rect, GenError> {
    let dict = doc
        .get_object(widget_id)
        .and_then(|o| o.as_dict())
        .map_err(|e| GenError::Structure(format!("widget is not a dictionary: {e}")))?;
    let rect = dict
        .get(b"Rect")
        .map_err(|_| GenError::Structure("widget has no /Rect".to_string()))?;
    let array = resolve(doc, rect)
        .as_array()
        .map_err(|_| GenError::Structure("/Rect is not an array".to_string()))?;
    if array.len() != 4 {
        return Err(GenError::Structure(format!(
            "/Rect has {} elements, expected 4",
            array.len()
        )));
    }
    let mut values = [0.0f64; 4];
    for (slot, obj) in values.iter_mut().zip(array) {
        *slot = crate::font_metrics::object_to_f64(resolve(doc, obj))
            .ok_or_else(|| GenError::Structure("/Rect entry is not a number".to_string()))?;
    }
    Ok(Rect::new(values[0], values[1], values[2], values[3]).normalized())
}

/// Ensure the widget has a normal appearance stream, creating an empty
/// one sized to the widget rectangle if absent. Returns the stream's id.
pub fn ensure_normal_appearance(
    doc: &mut Document,
    widget_id: ObjectId,
) -> Result<ObjectId, GenError> {
    if let Some(existing) = normal_appearance_id(doc, widget_id) {
        return Ok(existing);
    }

    let bbox = widget_rect(doc, widget_id)?.retranslated();
    let stream_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => Object::Array(vec![
            Object::Real(bbox.llx as f32),
            Object::Real(bbox.lly as f32),
            Object::Real(bbox.urx as f32),
            Object::Real(bbox.ury as f32),
        ]),
    };
    let stream_id = doc.add_object(Object::Stream(lopdf::Stream::new(stream_dict, Vec::new())));

    let widget = doc
        .get_object_mut(widget_id)
        .ok()
        .and_then(|o| o.as_dict_mut().ok())
        .ok_or_else(|| GenError::Structure("widget is not a dictionary".to_string()))?;
    let has_inline_ap = matches!(widget.get(b"AP"), Ok(Object::Dictionary(_)));
    if has_inline_ap {
        if let Ok(Object::Dictionary(ap)) = widget.get_mut(b"AP") {
            ap.set("N", Object::Reference(stream_id));
        }
    } else {
        widget.set(
            "AP",
            Object::Dictionary(dictionary! { "N" => Object::Reference(stream_id) }),
        );
    }
    Ok(stream_id)
}

/// The existing `/AP /N` stream id, if the widget has one.
fn normal_appearance_id(doc: &Document, widget_id: ObjectId) -> Option<ObjectId> {
    let dict = doc.get_object(widget_id).ok()?.as_dict().ok()?;
    let ap = resolve(doc, dict.get(b"AP").ok()?).as_dict().ok()?;
    let n = ap.get(b"N").ok()?;
    let id = n.as_reference().ok()?;
    match doc.get_object(id) {
        Ok(Object::Stream(_)) => Some(id),
        _ => None,
    }
}

/// The appearance stream's `/BBox`, when present.
pub fn stream_bbox(doc: &Document, stream_id: ObjectId) -> Option<Rect> {
    let stream = match doc.get_object(stream_id) {
        Ok(Object::Stream(s)) => s,
        _ => return None,
    };
    let array = resolve(doc, stream.dict.get(b"BBox").ok()?).as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let values: Vec<f64> = array
        .iter()
        .filter_map(|o| crate::font_metrics::object_to_f64(resolve(doc, o)))
        .collect();
    if values.len() != 4 {
        return None;
    }
    Some(Rect::new(values[0], values[1], values[2], values[3]).normalized())
}

/// The raw (decoded) content of a stream.
pub fn read_stream_content(doc: &Document, stream_id: ObjectId) -> Result<Vec<u8>, GenError> {
    match doc.get_object(stream_id) {
        Ok(Object::Stream(s)) => Ok(s
            .decompressed_content()
            .unwrap_or_else(|_| s.content.clone())),
        _ => Err(GenError::Structure(
            "appearance entry is not a stream".to_string(),
        )),
    }
}

/// Commit bytes as the stream's unfiltered content. Any previous filter
/// chain is dropped; this layer never compresses.
pub fn write_unfiltered_content(
    doc: &mut Document,
    stream_id: ObjectId,
    data: Vec<u8>,
) -> Result<(), GenError> {
    match doc.get_object_mut(stream_id) {
        Ok(Object::Stream(s)) => {
            s.dict.remove(b"Filter");
            s.dict.remove(b"DecodeParms");
            s.set_content(data);
            Ok(())
        }
        _ => Err(GenError::Structure(
            "appearance entry is not a stream".to_string(),
        )),
    }
}

/// The stream's local font resources (`/Resources /Font`).
pub fn stream_font_resources(doc: &Document, stream_id: ObjectId) -> Option<ResourceSet> {
    let stream = match doc.get_object(stream_id) {
        Ok(Object::Stream(s)) => s,
        _ => return None,
    };
    let resources = resolve(doc, stream.dict.get(b"Resources").ok()?).as_dict().ok()?;
    let fonts = resolve(doc, resources.get(b"Font").ok()?).as_dict().ok()?;
    Some(ResourceSet::from_font_dict(fonts))
}

/// Returns `true` when the stream carries a `/Resources` dictionary.
pub fn has_stream_resources(doc: &Document, stream_id: ObjectId) -> bool {
    match doc.get_object(stream_id) {
        Ok(Object::Stream(s)) => s.dict.has(b"Resources"),
        _ => false,
    }
}

/// Write the local font resources back onto the stream.
///
/// An indirect `/Resources` dictionary is inlined first so the write
/// never mutates an object other streams may share.
pub fn write_stream_font_resources(
    doc: &mut Document,
    stream_id: ObjectId,
    fonts: &ResourceSet,
) -> Result<(), GenError> {
    let inline: Option<Dictionary> = match doc.get_object(stream_id) {
        Ok(Object::Stream(s)) => match s.dict.get(b"Resources") {
            Ok(Object::Reference(_)) => {
                let resolved = s
                    .dict
                    .get(b"Resources")
                    .ok()
                    .map(|o| resolve(doc, o))
                    .and_then(|o| o.as_dict().ok())
                    .cloned();
                Some(resolved.unwrap_or_else(Dictionary::new))
            }
            _ => None,
        },
        _ => {
            return Err(GenError::Structure(
                "appearance entry is not a stream".to_string(),
            ));
        }
    };

    match doc.get_object_mut(stream_id) {
        Ok(Object::Stream(s)) => {
            if let Some(inlined) = inline {
                s.dict.set("Resources", Object::Dictionary(inlined));
            }
            let has_inline_resources = matches!(s.dict.get(b"Resources"), Ok(Object::Dictionary(_)));
            if has_inline_resources {
                if let Ok(Object::Dictionary(resources)) = s.dict.get_mut(b"Resources") {
                    resources.set("Font", Object::Dictionary(fonts.to_dictionary()));
                }
            } else {
                s.dict.set(
                    "Resources",
                    Object::Dictionary(
                        dictionary! { "Font" => Object::Dictionary(fonts.to_dictionary()) },
                    ),
                );
            }
            Ok(())
        }
        _ => Err(GenError::Structure(
            "appearance entry is not a stream".to_string(),
        )),
    }
}

/// Set the field's `/V` entry to the new value.
pub fn set_field_value(
    doc: &mut Document,
    field_id: ObjectId,
    value: &str,
) -> Result<(), GenError> {
    let bytes = crate::writer::encode_text(value);
    let dict = doc
        .get_object_mut(field_id)
        .ok()
        .and_then(|o| o.as_dict_mut().ok())
        .ok_or_else(|| GenError::Structure("field is not a dictionary".to_string()))?;
    dict.set("V", Object::String(bytes, lopdf::StringFormat::Literal));
    Ok(())
}

/// Set a choice field's `/I` selection array.
pub fn set_selected_indices(
    doc: &mut Document,
    field_id: ObjectId,
    indices: &[usize],
) -> Result<(), GenError> {
    let dict = doc
        .get_object_mut(field_id)
        .ok()
        .and_then(|o| o.as_dict_mut().ok())
        .ok_or_else(|| GenError::Structure("field is not a dictionary".to_string()))?;
    dict.set(
        "I",
        Object::Array(indices.iter().map(|i| Object::Integer(*i as i64)).collect()),
    );
    Ok(())
}

/// Decode a PDF text string: UTF-16BE when it carries a byte-order mark,
/// Latin-1 otherwise.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// The bytes of a string object, if it is one.
pub(crate) fn string_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}
