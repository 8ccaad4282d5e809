//! End-to-end appearance generation over in-memory documents.

use acrofill::tokenizer::{Operator, Token, tokenize};
use acrofill::writer::write_tokens;
use acrofill::{FillError, GenerateOptions, WarningCode, fill_field};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat, dictionary};

/// Build a document with one merged field/widget and a Helvetica entry in
/// the form's default resources.
fn field_document(field_entries: Dictionary) -> (Document, ObjectId) {
    let mut doc = Document::with_version("1.5");
    let helv_id = doc.add_object(Object::Dictionary(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    }));
    let field_id = doc.add_object(Object::Dictionary(field_entries));
    let form_id = doc.add_object(Object::Dictionary(dictionary! {
        "Fields" => Object::Array(vec![Object::Reference(field_id)]),
        "DR" => Object::Dictionary(dictionary! {
            "Font" => Object::Dictionary(dictionary! {
                "Helv" => Object::Reference(helv_id),
            }),
        }),
    }));
    let catalog_id = doc.add_object(Object::Dictionary(dictionary! {
        "Type" => "Catalog",
        "AcroForm" => Object::Reference(form_id),
    }));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    (doc, field_id)
}

fn text_field(da: &str, quadding: i64, flags: u32) -> Dictionary {
    dictionary! {
        "FT" => "Tx",
        "T" => Object::String(b"field".to_vec(), StringFormat::Literal),
        "DA" => Object::String(da.as_bytes().to_vec(), StringFormat::Literal),
        "Q" => Object::Integer(quadding),
        "Ff" => Object::Integer(flags as i64),
        "Rect" => Object::Array(vec![
            Object::Integer(0), Object::Integer(0),
            Object::Integer(100), Object::Integer(20),
        ]),
    }
}

/// The committed normal appearance bytes of a widget.
fn appearance_content(doc: &Document, widget_id: ObjectId) -> Vec<u8> {
    let widget = doc.get_object(widget_id).unwrap().as_dict().unwrap();
    let ap = widget.get(b"AP").unwrap().as_dict().unwrap();
    let n = ap.get(b"N").unwrap().as_reference().unwrap();
    match doc.get_object(n).unwrap() {
        Object::Stream(s) => s.content.clone(),
        _ => panic!("normal appearance is not a stream"),
    }
}

fn count_operator(tokens: &[Token], op: &Operator) -> usize {
    tokens.iter().filter(|t| t.is_operator(op)).count()
}

/// Helvetica width of a string at size 1 (AFM widths / 1000).
fn helv_width_at_1(text: &str) -> f64 {
    let data = acrofill::standard_fonts::lookup("Helvetica").unwrap();
    text.chars().map(|c| data.widths[c as usize] as f64).sum::<f64>() / 1000.0
}

#[test]
fn fresh_appearance_wraps_generated_block_in_markers() {
    let (mut doc, field_id) = field_document(text_field("/Helv 0 Tf", 1, 0));
    let report = fill_field(&mut doc, "field", "Hello", &GenerateOptions::default()).unwrap();
    assert_eq!(report.widgets_updated, 1);
    assert!(report.is_clean());

    let content = appearance_content(&doc, field_id);
    // No existing appearance: zero preserved-drawing bytes are prepended
    assert!(content.starts_with(b"/Tx BMC\n"));
    assert!(content.ends_with(b"EMC"));
}

#[test]
fn centered_autosized_text_layout() {
    let (mut doc, field_id) = field_document(text_field("/Helv 0 Tf", 1, 0));
    fill_field(&mut doc, "field", "Hello", &GenerateOptions::default()).unwrap();

    let content = appearance_content(&doc, field_id);
    let tokens = tokenize(&content).unwrap();

    assert_eq!(count_operator(&tokens, &Operator::BeginText), 1);
    assert_eq!(count_operator(&tokens, &Operator::EndText), 1);
    assert_eq!(count_operator(&tokens, &Operator::ShowText), 1);

    // The Tf carries a computed positive size bounded by the height fit
    let tf = tokens
        .iter()
        .position(|t| t.is_operator(&Operator::SetFont))
        .unwrap();
    let size = tokens[tf - 1].as_number().unwrap();
    let height_fit = 18.0 / ((931.0 + 225.0) / 1000.0);
    assert!(size > 0.0);
    assert!(size <= height_fit + 1e-6);

    // One Td at the centered horizontal offset (100 − textWidth)/2
    let td = tokens
        .iter()
        .position(|t| t.is_operator(&Operator::MoveText))
        .unwrap();
    let horizontal = tokens[td - 2].as_number().unwrap();
    let text_width = helv_width_at_1("Hello") * size;
    assert!((horizontal - (100.0 - text_width) / 2.0).abs() < 0.01);

    // The Tj shows the literal value as a hex string
    let tj = tokens
        .iter()
        .position(|t| t.is_operator(&Operator::ShowText))
        .unwrap();
    match &tokens[tj - 1] {
        Token::String(s) => {
            assert_eq!(s.bytes, b"Hello");
            assert!(s.hex);
        }
        other => panic!("expected string before Tj, got {other:?}"),
    }
}

#[test]
fn declared_da_size_is_kept() {
    let (mut doc, field_id) = field_document(text_field("/Helv 12 Tf", 0, 0));
    fill_field(&mut doc, "field", "Hi", &GenerateOptions::default()).unwrap();

    let tokens = tokenize(&appearance_content(&doc, field_id)).unwrap();
    let tf = tokens
        .iter()
        .position(|t| t.is_operator(&Operator::SetFont))
        .unwrap();
    assert_eq!(tokens[tf - 1].as_number(), Some(12.0));
}

#[test]
fn left_quadding_uses_fixed_padding() {
    let (mut doc, field_id) = field_document(text_field("/Helv 10 Tf", 0, 0));
    fill_field(&mut doc, "field", "Hi", &GenerateOptions::default()).unwrap();

    let tokens = tokenize(&appearance_content(&doc, field_id)).unwrap();
    let td = tokens
        .iter()
        .position(|t| t.is_operator(&Operator::MoveText))
        .unwrap();
    assert_eq!(tokens[td - 2].as_number(), Some(2.0));
}

#[test]
fn splice_preserves_tokens_outside_markers() {
    let (mut doc, field_id) = field_document(text_field("/Helv 0 Tf", 0, 0));

    // Existing appearance: decorative drawing, markers with old interior,
    // and trailing drawing after EMC
    let existing: &[u8] =
        b"0.75 g\n0 0 100 20 re\nf\n/Tx BMC\nBT\n/Helv 8 Tf\n(old) Tj\nET\nEMC\n0 g\n";
    let stream_id = doc.add_object(Object::Stream(lopdf::Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => Object::Array(vec![
                Object::Integer(0), Object::Integer(0),
                Object::Integer(100), Object::Integer(20),
            ]),
        },
        existing.to_vec(),
    )));
    doc.get_object_mut(field_id)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set(
            "AP",
            Object::Dictionary(dictionary! { "N" => Object::Reference(stream_id) }),
        );

    fill_field(&mut doc, "field", "new value", &GenerateOptions::default()).unwrap();

    let content = appearance_content(&doc, field_id);
    let original_tokens = tokenize(existing).unwrap();
    let bmc = original_tokens
        .iter()
        .position(|t| t.is_operator(&Operator::BeginMarkedContent))
        .unwrap();
    let emc = original_tokens
        .iter()
        .position(|t| t.is_operator(&Operator::EndMarkedContent))
        .unwrap();

    // Everything outside [bmc, emc] survives byte-for-byte through the
    // splice (modulo the Tf size rewrite, which sits inside the region)
    let prefix = write_tokens(&original_tokens[..=bmc]);
    let suffix = write_tokens(&original_tokens[emc..]);
    assert!(content.starts_with(&prefix));
    assert!(content.ends_with(&suffix));

    // The old interior was replaced by the regenerated block
    let text = String::from_utf8_lossy(&content);
    assert!(!text.contains("(old)"));
    assert!(text.contains("6E65772076616C7565")); // "new value" in hex
}

#[test]
fn font_copied_from_form_defaults_into_stream_resources() {
    let (mut doc, field_id) = field_document(text_field("/Helv 0 Tf", 0, 0));
    fill_field(&mut doc, "field", "x", &GenerateOptions::default()).unwrap();

    let widget = doc.get_object(field_id).unwrap().as_dict().unwrap();
    let ap = widget.get(b"AP").unwrap().as_dict().unwrap();
    let n = ap.get(b"N").unwrap().as_reference().unwrap();
    let stream = match doc.get_object(n).unwrap() {
        Object::Stream(s) => s,
        _ => panic!("expected stream"),
    };
    let resources = stream.dict.get(b"Resources").unwrap().as_dict().unwrap();
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
    assert!(fonts.has(b"Helv"));
}

#[test]
fn comb_field_positions_each_character_in_its_cell() {
    let mut entries = text_field("/Helv 10 Tf", 0, 1 << 24);
    entries.set("MaxLen", Object::Integer(5));
    let (mut doc, field_id) = field_document(entries);
    fill_field(&mut doc, "field", "abc", &GenerateOptions::default()).unwrap();

    let tokens = tokenize(&appearance_content(&doc, field_id)).unwrap();
    // Exactly one positioned show per character
    assert_eq!(count_operator(&tokens, &Operator::ShowText), 3);

    // Relative Td moves accumulate into one equal-width cell per glyph
    let comb_width = 100.0 / 5.0;
    let mut absolute_x = 0.0;
    let mut cell = 0;
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is_operator(&Operator::MoveText) {
            absolute_x += tokens[i - 2].as_number().unwrap();
            let cell_start = cell as f64 * comb_width;
            assert!(
                absolute_x > cell_start && absolute_x < cell_start + comb_width,
                "glyph {cell} at x {absolute_x}"
            );
            cell += 1;
        }
        i += 1;
    }
    assert_eq!(cell, 3);

    // The comb clips to its padding edge
    assert_eq!(count_operator(&tokens, &Operator::Clip), 1);
    assert_eq!(count_operator(&tokens, &Operator::EndPath), 1);
}

#[test]
fn multiline_value_emits_one_show_per_line() {
    let (mut doc, field_id) = field_document(text_field("/Helv 9 Tf", 0, 1 << 12));
    fill_field(&mut doc, "field", "first\nsecond", &GenerateOptions::default()).unwrap();

    let tokens = tokenize(&appearance_content(&doc, field_id)).unwrap();
    assert_eq!(count_operator(&tokens, &Operator::ShowText), 2);

    // The second line is reached by the fixed downward leading
    let mut found_leading = false;
    for window in tokens.windows(3) {
        if window[2].is_operator(&Operator::MoveText)
            && window[0].as_number() == Some(0.0)
            && window[1].as_number() == Some(-13.0)
        {
            found_leading = true;
        }
    }
    assert!(found_leading);
}

#[test]
fn listbox_renders_scroll_window_with_highlight() {
    let options = vec![
        Object::String(b"Apple".to_vec(), StringFormat::Literal),
        Object::String(b"Banana".to_vec(), StringFormat::Literal),
        Object::String(b"Cherry".to_vec(), StringFormat::Literal),
    ];
    let entries = dictionary! {
        "FT" => "Ch",
        "T" => Object::String(b"field".to_vec(), StringFormat::Literal),
        "DA" => Object::String(b"/Helv 0 Tf".to_vec(), StringFormat::Literal),
        "Opt" => Object::Array(options),
        "I" => Object::Array(vec![Object::Integer(1)]),
        "Rect" => Object::Array(vec![
            Object::Integer(0), Object::Integer(0),
            Object::Integer(100), Object::Integer(60),
        ]),
    };
    let (mut doc, field_id) = field_document(entries);
    let report = fill_field(&mut doc, "field", "Banana", &GenerateOptions::default()).unwrap();
    assert_eq!(report.widgets_updated, 1);

    let content = appearance_content(&doc, field_id);
    let text = String::from_utf8_lossy(&content);
    // The fixed highlight color behind the selected row
    assert!(text.contains("0.600006 0.756866 0.854904 rg"));

    let tokens = tokenize(&content).unwrap();
    // Every option from the top index renders, each in its own text
    // object except the first
    assert_eq!(count_operator(&tokens, &Operator::ShowText), 3);
    assert_eq!(count_operator(&tokens, &Operator::BeginText), 3);
    assert_eq!(count_operator(&tokens, &Operator::EndText), 3);
    // Highlight fill plus balanced save/restore
    assert_eq!(count_operator(&tokens, &Operator::Fill), 1);
    assert_eq!(count_operator(&tokens, &Operator::Save), 1);
    assert_eq!(count_operator(&tokens, &Operator::Restore), 1);
}

#[test]
fn listbox_top_index_scrolls_options() {
    let options = vec![
        Object::String(b"Apple".to_vec(), StringFormat::Literal),
        Object::String(b"Banana".to_vec(), StringFormat::Literal),
        Object::String(b"Cherry".to_vec(), StringFormat::Literal),
    ];
    let entries = dictionary! {
        "FT" => "Ch",
        "T" => Object::String(b"field".to_vec(), StringFormat::Literal),
        "DA" => Object::String(b"/Helv 0 Tf".to_vec(), StringFormat::Literal),
        "Opt" => Object::Array(options),
        "I" => Object::Array(vec![Object::Integer(2)]),
        "TI" => Object::Integer(1),
        "Rect" => Object::Array(vec![
            Object::Integer(0), Object::Integer(0),
            Object::Integer(100), Object::Integer(60),
        ]),
    };
    let (mut doc, field_id) = field_document(entries);
    fill_field(&mut doc, "field", "Cherry", &GenerateOptions::default()).unwrap();

    let content = appearance_content(&doc, field_id);
    let text = String::from_utf8_lossy(&content);
    // Apple is scrolled off; Banana and Cherry render
    assert!(!text.contains("4170706C65")); // "Apple"
    assert!(text.contains("42616E616E61")); // "Banana"
    assert!(text.contains("436865727279")); // "Cherry"
}

#[test]
fn format_action_without_appearance_skips_generation() {
    let mut entries = text_field("/Helv 0 Tf", 0, 0);
    entries.set(
        "AA",
        Object::Dictionary(dictionary! {
            "F" => Object::Dictionary(dictionary! { "S" => "JavaScript" }),
        }),
    );
    let (mut doc, field_id) = field_document(entries);
    let report = fill_field(&mut doc, "field", "x", &GenerateOptions::default()).unwrap();
    assert_eq!(report.widgets_updated, 0);
    assert_eq!(report.widgets_skipped, 1);
    // No appearance was created; the viewer will format the field
    let widget = doc.get_object(field_id).unwrap().as_dict().unwrap();
    assert!(!widget.has(b"AP"));
}

#[test]
fn missing_font_is_fatal_without_opt_in() {
    let (mut doc, _) = field_document(text_field("/Nope 0 Tf", 0, 0));
    let err = fill_field(&mut doc, "field", "x", &GenerateOptions::default());
    assert!(matches!(
        err,
        Err(FillError::MissingFontResource(name)) if name == "Nope"
    ));
}

#[test]
fn leftover_linking_recovers_with_warning() {
    let (mut doc, _) = field_document(text_field("/Nope 0 Tf", 0, 0));
    let options = GenerateOptions {
        link_leftover_resources: true,
        ..GenerateOptions::default()
    };
    let report = fill_field(&mut doc, "field", "x", &options).unwrap();
    assert_eq!(report.widgets_updated, 1);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.code == WarningCode::LinkedFallbackFont));
}

#[test]
fn unknown_quadding_defaults_left_with_warning() {
    let (mut doc, field_id) = field_document(text_field("/Helv 10 Tf", 7, 0));
    let report = fill_field(&mut doc, "field", "Hi", &GenerateOptions::default()).unwrap();
    assert_eq!(report.widgets_updated, 1);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.code == WarningCode::UnknownQuadding));

    // Layout fell back to the left padding
    let tokens = tokenize(&appearance_content(&doc, field_id)).unwrap();
    let td = tokens
        .iter()
        .position(|t| t.is_operator(&Operator::MoveText))
        .unwrap();
    assert_eq!(tokens[td - 2].as_number(), Some(2.0));
}

#[test]
fn strict_mode_escalates_warnings() {
    let (mut doc, _) = field_document(text_field("/Helv 10 Tf", 7, 0));
    let options = GenerateOptions {
        strict_mode: true,
        ..GenerateOptions::default()
    };
    assert!(fill_field(&mut doc, "field", "Hi", &options).is_err());
}

#[test]
fn unknown_field_name_is_reported() {
    let (mut doc, _) = field_document(text_field("/Helv 0 Tf", 0, 0));
    let err = fill_field(&mut doc, "nope", "x", &GenerateOptions::default());
    assert!(matches!(
        err,
        Err(FillError::FieldNotFound(name)) if name == "nope"
    ));
}

#[test]
fn button_field_is_unsupported() {
    let entries = dictionary! {
        "FT" => "Btn",
        "T" => Object::String(b"field".to_vec(), StringFormat::Literal),
        "Rect" => Object::Array(vec![
            Object::Integer(0), Object::Integer(0),
            Object::Integer(20), Object::Integer(20),
        ]),
    };
    let (mut doc, _) = field_document(entries);
    assert!(matches!(
        fill_field(&mut doc, "field", "x", &GenerateOptions::default()),
        Err(FillError::UnsupportedFieldType(_))
    ));
}

#[test]
fn value_is_committed_alongside_the_appearance() {
    let (mut doc, field_id) = field_document(text_field("/Helv 0 Tf", 0, 0));
    fill_field(&mut doc, "field", "Ada", &GenerateOptions::default()).unwrap();
    let dict = doc.get_object(field_id).unwrap().as_dict().unwrap();
    match dict.get(b"V").unwrap() {
        Object::String(bytes, _) => assert_eq!(bytes, b"Ada"),
        other => panic!("expected string /V, got {other:?}"),
    }
}

#[test]
fn choice_value_updates_selection_index() {
    let options = vec![
        Object::String(b"Apple".to_vec(), StringFormat::Literal),
        Object::String(b"Banana".to_vec(), StringFormat::Literal),
    ];
    let entries = dictionary! {
        "FT" => "Ch",
        "T" => Object::String(b"field".to_vec(), StringFormat::Literal),
        "DA" => Object::String(b"/Helv 0 Tf".to_vec(), StringFormat::Literal),
        "Opt" => Object::Array(options),
        "Rect" => Object::Array(vec![
            Object::Integer(0), Object::Integer(0),
            Object::Integer(100), Object::Integer(40),
        ]),
    };
    let (mut doc, field_id) = field_document(entries);
    fill_field(&mut doc, "field", "Banana", &GenerateOptions::default()).unwrap();

    let dict = doc.get_object(field_id).unwrap().as_dict().unwrap();
    let indices = dict.get(b"I").unwrap().as_array().unwrap();
    assert_eq!(indices.as_slice(), &[Object::Integer(1)]);
}
