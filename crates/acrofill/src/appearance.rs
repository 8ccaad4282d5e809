//! Appearance stream synthesis.
//!
//! Orchestrates the whole regeneration pass for one field: tokenize the
//! existing stream, locate its structure, resolve the font, lay the value
//! out, and re-emit bytes. Streams without a marked-content region keep
//! their drawing commands as a preserved prefix and gain a fresh
//! `/Tx BMC ... EMC` block; streams with markers are spliced: everything
//! up to and including `BMC` and everything from `EMC` on is kept
//! byte-compatible, with the generated block in between. Splicing builds
//! a new token sequence from slices; the original is never mutated in
//! place.

use crate::acroform::{self, AcroForm};
use crate::default_appearance::DaSpec;
use crate::error::GenError;
use crate::font_metrics::Font;
use crate::layout;
use crate::regions::{self, Landmarks};
use crate::resources::{self, ResourceSet};
use crate::tokenizer::{Number, Operator, Token, tokenize};
use crate::writer::{encode_text, format_number, to_hex, write_tokens};
use acrofill_core::{
    FF_COMB, FF_COMBO, FF_DO_NOT_SCROLL, FF_MULTILINE, FieldReport, FieldType, FieldValue,
    FieldWarning, FillError, GenerateOptions, Quadding, Rect, WarningCode, WidgetFailure,
};
use lopdf::{Document, ObjectId};

/// Regenerates the normal appearance of a field's widgets for a new value.
pub struct AppearanceGenerator<'a> {
    doc: &'a mut Document,
    form: AcroForm,
    options: GenerateOptions,
}

impl<'a> AppearanceGenerator<'a> {
    pub fn new(doc: &'a mut Document, form: AcroForm, options: GenerateOptions) -> Self {
        Self { doc, form, options }
    }

    /// Regenerate the appearance of every widget the field fans out to.
    ///
    /// A failure on one widget is recorded in the report and does not
    /// abort its siblings; the call fails only when no widget could be
    /// generated at all (or when strict mode escalates a warning).
    pub fn generate(
        &mut self,
        field_id: ObjectId,
        field_name: &str,
        value: &FieldValue,
    ) -> Result<FieldReport, FillError> {
        let mut report = FieldReport {
            field_name: field_name.to_string(),
            ..FieldReport::default()
        };

        let widgets = acroform::widget_ids(self.doc, field_id);
        let defers_to_viewer = acroform::has_format_action(self.doc, field_id);

        for (index, widget_id) in widgets.into_iter().enumerate() {
            // A bound format action means the viewer renders the value
            // itself; only regenerate where an appearance already exists.
            if defers_to_viewer && !acroform::has_appearance(self.doc, widget_id) {
                report.widgets_skipped += 1;
                continue;
            }

            match self.generate_widget(field_id, widget_id, value, &mut report.warnings) {
                Ok(()) => report.widgets_updated += 1,
                Err(err) => report.failures.push(WidgetFailure {
                    widget_index: index,
                    error: err.into(),
                }),
            }
        }

        for warning in &mut report.warnings {
            if warning.field_name.is_none() {
                warning.field_name = Some(field_name.to_string());
            }
        }

        if self.options.strict_mode {
            if let Some(warning) = report.warnings.first() {
                return Err(warning.to_error());
            }
        }
        if report.widgets_updated == 0 {
            if let Some(failure) = report.failures.first() {
                return Err(failure.error.clone());
            }
        }
        Ok(report)
    }

    fn generate_widget(
        &mut self,
        field_id: ObjectId,
        widget_id: ObjectId,
        value: &FieldValue,
        warnings: &mut Vec<FieldWarning>,
    ) -> Result<(), GenError> {
        let stream_id = acroform::ensure_normal_appearance(self.doc, widget_id)?;
        let bbox = match acroform::stream_bbox(self.doc, stream_id) {
            Some(bbox) => bbox,
            None => acroform::widget_rect(self.doc, widget_id)?.retranslated(),
        };
        let content = acroform::read_stream_content(self.doc, stream_id)?;
        let tokens = tokenize(&content)?;

        let da = self.resolve_default_appearance(field_id, warnings);

        if !acroform::has_stream_resources(self.doc, stream_id)
            && !self.form.has_default_resources(self.doc)
        {
            return Err(GenError::Core(FillError::MissingResources));
        }
        let mut local = acroform::stream_font_resources(self.doc, stream_id).unwrap_or_default();
        let shared = self
            .form
            .default_resources(self.doc)
            .unwrap_or_else(ResourceSet::new);

        let declared_name = da.as_ref().map(|d| d.font_name.clone()).unwrap_or_default();
        let resolved = resources::resolve_font(
            self.doc,
            &mut local,
            &shared,
            &declared_name,
            self.options.link_leftover_resources,
        )?;
        let (font, font_warning) = resolved.into_parts();
        if let Some(warning) = font_warning {
            note(warnings, warning);
        }
        acroform::write_stream_font_resources(self.doc, stream_id, &local)?;

        let quadding = {
            let raw = acroform::quadding_value(self.doc, field_id);
            let (quadding, warning) = Quadding::resolve(raw).into_parts();
            if let Some(warning) = warning {
                note(warnings, warning);
            }
            quadding
        };

        let flags = acroform::field_flags(self.doc, field_id);
        let is_listbox = acroform::field_type(self.doc, field_id) == Some(FieldType::Choice)
            && flags & FF_COMBO == 0;

        let bytes = if is_listbox {
            self.build_listbox_stream(field_id, bbox, &tokens, da, &font, quadding, value)?
        } else {
            self.build_text_stream(
                field_id, bbox, &tokens, da, &font, flags, quadding, value, warnings,
            )?
        };

        // The full byte stream is built before anything is committed; a
        // failure above leaves the previous appearance intact.
        acroform::write_unfiltered_content(self.doc, stream_id, bytes)?;
        Ok(())
    }

    /// Chase the default appearance through field → first kid → form,
    /// recovering from malformed levels with a diagnostic.
    fn resolve_default_appearance(
        &self,
        field_id: ObjectId,
        warnings: &mut Vec<FieldWarning>,
    ) -> Option<DaSpec> {
        for bytes in acroform::default_appearance_chain(self.doc, field_id, &self.form) {
            match DaSpec::parse(&bytes) {
                Ok(da) => return Some(da),
                Err(err) => note(
                    warnings,
                    FieldWarning::with_code(
                        WarningCode::MalformedDefaultAppearance,
                        format!("default appearance rejected, trying next level: {err}"),
                    ),
                ),
            }
        }
        None
    }

    #[allow(clippy::too_many_arguments)]
    fn build_text_stream(
        &self,
        field_id: ObjectId,
        bbox: Rect,
        tokens: &[Token],
        mut da: Option<DaSpec>,
        font: &Font,
        flags: u32,
        quadding: Quadding,
        value: &FieldValue,
        warnings: &mut Vec<FieldWarning>,
    ) -> Result<Vec<u8>, GenError> {
        let line_width = regions::line_width(tokens);
        let multiline = flags & FF_MULTILINE != 0;
        let do_not_scroll = flags & FF_DO_NOT_SCROLL != 0;
        let max_len = acroform::max_len(self.doc, field_id);
        let comb = flags & FF_COMB != 0 && max_len.is_some();

        let declared_size = da.as_ref().map(|d| d.font_size).unwrap_or(0.0);
        let font_size = layout::calculate_font_size(
            font,
            value.text(),
            bbox,
            line_width,
            declared_size,
            do_not_scroll,
        );
        if let Some(da) = da.as_mut() {
            da.set_font_size(font_size);
        }

        let border_edge = match regions::smallest_drawn_rect(bbox, tokens) {
            Ok(rect) => rect,
            Err(err) => {
                note(
                    warnings,
                    FieldWarning::with_code(
                        WarningCode::MalformedRectangle,
                        format!("drawn border ignored: {err}"),
                    ),
                );
                bbox
            }
        };

        let mut generated = Vec::new();
        let padding_edge = bbox.apply_padding(layout::DEFAULT_PADDING);
        if comb {
            push_line(&mut generated, "q");
            push_re(&mut generated, padding_edge);
            push_line(&mut generated, "W");
            push_line(&mut generated, "n");
        }
        push_line(&mut generated, "BT");
        if let Some(da) = &da {
            generated.extend(write_tokens(da.tokens()));
        }

        if comb {
            let cells = layout::comb_cells(
                font,
                font_size,
                value.text(),
                max_len.unwrap_or(0),
                bbox,
                padding_edge,
            );
            for cell in cells {
                push_line(
                    &mut generated,
                    &format!("{} {} Td", format_number(cell.x), format_number(cell.y)),
                );
                push_show_text(&mut generated, &cell.ch.to_string());
            }
        } else {
            let text_width = font.string_width(value.text()) / 1000.0 * font_size;
            let vertical = layout::vertical_offset(font, font_size, bbox, line_width, multiline)?;
            let vertical =
                layout::cap_shifted_vertical_offset(vertical, bbox, border_edge, font, font_size);
            let horizontal = layout::horizontal_offset(quadding, bbox, border_edge, text_width);
            push_line(
                &mut generated,
                &format!("{} {} Td", format_number(horizontal), format_number(vertical)),
            );

            if multiline && value.has_line_breaks() {
                let lines: Vec<&str> = value.lines().collect();
                let last = lines.len() - 1;
                for (i, line) in lines.into_iter().enumerate() {
                    let hex = to_hex(&encode_text(line));
                    if i == last {
                        push_line(&mut generated, &format!("<{hex}> Tj"));
                    } else {
                        push_line(
                            &mut generated,
                            &format!("<{hex}> Tj 0 -{} Td", format_number(layout::MULTILINE_LEADING)),
                        );
                    }
                }
            } else {
                push_show_text(&mut generated, value.text());
            }
        }
        push_line(&mut generated, "ET");

        Ok(assemble(tokens, da.as_ref(), &generated, font_size))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_listbox_stream(
        &self,
        field_id: ObjectId,
        bbox: Rect,
        tokens: &[Token],
        mut da: Option<DaSpec>,
        font: &Font,
        quadding: Quadding,
        value: &FieldValue,
    ) -> Result<Vec<u8>, GenError> {
        let line_width = regions::line_width(tokens);

        // Box model: padding edge inside the bounding box, content area
        // inside the padding edge. An inner clip in the existing stream
        // overrides the default padding edge.
        let mut padding_edge = bbox.apply_padding(layout::DEFAULT_PADDING);
        let mut content_area = padding_edge.apply_padding(layout::DEFAULT_PADDING);
        let landmarks = Landmarks::scan(tokens);
        if let (Some(bmc), Some(_)) = (landmarks.bmc, landmarks.bt) {
            if let Some(clip) = regions::clip_rect_after(tokens, bmc) {
                padding_edge = clip;
                content_area = padding_edge.apply_padding(padding_edge.llx - bbox.llx);
            }
        }

        let options = acroform::choice_options(self.doc, field_id);
        let selected = acroform::selected_indices(self.doc, field_id);
        let top = acroform::top_index(self.doc, field_id);

        let declared_size = da.as_ref().map(|d| d.font_size).unwrap_or(0.0);
        let font_size =
            layout::listbox_font_size(font, &options, content_area, line_width, declared_size);
        if let Some(da) = da.as_mut() {
            da.set_font_size(font_size);
        }
        let row_height = layout::row_height(font, font_size);

        let mut generated = Vec::new();
        push_line(&mut generated, "q");
        push_re(&mut generated, padding_edge);
        push_line(&mut generated, "W");
        push_line(&mut generated, "n");

        if let Some(&selected_index) = selected.first() {
            push_line(&mut generated, layout::HIGHLIGHT_COLOR);
            push_re(
                &mut generated,
                layout::highlight_rect(padding_edge, row_height, selected_index, top),
            );
            push_line(&mut generated, "f");
        }
        push_line(&mut generated, "0 g");
        push_line(&mut generated, "0 G");
        push_line(&mut generated, "1 w");

        push_line(&mut generated, "BT");
        if let Some(da) = &da {
            generated.extend(write_tokens(da.tokens()));
        }

        let text_width = font.string_width(value.text()) / 1000.0 * font_size;
        if let Some(adjust) = layout::listbox_horizontal_offset(quadding, bbox, text_width) {
            push_line(&mut generated, &format!("{} 0 Td", format_number(adjust)));
        }

        // Visible scroll window: options from the top index on, each in
        // its own text object except the first.
        let mut y = content_area.ury;
        for (i, option) in options.iter().enumerate().skip(top) {
            if i == top {
                y -= font.metrics.ascent() / 1000.0 * font_size;
            } else {
                y -= row_height;
                push_line(&mut generated, "BT");
            }
            push_line(
                &mut generated,
                &format!("{} {} Td", format_number(content_area.llx), format_number(y)),
            );
            push_show_text(&mut generated, option);
            if i + 1 != options.len() {
                push_line(&mut generated, "ET");
            }
        }
        push_line(&mut generated, "ET");
        push_line(&mut generated, "Q");

        Ok(assemble(tokens, da.as_ref(), &generated, font_size))
    }
}

/// Assemble the final byte stream around the generated block.
///
/// No markers: the existing tokens are preserved drawing, re-emitted in
/// front of a fresh `/Tx BMC … EMC` wrapper. Markers present: the default
/// appearance tokens are inserted only when the interior is empty, the
/// number before the first `Tf` is rewritten to the computed size, and
/// the output is the concatenation of the slice up to `BMC`, the
/// generated block, and the slice from `EMC` on.
fn assemble(tokens: &[Token], da: Option<&DaSpec>, generated: &[u8], font_size: f64) -> Vec<u8> {
    let landmarks = Landmarks::scan(tokens);

    if !landmarks.has_marked_content() {
        let mut out = write_tokens(tokens);
        out.extend_from_slice(b"/Tx BMC\n");
        out.extend_from_slice(generated);
        out.extend_from_slice(b"EMC");
        return out;
    }

    let mut work: Vec<Token> = tokens.to_vec();
    if landmarks.markers_adjacent() {
        if let (Some(da), Some(emc)) = (da, landmarks.emc) {
            let mut spliced = Vec::with_capacity(work.len() + da.tokens().len());
            spliced.extend_from_slice(&work[..emc]);
            spliced.extend_from_slice(da.tokens());
            spliced.extend_from_slice(&work[emc..]);
            work = spliced;
        }
    }

    if let Some(tf) = regions::index_of(&work, &Operator::SetFont) {
        if tf >= 1 && matches!(work[tf - 1], Token::Number(_)) {
            work[tf - 1] = Token::Number(Number::new(font_size));
        }
    }

    let landmarks = Landmarks::scan(&work);
    let mut out = Vec::new();
    match landmarks.bmc {
        Some(bmc) => out.extend(write_tokens(&work[..=bmc])),
        None => out.extend(write_tokens(&work)),
    }
    out.push(b'\n');
    out.extend_from_slice(generated);
    if let Some(emc) = landmarks.emc {
        out.extend(write_tokens(&work[emc..]));
    }
    out
}

/// Record a recovered diagnostic (and log it when tracing is enabled).
fn note(warnings: &mut Vec<FieldWarning>, warning: FieldWarning) {
    #[cfg(feature = "tracing")]
    tracing::warn!(code = warning.code.as_str(), "{warning}");
    warnings.push(warning);
}

fn push_line(out: &mut Vec<u8>, line: &str) {
    out.extend_from_slice(line.as_bytes());
    out.push(b'\n');
}

fn push_re(out: &mut Vec<u8>, rect: Rect) {
    push_line(
        out,
        &format!(
            "{} {} {} {} re",
            format_number(rect.llx),
            format_number(rect.lly),
            format_number(rect.width()),
            format_number(rect.height())
        ),
    );
}

/// Values are shown as hex strings so non-Latin-1 data survives.
fn push_show_text(out: &mut Vec<u8>, text: &str) {
    push_line(out, &format!("<{}> Tj", to_hex(&encode_text(text))));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_fresh_wraps_in_marked_content() {
        let out = assemble(&[], None, b"BT\nET\n", 10.0);
        assert_eq!(out, b"/Tx BMC\nBT\nET\nEMC");
    }

    #[test]
    fn assemble_fresh_preserves_existing_drawing() {
        let tokens = tokenize(b"0 0 100 20 re f").unwrap();
        let out = assemble(&tokens, None, b"BT\nET\n", 10.0);
        assert_eq!(out, b"0 0 100 20 re\nf\n/Tx BMC\nBT\nET\nEMC");
    }

    #[test]
    fn assemble_splice_keeps_outside_tokens() {
        let tokens = tokenize(b"1 w\n/Tx BMC\nBT ET\nEMC\nq Q\n").unwrap();
        let out = assemble(&tokens, None, b"BT\nnew\nET\n", 10.0);
        let text = String::from_utf8_lossy(&out);
        // Prefix up to BMC and suffix from EMC survive; the old interior
        // is replaced by the generated block
        assert!(text.starts_with("1 w\n/Tx BMC\n"));
        assert!(text.contains("BT\nnew\nET\n"));
        assert!(text.ends_with("EMC\nq\nQ\n"));
        assert!(!text.contains("BT ET"));
    }

    #[test]
    fn assemble_adjacent_markers_shadowed_by_generated_block() {
        // With an empty interior the DA tokens are inserted between the
        // markers for the Tf-rewrite bookkeeping, but the emitted output
        // is prefix + generated + suffix; the insertion itself is
        // shadowed by the generated block (which carries its own Tf).
        let tokens = tokenize(b"/Tx BMC EMC").unwrap();
        let da = DaSpec::parse(b"/Helv 0 Tf").unwrap();
        let out = assemble(&tokens, Some(&da), b"BT\n/Helv 9 Tf\nET\n", 9.0);
        assert_eq!(out, b"/Tx BMC\n\nBT\n/Helv 9 Tf\nET\nEMC\n");
    }

    #[test]
    fn assemble_rewrites_tf_size_in_prefix() {
        let tokens = tokenize(b"/Helv 4 Tf\n/Tx BMC\nBT ET\nEMC").unwrap();
        let out = assemble(&tokens, None, b"gen\n", 11.5);
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("/Helv 11.5 Tf"));
        assert!(!text.contains("/Helv 4 Tf"));
    }
}
