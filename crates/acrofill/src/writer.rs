//! Content stream serialization.
//!
//! Re-emits a (sub-)sequence of tokens as bytes. Tokens parsed from an
//! existing stream carry their source lexeme and are written back
//! byte-for-byte; tokens generated by the engine are formatted
//! canonically (ASCII numerals, trailing zeros trimmed, operators as bare
//! keywords). Operands are space-separated and every operator ends its
//! line, matching the layout existing PDF consumers expect.

use crate::tokenizer::{Token, is_delimiter, is_whitespace};

/// Serialize a token slice to bytes.
pub fn write_tokens(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    for token in tokens {
        write_token(token, &mut out);
        match token {
            Token::Operator(_) => out.push(b'\n'),
            _ => out.push(b' '),
        }
    }
    out
}

/// Serialize a single token, without any trailing separator.
pub fn write_token(token: &Token, out: &mut Vec<u8>) {
    match token {
        Token::Number(n) => match n.lexeme() {
            Some(lexeme) => out.extend_from_slice(lexeme.as_bytes()),
            None => out.extend_from_slice(format_number(n.value).as_bytes()),
        },
        Token::Name(name) => write_name(name, out),
        Token::String(s) => match s.lexeme() {
            Some(lexeme) => out.extend_from_slice(lexeme),
            None if s.hex => {
                out.push(b'<');
                out.extend_from_slice(to_hex(&s.bytes).as_bytes());
                out.push(b'>');
            }
            None => {
                out.push(b'(');
                for &b in &s.bytes {
                    if matches!(b, b'(' | b')' | b'\\') {
                        out.push(b'\\');
                    }
                    out.push(b);
                }
                out.push(b')');
            }
        },
        Token::Operator(op) => out.extend_from_slice(op.keyword().as_bytes()),
    }
}

/// Write a name with `#XX` escapes for delimiters, whitespace and `#`.
fn write_name(name: &str, out: &mut Vec<u8>) {
    out.push(b'/');
    for &b in name.as_bytes() {
        if b == b'#' || is_whitespace(b) || is_delimiter(b) || !(0x21..=0x7E).contains(&b) {
            out.push(b'#');
            out.extend_from_slice(format!("{b:02X}").as_bytes());
        } else {
            out.push(b);
        }
    }
}

/// Format a number the way the engine emits it: integers without a
/// decimal point, reals with up to six fractional digits, trailing zeros
/// trimmed, never scientific notation.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e12 {
        return format!("{}", value as i64);
    }
    let mut s = format!("{value:.6}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// Uppercase hex encoding, two digits per byte.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02X}"));
    }
    s
}

/// Encode a text value as PDF string bytes.
///
/// Values that fit in Latin-1 are encoded directly; anything else becomes
/// UTF-16BE with a byte-order mark, the standard PDF text-string form.
pub fn encode_text(text: &str) -> Vec<u8> {
    if text.chars().all(|c| (c as u32) <= 0xFF) {
        return text.chars().map(|c| c as u8).collect();
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}
