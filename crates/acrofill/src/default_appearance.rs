//! Default appearance (`/DA`) string parsing.
//!
//! A default appearance string is a short content-stream fragment that
//! names the font resource and size for a field's generated text, e.g.
//! `/Helv 12 Tf 0 g`. A size of 0 means "auto": the layout engine picks a
//! size that fits the box.

use crate::error::GenError;
use crate::tokenizer::{Number, Operator, Token, tokenize};
use acrofill_core::FillError;

/// A parsed default appearance string.
#[derive(Debug, Clone, PartialEq)]
pub struct DaSpec {
    /// The font resource name from the `Tf` operands.
    pub font_name: String,
    /// The declared font size; 0 means auto-size.
    pub font_size: f64,
    tokens: Vec<Token>,
}

impl DaSpec {
    /// Parse a default appearance string.
    ///
    /// # Errors
    ///
    /// Returns [`FillError::MalformedDefaultAppearance`] when the fragment
    /// does not tokenize, carries no `Tf`, or the `Tf` is missing its name
    /// and size operands.
    pub fn parse(bytes: &[u8]) -> Result<DaSpec, GenError> {
        let tokens = tokenize(bytes).map_err(|e| {
            GenError::Core(FillError::MalformedDefaultAppearance(e.to_string()))
        })?;

        let tf = tokens
            .iter()
            .position(|t| t.is_operator(&Operator::SetFont))
            .ok_or_else(|| {
                GenError::Core(FillError::MalformedDefaultAppearance(
                    "no Tf operator".to_string(),
                ))
            })?;
        if tf < 2 {
            return Err(GenError::Core(FillError::MalformedDefaultAppearance(
                "Tf is missing its operands".to_string(),
            )));
        }

        let font_name = match &tokens[tf - 2] {
            Token::Name(name) => name.clone(),
            other => {
                return Err(GenError::Core(FillError::MalformedDefaultAppearance(
                    format!("expected font name before Tf, got {other:?}"),
                )));
            }
        };
        let font_size = match &tokens[tf - 1] {
            Token::Number(n) => n.value,
            other => {
                return Err(GenError::Core(FillError::MalformedDefaultAppearance(
                    format!("expected font size before Tf, got {other:?}"),
                )));
            }
        };

        Ok(DaSpec {
            font_name,
            font_size,
            tokens,
        })
    }

    /// The full token sequence, including any color operators the string
    /// carried alongside the `Tf`.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Rewrite the size operand of the `Tf` to a newly computed value.
    ///
    /// Once a concrete positive size is computed it is the final size;
    /// every emitted `Tf` must carry it.
    pub fn set_font_size(&mut self, size: f64) {
        if let Some(tf) = self
            .tokens
            .iter()
            .position(|t| t.is_operator(&Operator::SetFont))
        {
            self.tokens[tf - 1] = Token::Number(Number::new(size));
        }
        self.font_size = size;
    }

    /// Returns `true` when the declared size means auto-sizing.
    pub fn is_auto_sized(&self) -> bool {
        self.font_size == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::write_tokens;

    #[test]
    fn parse_plain_da() {
        let da = DaSpec::parse(b"/Helv 12 Tf").unwrap();
        assert_eq!(da.font_name, "Helv");
        assert_eq!(da.font_size, 12.0);
        assert!(!da.is_auto_sized());
    }

    #[test]
    fn parse_auto_sized_da() {
        let da = DaSpec::parse(b"/Helv 0 Tf").unwrap();
        assert_eq!(da.font_size, 0.0);
        assert!(da.is_auto_sized());
    }

    #[test]
    fn parse_da_with_color_operators() {
        let da = DaSpec::parse(b"0 g /TiRo 9.5 Tf").unwrap();
        assert_eq!(da.font_name, "TiRo");
        assert_eq!(da.font_size, 9.5);
        // The color operators ride along for re-emission
        assert_eq!(da.tokens().len(), 5);
    }

    #[test]
    fn parse_da_without_tf_fails() {
        let err = DaSpec::parse(b"0 g 1 w");
        assert!(matches!(
            err,
            Err(GenError::Core(FillError::MalformedDefaultAppearance(_)))
        ));
    }

    #[test]
    fn parse_da_with_missing_operands_fails() {
        assert!(DaSpec::parse(b"Tf").is_err());
        assert!(DaSpec::parse(b"12 Tf").is_err());
        assert!(DaSpec::parse(b"/Helv (x) Tf").is_err());
    }

    #[test]
    fn parse_garbage_fails() {
        assert!(DaSpec::parse(b"(unclosed").is_err());
    }

    #[test]
    fn set_font_size_rewrites_tf_operand() {
        let mut da = DaSpec::parse(b"/Helv 0 Tf").unwrap();
        da.set_font_size(13.5);
        assert_eq!(da.font_size, 13.5);
        assert_eq!(write_tokens(da.tokens()), b"/Helv 13.5 Tf\n");
    }

    #[test]
    fn set_font_size_keeps_surrounding_tokens() {
        let mut da = DaSpec::parse(b"0 g /Helv 0 Tf").unwrap();
        da.set_font_size(8.0);
        assert_eq!(write_tokens(da.tokens()), b"0 g\n/Helv 8 Tf\n");
    }
}
