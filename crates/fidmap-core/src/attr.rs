//! Reader and writer for the line-oriented `<Element NAME="VALUE" .../>` text format.
//!
//! This is deliberately not an XML parser: every attribute is matched literally as
//! ` NAME="VALUE"` where `VALUE` is an optionally signed decimal number, in exactly the
//! order the writer emits them.

use std::fmt::Write as _;

use crate::{Error, Result};

pub(crate) const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub(crate) struct AttributeReader<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> AttributeReader<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> Error {
        let consumed = &self.text[..self.pos];
        let line = consumed.matches('\n').count() + 1;
        let column = match consumed.rfind('\n') {
            Some(nl) => consumed[nl + 1..].chars().count() + 1,
            None => consumed.chars().count() + 1,
        };
        Error::Malformed {
            line,
            column,
            message: message.into(),
        }
    }

    /// Consumes `literal` exactly.
    pub(crate) fn expect(&mut self, literal: &str) -> Result<()> {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.error(format!("expected `{literal}`")))
        }
    }

    pub(crate) fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Matches `WHITESPACE<NAME`.
    pub(crate) fn element(&mut self, name: &str) -> Result<()> {
        self.skip_whitespace();
        self.expect("<")?;
        self.expect(name)
    }

    /// Matches `WHITESPACE/>`.
    pub(crate) fn empty_element_end(&mut self) -> Result<()> {
        self.skip_whitespace();
        self.expect("/>")
    }

    /// Matches `WHITESPACE>`.
    pub(crate) fn element_end(&mut self) -> Result<()> {
        self.skip_whitespace();
        self.expect(">")
    }

    /// Matches `WHITESPACE</NAME>`.
    pub(crate) fn closing_element(&mut self, name: &str) -> Result<()> {
        self.skip_whitespace();
        self.expect("</")?;
        self.expect(name)?;
        self.expect(">")
    }

    /// Only trailing whitespace may remain.
    pub(crate) fn finish(&mut self) -> Result<()> {
        self.skip_whitespace();
        if self.rest().is_empty() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing text"))
        }
    }

    fn raw_value(&mut self, name: &str) -> Result<&'a str> {
        self.expect(" ")?;
        self.expect(name)?;
        self.expect("=\"")?;
        let rest = self.rest();
        let Some(end) = rest.find('"') else {
            return Err(self.error(format!("unterminated value for `{name}`")));
        };
        let value = &rest[..end];
        let unsigned = value.strip_prefix('-').unwrap_or(value);
        let digits = unsigned.chars().filter(char::is_ascii_digit).count();
        let points = unsigned.chars().filter(|&c| c == '.').count();
        if digits == 0 || points > 1 || digits + points != unsigned.len() {
            return Err(self.error(format!("`{name}` value `{value}` is not a decimal number")));
        }
        self.pos += end + 1;
        Ok(value)
    }

    pub(crate) fn number(&mut self, name: &str) -> Result<f64> {
        let value = self.raw_value(name)?;
        value
            .parse::<f64>()
            .map_err(|err| self.error(format!("`{name}`: {err}")))
    }

    pub(crate) fn integer(&mut self, name: &str) -> Result<i64> {
        let value = self.raw_value(name)?;
        value
            .parse::<i64>()
            .map_err(|err| self.error(format!("`{name}`: {err}")))
    }

    pub(crate) fn unsigned(&mut self, name: &str) -> Result<u32> {
        let value = self.integer(name)?;
        u32::try_from(value).map_err(|_| self.error(format!("`{name}` is out of range: {value}")))
    }

    pub(crate) fn flag(&mut self, name: &str) -> Result<bool> {
        match self.integer(name)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.error(format!("`{name}` must be 0 or 1, got {other}"))),
        }
    }
}

/// Refuses NaN and infinities, naming the offending field.
pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::NonFinite {
            what: name.to_string(),
        })
    }
}

/// Appends ` NAME="VALUE"` using the shortest round-trip decimal form of `value`.
pub(crate) fn write_number(out: &mut String, name: &str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    let _ = write!(out, r#" {name}="{value}""#);
    Ok(())
}

pub(crate) fn write_integer(out: &mut String, name: &str, value: impl std::fmt::Display) {
    let _ = write!(out, r#" {name}="{value}""#);
}

pub(crate) fn write_flag(out: &mut String, name: &str, value: bool) {
    write_integer(out, name, u8::from(value));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_signed_and_fractional_numbers() {
        let mut r = AttributeReader::new(r#" A="-12.5" B="3" C="0.125""#);
        assert_eq!(r.number("A").unwrap(), -12.5);
        assert_eq!(r.number("B").unwrap(), 3.0);
        assert_eq!(r.number("C").unwrap(), 0.125);
        r.finish().unwrap();
    }

    #[test]
    fn rejects_a_misspelled_attribute_name() {
        let mut r = AttributeReader::new(r#" Twst="1""#);
        let err = r.number("Twist").unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 1, column: 2, .. }), "{err}");
    }

    #[test]
    fn rejects_exponents_and_garbage() {
        for text in [r#" A="1e5""#, r#" A="""#, r#" A="1.2.3""#, r#" A="--1""#, r#" A="abc""#] {
            let mut r = AttributeReader::new(text);
            assert!(r.number("A").is_err(), "{text} should not parse");
        }
    }

    #[test]
    fn reports_line_and_column_of_the_failure() {
        let mut r = AttributeReader::new("<Map\n <Tag Id=\"x\"/>");
        r.element("Map").unwrap();
        r.element("Tag").unwrap();
        match r.integer("Id").unwrap_err() {
            Error::Malformed { line, column, .. } => assert_eq!((line, column), (2, 11)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn written_numbers_read_back_bit_for_bit() {
        let values = [0.1 + 0.2, -1.0 / 3.0, 1e-20, 123456789.125, -0.0, std::f64::consts::PI];
        let mut out = String::new();
        for (i, v) in values.iter().enumerate() {
            write_number(&mut out, &format!("V{i}"), *v).unwrap();
        }
        let mut r = AttributeReader::new(&out);
        for (i, v) in values.iter().enumerate() {
            let back = r.number(&format!("V{i}")).unwrap();
            assert_eq!(back.to_bits(), v.to_bits());
        }
    }

    #[test]
    fn refuses_to_write_non_finite_values() {
        let mut out = String::new();
        assert!(matches!(
            write_number(&mut out, "X", f64::NAN),
            Err(Error::NonFinite { .. })
        ));
    }
}
