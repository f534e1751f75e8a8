//! Numeric templates for the `value/total` part of a rendered line.
//!
//! A [`NumberFormat`] is a small printf-style template applied to a single
//! `f64`. The accepted grammar is the floating-point subset of the classic
//! `printf` verbs:
//!
//! ```text
//! template := (literal | "%%" | verb)+
//! verb     := "%" flags* width? ("." precision?)? ("f" | "F" | "e" | "E")
//! flags    := "-" | "+" | " " | "0" | "#"
//! ```
//!
//! Every verb in a template formats the same number, so `"%1.0f"` renders
//! `3.0` as `3` and `"%0.3f"` renders it as `3.000`.

use std::{fmt, str::FromStr};

use compact_str::CompactString;

/// The template used whenever no (valid) template has been configured.
pub const DEFAULT_FORMAT: &str = "%1.0f";

/// Reasons a template string is rejected by [`NumberFormat::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The template string was empty.
    #[error("format template is empty")]
    Empty,

    /// The template contained only literal text.
    #[error("format template `{0}` contains no numeric verb")]
    NoVerb(CompactString),

    /// A `%` verb other than `f`, `F`, `e` or `E` was used.
    #[error("unsupported verb `%{verb}` in format template `{template}`")]
    UnsupportedVerb {
        /// The rejected template.
        template: CompactString,
        /// The offending verb character.
        verb: char,
    },

    /// The template ended between a `%` and its verb.
    #[error("format template `{0}` ends inside a verb")]
    Truncated(CompactString),
}

/// A parsed printf-style numeric template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberFormat {
    source: CompactString,
    pieces: Vec<Piece>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
    Literal(CompactString),
    Verb(Verb),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Verb {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    sharp: bool,
    width: Option<usize>,
    precision: Option<usize>,
    exponent: Option<char>,
}

impl NumberFormat {
    /// Parses a template such as `"%1.0f"`, `"%0.3f"` or `"%.2e items"`.
    pub fn parse(template: &str) -> Result<Self, FormatError> {
        if template.is_empty() {
            return Err(FormatError::Empty);
        }

        let mut pieces = Vec::new();
        let mut literal = CompactString::default();
        let mut chars = template.chars().peekable();
        let truncated = || FormatError::Truncated(template.into());

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                literal.push('%');
                continue;
            }

            let mut verb = Verb::default();
            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => verb.left = true,
                    '+' => verb.plus = true,
                    ' ' => verb.space = true,
                    '0' => verb.zero = true,
                    '#' => verb.sharp = true,
                    _ => break,
                }
                chars.next();
            }

            verb.width = take_number(&mut chars);
            if chars.peek() == Some(&'.') {
                chars.next();
                verb.precision = Some(take_number(&mut chars).unwrap_or(0));
            }

            match chars.next().ok_or_else(truncated)? {
                'f' | 'F' => {}
                e @ ('e' | 'E') => verb.exponent = Some(e),
                other => {
                    return Err(FormatError::UnsupportedVerb {
                        template: template.into(),
                        verb: other,
                    });
                }
            }

            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Verb(verb));
        }

        if !pieces.iter().any(|p| matches!(p, Piece::Verb(_))) {
            return Err(FormatError::NoVerb(template.into()));
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: template.into(),
            pieces,
        })
    }

    /// The template string this format was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Formats `value` according to the template.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        let mut out = String::new();
        self.format_into(&mut out, value);
        out
    }

    /// Appends the formatted `value` to `out`.
    pub fn format_into(&self, out: &mut String, value: f64) {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Verb(verb) => verb.write(out, value),
            }
        }
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            source: DEFAULT_FORMAT.into(),
            pieces: vec![Piece::Verb(Verb {
                width: Some(1),
                precision: Some(0),
                ..Verb::default()
            })],
        }
    }
}

impl FromStr for NumberFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        number = Some(number.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize));
    }
    number
}

impl Verb {
    fn write(&self, out: &mut String, value: f64) {
        let sign = if value.is_sign_negative() && !value.is_nan() {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        };

        let precision = self.precision.unwrap_or(6);
        let magnitude = value.abs();
        let body = if value.is_nan() {
            String::from("NaN")
        } else if value.is_infinite() {
            String::from("Inf")
        } else if let Some(e) = self.exponent {
            exponent_body(magnitude, precision, e)
        } else {
            let mut body = format!("{magnitude:.precision$}");
            if self.sharp && precision == 0 {
                body.push('.');
            }
            body
        };

        let len = sign.len() + body.chars().count();
        let pad = self.width.unwrap_or(0).saturating_sub(len);
        if self.left {
            out.push_str(sign);
            out.push_str(&body);
            out.extend(std::iter::repeat_n(' ', pad));
        } else if self.zero && value.is_finite() {
            out.push_str(sign);
            out.extend(std::iter::repeat_n('0', pad));
            out.push_str(&body);
        } else {
            out.extend(std::iter::repeat_n(' ', pad));
            out.push_str(sign);
            out.push_str(&body);
        }
    }
}

/// Rust prints `1.5e2`; the template convention is `1.5e+02`.
fn exponent_body(magnitude: f64, precision: usize, e: char) -> String {
    let raw = format!("{magnitude:.precision$e}");
    let Some((mantissa, exp)) = raw.split_once('e') else {
        return raw;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let exp_sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{e}{exp_sign}{:02}", exp.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{FormatError, NumberFormat};

    /// Default Template
    /// The default renders whole numbers with no decimals.
    #[test]
    fn test_default_format() {
        let f = NumberFormat::default();
        assert_eq!(f.as_str(), "%1.0f");
        assert_eq!(f.format(3.0), "3");
        assert_eq!(f.format(101.0), "101");
        assert_eq!(f, NumberFormat::parse("%1.0f").unwrap());
    }

    #[rstest]
    #[case("%0.3f", 101.0, "101.000")]
    #[case("%1.0f", 2.6, "3")]
    #[case("%.2f", 1.005, "1.00")]
    #[case("%6.1f", 3.26, "   3.3")]
    #[case("%-6.1fx", 3.5, "3.5   x")]
    #[case("%06.1f", -3.5, "-003.5")]
    #[case("%+.1f", 3.5, "+3.5")]
    #[case("% .0f", 7.0, " 7")]
    #[case("%#.0f", 7.0, "7.")]
    #[case("%f", 1.5, "1.500000")]
    #[case("%.2e", 1234.5, "1.23e+03")]
    #[case("%.1E", 0.00012, "1.2E-04")]
    #[case("%.0f items (100%%)", 4.0, "4 items (100%)")]
    #[case("%.0f|%.1f", 2.0, "2|2.0")]
    fn test_templates(#[case] template: &str, #[case] value: f64, #[case] expected: &str) {
        let f = NumberFormat::parse(template).unwrap();
        assert_eq!(f.format(value), expected);
    }

    /// Non-finite Values
    #[test]
    fn test_non_finite() {
        let f = NumberFormat::parse("%.1f").unwrap();
        assert_eq!(f.format(f64::NAN), "NaN");
        assert_eq!(f.format(f64::INFINITY), "Inf");
        assert_eq!(f.format(f64::NEG_INFINITY), "-Inf");
    }

    /// Rejected Templates
    #[test]
    fn test_parse_errors() {
        assert_eq!(NumberFormat::parse(""), Err(FormatError::Empty));
        assert_eq!(
            NumberFormat::parse("no verbs"),
            Err(FormatError::NoVerb("no verbs".into()))
        );
        assert_eq!(
            NumberFormat::parse("%d"),
            Err(FormatError::UnsupportedVerb {
                template: "%d".into(),
                verb: 'd'
            })
        );
        assert_eq!(
            NumberFormat::parse("%0.3"),
            Err(FormatError::Truncated("%0.3".into()))
        );
        assert!(
            NumberFormat::parse("100%%")
                .unwrap_err()
                .to_string()
                .contains("no numeric verb")
        );
    }

    #[test]
    fn test_display_round_trips_source() {
        let f: NumberFormat = "%0.3f".parse().unwrap();
        assert_eq!(f.to_string(), "%0.3f");
    }
}
