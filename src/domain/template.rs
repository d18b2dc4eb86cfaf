//! Message templates
//!
//! A template is free text with exactly one printf-style placeholder for
//! the metric value, e.g. `"CPU load high: %.1f%%"`.

use crate::error::TemplateError;
use std::iter::Peekable;
use std::str::Chars;

const DEFAULT_PRECISION: usize = 6;

/// Upper bound for width and precision
const MAX_WIDTH: usize = 1_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    /// `+`: always print a sign
    plus: bool,
    /// `-`: pad on the right
    minus: bool,
    /// ` `: leave a space where a plus sign would go
    space: bool,
    /// `0`: pad with leading zeros after the sign
    zero: bool,
    /// `#`: always print a decimal point
    sharp: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    /// `%f`, `%F`
    Fixed { precision: usize },
    /// `%e`, `%E`
    Exponent { precision: usize, upper: bool },
    /// `%g`, `%G`, `%v`
    Shortest { upper: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placeholder {
    flags: Flags,
    width: usize,
    verb: Verb,
}

/// A message template with exactly one numeric placeholder
///
/// A placeholder is `%[flags][width][.precision]verb`:
///
/// - flags: `+` `-` ` ` `0` `#`
/// - verbs: `f` `F` `e` `E` take a precision (default 6); `g` `G` `v` print
///   the shortest representation and take neither a precision nor `#`
///
/// `%%` is a literal percent sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    prefix: String,
    placeholder: Placeholder,
    suffix: String,
}

impl Template {
    /// Parse a template, rejecting placeholder count mismatches
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut placeholder = None;
        let mut count = 0;

        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            let text = if placeholder.is_some() {
                &mut suffix
            } else {
                &mut prefix
            };

            if c != '%' {
                text.push(c);
                continue;
            }

            let flags = parse_flags(&mut chars);
            let width = parse_number(&mut chars)?;
            let precision = if chars.next_if_eq(&'.').is_some() {
                // "%.f" means precision zero
                Some(parse_number(&mut chars)?.unwrap_or(0))
            } else {
                None
            };
            let bare = flags == Flags::default() && width.is_none() && precision.is_none();

            let verb = match chars.next().ok_or(TemplateError::Truncated)? {
                '%' if bare => {
                    text.push('%');
                    continue;
                }
                'f' | 'F' => Verb::Fixed {
                    precision: precision.unwrap_or(DEFAULT_PRECISION),
                },
                v @ ('e' | 'E') => Verb::Exponent {
                    precision: precision.unwrap_or(DEFAULT_PRECISION),
                    upper: v == 'E',
                },
                v @ ('g' | 'G' | 'v') if precision.is_none() && !flags.sharp => {
                    Verb::Shortest { upper: v == 'G' }
                }
                other => return Err(TemplateError::UnsupportedVerb(other)),
            };

            count += 1;
            if placeholder.is_none() {
                placeholder = Some(Placeholder {
                    flags,
                    width: width.unwrap_or(0),
                    verb,
                });
            }
        }

        match (placeholder, count) {
            (None, _) => Err(TemplateError::NoPlaceholder),
            (Some(placeholder), 1) => Ok(Self {
                prefix,
                placeholder,
                suffix,
            }),
            (Some(_), n) => Err(TemplateError::TooManyPlaceholders(n)),
        }
    }

    /// Substitute the value into the placeholder
    pub fn render(&self, value: f64) -> String {
        let Placeholder { flags, width, verb } = self.placeholder;
        let magnitude = value.abs();

        let mut digits = match verb {
            Verb::Fixed { precision } => format!("{:.*}", precision, magnitude),
            Verb::Exponent { precision, upper } => {
                exponent_form(&format!("{:.*e}", precision, magnitude), upper)
            }
            Verb::Shortest { upper } => {
                if magnitude != 0.0 && !(1e-4..1e6).contains(&magnitude) {
                    exponent_form(&format!("{:e}", magnitude), upper)
                } else {
                    format!("{}", magnitude)
                }
            }
        };

        if flags.sharp && !digits.contains('.') {
            let at = digits
                .find(|c| c == 'e' || c == 'E')
                .unwrap_or(digits.len());
            digits.insert(at, '.');
        }

        let sign = if value.is_sign_negative() {
            "-"
        } else if flags.plus {
            "+"
        } else if flags.space {
            " "
        } else {
            ""
        };

        let pad = width.saturating_sub(sign.len() + digits.len());
        let number = if flags.minus {
            format!("{}{}{}", sign, digits, " ".repeat(pad))
        } else if flags.zero {
            format!("{}{}{}", sign, "0".repeat(pad), digits)
        } else {
            format!("{}{}{}", " ".repeat(pad), sign, digits)
        };

        format!("{}{}{}", self.prefix, number, self.suffix)
    }
}

fn parse_flags(chars: &mut Peekable<Chars<'_>>) -> Flags {
    let mut flags = Flags::default();
    while let Some(c) = chars.peek() {
        match c {
            '+' => flags.plus = true,
            '-' => flags.minus = true,
            ' ' => flags.space = true,
            '0' => flags.zero = true,
            '#' => flags.sharp = true,
            _ => break,
        }
        chars.next();
    }
    flags
}

fn parse_number(chars: &mut Peekable<Chars<'_>>) -> Result<Option<usize>, TemplateError> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        let next = number.unwrap_or(0) * 10 + digit as usize;
        if next > MAX_WIDTH {
            return Err(TemplateError::TooWide);
        }
        number = Some(next);
    }
    Ok(number)
}

/// Rewrite Rust's `1.5e3` as `1.5e+03`
fn exponent_form(rust: &str, upper: bool) -> String {
    let (mantissa, exp) = rust.split_once('e').unwrap_or((rust, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    let e = if upper { 'E' } else { 'e' };
    format!("{}{}{}{:02}", mantissa, e, sign, exp.abs())
}
