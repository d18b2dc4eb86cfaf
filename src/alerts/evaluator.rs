//! Threshold evaluation
//!
//! Turns sampler output into a number and a verdict. Stateless.

use crate::domain::MetricSpec;
use crate::error::{AppError, Result};

/// Parses sample text and compares it against a metric's threshold
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdEvaluator;

impl ThresholdEvaluator {
    /// Parse trimmed sampler output as a plain decimal number
    ///
    /// Accepts an optional sign, digits with an optional fraction and an
    /// optional decimal exponent. Rejects `inf`, `nan`, hex and anything
    /// that would overflow to infinity.
    pub fn parse(text: &str) -> Result<f64> {
        let parse_error = || AppError::Parse {
            text: text.to_string(),
        };

        if !is_plain_decimal(text) {
            return Err(parse_error());
        }

        let value: f64 = text.parse().map_err(|_| parse_error())?;
        if !value.is_finite() {
            return Err(parse_error());
        }

        Ok(value)
    }

    /// `true` when the value is strictly above the threshold
    #[inline]
    pub fn is_above(value: f64, threshold: f64) -> bool {
        value > threshold
    }

    /// Parse and compare in one step
    pub fn evaluate(&self, spec: &MetricSpec, text: &str) -> Result<(f64, bool)> {
        let value = Self::parse(text)?;
        Ok((value, spec.is_above(value)))
    }
}

fn is_plain_decimal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }

    if digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}
