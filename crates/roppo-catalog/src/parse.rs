// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Tolerant cell coercion. Malformed numbers become `None`, never zero.

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

pub fn parse_optional_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Integers, plus integral decimals such as `3.0` the way spreadsheet
/// exports tend to write them.
pub fn parse_optional_int(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = parse_optional_number(trimmed)?;
    if value.fract() != 0.0 || value.abs() > MAX_EXACT_INTEGER {
        return None;
    }
    Some(value as i64)
}

pub fn parse_optional_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
