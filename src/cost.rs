//! Field-size and treatment cost arithmetic.
//!
//! None of these functions fail: malformed field sizes degrade to zero so a
//! cost figure can always be shown.

use crate::models::Treatment;

/// Leading-integer parse of a user-entered field size, in acres.
///
/// Mirrors a lenient `parseInt`: surrounding whitespace is ignored, an
/// optional sign is accepted and trailing text after the digits is dropped
/// (`"3.5"` is 3, `"12 acres"` is 12). Empty, non-numeric or negative input
/// yields 0; sizes beyond `u64` saturate.
pub fn parse_field_size(input: &str) -> u64 {
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        &rest[..end]
    };

    if digits.is_empty() || negative {
        return 0;
    }

    // only overflow can fail here: `digits` is a non-empty ASCII digit run
    digits.parse().unwrap_or(u64::MAX)
}

/// `field_size_acres * cost_per_acre`, never negative.
pub fn total_cost(field_size_acres: u64, cost_per_acre: f64) -> f64 {
    field_size_acres as f64 * sanitize_cost(cost_per_acre)
}

/// Parse the raw field-size entry and multiply by the per-acre cost.
pub fn estimate_total_cost(field_size_input: &str, cost_per_acre: f64) -> f64 {
    total_cost(parse_field_size(field_size_input), cost_per_acre)
}

/// Sum of totals across a set of treatments (e.g. a comparison set).
pub fn aggregate_cost<'a, I>(field_size_acres: u64, treatments: I) -> f64
where
    I: IntoIterator<Item = &'a Treatment>,
{
    treatments
        .into_iter()
        .map(|t| total_cost(field_size_acres, t.cost_per_acre))
        .sum()
}

/// Per-acre display label; zero-cost treatments read as "Free".
pub fn cost_label(cost_per_acre: f64, currency: &str) -> String {
    let cost = sanitize_cost(cost_per_acre);
    if cost == 0.0 {
        "Free".to_string()
    } else {
        format!("{currency} {}/acre", format_amount(cost))
    }
}

pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

fn sanitize_cost(cost_per_acre: f64) -> f64 {
    if cost_per_acre.is_nan() {
        0.0
    } else {
        cost_per_acre.max(0.0)
    }
}
