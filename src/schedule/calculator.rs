use chrono::{Days, NaiveDate};

/// Day count used when a frequency descriptor carries no number
/// ("Once", "Immediate", "Seasonal", ...).
pub const DEFAULT_FREQUENCY_DAYS: u32 = 7;

/// Extract the first run of decimal digits from a free-text frequency
/// descriptor. Falls back to [`DEFAULT_FREQUENCY_DAYS`] when there is none or
/// when the run does not fit in a `u32`.
pub fn parse_frequency_days(descriptor: &str) -> u32 {
    let digits: String = descriptor
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return DEFAULT_FREQUENCY_DAYS;
    }

    digits.parse().unwrap_or(DEFAULT_FREQUENCY_DAYS)
}

/// Next application date for a descriptor such as `"Apply every 10 days"`.
pub fn compute_next_application(start_date: NaiveDate, frequency_descriptor: &str) -> NaiveDate {
    next_application_after(start_date, parse_frequency_days(frequency_descriptor))
}

/// Calendar-day projection from an already parsed day count. Saturates at
/// `NaiveDate::MAX` rather than failing.
pub fn next_application_after(start_date: NaiveDate, frequency_days: u32) -> NaiveDate {
    start_date
        .checked_add_days(Days::new(u64::from(frequency_days)))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn extracts_first_integer_token() {
        assert_eq!(parse_frequency_days("10 days"), 10);
        assert_eq!(parse_frequency_days("Apply every 3 days"), 3);
        assert_eq!(parse_frequency_days("every 14 days, repeat 2 times"), 14);
        assert_eq!(parse_frequency_days("7"), 7);
    }

    #[test]
    fn defaults_when_no_digits() {
        for descriptor in ["Once", "Immediate", "Seasonal", "Next season", ""] {
            assert_eq!(parse_frequency_days(descriptor), DEFAULT_FREQUENCY_DAYS, "{descriptor}");
        }
    }

    #[test]
    fn defaults_on_overflowing_digit_run() {
        assert_eq!(parse_frequency_days("every 99999999999 days"), DEFAULT_FREQUENCY_DAYS);
    }

    #[test]
    fn projects_calendar_days() {
        assert_eq!(
            compute_next_application(date(2024, 1, 1), "Apply every 10 days"),
            date(2024, 1, 11)
        );
        assert_eq!(compute_next_application(date(2024, 1, 1), "Seasonal"), date(2024, 1, 8));
        assert_eq!(compute_next_application(date(2024, 2, 25), "5 days"), date(2024, 3, 1));
        assert_eq!(compute_next_application(date(2023, 12, 30), "3 days"), date(2024, 1, 2));
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        assert_eq!(next_application_after(NaiveDate::MAX, 1), NaiveDate::MAX);
    }
}
