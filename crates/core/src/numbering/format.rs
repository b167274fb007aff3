//! Number formatting and counter reset rules.

use super::error::NumberingError;
use super::types::{ResetRule, SeriesFormat};

/// Formats a counter value as a document number.
///
/// Layout is `prefix + sep + year + sep + zero-padded value`. Empty parts are
/// skipped together with their separator, so a series without a year renders
/// as `INV-00042`.
///
/// # Errors
///
/// Returns `NumberingError::InvalidCounter` if `value` is not positive.
pub fn format_number(
    format: &SeriesFormat,
    year: i32,
    value: i64,
    pad_width: usize,
) -> Result<String, NumberingError> {
    if value <= 0 {
        return Err(NumberingError::InvalidCounter(value));
    }

    let counter = format!("{value:0pad_width$}");
    let parts: Vec<String> = [Some(format.prefix.clone()), format.year_format.render(year)]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .chain(std::iter::once(counter))
        .collect();

    Ok(parts.join(&format.separator))
}

/// Year printed in a number.
///
/// A yearly series prints the year its counter belongs to, which differs
/// from the document year only for backdated documents. Pass the
/// [`ResetRule::effective`] rule.
#[must_use]
pub const fn number_year(rule: ResetRule, reset_year: i32, document_year: i32) -> i32 {
    match rule {
        ResetRule::Yearly => reset_year,
        ResetRule::Never => document_year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbering::types::YearFormat;
    use rstest::rstest;

    fn series(prefix: &str, separator: &str, year_format: YearFormat) -> SeriesFormat {
        SeriesFormat {
            prefix: prefix.to_string(),
            separator: separator.to_string(),
            year_format,
        }
    }

    #[rstest]
    #[case(series("INV", "-", YearFormat::Yyyy), 1, "INV-2024-00001")]
    #[case(series("INV", "-", YearFormat::Yy), 42, "INV-24-00042")]
    #[case(series("INV", "/", YearFormat::None), 7, "INV/00007")]
    #[case(series("", "-", YearFormat::Yyyy), 3, "2024-00003")]
    #[case(series("JE", "", YearFormat::Yyyy), 123_456, "JE2024123456")]
    fn test_format_number(#[case] format: SeriesFormat, #[case] value: i64, #[case] expected: &str) {
        assert_eq!(format_number(&format, 2024, value, 5).unwrap(), expected);
    }

    #[test]
    fn test_format_rejects_non_positive_counter() {
        let format = series("INV", "-", YearFormat::None);
        assert!(matches!(
            format_number(&format, 2024, 0, 5),
            Err(NumberingError::InvalidCounter(0))
        ));
    }

    #[test]
    fn test_backdated_number_uses_counter_year() {
        assert_eq!(number_year(ResetRule::Yearly, 2025, 2024), 2025);
        assert_eq!(number_year(ResetRule::Never, 2025, 2024), 2024);
    }

    #[test]
    fn test_yearless_series_prints_no_year_after_rollover() {
        let format = series("PAY", "-", YearFormat::None);
        let rule = ResetRule::Yearly.effective(format.year_format);
        let year = number_year(rule, 2024, 2025);
        assert_eq!(format_number(&format, year, 2, 5).unwrap(), "PAY-00002");
    }
}
