use time::{
    format_description::FormatItem, macros::format_description, Date, OffsetDateTime, UtcOffset,
};

use crate::error::AppError;

pub const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
/// Date format the dining API expects.
pub const US_DATE: &[FormatItem<'static>] = format_description!("[month]/[day]/[year]");

/// Parses a `YYYY-MM-DD` request parameter.
pub fn parse_iso_date(raw: &str, field: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), ISO_DATE)
        .map_err(|_| AppError::invalid_argument(format!("{field} must be a date in YYYY-MM-DD format.")))
}

pub fn format_us(date: Date) -> String {
    date.format(US_DATE).unwrap_or_default()
}

/// Current calendar date at the given offset.
pub fn today_in(offset: UtcOffset) -> Date {
    OffsetDateTime::now_utc().to_offset(offset).date()
}

/// Parses offsets such as `+00:00`, `-05:00` or `Z`.
pub fn parse_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.is_empty() {
        return Ok(UtcOffset::UTC);
    }
    let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
    UtcOffset::parse(raw, &format).map_err(|e| anyhow::anyhow!("invalid UTC offset {raw:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, offset};

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_iso_date("2025-03-09", "date").unwrap(), date!(2025 - 03 - 09));
        let err = parse_iso_date("03/09/2025", "startDate").unwrap_err();
        assert!(err.message.contains("startDate"));
    }

    #[test]
    fn formats_for_upstream() {
        assert_eq!(format_us(date!(2025 - 03 - 09)), "03/09/2025");
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_offset("+00:00").unwrap(), UtcOffset::UTC);
        assert_eq!(parse_offset("-05:00").unwrap(), offset!(-5));
        assert_eq!(parse_offset("Z").unwrap(), UtcOffset::UTC);
        assert!(parse_offset("eastern").is_err());
    }
}
