use crate::error::AppError;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn format_timestamp(value: OffsetDateTime) -> Result<String, AppError> {
    value
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Parses a stored or user-supplied timestamp.
///
/// RFC 3339 values carry their own offset. Local wall-clock forms
/// (`2024-01-03T09:30`, `2024-01-03 09:30:00`, `2024-01-03`) are read in
/// `offset`. Anything else is `None`.
pub fn parse_timestamp(raw: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(parsed);
    }

    let local_formats: [&[BorrowedFormatItem<'static>]; 4] = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ];
    for format in local_formats {
        if let Ok(parsed) = PrimitiveDateTime::parse(trimmed, format) {
            return Some(parsed.assume_offset(offset));
        }
    }

    parse_date(trimmed).map(|date| date.midnight().assume_offset(offset))
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}
