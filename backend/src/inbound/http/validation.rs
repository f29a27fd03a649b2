//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper reports failures as a field-level map in
//! `error.details.fields` so clients can highlight the offending input.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::{DateRange, Error, FieldErrors, IdentifierError};

/// Days covered by a report when the caller supplies no range.
pub(crate) const DEFAULT_REPORT_DAYS: u32 = 30;

/// Wrap a single field failure in a validation error.
pub(crate) fn field_error(field: &str, message: impl Into<String>) -> Error {
    let mut fields = FieldErrors::default();
    fields.add(field, message);
    Error::validation(fields)
}

/// Parse a path or query identifier.
pub(crate) fn parse_id<T>(field: &str, raw: &str) -> Result<T, Error>
where
    T: FromStr<Err = IdentifierError>,
{
    raw.parse::<T>()
        .map_err(|err| field_error(field, err.to_string()))
}

fn parse_date(field: &str, raw: &str, fields: &mut FieldErrors) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            fields.add(field, format!("{field} must be a date in YYYY-MM-DD format"));
            None
        }
    }
}

/// Parse an optional `from`/`to` query pair.
///
/// Both bounds absent yields `None`; one bound alone is rejected.
pub(crate) fn parse_optional_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Option<DateRange>, Error> {
    let mut fields = FieldErrors::default();
    let (from, to) = match (from, to) {
        (None, None) => return Ok(None),
        (Some(from), Some(to)) => (
            parse_date("from", from, &mut fields),
            parse_date("to", to, &mut fields),
        ),
        (Some(_), None) => {
            fields.add("to", "to is required when from is given");
            (None, None)
        }
        (None, Some(_)) => {
            fields.add("from", "from is required when to is given");
            (None, None)
        }
    };
    match (from, to) {
        (Some(from), Some(to)) if fields.is_empty() => DateRange::new(from, to)
            .map(Some)
            .map_err(|err| field_error("to", err.to_string())),
        _ => Err(Error::validation(fields)),
    }
}

/// Parse a `from`/`to` query pair, defaulting to the trailing report window
/// ending `today`.
pub(crate) fn parse_range_or_default(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange, Error> {
    Ok(parse_optional_range(from, to)?
        .unwrap_or_else(|| DateRange::trailing_days(today, DEFAULT_REPORT_DAYS)))
}
