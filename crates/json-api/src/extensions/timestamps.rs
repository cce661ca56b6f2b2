//! RFC 3339 timestamp parsing for request fields and query parameters.

use jiff::Timestamp;
use salvo::{oapi::extract::QueryParam, prelude::StatusError};

use crate::extensions::*;

/// Parse a required timestamp field, naming it in the 400 on failure.
pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<Timestamp, StatusError> {
    value
        .trim()
        .parse::<Timestamp>()
        .or_400(&format!("could not parse \"{field}\""))
}

/// Parse an optional timestamp field. Absent stays absent.
pub(crate) fn parse_optional_timestamp(
    field: &str,
    value: Option<&str>,
) -> Result<Option<Timestamp>, StatusError> {
    value.map(|value| parse_timestamp(field, value)).transpose()
}

/// The `at` query parameter lets clients evaluate time windows at a fixed
/// instant instead of the server clock.
pub(crate) trait AtQueryExt {
    fn at_or_now(self) -> Result<Timestamp, StatusError>;
}

impl AtQueryExt for QueryParam<String, false> {
    fn at_or_now(self) -> Result<Timestamp, StatusError> {
        Ok(parse_optional_timestamp("at", self.into_inner().as_deref())?
            .unwrap_or_else(Timestamp::now))
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_rfc3339_with_surrounding_space() -> TestResult {
        let parsed = parse_timestamp("starts_at", " 2026-10-19T12:00:00Z ")?;

        assert_eq!(parsed, "2026-10-19T12:00:00Z".parse::<Timestamp>()?);

        Ok(())
    }

    #[test]
    fn bad_timestamp_names_the_field() {
        let error = parse_timestamp("ends_at", "tomorrow").err();

        assert_eq!(error.as_ref().map(|e| e.code), Some(StatusCode::BAD_REQUEST));
        assert!(
            error.is_some_and(|e| e.brief.contains("\"ends_at\"")),
            "brief should name the field"
        );
    }

    #[test]
    fn missing_optional_timestamp_is_none() -> TestResult {
        assert_eq!(parse_optional_timestamp("ends_at", None)?, None);

        Ok(())
    }
}
