//! Query-string filters.
//!
//! Filters arrive as plain strings and are parsed with the domain's `FromStr`
//! impls, so a bad value yields the usual JSON validation error rather than
//! the extractor's plain-text rejection.

use std::str::FromStr;

use serde::Deserialize;
use utoipa::IntoParams;

use common::AppResult;
use domain::DomainError;

/// `?status=` filter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    /// Lifecycle status, e.g. `pending`
    pub status: Option<String>,
}

/// `?kind=` filter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KindQuery {
    /// `shop` or `warehouse`
    pub kind: Option<String>,
}

/// Parse an optional filter value; blank counts as absent.
pub fn parse_optional<T>(raw: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr<Err = DomainError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Ok(Some(value.parse()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{BusinessKind, RequestStatus};

    #[test]
    fn blank_and_missing_are_none() {
        assert_eq!(parse_optional::<RequestStatus>(None).unwrap(), None);
        assert_eq!(parse_optional::<RequestStatus>(Some("  ")).unwrap(), None);
    }

    #[test]
    fn parses_known_values() {
        assert_eq!(
            parse_optional::<BusinessKind>(Some("warehouse")).unwrap(),
            Some(BusinessKind::Warehouse)
        );
        assert!(parse_optional::<RequestStatus>(Some("bogus")).is_err());
    }
}
