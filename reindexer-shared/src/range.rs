//! Range-bound resolution for time-windowed scans.
//!
//! Configured bounds are `YYYY-MM-DD` strings. Depending on the configured
//! time representation they are either forwarded to the engine untouched or
//! converted to UTC-midnight epoch values. The mapper's defensive re-check
//! always compares in the numeric domain of the document timestamps.

use chrono::NaiveDate;
use thiserror::Error;

use crate::enums::TimeUnit;

/// A range bound as sent to the search engine.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeBound {
    /// A raw date string, parsed server-side.
    Raw(String),
    /// An epoch value (seconds or milliseconds per the configured unit).
    Epoch(i64),
}

/// Errors raised while resolving range bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// A bound was not a valid `YYYY-MM-DD` date.
    #[error("invalid range bound {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// The configured time window, resolved for both the engine query and the
/// mapper's re-validation.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRange {
    /// Lower bound for the engine query, if configured.
    pub query_gte: Option<RangeBound>,
    /// Upper bound for the engine query, if configured.
    pub query_lte: Option<RangeBound>,
    /// Lower bound for the mapper's numeric re-check, if configured.
    pub check_gte: Option<i64>,
    /// Upper bound for the mapper's numeric re-check, if configured.
    pub check_lte: Option<i64>,
}

/// Convert a `YYYY-MM-DD` date string to its UTC-midnight epoch value in the
/// given unit. Raw mode compares in epoch seconds.
pub fn date_to_epoch(date: &str, unit: TimeUnit) -> Result<i64, RangeError> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| RangeError::InvalidDate(date.to_string()))?;
    let midnight = parsed
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| RangeError::InvalidDate(date.to_string()))?
        .and_utc();

    Ok(match unit {
        TimeUnit::EpochMillis => midnight.timestamp_millis(),
        TimeUnit::Raw | TimeUnit::EpochSeconds => midnight.timestamp(),
    })
}

/// Resolve a pair of optional configured bounds against a time representation.
pub fn resolve_bounds(
    gte: Option<&str>,
    lte: Option<&str>,
    unit: TimeUnit,
) -> Result<ResolvedRange, RangeError> {
    let mut resolved = ResolvedRange::default();

    if let Some(gte) = gte {
        let epoch = date_to_epoch(gte, unit)?;
        resolved.check_gte = Some(epoch);
        resolved.query_gte = Some(match unit {
            TimeUnit::Raw => RangeBound::Raw(gte.to_string()),
            TimeUnit::EpochSeconds | TimeUnit::EpochMillis => RangeBound::Epoch(epoch),
        });
    }

    if let Some(lte) = lte {
        let epoch = date_to_epoch(lte, unit)?;
        resolved.check_lte = Some(epoch);
        resolved.query_lte = Some(match unit {
            TimeUnit::Raw => RangeBound::Raw(lte.to_string()),
            TimeUnit::EpochSeconds | TimeUnit::EpochMillis => RangeBound::Epoch(epoch),
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_to_epoch_seconds() {
        assert_eq!(
            date_to_epoch("2024-01-15", TimeUnit::EpochSeconds).unwrap(),
            1_705_276_800
        );
    }

    #[test]
    fn test_date_to_epoch_millis() {
        assert_eq!(
            date_to_epoch("2024-01-15", TimeUnit::EpochMillis).unwrap(),
            1_705_276_800_000
        );
    }

    #[test]
    fn test_date_to_epoch_raw_uses_seconds() {
        assert_eq!(
            date_to_epoch("1970-01-02", TimeUnit::Raw).unwrap(),
            86_400
        );
    }

    #[test]
    fn test_date_to_epoch_rejects_garbage() {
        assert!(matches!(
            date_to_epoch("15/01/2024", TimeUnit::Raw),
            Err(RangeError::InvalidDate(_))
        ));
        assert!(date_to_epoch("2024-13-01", TimeUnit::Raw).is_err());
    }

    #[test]
    fn test_resolve_bounds_raw_passes_strings_through() {
        let resolved =
            resolve_bounds(Some("2024-01-01"), Some("2024-01-31"), TimeUnit::Raw).unwrap();

        assert_eq!(
            resolved.query_gte,
            Some(RangeBound::Raw("2024-01-01".to_string()))
        );
        assert_eq!(
            resolved.query_lte,
            Some(RangeBound::Raw("2024-01-31".to_string()))
        );
        // Re-check thresholds still live in the epoch-seconds domain.
        assert_eq!(resolved.check_gte, Some(1_704_067_200));
        assert_eq!(resolved.check_lte, Some(1_706_659_200));
    }

    #[test]
    fn test_resolve_bounds_epoch_converts_query_bounds() {
        let resolved =
            resolve_bounds(Some("2024-01-01"), None, TimeUnit::EpochMillis).unwrap();

        assert_eq!(
            resolved.query_gte,
            Some(RangeBound::Epoch(1_704_067_200_000))
        );
        assert_eq!(resolved.check_gte, Some(1_704_067_200_000));
        assert!(resolved.query_lte.is_none());
        assert!(resolved.check_lte.is_none());
    }

    #[test]
    fn test_resolve_bounds_single_sided() {
        let resolved = resolve_bounds(None, Some("2024-06-30"), TimeUnit::EpochSeconds).unwrap();
        assert!(resolved.query_gte.is_none());
        assert!(resolved.check_gte.is_none());
        assert!(resolved.query_lte.is_some());
    }
}
