//! Timezone handling for date bucketing
//!
//! Calls are grouped by the calendar date they fall on in the viewer's
//! timezone. The zone comes from `--utc`, `--timezone`, the `TZ`
//! environment variable or the system setting, in that order.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

use crate::error::{CallstatError, Result};
use crate::types::DailyDate;

/// Configuration for timezone handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneConfig {
    /// The timezone used to derive calendar dates
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self::new(get_local_timezone())
    }
}

impl TimezoneConfig {
    /// Wrap an explicit timezone
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            is_utc: tz == Tz::UTC,
        }
    }

    /// UTC configuration
    pub fn utc() -> Self {
        Self::new(Tz::UTC)
    }

    /// Build the configuration from command line flags
    ///
    /// `use_utc` wins over an explicit zone name; with neither, the local
    /// zone is detected.
    pub fn from_cli(timezone: Option<&str>, use_utc: bool) -> Result<Self> {
        if use_utc {
            return Ok(Self::utc());
        }

        match timezone {
            Some(name) => Tz::from_str(name).map(Self::new).map_err(|_| {
                CallstatError::InvalidTimezone(format!(
                    "'{name}'. Use an IANA name like 'America/New_York', 'Europe/Berlin', or 'UTC'"
                ))
            }),
            None => Ok(Self::default()),
        }
    }

    /// Name shown in report headers
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Calendar date of an instant in this timezone
    pub fn daily_date(&self, instant: &DateTime<Utc>) -> DailyDate {
        DailyDate::new(instant.with_timezone(&self.tz).date_naive())
    }
}

/// Detect the system's local timezone, falling back to UTC
pub fn get_local_timezone() -> Tz {
    if let Ok(tz_str) = std::env::var("TZ")
        && let Ok(tz) = Tz::from_str(&tz_str)
    {
        debug!("Using timezone from TZ environment variable: {}", tz_str);
        return tz;
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => Tz::from_str(&tz_str).unwrap_or_else(|_| {
            debug!("Unrecognized system timezone '{}', falling back to UTC", tz_str);
            Tz::UTC
        }),
        Err(e) => {
            debug!("Could not detect local timezone: {:?}, falling back to UTC", e);
            Tz::UTC
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ENV_MUTEX, EnvVarGuard};
    use chrono::TimeZone;

    #[test]
    fn test_utc_flag_wins() {
        let config = TimezoneConfig::from_cli(Some("Asia/Tokyo"), true).unwrap();
        assert!(config.is_utc);
        assert_eq!(config.display_name(), "UTC");
    }

    #[test]
    fn test_explicit_timezone() {
        let config = TimezoneConfig::from_cli(Some("Europe/Berlin"), false).unwrap();
        assert!(!config.is_utc);
        assert_eq!(config.display_name(), "Europe/Berlin");
    }

    #[test]
    fn test_invalid_timezone() {
        let err = TimezoneConfig::from_cli(Some("Mars/Olympus"), false).unwrap_err();
        assert!(matches!(err, CallstatError::InvalidTimezone(_)));
    }

    #[test]
    fn test_utc_by_name_is_utc() {
        let config = TimezoneConfig::from_cli(Some("UTC"), false).unwrap();
        assert!(config.is_utc);
    }

    #[tokio::test]
    async fn test_tz_environment_variable() {
        let _lock = ENV_MUTEX.lock().await;
        let mut guard = EnvVarGuard::new();
        guard.set("TZ", "Asia/Tokyo");

        assert_eq!(get_local_timezone(), chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn test_daily_date_crosses_midnight() {
        let config = TimezoneConfig::new(chrono_tz::Asia::Tokyo);
        let late_utc = Utc.with_ymd_and_hms(2024, 6, 30, 20, 0, 0).unwrap();
        assert_eq!(config.daily_date(&late_utc).to_string(), "2024-07-01");
    }
}
