//! Relative date windows for remote history (`last 2 weeks`, `today`, ...).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use thiserror::Error;

/// Timestamp format sent to the GitHub API.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Optional `since` and `until` timestamps.
pub type Bounds = (Option<String>, Option<String>);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error(
        "invalid date window '{0}': expected 'last N days|weeks|months', 'today', 'yesterday' or 'all'"
    )]
    Invalid(String),

    #[error("date window '{0}' reaches past the earliest representable date")]
    OutOfRange(String),
}

/// Unit of a relative window. Weeks are 7 days, months are 30.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowUnit {
    Days,
    Weeks,
    Months,
}

impl WindowUnit {
    fn days(self) -> i64 {
        match self {
            WindowUnit::Days => 1,
            WindowUnit::Weeks => 7,
            WindowUnit::Months => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    /// No lower bound; the caller raises the result ceiling.
    All,
    /// Since midnight UTC today.
    Today,
    /// From midnight UTC yesterday until midnight UTC today.
    Yesterday,
    Last { amount: u32, unit: WindowUnit },
}

impl DateWindow {
    /// `(since, until)` bounds relative to `now`, formatted with [`ISO_FORMAT`].
    ///
    /// Fails when the window starts before the earliest date chrono can hold.
    pub fn bounds_at(&self, now: DateTime<Utc>) -> Result<Bounds, WindowError> {
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let days_before = |at: DateTime<Utc>, days: i64| {
            TimeDelta::try_days(days)
                .and_then(|span| at.checked_sub_signed(span))
                .ok_or_else(|| WindowError::OutOfRange(self.to_string()))
        };
        match *self {
            DateWindow::All => Ok((None, None)),
            DateWindow::Today => Ok((Some(format_iso(midnight)), None)),
            DateWindow::Yesterday => Ok((
                Some(format_iso(days_before(midnight, 1)?)),
                Some(format_iso(midnight)),
            )),
            DateWindow::Last { amount, unit } => {
                let since = days_before(now, i64::from(amount) * unit.days())?;
                Ok((Some(format_iso(since)), None))
            }
        }
    }

    /// Bounds relative to the current time.
    pub fn bounds(&self) -> Result<Bounds, WindowError> {
        self.bounds_at(Utc::now())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, DateWindow::All)
    }
}

pub fn format_iso(at: DateTime<Utc>) -> String {
    at.format(ISO_FORMAT).to_string()
}

impl FromStr for DateWindow {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WindowError::Invalid(s.to_string());
        let normalized = s.trim().to_lowercase();

        match normalized.as_str() {
            "all" => return Ok(DateWindow::All),
            "today" => return Ok(DateWindow::Today),
            "yesterday" => return Ok(DateWindow::Yesterday),
            _ => {}
        }

        let rest = normalized
            .strip_prefix("last")
            .map(str::trim_start)
            .unwrap_or(&normalized);
        let words: Vec<&str> = rest.split_whitespace().collect();

        // "last week" means one week.
        let (amount, unit) = match words.as_slice() {
            [unit] if normalized.starts_with("last") => (1, *unit),
            [amount, unit] => (amount.parse::<u32>().map_err(|_| invalid())?, *unit),
            _ => return Err(invalid()),
        };
        if amount == 0 {
            return Err(invalid());
        }

        let unit = match unit {
            "day" | "days" => WindowUnit::Days,
            "week" | "weeks" => WindowUnit::Weeks,
            "month" | "months" => WindowUnit::Months,
            _ => return Err(invalid()),
        };

        Ok(DateWindow::Last { amount, unit })
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateWindow::All => write!(f, "all"),
            DateWindow::Today => write!(f, "today"),
            DateWindow::Yesterday => write!(f, "yesterday"),
            DateWindow::Last { amount, unit } => {
                let unit = match unit {
                    WindowUnit::Days => "days",
                    WindowUnit::Weeks => "weeks",
                    WindowUnit::Months => "months",
                };
                write!(f, "last {amount} {unit}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 13, 45, 30).unwrap()
    }

    #[test]
    fn last_two_weeks_is_exactly_fourteen_days() {
        let window: DateWindow = "last 2 weeks".parse().unwrap();
        let (since, until) = window.bounds_at(fixed_now()).unwrap();
        assert_eq!(since.as_deref(), Some("2024-03-01T13:45:30Z"));
        assert!(until.is_none());
    }

    #[test]
    fn last_two_weeks_against_real_clock() {
        let before = Utc::now();
        let (since, _) = "last 2 weeks".parse::<DateWindow>().unwrap().bounds().unwrap();
        let after = Utc::now();

        let since = chrono::NaiveDateTime::parse_from_str(&since.unwrap(), ISO_FORMAT)
            .unwrap()
            .and_utc();
        let lower = before - TimeDelta::days(14) - TimeDelta::seconds(1);
        let upper = after - TimeDelta::days(14);
        assert!(since >= lower && since <= upper, "since {since} outside [{lower}, {upper}]");
    }

    #[test]
    fn months_are_thirty_days() {
        let (since, _) = "last 1 month".parse::<DateWindow>().unwrap().bounds_at(fixed_now()).unwrap();
        assert_eq!(since.as_deref(), Some("2024-02-14T13:45:30Z"));
    }

    #[test]
    fn bare_amount_and_unit() {
        assert_eq!(
            "7 days".parse::<DateWindow>().unwrap(),
            DateWindow::Last { amount: 7, unit: WindowUnit::Days }
        );
    }

    #[test]
    fn last_without_amount_means_one() {
        assert_eq!(
            "last week".parse::<DateWindow>().unwrap(),
            DateWindow::Last { amount: 1, unit: WindowUnit::Weeks }
        );
    }

    #[test]
    fn today_and_yesterday() {
        let (since, until) = DateWindow::Today.bounds_at(fixed_now()).unwrap();
        assert_eq!(since.as_deref(), Some("2024-03-15T00:00:00Z"));
        assert!(until.is_none());

        let (since, until) = DateWindow::Yesterday.bounds_at(fixed_now()).unwrap();
        assert_eq!(since.as_deref(), Some("2024-03-14T00:00:00Z"));
        assert_eq!(until.as_deref(), Some("2024-03-15T00:00:00Z"));
    }

    #[test]
    fn all_has_no_bounds() {
        let window: DateWindow = " ALL ".parse().unwrap();
        assert!(window.is_all());
        assert_eq!(window.bounds_at(fixed_now()), Ok((None, None)));
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", "last", "last 0 days", "last -1 days", "2 fortnights", "soon", "last 3"] {
            assert!(input.parse::<DateWindow>().is_err(), "accepted: {input:?}");
        }
    }

    #[test]
    fn huge_windows_are_out_of_range() {
        for input in ["last 100000000 days", "last 4294967295 months"] {
            let window: DateWindow = input.parse().unwrap();
            assert!(
                matches!(window.bounds_at(fixed_now()), Err(WindowError::OutOfRange(_))),
                "accepted: {input:?}"
            );
            assert!(matches!(window.bounds(), Err(WindowError::OutOfRange(_))));
        }
    }

    #[test]
    fn display_roundtrips_through_parse() {
        let window = DateWindow::Last { amount: 3, unit: WindowUnit::Months };
        assert_eq!(window.to_string(), "last 3 months");
        assert_eq!(window.to_string().parse::<DateWindow>().unwrap(), window);
    }
}
