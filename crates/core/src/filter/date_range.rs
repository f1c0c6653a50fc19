//! Date range selection: a named period or an explicit pair of bounds.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::FilterError;
use crate::calendar::{self, DateInterval};

/// Named reporting period, resolved against a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodToken {
    /// Start of the current month up to the reference date.
    Month,
    /// The whole current calendar quarter.
    Quarter,
    /// Start of the current year up to the reference date.
    Year,
    /// The previous calendar month.
    LastMonth,
    /// The previous calendar quarter.
    LastQuarter,
    /// The previous calendar year.
    LastYear,
}

impl PeriodToken {
    /// Every selectable token, in menu order.
    pub const ALL: [Self; 6] = [
        Self::Month,
        Self::Quarter,
        Self::Year,
        Self::LastMonth,
        Self::LastQuarter,
        Self::LastYear,
    ];

    /// Wire name of the token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
            Self::LastMonth => "last-month",
            Self::LastQuarter => "last-quarter",
            Self::LastYear => "last-year",
        }
    }

    /// Resolves the token to concrete dates relative to `today`.
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> DateInterval {
        match self {
            Self::Month => DateInterval::new(calendar::month_start(today), today),
            Self::Year => DateInterval::new(calendar::year_start(today), today),
            Self::Quarter => calendar::quarter_bounds(today),
            Self::LastMonth => {
                let this_month = calendar::month_start(today);
                DateInterval::new(this_month - Months::new(1), this_month - Days::new(1))
            }
            Self::LastQuarter => {
                let this_quarter = calendar::quarter_bounds(today).start;
                DateInterval::new(this_quarter - Months::new(3), this_quarter - Days::new(1))
            }
            Self::LastYear => {
                let this_year = calendar::year_start(today);
                DateInterval::new(this_year - Months::new(12), this_year - Days::new(1))
            }
        }
    }
}

impl std::fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PeriodToken {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|token| token.as_str() == s.trim())
            .ok_or_else(|| FilterError::unknown_period(s))
    }
}

/// Which end of an explicit range is being set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateBound {
    /// The `start_date` bound.
    Start,
    /// The `end_date` bound.
    End,
}

impl DateBound {
    /// Field name of the bound.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Start => "start_date",
            Self::End => "end_date",
        }
    }

    /// Parses a bound value formatted `YYYY-MM-DD`.
    pub fn parse_value(self, value: &str) -> Result<NaiveDate, FilterError> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| FilterError::invalid_date(self.field_name(), value))
    }
}

/// Explicit range; either bound may still be unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExplicitRange {
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl ExplicitRange {
    /// Range with both bounds set.
    #[must_use]
    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
        }
    }

    /// Returns true if `date` satisfies every bound that is set.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }
}

impl From<DateInterval> for ExplicitRange {
    fn from(interval: DateInterval) -> Self {
        Self::between(interval.start, interval.end)
    }
}

/// Date range selection. Serializes as `null`, a token string, or an
/// object with `start_date`/`end_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateRange {
    /// No date restriction.
    #[default]
    Unset,
    /// A named period.
    Period(PeriodToken),
    /// Explicit bounds.
    Explicit(ExplicitRange),
}

impl DateRange {
    /// Replaces the selection with `token`, dropping explicit bounds.
    #[must_use]
    pub const fn with_token(token: PeriodToken) -> Self {
        Self::Period(token)
    }

    /// Merges one bound into the explicit range.
    ///
    /// A named period is discarded; the other bound stays unset until given.
    #[must_use]
    pub fn with_bound(self, which: DateBound, date: NaiveDate) -> Self {
        let mut range = match self {
            Self::Explicit(range) => range,
            Self::Unset | Self::Period(_) => ExplicitRange::default(),
        };
        match which {
            DateBound::Start => range.start_date = Some(date),
            DateBound::End => range.end_date = Some(date),
        }
        Self::Explicit(range)
    }

    /// The active period token, if any.
    #[must_use]
    pub const fn token(&self) -> Option<PeriodToken> {
        match self {
            Self::Period(token) => Some(*token),
            Self::Unset | Self::Explicit(_) => None,
        }
    }

    /// The explicit bounds, if any.
    #[must_use]
    pub const fn explicit(&self) -> Option<&ExplicitRange> {
        match self {
            Self::Explicit(range) => Some(range),
            Self::Unset | Self::Period(_) => None,
        }
    }

    /// Resolves the selection to concrete bounds. `None` when unset.
    #[must_use]
    pub fn resolve(&self, today: NaiveDate) -> Option<ExplicitRange> {
        match self {
            Self::Unset => None,
            Self::Period(token) => Some(token.resolve(today).into()),
            Self::Explicit(range) => Some(*range),
        }
    }
}
