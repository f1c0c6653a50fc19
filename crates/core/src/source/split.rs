//! Day-proportional split of a deferred amount into report buckets.

use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::calendar::{self, DateInterval};

/// Decimal places kept by a prorated share.
const SHARE_DECIMALS: u32 = 2;

/// Bucket amounts of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketSplit {
    /// Full absolute amount.
    pub total: Decimal,
    /// Recognition starts after the current quarter.
    pub not_started: Decimal,
    /// Days before the current quarter.
    pub before: Decimal,
    /// Days inside the current quarter.
    pub current: Decimal,
    /// Remainder after the current quarter.
    pub later: Decimal,
}

/// Splits `amount` recognized from `start` to `end` (inclusive) against the
/// quarter containing `as_of`.
///
/// The total is the absolute amount. Shares are prorated cumulatively and
/// `later` takes the remainder, so they always add up to it. A line ending
/// before it starts counts as a single day on its start date.
///
/// Nothing is set aside for the recognized portion: the buckets cover the
/// whole amount and recognition is carried separately by the caller.
#[must_use]
pub fn split_line(
    amount: Decimal,
    start: NaiveDate,
    end: NaiveDate,
    as_of: NaiveDate,
) -> BucketSplit {
    let total = amount.abs();
    let quarter = calendar::quarter_bounds(as_of);

    if start > quarter.end {
        return BucketSplit {
            total,
            not_started: total,
            ..BucketSplit::default()
        };
    }

    let span = DateInterval::new(start, end.max(start));
    let span_days = span.days();
    let before_days = match quarter.start.checked_sub_days(Days::new(1)) {
        Some(last_before) => span.overlap_days(&DateInterval::new(span.start, last_before)),
        None => 0,
    };
    let current_days = span.overlap_days(&quarter);

    let before = prorate(total, before_days, span_days);
    let through_current = prorate(total, before_days + current_days, span_days);

    BucketSplit {
        total,
        not_started: Decimal::ZERO,
        before,
        current: through_current - before,
        later: total - through_current,
    }
}

fn prorate(total: Decimal, days: i64, span_days: i64) -> Decimal {
    if days <= 0 || span_days <= 0 {
        return Decimal::ZERO;
    }
    if days >= span_days {
        return total;
    }
    (total * Decimal::from(days) / Decimal::from(span_days))
        .round_dp_with_strategy(SHARE_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}
