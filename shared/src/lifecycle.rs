//! Pure poll lifecycle rules shared by the server and the browser.
//!
//! Nothing here touches storage or the clock; callers pass `now` in.

use time::{Duration, OffsetDateTime};
use crate::models::OptionTally;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    #[error("Cannot edit active poll or poll with votes")]
    NotEditable,
}

/// End timestamp for a poll activated (or created) at `now`.
pub fn ends_at_from_countdown(now: OffsetDateTime, countdown_minutes: Option<i32>) -> Option<OffsetDateTime> {
    match countdown_minutes {
        Some(minutes) if minutes > 0 => Some(now + Duration::minutes(i64::from(minutes))),
        _ => None,
    }
}

/// A poll can be replaced wholesale only while closed and untouched by voters.
pub fn ensure_editable(is_active: bool, recorded_votes: i64) -> Result<(), LifecycleError> {
    if is_active || recorded_votes > 0 {
        Err(LifecycleError::NotEditable)
    } else {
        Ok(())
    }
}

/// Whole seconds until `ends_at`, floored at zero. `None` when the poll has no end.
pub fn seconds_left(ends_at: Option<OffsetDateTime>, now: OffsetDateTime) -> Option<i64> {
    ends_at.map(|ends_at| (ends_at - now).whole_seconds().max(0))
}

pub fn format_time_left(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Countdown minutes to pre-fill when editing a poll that already has an end time.
pub fn countdown_from_ends_at(ends_at: Option<OffsetDateTime>, now: OffsetDateTime) -> Option<i32> {
    let remaining = ends_at? - now;
    let minutes = (remaining.as_seconds_f64() / 60.0).round() as i32;
    (minutes > 0).then_some(minutes)
}

pub fn total_votes(options: &[OptionTally]) -> i64 {
    options.iter().map(|opt| opt.votes).sum()
}

/// Share of `total` as a percentage, `0.0` when nobody has voted.
pub fn vote_share(votes: i64, total: i64) -> f64 {
    if total <= 0 {
        0.0
    } else {
        votes as f64 / total as f64 * 100.0
    }
}

pub fn format_share(votes: i64, total: i64) -> String {
    format!("{:.1}", vote_share(votes, total))
}

/// What the ballot page shows for the active poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotStatus {
    Open,
    Voted,
    Ended,
}

/// A finished countdown closes the ballot even for browsers that already voted.
pub fn ballot_status(time_left: Option<i64>, already_voted: bool) -> BallotStatus {
    if time_left == Some(0) {
        BallotStatus::Ended
    } else if already_voted {
        BallotStatus::Voted
    } else {
        BallotStatus::Open
    }
}
