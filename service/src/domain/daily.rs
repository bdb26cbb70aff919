//! [`DailyTask`] definitions.

use std::collections::BTreeMap;

#[cfg(doc)]
use common::DateTime;
use common::{unit, Date, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::project;
#[cfg(doc)]
use crate::domain::Project;

/// Recurring task meant to be completed once per calendar day.
#[derive(Clone, Debug)]
pub struct DailyTask {
    /// ID of this [`DailyTask`].
    pub id: Id,

    /// ID of the [`Project`] this [`DailyTask`] belongs to.
    pub project_id: project::Id,

    /// [`Title`] of this [`DailyTask`].
    pub title: Title,

    /// Completion ledger of this [`DailyTask`]: whether it was done on each
    /// recorded [`Date`].
    ///
    /// At most one entry per [`Date`]. Entries are append-only, except
    /// today's `done` mark, which toggles in place.
    pub completions: BTreeMap<Date, bool>,

    /// [`DateTime`] when this [`DailyTask`] was created.
    pub created_at: CreationDateTime,
}

impl DailyTask {
    /// Indicates whether this [`DailyTask`] was done on the given [`Date`].
    ///
    /// A missing ledger entry counts as not done.
    #[must_use]
    pub fn is_done_on(&self, date: Date) -> bool {
        self.completions.get(&date).copied().unwrap_or_default()
    }

    /// Number of consecutive [`Date`]s this [`DailyTask`] was done on,
    /// walking backward from (and including) `today`.
    ///
    /// Any gap or a `done = false` mark breaks the count, so a [`DailyTask`]
    /// not done today has a streak of 0.
    #[must_use]
    pub fn streak(&self, today: Date) -> u32 {
        let mut streak = 0;
        let mut day = Some(today);
        while let Some(d) = day {
            if !self.is_done_on(d) {
                break;
            }
            streak += 1;
            day = d.previous();
        }
        streak
    }

    /// Completion marks of this [`DailyTask`] on `today` and the 6 preceding
    /// [`Date`]s, oldest first.
    #[must_use]
    pub fn history(&self, today: Date) -> [bool; 7] {
        let mut history = [false; 7];
        for (n, done) in history.iter_mut().rev().enumerate() {
            *done = u16::try_from(n)
                .ok()
                .and_then(|n| today.minus_days(n))
                .is_some_and(|d| self.is_done_on(d));
        }
        history
    }
}

/// Completion mark of a single [`DailyTask`] on a single [`Date`].
#[derive(Clone, Copy, Debug)]
pub struct Completion {
    /// ID of the marked [`DailyTask`].
    pub task_id: Id,

    /// [`Date`] the mark is on.
    pub date: Date,
}

/// Missing `done = false` marks of all [`DailyTask`]s of a [`Project`] on a
/// single [`Date`].
///
/// Materializing these before listing is what keeps every [`DailyTask`]
/// carrying an entry for today.
#[derive(Clone, Copy, Debug)]
pub struct Today {
    /// ID of the [`Project`] whose [`DailyTask`]s are materialized.
    pub project_id: project::Id,

    /// [`Date`] considered as today.
    pub date: Date,
}

/// ID of a [`DailyTask`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Title of a [`DailyTask`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `title` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 512
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// [`DateTime`] when a [`DailyTask`] was created.
pub type CreationDateTime = DateTimeOf<(DailyTask, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::Date;

    use super::{DailyTask, Id, Title};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn task(completions: &[(&str, bool)]) -> DailyTask {
        DailyTask {
            id: Id::new(),
            project_id: super::project::Id::new(),
            title: Title::new("stretch").unwrap(),
            completions: completions
                .iter()
                .map(|(d, done)| (date(d), *done))
                .collect(),
            created_at: common::DateTime::now().coerce(),
        }
    }

    #[test]
    fn streak_counts_consecutive_days_back_from_today() {
        let task = task(&[
            ("2025-03-10", true),
            ("2025-03-09", true),
            ("2025-03-08", false),
            ("2025-03-07", true),
        ]);

        assert_eq!(task.streak(date("2025-03-10")), 2);
    }

    #[test]
    fn streak_is_zero_without_todays_mark() {
        let task = task(&[("2025-03-09", true), ("2025-03-08", true)]);

        assert_eq!(task.streak(date("2025-03-10")), 0);
    }

    #[test]
    fn streak_breaks_on_gaps() {
        let task = task(&[("2025-03-10", true), ("2025-03-08", true)]);

        assert_eq!(task.streak(date("2025-03-10")), 1);
    }

    #[test]
    fn streak_spans_month_boundaries() {
        let task = task(&[
            ("2025-03-01", true),
            ("2025-02-28", true),
            ("2025-02-27", true),
        ]);

        assert_eq!(task.streak(date("2025-03-01")), 3);
    }

    #[test]
    fn history_is_oldest_first() {
        let task = task(&[("2025-03-08", true), ("2025-03-05", true)]);

        assert_eq!(
            task.history(date("2025-03-10")),
            [false, false, true, false, false, true, false],
        );
    }

    #[test]
    fn history_ends_with_today() {
        let task = task(&[("2025-03-10", true)]);

        assert_eq!(
            task.history(date("2025-03-10")),
            [false, false, false, false, false, false, true],
        );
    }

    #[test]
    fn false_marks_do_not_count() {
        let task = task(&[("2025-03-10", false)]);

        assert!(!task.is_done_on(date("2025-03-10")));
        assert_eq!(task.streak(date("2025-03-10")), 0);
        assert_eq!(task.history(date("2025-03-10")), [false; 7]);
    }
}
