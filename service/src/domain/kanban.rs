//! [`KanbanTask`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::project;
#[cfg(doc)]
use crate::domain::Project;

/// Task on the kanban board of a [`Project`].
#[derive(Clone, Debug)]
pub struct KanbanTask {
    /// ID of this [`KanbanTask`].
    pub id: Id,

    /// ID of the [`Project`] this [`KanbanTask`] belongs to.
    pub project_id: project::Id,

    /// [`Title`] of this [`KanbanTask`].
    pub title: Title,

    /// [`Status`] of this [`KanbanTask`] on the board.
    pub status: Status,

    /// [`Subtask`]s of this [`KanbanTask`], in their checklist order.
    pub subtasks: Vec<Subtask>,

    /// [`DateTime`] when this [`KanbanTask`] was created.
    pub created_at: CreationDateTime,
}

/// Single checklist entry of a [`KanbanTask`].
#[derive(Clone, Debug)]
pub struct Subtask {
    /// [`Title`] of this [`Subtask`].
    pub title: Title,

    /// Indicator whether this [`Subtask`] is completed.
    pub done: bool,
}

/// ID of a [`KanbanTask`].
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

/// Title of a [`KanbanTask`] or its [`Subtask`].
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

define_kind! {
    #[doc = "Status of a [`KanbanTask`] on the board."]
    enum Status {
        #[doc = "Queued for work."]
        Todo = 1,

        #[doc = "Being worked on."]
        Doing = 2,

        #[doc = "Completed."]
        Done = 3,
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Todo
    }
}

/// [`DateTime`] when a [`KanbanTask`] was created.
pub type CreationDateTime = DateTimeOf<(KanbanTask, unit::Creation)>;
