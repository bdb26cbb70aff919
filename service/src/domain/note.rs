//! [`Note`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::project;
#[cfg(doc)]
use crate::domain::Project;

/// Rich-text note kept in a [`Project`].
#[derive(Clone, Debug)]
pub struct Note {
    /// ID of this [`Note`].
    pub id: Id,

    /// ID of the [`Project`] this [`Note`] belongs to.
    pub project_id: project::Id,

    /// [`Title`] of this [`Note`].
    pub title: Title,

    /// [`Category`] this [`Note`] is grouped under.
    pub category: Category,

    /// [`Content`] of this [`Note`].
    pub content: Content,

    /// Indicator whether this [`Note`] is pinned atop its [`Category`].
    pub pinned: bool,

    /// [`DateTime`] when this [`Note`] was last changed.
    pub updated_at: UpdateDateTime,
}

/// ID of a [`Note`].
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

/// Title of a [`Note`].
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

/// Category a [`Note`] is grouped under.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Category(String);

impl Category {
    /// Creates a new [`Category`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `category` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(category: impl Into<String>) -> Self {
        Self(category.into())
    }

    /// Creates a new [`Category`] if the given `category` is valid.
    #[must_use]
    pub fn new(category: impl Into<String>) -> Option<Self> {
        let category = category.into();
        Self::check(&category).then_some(Self(category))
    }

    /// Checks whether the given `category` is a valid [`Category`].
    fn check(category: impl AsRef<str>) -> bool {
        let category = category.as_ref();
        category.trim() == category
            && !category.is_empty()
            && category.len() <= 512
    }
}

impl FromStr for Category {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Category`")
    }
}

/// Content of a [`Note`].
///
/// Carries an opaque rich-text document produced by the client and passed
/// through unchanged.
#[derive(AsRef, Clone, Debug, Default, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Content(String);

impl Content {
    /// Creates a new [`Content`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `content` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    /// Creates a new [`Content`] if the given `content` is valid.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        Self::check(&content).then_some(Self(content))
    }

    /// Checks whether the given `content` is a valid [`Content`].
    fn check(content: impl AsRef<str>) -> bool {
        content.as_ref().len() <= 65_536
    }
}

impl FromStr for Content {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Content`")
    }
}

/// [`DateTime`] when a [`Note`] was last changed.
pub type UpdateDateTime = DateTimeOf<(Note, unit::Update)>;
