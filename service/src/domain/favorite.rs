//! [`Favorite`] definitions.

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

/// Bookmarked link kept in a [`Project`].
#[derive(Clone, Debug)]
pub struct Favorite {
    /// ID of this [`Favorite`].
    pub id: Id,

    /// ID of the [`Project`] this [`Favorite`] belongs to.
    pub project_id: project::Id,

    /// [`Title`] of this [`Favorite`].
    pub title: Title,

    /// [`Url`] this [`Favorite`] points at.
    pub url: Url,

    /// [`Category`] this [`Favorite`] is grouped under.
    pub category: Category,

    /// [`DateTime`] when this [`Favorite`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Favorite`].
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

/// Title of a [`Favorite`].
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

/// URL a [`Favorite`] points at.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Url(String);

impl Url {
    /// Creates a new [`Url`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `url` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Creates a new [`Url`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`Url`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        (url.starts_with("http://") || url.starts_with("https://"))
            && url.len() <= 2048
    }
}

impl FromStr for Url {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Url`")
    }
}

/// Category a [`Favorite`] is grouped under.
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

/// [`DateTime`] when a [`Favorite`] was created.
pub type CreationDateTime = DateTimeOf<(Favorite, unit::Creation)>;
