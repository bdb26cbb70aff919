//! [`Project`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Workspace a [`User`] organizes one work engagement in.
#[derive(Clone, Debug)]
pub struct Project {
    /// ID of this [`Project`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Project`].
    pub user_id: user::Id,

    /// [`Name`] of this [`Project`].
    pub name: Name,

    /// Accent [`Color`] of this [`Project`].
    pub color: Color,

    /// Scratchpad [`Note`] of this [`Project`].
    pub note: Note,

    /// Indicator whether this [`Project`] is the one being worked in.
    ///
    /// At most one [`Project`] per [`User`] is active at a time.
    pub is_active: bool,

    /// [`DateTime`]s when this [`Project`] was switched to.
    pub switched_at: Vec<SwitchDateTime>,
}

/// ID of a [`Project`].
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

/// Name of a [`Project`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Accent color of a [`Project`], as a `#rrggbb` hex triplet.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Color(String);

impl Default for Color {
    fn default() -> Self {
        Self("#ffffff".into())
    }
}

impl Color {
    /// Creates a new [`Color`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `color` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(color: impl Into<String>) -> Self {
        Self(color.into())
    }

    /// Creates a new [`Color`] if the given `color` is valid.
    #[must_use]
    pub fn new(color: impl Into<String>) -> Option<Self> {
        let color = color.into();
        Self::check(&color).then_some(Self(color))
    }

    /// Checks whether the given `color` is a valid [`Color`].
    fn check(color: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Color`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new("^#[0-9a-fA-F]{6}$").expect("valid regex")
        });

        REGEX.is_match(color.as_ref())
    }
}

impl FromStr for Color {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Color`")
    }
}

/// Scratchpad note of a [`Project`].
///
/// Carries an opaque rich-text document produced by the client and passed
/// through unchanged.
#[derive(AsRef, Clone, Debug, Default, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Note(String);

impl Note {
    /// Creates a new [`Note`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `note` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(note: impl Into<String>) -> Self {
        Self(note.into())
    }

    /// Creates a new [`Note`] if the given `note` is valid.
    #[must_use]
    pub fn new(note: impl Into<String>) -> Option<Self> {
        let note = note.into();
        Self::check(&note).then_some(Self(note))
    }

    /// Checks whether the given `note` is a valid [`Note`].
    fn check(note: impl AsRef<str>) -> bool {
        note.as_ref().len() <= 65_536
    }
}

impl FromStr for Note {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Note`")
    }
}

/// [`DateTime`] when a [`Project`] was switched to.
pub type SwitchDateTime = DateTimeOf<(Project, unit::Switch)>;
