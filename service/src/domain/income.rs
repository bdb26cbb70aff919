//! [`Income`] definitions.

use common::Date;
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Freelance income record of a [`User`].
#[derive(Clone, Debug)]
pub struct Income {
    /// ID of this [`Income`].
    pub id: Id,

    /// ID of the [`User`] who earned this [`Income`].
    pub user_id: user::Id,

    /// [`Date`] this [`Income`] was received on.
    pub date: Date,

    /// [`Amount`] of this [`Income`].
    pub amount: Amount,

    /// [`Source`] this [`Income`] came from.
    pub source: Source,

    /// [`Product`] this [`Income`] was earned with.
    pub product: Product,
}

/// ID of an [`Income`].
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

/// Amount of an [`Income`], in the freelancer's bookkeeping currency.
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
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Amount(Decimal);

/// Site or stream an [`Income`] came from.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Source(String);

impl Source {
    /// Creates a new [`Source`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `source` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// Creates a new [`Source`] if the given `source` is valid.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Option<Self> {
        let source = source.into();
        Self::check(&source).then_some(Self(source))
    }

    /// Checks whether the given `source` is a valid [`Source`].
    fn check(source: impl AsRef<str>) -> bool {
        let source = source.as_ref();
        source.trim() == source && !source.is_empty() && source.len() <= 512
    }
}

impl FromStr for Source {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Source`")
    }
}

/// Product or service an [`Income`] was earned with.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Product(String);

impl Product {
    /// Creates a new [`Product`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `product` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(product: impl Into<String>) -> Self {
        Self(product.into())
    }

    /// Creates a new [`Product`] if the given `product` is valid.
    #[must_use]
    pub fn new(product: impl Into<String>) -> Option<Self> {
        let product = product.into();
        Self::check(&product).then_some(Self(product))
    }

    /// Checks whether the given `product` is a valid [`Product`].
    fn check(product: impl AsRef<str>) -> bool {
        let product = product.as_ref();
        product.trim() == product && !product.is_empty() && product.len() <= 512
    }
}

impl FromStr for Product {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Product`")
    }
}
