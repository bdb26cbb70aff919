//! [`Query`] collection related to the multiple [`Income`]s.

use common::operations::By;

use crate::{domain::user, read};
#[cfg(doc)]
use crate::{
    domain::{Income, User},
    Query,
};

use super::DatabaseQuery;

/// Queries a list of [`Income`]s.
pub type List =
    DatabaseQuery<By<read::income::list::Page, read::income::list::Selector>>;

/// Queries total count of [`Income`]s of a [`User`].
pub type TotalCount =
    DatabaseQuery<By<read::income::list::TotalCount, user::Id>>;
