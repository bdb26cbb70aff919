//! [`Query`] collection related to the multiple [`Project`]s.

use common::operations::By;

use crate::domain::{user, Project};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries all the [`Project`]s of a [`User`].
pub type OfUser = DatabaseQuery<By<Vec<Project>, user::Id>>;
