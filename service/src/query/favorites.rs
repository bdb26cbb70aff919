//! [`Query`] collection related to the multiple [`Favorite`]s.

use common::operations::By;

use crate::domain::{project, Favorite};
#[cfg(doc)]
use crate::{domain::Project, Query};

use super::DatabaseQuery;

/// Queries all the [`Favorite`]s of a [`Project`].
pub type OfProject = DatabaseQuery<By<Vec<Favorite>, project::Id>>;
