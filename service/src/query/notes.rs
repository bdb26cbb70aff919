//! [`Query`] collection related to the multiple [`Note`]s.

use common::operations::By;

use crate::domain::{project, Note};
#[cfg(doc)]
use crate::{domain::Project, Query};

use super::DatabaseQuery;

/// Queries all the [`Note`]s of a [`Project`].
pub type OfProject = DatabaseQuery<By<Vec<Note>, project::Id>>;
