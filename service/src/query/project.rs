//! [`Query`] collection related to a single [`Project`].

use common::operations::By;

use crate::domain::{project, Project};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Project`] by its [`project::Id`].
pub type ById = DatabaseQuery<By<Option<Project>, project::Id>>;
