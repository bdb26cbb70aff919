//! [`Query`] collection related to the multiple [`KanbanTask`]s.

use common::operations::By;

use crate::domain::{project, KanbanTask};
#[cfg(doc)]
use crate::{domain::Project, Query};

use super::DatabaseQuery;

/// Queries all the [`KanbanTask`]s of a [`Project`].
pub type OfProject = DatabaseQuery<By<Vec<KanbanTask>, project::Id>>;
