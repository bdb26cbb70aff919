//! [`Query`] collection related to the multiple [`DailyTask`]s.

use common::operations::By;

use crate::domain::{project, user, DailyTask};
#[cfg(doc)]
use crate::{
    domain::{Project, User},
    Query,
};

use super::DatabaseQuery;

/// Queries all the [`DailyTask`]s of a [`Project`].
pub type OfProject = DatabaseQuery<By<Vec<DailyTask>, project::Id>>;

/// Queries all the [`DailyTask`]s of all the [`Project`]s of a [`User`].
pub type OfUser = DatabaseQuery<By<Vec<DailyTask>, user::Id>>;
