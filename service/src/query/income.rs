//! [`Query`] collection related to a single [`Income`].

use common::operations::By;

use crate::domain::{income, Income};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Income`] by its [`income::Id`].
pub type ById = DatabaseQuery<By<Option<Income>, income::Id>>;
