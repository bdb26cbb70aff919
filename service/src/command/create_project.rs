//! [`Command`] for creating a new [`Project`].

use common::operations::{Commit, Insert, Transact, Transacted};
use derive_more::From;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::project::{Color, Name};
use crate::{
    domain::{project, user, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Project`].
///
/// A new [`Project`] is created inactive, with an empty [`project::Note`],
/// and becomes active only via [`SwitchActiveProject`].
///
/// [`SwitchActiveProject`]: super::SwitchActiveProject
#[derive(Clone, Debug, From)]
pub struct CreateProject {
    /// ID of the [`User`] owning the new [`Project`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// [`Name`] of the new [`Project`].
    pub name: project::Name,

    /// [`Color`] of the new [`Project`], if different from the default
    /// one.
    pub color: Option<project::Color>,
}

impl<Db> Command<CreateProject> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Project>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Project;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateProject) -> Result<Self::Ok, Self::Err> {
        let CreateProject {
            user_id,
            name,
            color,
        } = cmd;

        let project = Project {
            id: project::Id::new(),
            user_id,
            name,
            color: color.unwrap_or_default(),
            note: project::Note::default(),
            is_active: false,
            switched_at: vec![],
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        tx.execute(Insert(project.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(project)
    }
}

/// Error of [`CreateProject`] [`Command`] execution.
pub type ExecutionError = database::Error;
