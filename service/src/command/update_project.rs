//! [`Command`] for updating a [`Project`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::project::{Color, Name, Note};
use crate::{
    domain::{project, user, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`Project`].
///
/// Fields left as [`None`] are kept intact.
#[derive(Clone, Debug, From)]
pub struct UpdateProject {
    /// ID of the [`Project`] to update.
    pub project_id: project::Id,

    /// ID of the [`User`] performing the update.
    ///
    /// A [`Project`] owned by another [`User`] is reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// New [`Name`] of the [`Project`].
    pub name: Option<project::Name>,

    /// New [`Color`] of the [`Project`].
    pub color: Option<project::Color>,

    /// New [`Note`] of the [`Project`].
    pub note: Option<project::Note>,
}

impl<Db> Command<UpdateProject> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Project, project::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Project>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Project;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateProject) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProject {
            project_id,
            initiator_id,
            name,
            color,
            note,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Project`.
        tx.execute(Lock(By::new(project_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut project = tx
            .execute(Select(By::<Option<Project>, _>::new(project_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|p| p.user_id == initiator_id)
            .ok_or(E::ProjectNotExists(project_id))
            .map_err(tracerr::wrap!())?;

        if let Some(name) = name {
            project.name = name;
        }
        if let Some(color) = color {
            project.color = color;
        }
        if let Some(note) = note {
            project.note = note;
        }

        tx.execute(Update(project.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(project)
    }
}

/// Error of [`UpdateProject`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Project`] doesn't exist.
    #[display("`Project(id: {_0})` does not exist")]
    #[from(ignore)]
    ProjectNotExists(#[error(not(source))] project::Id),
}
