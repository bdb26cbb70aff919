//! [`Command`] for creating a new [`KanbanTask`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::kanban::{Status, Title};
use crate::{
    domain::{kanban, project, user, KanbanTask, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`KanbanTask`].
#[derive(Clone, Debug, From)]
pub struct CreateKanbanTask {
    /// ID of the [`Project`] to create the [`KanbanTask`] in.
    pub project_id: project::Id,

    /// ID of the [`User`] performing the creation.
    ///
    /// A [`Project`] owned by another [`User`] is reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// [`Title`] of the new [`KanbanTask`].
    pub title: kanban::Title,

    /// [`Status`] of the new [`KanbanTask`], if different from the default
    /// one.
    pub status: Option<kanban::Status>,
}

impl<Db> Command<CreateKanbanTask> for Service<Db>
where
    Db: Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<KanbanTask>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = KanbanTask;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateKanbanTask,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateKanbanTask {
            project_id,
            initiator_id,
            title,
            status,
        } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<Project>, _>::new(project_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|p| p.user_id == initiator_id)
                .ok_or(E::ProjectNotExists(project_id))
                .map_err(tracerr::wrap!())?,
        );

        let task = KanbanTask {
            id: kanban::Id::new(),
            project_id,
            title,
            status: status.unwrap_or_default(),
            subtasks: vec![],
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(task.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(task)
    }
}

/// Error of [`CreateKanbanTask`] [`Command`] execution.
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
