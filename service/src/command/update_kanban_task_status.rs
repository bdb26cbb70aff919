//! [`Command`] for updating a [`kanban::Status`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::kanban::Status;
use crate::{
    domain::{kanban, project, user, KanbanTask, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`kanban::Status`].
#[derive(Clone, Copy, Debug, From)]
pub struct UpdateKanbanTaskStatus {
    /// ID of the [`KanbanTask`] which [`Status`] should be updated.
    pub task_id: kanban::Id,

    /// ID of the [`User`] performing the update.
    ///
    /// A [`KanbanTask`] of a [`Project`] owned by another [`User`] is
    /// reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// New [`Status`] of the [`KanbanTask`].
    pub status: kanban::Status,
}

impl<Db> Command<UpdateKanbanTaskStatus> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<KanbanTask>, kanban::Id>>,
            Ok = Option<KanbanTask>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<KanbanTask, kanban::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<KanbanTask>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = KanbanTask;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateKanbanTaskStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateKanbanTaskStatus {
            task_id,
            initiator_id,
            status,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `KanbanTask`.
        tx.execute(Lock(By::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut task = tx
            .execute(Select(By::<Option<KanbanTask>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::KanbanTaskNotExists(task_id))
            .map_err(tracerr::wrap!())?;
        drop(
            tx.execute(Select(By::<Option<Project>, _>::new(task.project_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|p| p.user_id == initiator_id)
                .ok_or(E::KanbanTaskNotExists(task_id))
                .map_err(tracerr::wrap!())?,
        );

        task.status = status;
        tx.execute(Update(task.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(task)
    }
}

/// Error of [`UpdateKanbanTaskStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`KanbanTask`] doesn't exist.
    #[display("`KanbanTask(id: {_0})` does not exist")]
    #[from(ignore)]
    KanbanTaskNotExists(#[error(not(source))] kanban::Id),
}
