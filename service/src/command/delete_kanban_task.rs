//! [`Command`] for deleting a [`KanbanTask`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{kanban, project, user, KanbanTask, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`KanbanTask`].
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteKanbanTask {
    /// ID of the [`KanbanTask`] to delete.
    pub task_id: kanban::Id,

    /// ID of the [`User`] performing the deletion.
    ///
    /// A [`KanbanTask`] of a [`Project`] owned by another [`User`] is
    /// reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,
}

impl<Db> Command<DeleteKanbanTask> for Service<Db>
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
        > + Database<
            Delete<By<KanbanTask, kanban::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteKanbanTask,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteKanbanTask {
            task_id,
            initiator_id,
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

        let task = tx
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

        tx.execute(Delete(By::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(())
    }
}

/// Error of [`DeleteKanbanTask`] [`Command`] execution.
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
