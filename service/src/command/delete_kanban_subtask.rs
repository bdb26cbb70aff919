//! [`Command`] for deleting a [`Subtask`] of a [`KanbanTask`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        kanban::{self, Subtask},
        project, user, KanbanTask, Project,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Subtask`] of a [`KanbanTask`].
///
/// [`Subtask`]s following the deleted one shift down by one index.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteKanbanSubtask {
    /// ID of the [`KanbanTask`] owning the [`Subtask`].
    pub task_id: kanban::Id,

    /// Zero-based index of the [`Subtask`] in the [`KanbanTask`].
    pub index: u16,

    /// ID of the [`User`] performing the deletion.
    ///
    /// A [`KanbanTask`] of a [`Project`] owned by another [`User`] is
    /// reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,
}

impl<Db> Command<DeleteKanbanSubtask> for Service<Db>
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
        cmd: DeleteKanbanSubtask,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteKanbanSubtask {
            task_id,
            index,
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

        if usize::from(index) >= task.subtasks.len() {
            return Err(tracerr::new!(E::SubtaskNotExists(index)));
        }
        drop(task.subtasks.remove(usize::from(index)));

        tx.execute(Update(task.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(task)
    }
}

/// Error of [`DeleteKanbanSubtask`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`KanbanTask`] doesn't exist.
    #[display("`KanbanTask(id: {_0})` does not exist")]
    #[from(ignore)]
    KanbanTaskNotExists(#[error(not(source))] kanban::Id),

    /// [`KanbanTask`] has no [`Subtask`] at the provided index.
    #[display("`KanbanTask` has no subtask at index {_0}")]
    #[from(ignore)]
    SubtaskNotExists(#[error(not(source))] u16),
}
