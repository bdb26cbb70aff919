//! [`Command`] for adding a [`Subtask`] to a [`KanbanTask`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::kanban::Title;
use crate::{
    domain::{
        kanban::{self, Subtask},
        project, user, KanbanTask, Project,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a [`Subtask`] to a [`KanbanTask`].
///
/// The new [`Subtask`] is appended to the end of the list, not done.
#[derive(Clone, Debug, From)]
pub struct CreateKanbanSubtask {
    /// ID of the [`KanbanTask`] to add the [`Subtask`] to.
    pub task_id: kanban::Id,

    /// ID of the [`User`] performing the addition.
    ///
    /// A [`KanbanTask`] of a [`Project`] owned by another [`User`] is
    /// reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// [`Title`] of the new [`Subtask`].
    pub title: kanban::Title,
}

impl<Db> Command<CreateKanbanSubtask> for Service<Db>
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
        cmd: CreateKanbanSubtask,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateKanbanSubtask {
            task_id,
            initiator_id,
            title,
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

        task.subtasks.push(Subtask { title, done: false });
        tx.execute(Update(task.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(task)
    }
}

/// Error of [`CreateKanbanSubtask`] [`Command`] execution.
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
