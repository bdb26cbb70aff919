//! [`Command`] for toggling a [`Subtask`] of a [`KanbanTask`].

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

/// [`Command`] for toggling the done state of a [`Subtask`] of a
/// [`KanbanTask`].
#[derive(Clone, Copy, Debug, From)]
pub struct ToggleKanbanSubtask {
    /// ID of the [`KanbanTask`] owning the [`Subtask`].
    pub task_id: kanban::Id,

    /// Zero-based index of the [`Subtask`] in the [`KanbanTask`].
    pub index: u16,

    /// ID of the [`User`] performing the toggle.
    ///
    /// A [`KanbanTask`] of a [`Project`] owned by another [`User`] is
    /// reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,
}

impl<Db> Command<ToggleKanbanSubtask> for Service<Db>
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
        cmd: ToggleKanbanSubtask,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleKanbanSubtask {
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

        let subtask = task
            .subtasks
            .get_mut(usize::from(index))
            .ok_or(E::SubtaskNotExists(index))
            .map_err(tracerr::wrap!())?;
        subtask.done = !subtask.done;

        tx.execute(Update(task.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(task)
    }
}

/// Error of [`ToggleKanbanSubtask`] [`Command`] execution.
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

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        command::testing,
        domain::{
            kanban::{self, Subtask},
            user, KanbanTask,
        },
        Command as _,
    };

    use super::{ExecutionError as E, ToggleKanbanSubtask};

    fn subtask(title: &str, done: bool) -> Subtask {
        Subtask {
            title: kanban::Title::new(title).unwrap(),
            done,
        }
    }

    #[tokio::test]
    async fn flips_only_the_addressed_subtask() {
        let service = testing::service();
        let user_id = user::Id::new();
        let project = testing::project(user_id, "acme");
        let mut task = testing::kanban_task(project.id, "ship v1");
        task.subtasks =
            vec![subtask("write docs", false), subtask("tag release", true)];
        service.database().execute(Insert(project)).await.unwrap();
        service
            .database()
            .execute(Insert(task.clone()))
            .await
            .unwrap();

        let toggled = service
            .execute(ToggleKanbanSubtask {
                task_id: task.id,
                index: 0,
                initiator_id: user_id,
            })
            .await
            .unwrap();

        assert!(toggled.subtasks[0].done);
        assert!(toggled.subtasks[1].done);
        let stored = service
            .database()
            .execute(Select(By::<Option<KanbanTask>, _>::new(task.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.subtasks[0].done);

        let toggled = service
            .execute(ToggleKanbanSubtask {
                task_id: task.id,
                index: 0,
                initiator_id: user_id,
            })
            .await
            .unwrap();
        assert!(!toggled.subtasks[0].done);
    }

    #[tokio::test]
    async fn rejects_out_of_range_index() {
        let service = testing::service();
        let user_id = user::Id::new();
        let project = testing::project(user_id, "acme");
        let mut task = testing::kanban_task(project.id, "ship v1");
        task.subtasks = vec![subtask("write docs", false)];
        service.database().execute(Insert(project)).await.unwrap();
        service
            .database()
            .execute(Insert(task.clone()))
            .await
            .unwrap();

        let result = service
            .execute(ToggleKanbanSubtask {
                task_id: task.id,
                index: 1,
                initiator_id: user_id,
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::SubtaskNotExists(1),
        ));
    }

    #[tokio::test]
    async fn masks_foreign_tasks() {
        let service = testing::service();
        let project = testing::project(user::Id::new(), "acme");
        let mut task = testing::kanban_task(project.id, "ship v1");
        task.subtasks = vec![subtask("write docs", false)];
        service.database().execute(Insert(project)).await.unwrap();
        service
            .database()
            .execute(Insert(task.clone()))
            .await
            .unwrap();

        let result = service
            .execute(ToggleKanbanSubtask {
                task_id: task.id,
                index: 0,
                initiator_id: user::Id::new(),
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::KanbanTaskNotExists(_),
        ));
    }
}
