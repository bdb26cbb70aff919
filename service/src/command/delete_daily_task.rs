//! [`Command`] for deleting a [`DailyTask`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{daily, project, user, DailyTask, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`DailyTask`].
///
/// Deletes the [`DailyTask`] along with its whole completion ledger.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteDailyTask {
    /// ID of the [`DailyTask`] to delete.
    pub task_id: daily::Id,

    /// ID of the [`User`] performing the deletion.
    ///
    /// A [`DailyTask`] of a [`Project`] owned by another [`User`] is
    /// reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,
}

impl<Db> Command<DeleteDailyTask> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<DailyTask>, daily::Id>>,
            Ok = Option<DailyTask>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<DailyTask, daily::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<DailyTask, daily::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteDailyTask,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteDailyTask {
            task_id,
            initiator_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `DailyTask`.
        tx.execute(Lock(By::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let task = tx
            .execute(Select(By::<Option<DailyTask>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::DailyTaskNotExists(task_id))
            .map_err(tracerr::wrap!())?;
        drop(
            tx.execute(Select(By::<Option<Project>, _>::new(task.project_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|p| p.user_id == initiator_id)
                .ok_or(E::DailyTaskNotExists(task_id))
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

/// Error of [`DeleteDailyTask`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`DailyTask`] doesn't exist.
    #[display("`DailyTask(id: {_0})` does not exist")]
    #[from(ignore)]
    DailyTaskNotExists(#[error(not(source))] daily::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
