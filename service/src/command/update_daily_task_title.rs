//! [`Command`] for updating a [`daily::Title`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::daily::Title;
use crate::{
    domain::{daily, project, user, DailyTask, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`daily::Title`].
#[derive(Clone, Debug, From)]
pub struct UpdateDailyTaskTitle {
    /// ID of the [`DailyTask`] which [`Title`] should be updated.
    pub task_id: daily::Id,

    /// ID of the [`User`] performing the update.
    ///
    /// A [`DailyTask`] of a [`Project`] owned by another [`User`] is
    /// reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// New [`Title`] of the [`DailyTask`].
    pub title: daily::Title,
}

impl<Db> Command<UpdateDailyTaskTitle> for Service<Db>
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
        > + Database<Update<DailyTask>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = DailyTask;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateDailyTaskTitle,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateDailyTaskTitle {
            task_id,
            initiator_id,
            title,
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

        let mut task = tx
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

        task.title = title;
        tx.execute(Update(task.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(task)
    }
}

/// Error of [`UpdateDailyTaskTitle`] [`Command`] execution.
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
