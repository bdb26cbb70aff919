//! [`Command`] for toggling today's completion of a [`DailyTask`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{daily, project, user, DailyTask, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for toggling today's completion of a [`DailyTask`].
///
/// Flips the done state of today's entry in the completion ledger,
/// creating the entry as done when it is missing. Entries of past days
/// are never touched.
#[derive(Clone, Copy, Debug, From)]
pub struct ToggleDailyTask {
    /// ID of the [`DailyTask`] to toggle.
    pub task_id: daily::Id,

    /// ID of the [`User`] performing the toggle.
    ///
    /// A [`DailyTask`] of a [`Project`] owned by another [`User`] is
    /// reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,
}

impl<Db> Command<ToggleDailyTask> for Service<Db>
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
            Update<daily::Completion>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = DailyTask;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ToggleDailyTask,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleDailyTask {
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

        let date = Date::today();
        let done = tx
            .execute(Update(daily::Completion { task_id, date }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let _ = task.completions.insert(date, done);

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(task)
    }
}

/// Error of [`ToggleDailyTask`] [`Command`] execution.
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

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        Date,
    };

    use crate::{
        command::testing,
        domain::{user, DailyTask},
        Command as _,
    };

    use super::{ExecutionError as E, ToggleDailyTask};

    #[tokio::test]
    async fn toggles_today_back_and_forth() {
        let service = testing::service();
        let user_id = user::Id::new();
        let project = testing::project(user_id, "acme");
        let task = testing::daily_task(project.id, "stretch");
        service.database().execute(Insert(project)).await.unwrap();
        service
            .database()
            .execute(Insert(task.clone()))
            .await
            .unwrap();
        let cmd = ToggleDailyTask {
            task_id: task.id,
            initiator_id: user_id,
        };

        let toggled = service.execute(cmd).await.unwrap();
        assert!(toggled.is_done_on(Date::today()));

        let toggled = service.execute(cmd).await.unwrap();
        assert!(!toggled.is_done_on(Date::today()));

        let stored = service
            .database()
            .execute(Select(By::<Option<DailyTask>, _>::new(task.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.completions.len(), 1);
        assert_eq!(stored.completions.get(&Date::today()), Some(&false));
    }

    #[tokio::test]
    async fn leaves_past_days_untouched() {
        let service = testing::service();
        let user_id = user::Id::new();
        let project = testing::project(user_id, "acme");
        let mut task = testing::daily_task(project.id, "stretch");
        let yesterday = Date::today().previous().unwrap();
        let _ = task.completions.insert(yesterday, true);
        service.database().execute(Insert(project)).await.unwrap();
        service
            .database()
            .execute(Insert(task.clone()))
            .await
            .unwrap();

        let toggled = service
            .execute(ToggleDailyTask {
                task_id: task.id,
                initiator_id: user_id,
            })
            .await
            .unwrap();

        assert!(toggled.is_done_on(Date::today()));
        assert!(toggled.is_done_on(yesterday));
        assert_eq!(toggled.streak(Date::today()), 2);
    }

    #[tokio::test]
    async fn masks_foreign_tasks() {
        let service = testing::service();
        let project = testing::project(user::Id::new(), "acme");
        let task = testing::daily_task(project.id, "stretch");
        service.database().execute(Insert(project)).await.unwrap();
        service
            .database()
            .execute(Insert(task.clone()))
            .await
            .unwrap();

        let result = service
            .execute(ToggleDailyTask {
                task_id: task.id,
                initiator_id: user::Id::new(),
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::DailyTaskNotExists(_),
        ));
    }
}
