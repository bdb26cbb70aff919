//! [`Command`] for materializing today's completions of a [`Project`].

use common::{
    operations::{By, Insert, Select},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::DailyTask;
use crate::{
    domain::{daily, project, user, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for materializing today's completions of a [`Project`].
///
/// Adds a not-done entry for today to the completion ledger of every
/// [`DailyTask`] of the [`Project`] lacking one. Existing entries are
/// kept intact, so repeating this [`Command`] is a no-op, and a
/// completion toggled earlier today is never reset.
#[derive(Clone, Copy, Debug, From)]
pub struct EnsureDailyCompletions {
    /// ID of the [`Project`] which [`DailyTask`]s' ledgers should gain
    /// today's entry.
    pub project_id: project::Id,

    /// ID of the [`User`] performing the materialization.
    ///
    /// A [`Project`] owned by another [`User`] is reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,
}

impl<Db> Command<EnsureDailyCompletions> for Service<Db>
where
    Db: Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<daily::Today>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: EnsureDailyCompletions,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let EnsureDailyCompletions {
            project_id,
            initiator_id,
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

        self.database()
            .execute(Insert(daily::Today {
                project_id,
                date: Date::today(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(())
    }
}

/// Error of [`EnsureDailyCompletions`] [`Command`] execution.
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

    use super::{EnsureDailyCompletions, ExecutionError as E};

    #[tokio::test]
    async fn seeds_missing_marks_without_touching_existing_ones() {
        let service = testing::service();
        let user_id = user::Id::new();
        let project = testing::project(user_id, "acme");
        let seeded = testing::daily_task(project.id, "stretch");
        let mut done = testing::daily_task(project.id, "inbox zero");
        let _ = done.completions.insert(Date::today(), true);
        service.database().execute(Insert(project.clone())).await.unwrap();
        service
            .database()
            .execute(Insert(seeded.clone()))
            .await
            .unwrap();
        service
            .database()
            .execute(Insert(done.clone()))
            .await
            .unwrap();

        service
            .execute(EnsureDailyCompletions {
                project_id: project.id,
                initiator_id: user_id,
            })
            .await
            .unwrap();

        let stored = service
            .database()
            .execute(Select(By::<Option<DailyTask>, _>::new(seeded.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.completions.get(&Date::today()), Some(&false));
        let stored = service
            .database()
            .execute(Select(By::<Option<DailyTask>, _>::new(done.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_done_on(Date::today()));
    }

    #[tokio::test]
    async fn repeating_is_a_noop() {
        let service = testing::service();
        let user_id = user::Id::new();
        let project = testing::project(user_id, "acme");
        let task = testing::daily_task(project.id, "stretch");
        service.database().execute(Insert(project.clone())).await.unwrap();
        service
            .database()
            .execute(Insert(task.clone()))
            .await
            .unwrap();
        let cmd = EnsureDailyCompletions {
            project_id: project.id,
            initiator_id: user_id,
        };

        service.execute(cmd).await.unwrap();
        service.execute(cmd).await.unwrap();

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
    async fn rejects_foreign_project() {
        let service = testing::service();
        let project = testing::project(user::Id::new(), "acme");
        service
            .database()
            .execute(Insert(project.clone()))
            .await
            .unwrap();

        let result = service
            .execute(EnsureDailyCompletions {
                project_id: project.id,
                initiator_id: user::Id::new(),
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::ProjectNotExists(_),
        ));
    }
}
