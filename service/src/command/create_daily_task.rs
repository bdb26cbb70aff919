//! [`Command`] for creating a new [`DailyTask`].

use std::collections::BTreeMap;

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    Date, DateTime,
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

/// [`Command`] for creating a new [`DailyTask`].
///
/// The new [`DailyTask`] starts with a single not-done completion for
/// today, so it shows up in today's checklist right away.
#[derive(Clone, Debug, From)]
pub struct CreateDailyTask {
    /// ID of the [`Project`] to create the [`DailyTask`] in.
    pub project_id: project::Id,

    /// ID of the [`User`] performing the creation.
    ///
    /// A [`Project`] owned by another [`User`] is reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// [`Title`] of the new [`DailyTask`].
    pub title: daily::Title,
}

impl<Db> Command<CreateDailyTask> for Service<Db>
where
    Db: Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<DailyTask>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = DailyTask;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateDailyTask,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateDailyTask {
            project_id,
            initiator_id,
            title,
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

        let task = DailyTask {
            id: daily::Id::new(),
            project_id,
            title,
            completions: BTreeMap::from([(Date::today(), false)]),
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

/// Error of [`CreateDailyTask`] [`Command`] execution.
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
