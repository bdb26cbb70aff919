//! [`Command`] for switching the active [`Project`] of a [`User`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{project, user, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for switching the active [`Project`] of a [`User`].
///
/// Deactivates every other [`Project`] of the [`User`], activates the
/// chosen one, and appends the switch moment to its history. The switch
/// moment is appended even when the chosen [`Project`] is active already.
#[derive(Clone, Copy, Debug, From)]
pub struct SwitchActiveProject {
    /// ID of the [`Project`] to activate.
    pub project_id: project::Id,

    /// ID of the [`User`] performing the switch.
    ///
    /// A [`Project`] owned by another [`User`] is reported as not existing.
    pub initiator_id: user::Id,
}

impl<Db> Command<SwitchActiveProject> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Vec<Project>, user::Id>>,
            Ok = Vec<Project>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Project, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Project>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Project;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SwitchActiveProject,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SwitchActiveProject {
            project_id,
            initiator_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent switches upon the same set of `Project`s.
        tx.execute(Lock(By::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let projects = tx
            .execute(Select(By::<Vec<Project>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut target = None;
        let mut others = vec![];
        for project in projects {
            if project.id == project_id {
                target = Some(project);
            } else {
                others.push(project);
            }
        }
        let mut target = target
            .ok_or(E::ProjectNotExists(project_id))
            .map_err(tracerr::wrap!())?;

        for mut project in others {
            if project.is_active {
                project.is_active = false;
                tx.execute(Update(project))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
            }
        }

        target.is_active = true;
        target.switched_at.push(DateTime::now().coerce());
        tx.execute(Update(target.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(target)
    }
}

/// Error of [`SwitchActiveProject`] [`Command`] execution.
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
    use common::operations::{By, Insert, Select};

    use crate::{
        command::testing,
        domain::{user, Project},
        Command as _,
    };

    use super::{ExecutionError as E, SwitchActiveProject};

    #[tokio::test]
    async fn activates_target_and_deactivates_the_rest() {
        let service = testing::service();
        let user_id = user::Id::new();
        let mut old = testing::project(user_id, "acme");
        old.is_active = true;
        let new = testing::project(user_id, "lab");
        service.database().execute(Insert(old)).await.unwrap();
        service.database().execute(Insert(new.clone())).await.unwrap();

        let switched = service
            .execute(SwitchActiveProject {
                project_id: new.id,
                initiator_id: user_id,
            })
            .await
            .unwrap();

        assert!(switched.is_active);
        assert_eq!(switched.switched_at.len(), 1);
        let projects = service
            .database()
            .execute(Select(By::<Vec<Project>, _>::new(user_id)))
            .await
            .unwrap();
        assert_eq!(projects.len(), 2);
        for p in &projects {
            assert_eq!(p.is_active, p.id == new.id, "`{}`", p.name);
        }
    }

    #[tokio::test]
    async fn switching_to_the_active_project_appends_history() {
        let service = testing::service();
        let user_id = user::Id::new();
        let project = testing::project(user_id, "acme");
        let cmd = SwitchActiveProject {
            project_id: project.id,
            initiator_id: user_id,
        };
        service.database().execute(Insert(project)).await.unwrap();

        drop(service.execute(cmd).await.unwrap());
        let switched = service.execute(cmd).await.unwrap();

        assert!(switched.is_active);
        assert_eq!(switched.switched_at.len(), 2);
    }

    #[tokio::test]
    async fn rejects_foreign_project() {
        let service = testing::service();
        let owner_id = user::Id::new();
        let project = testing::project(owner_id, "acme");
        service
            .database()
            .execute(Insert(project.clone()))
            .await
            .unwrap();

        let result = service
            .execute(SwitchActiveProject {
                project_id: project.id,
                initiator_id: user::Id::new(),
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::ProjectNotExists(_),
        ));
        let stored = service
            .database()
            .execute(Select(By::<Vec<Project>, _>::new(owner_id)))
            .await
            .unwrap();
        assert!(!stored[0].is_active);
    }
}
