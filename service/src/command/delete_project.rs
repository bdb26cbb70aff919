//! [`Command`] for deleting a [`Project`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{project, user, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Project`].
///
/// Deletes the [`Project`] along with everything attached to it: kanban
/// tasks, daily tasks with their completions, notes and favorites.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteProject {
    /// ID of the [`Project`] to delete.
    pub project_id: project::Id,

    /// ID of the [`User`] performing the deletion.
    ///
    /// A [`Project`] owned by another [`User`] is reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,
}

impl<Db> Command<DeleteProject> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Project, project::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Project, project::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteProject) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProject {
            project_id,
            initiator_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Project`.
        tx.execute(Lock(By::new(project_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        drop(
            tx.execute(Select(By::<Option<Project>, _>::new(project_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|p| p.user_id == initiator_id)
                .ok_or(E::ProjectNotExists(project_id))
                .map_err(tracerr::wrap!())?,
        );

        tx.execute(Delete(By::new(project_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(())
    }
}

/// Error of [`DeleteProject`] [`Command`] execution.
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
        domain::{DailyTask, Favorite, KanbanTask, Note, Project},
        Command as _,
    };

    use super::{DeleteProject, ExecutionError as E};

    #[tokio::test]
    async fn removes_the_project_with_everything_attached() {
        let service = testing::service();
        let user = testing::register(&service, "dev@example.com", "s3cret")
            .await;
        let project = testing::project(user.id, "Atlas");
        let task = testing::kanban_task(project.id, "Wire up CI");
        let habit = testing::daily_task(project.id, "Stand-up");
        let note = testing::note(project.id, "Meeting minutes");
        let favorite = testing::favorite(project.id, "Crate docs");
        let db = service.database();
        db.execute(Insert(project.clone())).await.unwrap();
        db.execute(Insert(task)).await.unwrap();
        db.execute(Insert(habit)).await.unwrap();
        db.execute(Insert(note)).await.unwrap();
        db.execute(Insert(favorite)).await.unwrap();

        service
            .execute(DeleteProject {
                project_id: project.id,
                initiator_id: user.id,
            })
            .await
            .unwrap();

        let gone = db
            .execute(Select(By::<Option<Project>, _>::new(project.id)))
            .await
            .unwrap();
        assert!(gone.is_none());
        let tasks = db
            .execute(Select(By::<Vec<KanbanTask>, _>::new(project.id)))
            .await
            .unwrap();
        assert!(tasks.is_empty());
        let habits = db
            .execute(Select(By::<Vec<DailyTask>, _>::new(project.id)))
            .await
            .unwrap();
        assert!(habits.is_empty());
        let notes = db
            .execute(Select(By::<Vec<Note>, _>::new(project.id)))
            .await
            .unwrap();
        assert!(notes.is_empty());
        let favorites = db
            .execute(Select(By::<Vec<Favorite>, _>::new(project.id)))
            .await
            .unwrap();
        assert!(favorites.is_empty());
    }

    #[tokio::test]
    async fn masks_foreign_project() {
        let service = testing::service();
        let owner = testing::register(&service, "dev@example.com", "s3cret")
            .await;
        let other = testing::register(&service, "qa@example.com", "s3cret")
            .await;
        let project = testing::project(owner.id, "Atlas");
        let db = service.database();
        db.execute(Insert(project.clone())).await.unwrap();

        let result = service
            .execute(DeleteProject {
                project_id: project.id,
                initiator_id: other.id,
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::ProjectNotExists(_),
        ));
        let stored = db
            .execute(Select(By::<Option<Project>, _>::new(project.id)))
            .await
            .unwrap();
        assert!(stored.is_some());
    }
}
