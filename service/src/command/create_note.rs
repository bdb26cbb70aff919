//! [`Command`] for creating a new [`Note`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::note::{Category, Title};
use crate::{
    domain::{note, project, user, Note, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Note`].
///
/// A new [`Note`] starts with an empty [`note::Content`], not pinned.
#[derive(Clone, Debug, From)]
pub struct CreateNote {
    /// ID of the [`Project`] to create the [`Note`] in.
    pub project_id: project::Id,

    /// ID of the [`User`] performing the creation.
    ///
    /// A [`Project`] owned by another [`User`] is reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// [`Title`] of the new [`Note`].
    pub title: note::Title,

    /// [`Category`] of the new [`Note`].
    pub category: note::Category,
}

impl<Db> Command<CreateNote> for Service<Db>
where
    Db: Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Note>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Note;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateNote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateNote {
            project_id,
            initiator_id,
            title,
            category,
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

        let note = Note {
            id: note::Id::new(),
            project_id,
            title,
            category,
            content: note::Content::default(),
            pinned: false,
            updated_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(note.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(note)
    }
}

/// Error of [`CreateNote`] [`Command`] execution.
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
