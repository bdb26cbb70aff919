//! [`Command`] for updating a [`Title`] and [`Category`] of a [`Note`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
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

/// [`Command`] for updating a [`Title`] and [`Category`] of a [`Note`].
///
/// Refreshes the update moment of the [`Note`].
#[derive(Clone, Debug, From)]
pub struct UpdateNoteMeta {
    /// ID of the [`Note`] to update.
    pub note_id: note::Id,

    /// ID of the [`User`] performing the update.
    ///
    /// A [`Note`] of a [`Project`] owned by another [`User`] is reported
    /// as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// New [`Title`] of the [`Note`].
    pub title: note::Title,

    /// New [`Category`] of the [`Note`].
    pub category: note::Category,
}

impl<Db> Command<UpdateNoteMeta> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Note>, note::Id>>,
            Ok = Option<Note>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Note, note::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Note>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Note;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateNoteMeta,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateNoteMeta {
            note_id,
            initiator_id,
            title,
            category,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Note`.
        tx.execute(Lock(By::new(note_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut note = tx
            .execute(Select(By::<Option<Note>, _>::new(note_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NoteNotExists(note_id))
            .map_err(tracerr::wrap!())?;
        drop(
            tx.execute(Select(By::<Option<Project>, _>::new(note.project_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|p| p.user_id == initiator_id)
                .ok_or(E::NoteNotExists(note_id))
                .map_err(tracerr::wrap!())?,
        );

        note.title = title;
        note.category = category;
        note.updated_at = DateTime::now().coerce();
        tx.execute(Update(note.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(note)
    }
}

/// Error of [`UpdateNoteMeta`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Note`] doesn't exist.
    #[display("`Note(id: {_0})` does not exist")]
    #[from(ignore)]
    NoteNotExists(#[error(not(source))] note::Id),
}
