//! [`Command`] for deleting a [`Favorite`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{favorite, project, user, Favorite, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Favorite`].
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteFavorite {
    /// ID of the [`Favorite`] to delete.
    pub favorite_id: favorite::Id,

    /// ID of the [`User`] performing the deletion.
    ///
    /// A [`Favorite`] of a [`Project`] owned by another [`User`] is
    /// reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,
}

impl<Db> Command<DeleteFavorite> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Favorite>, favorite::Id>>,
            Ok = Option<Favorite>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Favorite, favorite::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Favorite, favorite::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteFavorite,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteFavorite {
            favorite_id,
            initiator_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Favorite`.
        tx.execute(Lock(By::new(favorite_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let favorite = tx
            .execute(Select(By::<Option<Favorite>, _>::new(favorite_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::FavoriteNotExists(favorite_id))
            .map_err(tracerr::wrap!())?;
        drop(
            tx.execute(Select(By::<Option<Project>, _>::new(
                favorite.project_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|p| p.user_id == initiator_id)
            .ok_or(E::FavoriteNotExists(favorite_id))
            .map_err(tracerr::wrap!())?,
        );

        tx.execute(Delete(By::new(favorite_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(())
    }
}

/// Error of [`DeleteFavorite`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Favorite`] doesn't exist.
    #[display("`Favorite(id: {_0})` does not exist")]
    #[from(ignore)]
    FavoriteNotExists(#[error(not(source))] favorite::Id),
}
