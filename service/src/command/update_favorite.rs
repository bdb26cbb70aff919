//! [`Command`] for updating a [`Favorite`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::favorite::{Category, Title, Url};
use crate::{
    domain::{favorite, project, user, Favorite, Project},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`Favorite`].
#[derive(Clone, Debug, From)]
pub struct UpdateFavorite {
    /// ID of the [`Favorite`] to update.
    pub favorite_id: favorite::Id,

    /// ID of the [`User`] performing the update.
    ///
    /// A [`Favorite`] of a [`Project`] owned by another [`User`] is
    /// reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// New [`Title`] of the [`Favorite`].
    pub title: favorite::Title,

    /// New [`Url`] of the [`Favorite`].
    pub url: favorite::Url,

    /// New [`Category`] of the [`Favorite`].
    pub category: favorite::Category,
}

impl<Db> Command<UpdateFavorite> for Service<Db>
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
        > + Database<Update<Favorite>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Favorite;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateFavorite,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateFavorite {
            favorite_id,
            initiator_id,
            title,
            url,
            category,
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

        let mut favorite = tx
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

        favorite.title = title;
        favorite.url = url;
        favorite.category = category;
        tx.execute(Update(favorite.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(favorite)
    }
}

/// Error of [`UpdateFavorite`] [`Command`] execution.
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
