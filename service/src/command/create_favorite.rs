//! [`Command`] for creating a new [`Favorite`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
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

/// [`Command`] for creating a new [`Favorite`].
#[derive(Clone, Debug, From)]
pub struct CreateFavorite {
    /// ID of the [`Project`] to create the [`Favorite`] in.
    pub project_id: project::Id,

    /// ID of the [`User`] performing the creation.
    ///
    /// A [`Project`] owned by another [`User`] is reported as not existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// [`Title`] of the new [`Favorite`].
    pub title: favorite::Title,

    /// [`Url`] the new [`Favorite`] points to.
    pub url: favorite::Url,

    /// [`Category`] of the new [`Favorite`].
    pub category: favorite::Category,
}

impl<Db> Command<CreateFavorite> for Service<Db>
where
    Db: Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Favorite>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Favorite;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateFavorite,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateFavorite {
            project_id,
            initiator_id,
            title,
            url,
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

        let favorite = Favorite {
            id: favorite::Id::new(),
            project_id,
            title,
            url,
            category,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(favorite.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(favorite)
    }
}

/// Error of [`CreateFavorite`] [`Command`] execution.
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
