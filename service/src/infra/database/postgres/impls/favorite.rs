//! [`Favorite`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{favorite, project, Favorite},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C, IDs> Database<Select<By<HashMap<favorite::Id, Favorite>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[favorite::Id]>,
{
    type Ok = HashMap<favorite::Id, Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<favorite::Id, Favorite>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[favorite::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, project_id, \
                   title, url, category, \
                   created_at \
            FROM favorites \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                (
                    id,
                    Favorite {
                        id,
                        project_id: row.get("project_id"),
                        title: row.get("title"),
                        url: row.get("url"),
                        category: row.get("category"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Favorite>, favorite::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<favorite::Id, Favorite>, [favorite::Id; 1]>>,
        Ok = HashMap<favorite::Id, Favorite>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Favorite>, favorite::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Favorite>, project::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<favorite::Id, Favorite>, Vec<favorite::Id>>>,
        Ok = HashMap<favorite::Id, Favorite>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Favorite>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let project_id: project::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM favorites \
            WHERE project_id = $1::UUID \
            ORDER BY created_at ASC, id ASC";
        let ids = self
            .query(SQL, &[&project_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<favorite::Id>>();

        let mut favorites = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids
            .into_iter()
            .filter_map(|id| favorites.remove(&id))
            .collect())
    }
}

impl<C> Database<Insert<Favorite>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Favorite>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(favorite): Insert<Favorite>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(favorite))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Favorite>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(favorite): Update<Favorite>,
    ) -> Result<Self::Ok, Self::Err> {
        let Favorite {
            id,
            project_id,
            title,
            url,
            category,
            created_at,
        } = favorite;

        const SQL: &str = "\
            INSERT INTO favorites (\
                id, project_id, \
                title, url, category, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET project_id = EXCLUDED.project_id, \
                title = EXCLUDED.title, \
                url = EXCLUDED.url, \
                category = EXCLUDED.category, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[&id, &project_id, &title, &url, &category, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Favorite, favorite::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Favorite, favorite::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: favorite::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO favorites_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Favorite, favorite::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Favorite, favorite::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: favorite::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM favorites \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
