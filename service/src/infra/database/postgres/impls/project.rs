//! [`Project`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{project, user, Project},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C, IDs> Database<Select<By<HashMap<project::Id, Project>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[project::Id]>,
{
    type Ok = HashMap<project::Id, Project>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<project::Id, Project>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[project::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, user_id, \
                   name, color, note, \
                   is_active, switched_at \
            FROM projects \
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
                    Project {
                        id,
                        user_id: row.get("user_id"),
                        name: row.get("name"),
                        color: row.get("color"),
                        note: row.get("note"),
                        is_active: row.get("is_active"),
                        switched_at: row.get("switched_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Project>, project::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<project::Id, Project>, [project::Id; 1]>>,
        Ok = HashMap<project::Id, Project>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Project>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Project>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Project>, user::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<project::Id, Project>, Vec<project::Id>>>,
        Ok = HashMap<project::Id, Project>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Project>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Project>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM projects \
            WHERE user_id = $1::UUID \
            ORDER BY name ASC, id ASC";
        let ids = self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<project::Id>>();

        let mut projects = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.into_iter().filter_map(|id| projects.remove(&id)).collect())
    }
}

impl<C> Database<Insert<Project>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Project>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(project): Insert<Project>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(project))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Project>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(project): Update<Project>,
    ) -> Result<Self::Ok, Self::Err> {
        let Project {
            id,
            user_id,
            name,
            color,
            note,
            is_active,
            switched_at,
        } = project;

        const SQL: &str = "\
            INSERT INTO projects (\
                id, user_id, \
                name, color, note, \
                is_active, switched_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::BOOL, $7::TIMESTAMPTZ[]\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET user_id = EXCLUDED.user_id, \
                name = EXCLUDED.name, \
                color = EXCLUDED.color, \
                note = EXCLUDED.note, \
                is_active = EXCLUDED.is_active, \
                switched_at = EXCLUDED.switched_at";
        self.exec(
            SQL,
            &[&id, &user_id, &name, &color, &note, &is_active, &switched_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Project, project::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Project, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: project::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO projects_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Project, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Project, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        // The whole set of the `User`'s `Project`s is guarded by a single
        // `users_lock` row.
        const SQL: &str = "\
            INSERT INTO users_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Project, project::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Project, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: project::Id = by.into_inner();

        // Kanban tasks, daily tasks, notes and favorites of the `Project` go
        // down with it via `ON DELETE CASCADE`.
        const SQL: &str = "\
            DELETE FROM projects \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
