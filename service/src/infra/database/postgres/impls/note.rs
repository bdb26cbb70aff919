//! [`Note`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{note, project, Note},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C, IDs> Database<Select<By<HashMap<note::Id, Note>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[note::Id]>,
{
    type Ok = HashMap<note::Id, Note>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<note::Id, Note>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[note::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, project_id, \
                   title, category, content, \
                   pinned, updated_at \
            FROM notes \
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
                    Note {
                        id,
                        project_id: row.get("project_id"),
                        title: row.get("title"),
                        category: row.get("category"),
                        content: row.get("content"),
                        pinned: row.get("pinned"),
                        updated_at: row.get("updated_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Note>, note::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<note::Id, Note>, [note::Id; 1]>>,
        Ok = HashMap<note::Id, Note>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Note>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Note>, note::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Note>, project::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<note::Id, Note>, Vec<note::Id>>>,
        Ok = HashMap<note::Id, Note>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Note>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Note>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let project_id: project::Id = by.into_inner();

        // Pinned notes first, then the freshest ones.
        const SQL: &str = "\
            SELECT id \
            FROM notes \
            WHERE project_id = $1::UUID \
            ORDER BY pinned DESC, updated_at DESC, id ASC";
        let ids = self
            .query(SQL, &[&project_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<note::Id>>();

        let mut notes = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.into_iter().filter_map(|id| notes.remove(&id)).collect())
    }
}

impl<C> Database<Insert<Note>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Note>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(note): Insert<Note>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(note)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Note>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(note): Update<Note>,
    ) -> Result<Self::Ok, Self::Err> {
        let Note {
            id,
            project_id,
            title,
            category,
            content,
            pinned,
            updated_at,
        } = note;

        const SQL: &str = "\
            INSERT INTO notes (\
                id, project_id, \
                title, category, content, \
                pinned, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::BOOL, $7::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET project_id = EXCLUDED.project_id, \
                title = EXCLUDED.title, \
                category = EXCLUDED.category, \
                content = EXCLUDED.content, \
                pinned = EXCLUDED.pinned, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &project_id,
                &title,
                &category,
                &content,
                &pinned,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Note, note::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Note, note::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: note::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO notes_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Note, note::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Note, note::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: note::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM notes \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
