//! [`KanbanTask`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{kanban, project, KanbanTask},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C, IDs> Database<Select<By<HashMap<kanban::Id, KanbanTask>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[kanban::Id]>,
{
    type Ok = HashMap<kanban::Id, KanbanTask>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<kanban::Id, KanbanTask>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[kanban::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SUBTASKS_SQL: &str = "\
            SELECT task_id, title, done \
            FROM kanban_subtasks \
            WHERE task_id IN (SELECT unnest($1::UUID[])) \
            ORDER BY task_id ASC, index ASC";
        let mut subtasks = self
            .query(SUBTASKS_SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                (
                    row.get::<_, kanban::Id>("task_id"),
                    kanban::Subtask {
                        title: row.get("title"),
                        done: row.get("done"),
                    },
                )
            })
            .into_group_map();

        const SQL: &str = "\
            SELECT id, project_id, \
                   title, status, \
                   created_at \
            FROM kanban_tasks \
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
                    KanbanTask {
                        id,
                        project_id: row.get("project_id"),
                        title: row.get("title"),
                        status: row.get("status"),
                        subtasks: subtasks.remove(&id).unwrap_or_default(),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<KanbanTask>, kanban::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<kanban::Id, KanbanTask>, [kanban::Id; 1]>>,
        Ok = HashMap<kanban::Id, KanbanTask>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<KanbanTask>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<KanbanTask>, kanban::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<KanbanTask>, project::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<kanban::Id, KanbanTask>, Vec<kanban::Id>>>,
        Ok = HashMap<kanban::Id, KanbanTask>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<KanbanTask>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<KanbanTask>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let project_id: project::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM kanban_tasks \
            WHERE project_id = $1::UUID \
            ORDER BY created_at ASC, id ASC";
        let ids = self
            .query(SQL, &[&project_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<kanban::Id>>();

        let mut tasks = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.into_iter().filter_map(|id| tasks.remove(&id)).collect())
    }
}

impl<C> Database<Insert<KanbanTask>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<KanbanTask>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(task): Insert<KanbanTask>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(task)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<KanbanTask>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(task): Update<KanbanTask>,
    ) -> Result<Self::Ok, Self::Err> {
        let KanbanTask {
            id,
            project_id,
            title,
            status,
            subtasks,
            created_at,
        } = task;

        const SQL: &str = "\
            INSERT INTO kanban_tasks (\
                id, project_id, \
                title, status, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::INT2, \
                $5::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET project_id = EXCLUDED.project_id, \
                title = EXCLUDED.title, \
                status = EXCLUDED.status, \
                created_at = EXCLUDED.created_at";
        self.exec(SQL, &[&id, &project_id, &title, &status, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        // The checklist is rewritten as a whole, preserving its order via the
        // `index` column.
        let (titles, dones): (Vec<_>, Vec<_>) =
            subtasks.into_iter().map(|s| (s.title, s.done)).unzip();

        const CLEAR_SQL: &str = "\
            DELETE FROM kanban_subtasks \
            WHERE task_id = $1::UUID";
        self.exec(CLEAR_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        const FILL_SQL: &str = "\
            INSERT INTO kanban_subtasks (task_id, index, title, done) \
            SELECT $1::UUID, (t.ord - 1)::INT2, t.title, t.done \
            FROM unnest($2::VARCHAR[], $3::BOOL[]) \
                 WITH ORDINALITY AS t (title, done, ord)";
        self.exec(FILL_SQL, &[&id, &titles, &dones])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<KanbanTask, kanban::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<KanbanTask, kanban::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: kanban::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO kanban_tasks_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<KanbanTask, kanban::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<KanbanTask, kanban::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: kanban::Id = by.into_inner();

        // Subtasks go down with the task via `ON DELETE CASCADE`.
        const SQL: &str = "\
            DELETE FROM kanban_tasks \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
