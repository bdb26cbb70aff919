//! [`DailyTask`]-related [`Database`] implementations.

use std::collections::{BTreeMap, HashMap};

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Date,
};
use tracerr::Traced;

use crate::{
    domain::{daily, project, user, DailyTask},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C, IDs> Database<Select<By<HashMap<daily::Id, DailyTask>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[daily::Id]>,
{
    type Ok = HashMap<daily::Id, DailyTask>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<daily::Id, DailyTask>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[daily::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const LEDGER_SQL: &str = "\
            SELECT task_id, date, done \
            FROM daily_completions \
            WHERE task_id IN (SELECT unnest($1::UUID[]))";
        let mut ledgers: HashMap<daily::Id, BTreeMap<Date, bool>> =
            HashMap::new();
        for row in self
            .query(LEDGER_SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
        {
            let _ = ledgers
                .entry(row.get("task_id"))
                .or_default()
                .insert(row.get("date"), row.get("done"));
        }

        const SQL: &str = "\
            SELECT id, project_id, title, created_at \
            FROM daily_tasks \
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
                    DailyTask {
                        id,
                        project_id: row.get("project_id"),
                        title: row.get("title"),
                        completions: ledgers.remove(&id).unwrap_or_default(),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<DailyTask>, daily::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<daily::Id, DailyTask>, [daily::Id; 1]>>,
        Ok = HashMap<daily::Id, DailyTask>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<DailyTask>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<DailyTask>, daily::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<DailyTask>, project::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<daily::Id, DailyTask>, Vec<daily::Id>>>,
        Ok = HashMap<daily::Id, DailyTask>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<DailyTask>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<DailyTask>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let project_id: project::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM daily_tasks \
            WHERE project_id = $1::UUID \
            ORDER BY created_at ASC, id ASC";
        let ids = self
            .query(SQL, &[&project_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<daily::Id>>();

        let mut tasks = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.into_iter().filter_map(|id| tasks.remove(&id)).collect())
    }
}

impl<C> Database<Select<By<Vec<DailyTask>, user::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<daily::Id, DailyTask>, Vec<daily::Id>>>,
        Ok = HashMap<daily::Id, DailyTask>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<DailyTask>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<DailyTask>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT t.id \
            FROM daily_tasks AS t \
                 JOIN projects AS p ON p.id = t.project_id \
            WHERE p.user_id = $1::UUID \
            ORDER BY t.created_at ASC, t.id ASC";
        let ids = self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<daily::Id>>();

        let mut tasks = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.into_iter().filter_map(|id| tasks.remove(&id)).collect())
    }
}

impl<C> Database<Insert<DailyTask>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<DailyTask>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(task): Insert<DailyTask>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = task.id;
        let ledger = task.completions.clone();
        self.execute(Update(task)).await.map_err(tracerr::wrap!())?;

        // Seed the initial completion ledger. Later on it is maintained
        // through `daily::Completion` and `daily::Today` operations only.
        let (dates, dones): (Vec<_>, Vec<_>) = ledger.into_iter().unzip();

        const SQL: &str = "\
            INSERT INTO daily_completions (task_id, date, done) \
            SELECT $1::UUID, t.date, t.done \
            FROM unnest($2::DATE[], $3::BOOL[]) AS t (date, done) \
            ON CONFLICT (task_id, date) DO NOTHING";
        self.exec(SQL, &[&id, &dates, &dones])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Update<DailyTask>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(task): Update<DailyTask>,
    ) -> Result<Self::Ok, Self::Err> {
        let DailyTask {
            id,
            project_id,
            title,
            completions: _,
            created_at,
        } = task;

        // The completion ledger is not written back here: it changes through
        // `daily::Completion` and `daily::Today` operations.
        const SQL: &str = "\
            INSERT INTO daily_tasks (\
                id, project_id, title, \
                created_at\
            ) \
            VALUES ($1::UUID, $2::UUID, $3::VARCHAR, $4::TIMESTAMPTZ) \
            ON CONFLICT (id) DO UPDATE \
            SET project_id = EXCLUDED.project_id, \
                title = EXCLUDED.title, \
                created_at = EXCLUDED.created_at";
        self.exec(SQL, &[&id, &project_id, &title, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Update<daily::Completion>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(completion): Update<daily::Completion>,
    ) -> Result<Self::Ok, Self::Err> {
        let daily::Completion { task_id, date } = completion;

        // A missing mark toggles straight to done.
        const SQL: &str = "\
            INSERT INTO daily_completions (task_id, date, done) \
            VALUES ($1::UUID, $2::DATE, TRUE) \
            ON CONFLICT (task_id, date) DO UPDATE \
            SET done = NOT daily_completions.done \
            RETURNING done";
        self.query_opt(SQL, &[&task_id, &date])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get("done"))
    }
}

impl<C> Database<Insert<daily::Today>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(today): Insert<daily::Today>,
    ) -> Result<Self::Ok, Self::Err> {
        let daily::Today { project_id, date } = today;

        // Single statement, so no transaction is needed: existing marks are
        // left untouched.
        const SQL: &str = "\
            INSERT INTO daily_completions (task_id, date, done) \
            SELECT id, $2::DATE, FALSE \
            FROM daily_tasks \
            WHERE project_id = $1::UUID \
            ON CONFLICT (task_id, date) DO NOTHING";
        self.exec(SQL, &[&project_id, &date])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<DailyTask, daily::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<DailyTask, daily::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: daily::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO daily_tasks_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<DailyTask, daily::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<DailyTask, daily::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: daily::Id = by.into_inner();

        // The completion ledger goes down with the task via
        // `ON DELETE CASCADE`.
        const SQL: &str = "\
            DELETE FROM daily_tasks \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
