//! [`Income`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::{income, user, Income},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C, IDs> Database<Select<By<HashMap<income::Id, Income>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[income::Id]>,
{
    type Ok = HashMap<income::Id, Income>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<income::Id, Income>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[income::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, user_id, \
                   date, amount, \
                   source, product \
            FROM incomes \
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
                    Income {
                        id,
                        user_id: row.get("user_id"),
                        date: row.get("date"),
                        amount: row.get("amount"),
                        source: row.get("source"),
                        product: row.get("product"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Income>, income::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<income::Id, Income>, [income::Id; 1]>>,
        Ok = HashMap<income::Id, Income>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Income>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Income>, income::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Income>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Income>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(income): Insert<Income>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(income)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Income>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(income): Update<Income>,
    ) -> Result<Self::Ok, Self::Err> {
        let Income {
            id,
            user_id,
            date,
            amount,
            source,
            product,
        } = income;

        const SQL: &str = "\
            INSERT INTO incomes (\
                id, user_id, \
                date, amount, \
                source, product\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::DATE, $4::NUMERIC, \
                $5::VARCHAR, $6::VARCHAR\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET user_id = EXCLUDED.user_id, \
                date = EXCLUDED.date, \
                amount = EXCLUDED.amount, \
                source = EXCLUDED.source, \
                product = EXCLUDED.product";
        self.exec(SQL, &[&id, &user_id, &date, &amount, &source, &product])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Income, income::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Income, income::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: income::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO incomes_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Income, income::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Income, income::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: income::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM incomes \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<Select<By<read::income::list::Page, read::income::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::income::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::income::list::Page, read::income::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::income::list::Selector {
            arguments,
            filter: read::income::list::Filter { user_id },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &user_id];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });

        // The list is walked newest first, so the requested kind mirrors.
        let kind = arguments.kind().reversed();

        let sql = format!(
            "SELECT id \
             FROM incomes \
             WHERE user_id = $2::UUID \
                   {cursor} \
             ORDER BY date {order}, \
                      id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = kind.operator();
                f(&format_args!(
                    "AND (date, id) {op} (SELECT date, id \
                                          FROM incomes \
                                          WHERE id = ${idx}::UUID)"
                ))
            }),
            order = kind.order().sql(),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(read::income::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::income::list::TotalCount, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::income::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::income::list::TotalCount, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM incomes \
            WHERE user_id = $1::UUID";
        self.query_opt(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}
