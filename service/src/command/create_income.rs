//! [`Command`] for recording a new [`Income`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    Date,
};
use derive_more::From;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::income::{Amount, Product, Source};
use crate::{
    domain::{income, user, Income},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording a new [`Income`].
#[derive(Clone, Debug, From)]
pub struct CreateIncome {
    /// ID of the [`User`] owning the new [`Income`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// Calendar day the [`Income`] was earned on.
    pub date: Date,

    /// [`Amount`] of the [`Income`].
    pub amount: income::Amount,

    /// [`Source`] of the [`Income`].
    pub source: income::Source,

    /// [`Product`] the [`Income`] was earned for.
    pub product: income::Product,
}

impl<Db> Command<CreateIncome> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Income>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Income;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateIncome) -> Result<Self::Ok, Self::Err> {
        let CreateIncome {
            user_id,
            date,
            amount,
            source,
            product,
        } = cmd;

        let income = Income {
            id: income::Id::new(),
            user_id,
            date,
            amount,
            source,
            product,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        tx.execute(Insert(income.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(income)
    }
}

/// Error of [`CreateIncome`] [`Command`] execution.
pub type ExecutionError = database::Error;
