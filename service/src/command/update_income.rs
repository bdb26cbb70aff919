//! [`Command`] for updating an [`Income`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::income::{Amount, Product, Source};
use crate::{
    domain::{income, user, Income},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an [`Income`].
///
/// Fields left as [`None`] are kept intact.
#[derive(Clone, Debug, From)]
pub struct UpdateIncome {
    /// ID of the [`Income`] to update.
    pub income_id: income::Id,

    /// ID of the [`User`] performing the update.
    ///
    /// An [`Income`] owned by another [`User`] is reported as not
    /// existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// New calendar day of the [`Income`].
    pub date: Option<Date>,

    /// New [`Amount`] of the [`Income`].
    pub amount: Option<income::Amount>,

    /// New [`Source`] of the [`Income`].
    pub source: Option<income::Source>,

    /// New [`Product`] of the [`Income`].
    pub product: Option<income::Product>,
}

impl<Db> Command<UpdateIncome> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Income>, income::Id>>,
            Ok = Option<Income>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Income, income::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Income>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Income;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateIncome) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateIncome {
            income_id,
            initiator_id,
            date,
            amount,
            source,
            product,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Income`.
        tx.execute(Lock(By::new(income_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut income = tx
            .execute(Select(By::<Option<Income>, _>::new(income_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|i| i.user_id == initiator_id)
            .ok_or(E::IncomeNotExists(income_id))
            .map_err(tracerr::wrap!())?;

        if let Some(date) = date {
            income.date = date;
        }
        if let Some(amount) = amount {
            income.amount = amount;
        }
        if let Some(source) = source {
            income.source = source;
        }
        if let Some(product) = product {
            income.product = product;
        }

        tx.execute(Update(income.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(income)
    }
}

/// Error of [`UpdateIncome`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Income`] doesn't exist.
    #[display("`Income(id: {_0})` does not exist")]
    #[from(ignore)]
    IncomeNotExists(#[error(not(source))] income::Id),
}
