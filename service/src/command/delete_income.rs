//! [`Command`] for deleting an [`Income`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{income, user, Income},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting an [`Income`].
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteIncome {
    /// ID of the [`Income`] to delete.
    pub income_id: income::Id,

    /// ID of the [`User`] performing the deletion.
    ///
    /// An [`Income`] owned by another [`User`] is reported as not
    /// existing.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,
}

impl<Db> Command<DeleteIncome> for Service<Db>
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
        > + Database<
            Delete<By<Income, income::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteIncome) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteIncome {
            income_id,
            initiator_id,
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

        drop(
            tx.execute(Select(By::<Option<Income>, _>::new(income_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|i| i.user_id == initiator_id)
                .ok_or(E::IncomeNotExists(income_id))
                .map_err(tracerr::wrap!())?,
        );

        tx.execute(Delete(By::new(income_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(())
    }
}

/// Error of [`DeleteIncome`] [`Command`] execution.
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
