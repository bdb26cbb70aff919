//! [`Command`] for confirming a [`two_factor`] enrollment of a [`User`].

use std::time::SystemTimeError;

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::two_factor::{Code, Secret};
use crate::{
    domain::{
        user::{self, two_factor},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for confirming a [`two_factor`] enrollment of a [`User`].
///
/// Checks the provided [`Code`] against the pending [`Secret`] stored by
/// [`SetupUserTwoFactor`], and only then makes the second factor required
/// for sign-in.
///
/// [`SetupUserTwoFactor`]: super::SetupUserTwoFactor
#[derive(Clone, Debug, From)]
pub struct EnableUserTwoFactor {
    /// ID of the [`User`] confirming the enrollment.
    pub user_id: user::Id,

    /// One-time [`Code`] generated from the pending [`Secret`].
    pub code: two_factor::Code,
}

impl<Db> Command<EnableUserTwoFactor> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: EnableUserTwoFactor,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let EnableUserTwoFactor { user_id, code } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;
        if user.two_factor_enabled {
            return Err(tracerr::new!(E::AlreadyEnabled));
        }
        let Some(secret) = &user.two_factor_secret else {
            return Err(tracerr::new!(E::NotSetUp));
        };

        let is_valid = two_factor::totp(secret, &user.email)
            .map_err(tracerr::from_and_wrap!(=> E))?
            .check_current(code.as_ref())
            .map_err(tracerr::from_and_wrap!(=> E))?;
        if !is_valid {
            return Err(tracerr::new!(E::WrongSecondFactorCode));
        }

        user.two_factor_enabled = true;
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`EnableUserTwoFactor`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Second factor is already enabled for the [`User`].
    #[display("Second factor is already enabled")]
    AlreadyEnabled,

    /// Failed to read the system clock to validate the [`Code`].
    #[display("Failed to read system time: {_0}")]
    ClockError(SystemTimeError),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// No [`two_factor`] enrollment was started for the [`User`].
    #[display("Second factor enrollment was not started")]
    NotSetUp,

    /// Failed to initialize a TOTP generator for the [`User`].
    #[display("Failed to initialize TOTP generator: {_0}")]
    TotpCreationError(totp_rs::TotpUrlError),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// Provided [`Code`] doesn't match the pending [`Secret`].
    #[display("Wrong second factor `Code`")]
    WrongSecondFactorCode,
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        command::{testing, SetupUserTwoFactor},
        domain::{
            user::{self, two_factor},
            User,
        },
        Command as _,
    };

    use super::{EnableUserTwoFactor, ExecutionError as E};

    fn code(s: &str) -> two_factor::Code {
        two_factor::Code::new(s).unwrap()
    }

    #[tokio::test]
    async fn enables_with_a_current_code() {
        let service = testing::service();
        let user =
            testing::register(&service, "dev@example.com", "s3cret").await;
        let secret = service
            .execute(SetupUserTwoFactor { user_id: user.id })
            .await
            .unwrap()
            .secret;

        let current = two_factor::totp(&secret, &user.email)
            .unwrap()
            .generate_current()
            .unwrap();
        let enabled = service
            .execute(EnableUserTwoFactor {
                user_id: user.id,
                code: code(&current),
            })
            .await
            .unwrap();

        assert!(enabled.two_factor_enabled);
        let stored = service
            .database()
            .execute(Select(By::<Option<User>, _>::new(user.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.two_factor_enabled);
        assert_eq!(stored.two_factor_secret, Some(secret));
    }

    #[tokio::test]
    async fn rejects_unstarted_enrollment() {
        let service = testing::service();
        let user =
            testing::register(&service, "dev@example.com", "s3cret").await;

        let result = service
            .execute(EnableUserTwoFactor {
                user_id: user.id,
                code: code("000000"),
            })
            .await;

        assert!(matches!(result.unwrap_err().as_ref(), E::NotSetUp));
    }

    #[tokio::test]
    async fn rejects_wrong_code() {
        let service = testing::service();
        let user =
            testing::register(&service, "dev@example.com", "s3cret").await;
        drop(
            service
                .execute(SetupUserTwoFactor { user_id: user.id })
                .await
                .unwrap(),
        );

        let result = service
            .execute(EnableUserTwoFactor {
                user_id: user.id,
                code: code("000000"),
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::WrongSecondFactorCode,
        ));
        let stored = service
            .database()
            .execute(Select(By::<Option<User>, _>::new(user.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.two_factor_enabled);
    }

    #[tokio::test]
    async fn rejects_enabled_second_factor() {
        let service = testing::service();
        let user = testing::enroll(&service).await;
        let current = two_factor::totp(
            user.two_factor_secret.as_ref().unwrap(),
            &user.email,
        )
        .unwrap()
        .generate_current()
        .unwrap();

        let result = service
            .execute(EnableUserTwoFactor {
                user_id: user.id,
                code: code(&current),
            })
            .await;

        assert!(matches!(result.unwrap_err().as_ref(), E::AlreadyEnabled));
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let service = testing::service();

        let result = service
            .execute(EnableUserTwoFactor {
                user_id: user::Id::new(),
                code: code("000000"),
            })
            .await;

        assert!(matches!(result.unwrap_err().as_ref(), E::UserNotExists(_)));
    }
}
