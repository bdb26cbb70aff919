//! [`Command`] for starting a [`two_factor`] enrollment of a [`User`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::two_factor::Code;
use crate::{
    domain::{
        user::{self, two_factor},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for starting a [`two_factor`] enrollment of a [`User`].
///
/// Generates a fresh [`two_factor::Secret`] and stores it as pending: the
/// second factor becomes required for sign-in only once the [`User`]
/// confirms possession of the secret with a valid [`Code`] (see
/// [`EnableUserTwoFactor`]).
///
/// Repeating this [`Command`] before confirmation replaces the pending
/// secret with a new one.
///
/// [`EnableUserTwoFactor`]: super::EnableUserTwoFactor
#[derive(Clone, Copy, Debug, From)]
pub struct SetupUserTwoFactor {
    /// ID of the [`User`] enrolling a second factor.
    pub user_id: user::Id,
}

/// Output of [`SetupUserTwoFactor`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Generated [`two_factor::Secret`], for manual entry into an
    /// authenticator app.
    pub secret: two_factor::Secret,

    /// [`two_factor::EnrollmentUri`] carrying the generated
    /// [`two_factor::Secret`], to be rendered as a QR code.
    pub enrollment_uri: two_factor::EnrollmentUri,
}

impl<Db> Command<SetupUserTwoFactor> for Service<Db>
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
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SetupUserTwoFactor,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SetupUserTwoFactor { user_id } = cmd;

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

        let secret = two_factor::Secret::generate();
        let enrollment_uri = two_factor::totp(&secret, &user.email)
            .map(|totp| two_factor::EnrollmentUri::from(&totp))
            .map_err(tracerr::from_and_wrap!(=> E))?;

        user.two_factor_secret = Some(secret.clone());
        tx.execute(Update(user))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output {
            secret,
            enrollment_uri,
        })
    }
}

/// Error of [`SetupUserTwoFactor`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Second factor is already enabled for the [`User`].
    #[display("Second factor is already enabled")]
    AlreadyEnabled,

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Failed to initialize a TOTP generator for the [`User`].
    #[display("Failed to initialize TOTP generator: {_0}")]
    TotpCreationError(totp_rs::TotpUrlError),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        command::testing,
        domain::{user, User},
        Command as _,
    };

    use super::{ExecutionError as E, SetupUserTwoFactor};

    #[tokio::test]
    async fn stores_a_pending_secret() {
        let service = testing::service();
        let user =
            testing::register(&service, "dev@example.com", "s3cret").await;

        let output = service
            .execute(SetupUserTwoFactor { user_id: user.id })
            .await
            .unwrap();

        assert!(output
            .enrollment_uri
            .as_ref()
            .starts_with("otpauth://totp/"));
        let stored = service
            .database()
            .execute(Select(By::<Option<User>, _>::new(user.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.two_factor_secret, Some(output.secret));
        // Pending only: sign-in does not ask for a code yet.
        assert!(!stored.two_factor_enabled);
    }

    #[tokio::test]
    async fn repeating_replaces_the_pending_secret() {
        let service = testing::service();
        let user =
            testing::register(&service, "dev@example.com", "s3cret").await;

        let first = service
            .execute(SetupUserTwoFactor { user_id: user.id })
            .await
            .unwrap()
            .secret;
        let second = service
            .execute(SetupUserTwoFactor { user_id: user.id })
            .await
            .unwrap()
            .secret;

        assert_ne!(first, second);
        let stored = service
            .database()
            .execute(Select(By::<Option<User>, _>::new(user.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.two_factor_secret, Some(second));
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let service = testing::service();

        let result = service
            .execute(SetupUserTwoFactor {
                user_id: user::Id::new(),
            })
            .await;

        assert!(matches!(result.unwrap_err().as_ref(), E::UserNotExists(_)));
    }

    #[tokio::test]
    async fn rejects_enabled_second_factor() {
        let service = testing::service();
        let user = testing::enroll(&service).await;

        let result = service
            .execute(SetupUserTwoFactor { user_id: user.id })
            .await;

        assert!(matches!(result.unwrap_err().as_ref(), E::AlreadyEnabled));
    }
}
