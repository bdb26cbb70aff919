//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Password};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Debug, From)]
pub struct CreateUser {
    /// [`Email`] of the [`User`] to be created.
    pub email: user::Email,

    /// [`Password`] of the [`User`] to be created.
    pub password: SecretBox<user::Password>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<User>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser { email, password } = cmd;

        let existing = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let password_hash = user::PasswordHash::new(password.expose_secret())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let user = User {
            id: user::Id::new(),
            email,
            password_hash,
            two_factor_secret: None,
            two_factor_enabled: false,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Failed to hash the provided [`Password`].
    #[display("Failed to hash `Password`: {_0}")]
    CreatePasswordHashError(argon2::password_hash::Error),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] with the provided [`Email`] already exists.
    #[display("`User(email: {_0})` already exists")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};
    use secrecy::SecretBox;

    use crate::{
        command::testing,
        domain::{user, User},
        Command as _,
    };

    use super::{CreateUser, ExecutionError};

    #[tokio::test]
    async fn registers_a_user_with_hashed_password() {
        let service = testing::service();

        let user =
            testing::register(&service, "dev@example.com", "s3cret pass")
                .await;

        assert!(!user.two_factor_enabled);
        assert!(user.two_factor_secret.is_none());

        let stored = service
            .database()
            .execute(Select(By::<Option<User>, _>::new(&user.email)))
            .await
            .unwrap()
            .expect("`User` is stored");
        assert_eq!(stored.id, user.id);
        assert!(stored
            .password_hash
            .verify(&user::Password::new("s3cret pass").unwrap()));
        assert!(!stored
            .password_hash
            .verify(&user::Password::new("different").unwrap()));
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let service = testing::service();
        drop(testing::register(&service, "dev@example.com", "s3cret").await);

        let password = user::Password::new("another one").unwrap();
        let result = service
            .execute(CreateUser {
                email: user::Email::new("dev@example.com").unwrap(),
                password: SecretBox::init_with(move || password),
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            ExecutionError::EmailOccupied(_),
        ));
    }
}
