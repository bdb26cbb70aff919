//! [`Command`] for creating a [`Session`].

use std::time::{Duration, SystemTimeError};

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, two_factor::Code, Email, Password};
use crate::{
    domain::{
        user::{self, session, two_factor, Session},
        User,
    },
    infra::{database, Database},
    throttle, Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`] by [`User`] credentials.
#[derive(Debug, From)]
pub struct CreateUserSession {
    /// [`Email`] of the [`User`] to create the [`Session`] for.
    pub email: user::Email,

    /// [`Password`] of the [`User`].
    pub password: SecretBox<user::Password>,

    /// One-time [`Code`] of the [`User`]'s second factor, if one is
    /// enabled.
    pub code: Option<two_factor::Code>,

    /// [`throttle::Key`] identifying the client performing this
    /// [`Command`], to count its failed attempts against.
    pub throttle_key: throttle::Key,
}

impl CreateUserSession {
    /// [`Duration`] of [`Session`] expiration.
    const EXPIRATION_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: for<'l> Database<
        Select<By<Option<User>, &'l user::Email>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let Cmd {
            email,
            password,
            code,
            throttle_key,
        } = cmd;

        let throttling = self.config().login_throttle;
        if !self.throttle().check(&throttle_key, throttling) {
            return Err(tracerr::new!(E::TooManyAttempts));
        }

        let Some(user) = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            self.throttle().record_failure(throttle_key, throttling);
            return Err(tracerr::new!(E::WrongCredentials));
        };

        if !user.password_hash.verify(password.expose_secret()) {
            self.throttle().record_failure(throttle_key, throttling);
            return Err(tracerr::new!(E::WrongCredentials));
        }

        if user.two_factor_enabled {
            let Some(code) = code else {
                self.throttle().record_failure(throttle_key, throttling);
                return Err(tracerr::new!(E::SecondFactorRequired));
            };

            let mut is_valid = false;
            if let Some(secret) = &user.two_factor_secret {
                is_valid = two_factor::totp(secret, &user.email)
                    .map_err(tracerr::from_and_wrap!(=> E))?
                    .check_current(code.as_ref())
                    .map_err(tracerr::from_and_wrap!(=> E))?;
            }
            if !is_valid {
                self.throttle().record_failure(throttle_key, throttling);
                return Err(tracerr::new!(E::WrongSecondFactorCode));
            }
        }

        let expires_at = (DateTime::now() + Cmd::EXPIRATION_DURATION).coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                expires_at,
            },
            &self.config.jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Failed to read the system clock to validate a [`Code`].
    #[display("Failed to read system time: {_0}")]
    ClockError(SystemTimeError),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] has a second factor enabled, but no [`Code`] was provided.
    #[display("Second factor `Code` is required")]
    SecondFactorRequired,

    /// Too many failed attempts were made recently, so this one was not
    /// even considered.
    #[display("Too many failed sign-in attempts, try again later")]
    TooManyAttempts,

    /// Failed to initialize a TOTP generator for the [`User`].
    #[display("Failed to initialize TOTP generator: {_0}")]
    TotpCreationError(totp_rs::TotpUrlError),

    /// Provided credentials are wrong.
    #[display("Wrong `User` credentials")]
    WrongCredentials,

    /// Provided second factor [`Code`] is wrong.
    #[display("Wrong second factor `Code`")]
    WrongSecondFactorCode,
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::testing,
        domain::user::{self, two_factor, Session},
        Command as _,
    };

    use super::{CreateUserSession, ExecutionError as E};

    fn password(password: &str) -> SecretBox<user::Password> {
        let password = user::Password::new(password).unwrap();
        SecretBox::init_with(move || password)
    }

    fn sign_in(email: &str, pass: &str, key: &str) -> CreateUserSession {
        CreateUserSession {
            email: user::Email::new(email).unwrap(),
            password: password(pass),
            code: None,
            throttle_key: key.into(),
        }
    }

    #[tokio::test]
    async fn issues_a_decodable_token() {
        let service = testing::service();
        let user =
            testing::register(&service, "dev@example.com", "s3cret").await;

        let output = service
            .execute(sign_in("dev@example.com", "s3cret", "10.0.0.1"))
            .await
            .unwrap();

        assert_eq!(output.user.id, user.id);
        let claims = jsonwebtoken::decode::<Session>(
            output.token.as_ref(),
            &jsonwebtoken::DecodingKey::from_secret(testing::JWT_SECRET),
            &jsonwebtoken::Validation::default(),
        )
        .unwrap()
        .claims;
        assert_eq!(claims.user_id, user.id);
        assert!(service.throttle().is_empty());
    }

    #[tokio::test]
    async fn unknown_email_counts_as_wrong_credentials() {
        let service = testing::service();

        let result = service
            .execute(sign_in("nobody@example.com", "s3cret", "10.0.0.1"))
            .await;

        assert!(matches!(result.unwrap_err().as_ref(), E::WrongCredentials));
        assert_eq!(service.throttle().len(), 1);
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let service = testing::service();
        drop(testing::register(&service, "dev@example.com", "s3cret").await);

        let result = service
            .execute(sign_in("dev@example.com", "not it", "10.0.0.1"))
            .await;

        assert!(matches!(result.unwrap_err().as_ref(), E::WrongCredentials));
        assert_eq!(service.throttle().len(), 1);
    }

    #[tokio::test]
    async fn throttles_after_max_attempts() {
        let service = testing::service();
        drop(testing::register(&service, "dev@example.com", "s3cret").await);

        for _ in 0..service.config().login_throttle.max_attempts {
            let result = service
                .execute(sign_in("dev@example.com", "not it", "10.0.0.1"))
                .await;
            assert!(matches!(
                result.unwrap_err().as_ref(),
                E::WrongCredentials,
            ));
        }

        // Even the correct credentials are not considered anymore.
        let result = service
            .execute(sign_in("dev@example.com", "s3cret", "10.0.0.1"))
            .await;
        assert!(matches!(result.unwrap_err().as_ref(), E::TooManyAttempts));
    }

    #[tokio::test]
    async fn failures_below_the_limit_do_not_block() {
        let service = testing::service();
        drop(testing::register(&service, "dev@example.com", "s3cret").await);

        for _ in 1..service.config().login_throttle.max_attempts {
            drop(
                service
                    .execute(sign_in("dev@example.com", "not it", "10.0.0.1"))
                    .await,
            );
        }

        drop(
            service
                .execute(sign_in("dev@example.com", "s3cret", "10.0.0.1"))
                .await
                .unwrap(),
        );

        // A successful sign-in never clears the counted failures.
        assert_eq!(service.throttle().len(), 1);
    }

    #[tokio::test]
    async fn success_does_not_reset_the_counter() {
        let service = testing::service();
        drop(testing::register(&service, "dev@example.com", "s3cret").await);

        let max = service.config().login_throttle.max_attempts;
        for _ in 0..(max - 2) {
            drop(
                service
                    .execute(sign_in("dev@example.com", "not it", "10.0.0.1"))
                    .await,
            );
        }
        drop(
            service
                .execute(sign_in("dev@example.com", "s3cret", "10.0.0.1"))
                .await
                .unwrap(),
        );
        for _ in 0..2 {
            drop(
                service
                    .execute(sign_in("dev@example.com", "not it", "10.0.0.1"))
                    .await,
            );
        }

        let result = service
            .execute(sign_in("dev@example.com", "s3cret", "10.0.0.1"))
            .await;
        assert!(matches!(result.unwrap_err().as_ref(), E::TooManyAttempts));
    }

    #[tokio::test]
    async fn keys_throttle_independently() {
        let service = testing::service();
        drop(testing::register(&service, "dev@example.com", "s3cret").await);

        for _ in 0..service.config().login_throttle.max_attempts {
            drop(
                service
                    .execute(sign_in("dev@example.com", "not it", "10.0.0.1"))
                    .await,
            );
        }

        drop(
            service
                .execute(sign_in("dev@example.com", "s3cret", "10.0.0.2"))
                .await
                .unwrap(),
        );
    }

    #[tokio::test]
    async fn requires_second_factor_code_when_enabled() {
        let service = testing::service();
        let user = testing::enroll(&service).await;

        let result = service
            .execute(sign_in(user.email.as_ref(), "s3cret", "10.0.0.1"))
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::SecondFactorRequired,
        ));
        assert_eq!(service.throttle().len(), 1);
    }

    #[tokio::test]
    async fn rejects_wrong_second_factor_code() {
        let service = testing::service();
        let user = testing::enroll(&service).await;

        let result = service
            .execute(CreateUserSession {
                email: user.email,
                password: password("s3cret"),
                code: Some(two_factor::Code::new("000000").unwrap()),
                throttle_key: "10.0.0.1".into(),
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::WrongSecondFactorCode,
        ));
        assert_eq!(service.throttle().len(), 1);
    }

    #[tokio::test]
    async fn accepts_current_second_factor_code() {
        let service = testing::service();
        let user = testing::enroll(&service).await;
        let code = two_factor::totp(
            user.two_factor_secret.as_ref().unwrap(),
            &user.email,
        )
        .unwrap()
        .generate_current()
        .unwrap();

        let output = service
            .execute(CreateUserSession {
                email: user.email.clone(),
                password: password("s3cret"),
                code: Some(two_factor::Code::new(code).unwrap()),
                throttle_key: "10.0.0.1".into(),
            })
            .await
            .unwrap();

        assert_eq!(output.user.id, user.id);
        assert!(service.throttle().is_empty());
    }
}
