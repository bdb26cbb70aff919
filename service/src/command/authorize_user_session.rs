//! [`Command`] for authorizing a [`User`].

use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::user::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`].
///
/// Validates the [`Session`] token statelessly: a token forged or expired
/// is rejected by its signature and `exp` claim alone, without touching
/// the database.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use secrecy::SecretBox;

    use crate::{
        command::{testing, CreateUserSession},
        domain::user::{self, session, Session},
        Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError as E};

    fn token(claims: &Session, secret: &[u8]) -> session::Token {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            claims,
            &jsonwebtoken::EncodingKey::from_secret(secret),
        )
        .unwrap()
        .parse()
        .unwrap()
    }

    #[tokio::test]
    async fn accepts_tokens_issued_at_sign_in() {
        let service = testing::service();
        let user =
            testing::register(&service, "dev@example.com", "s3cret").await;
        let password = user::Password::new("s3cret").unwrap();
        let output = service
            .execute(CreateUserSession {
                email: user.email.clone(),
                password: SecretBox::init_with(move || password),
                code: None,
                throttle_key: "10.0.0.1".into(),
            })
            .await
            .unwrap();

        let session = service
            .execute(AuthorizeUserSession {
                token: output.token,
            })
            .await
            .unwrap();

        assert_eq!(session.user_id, user.id);
        // The `exp` claim is carried with a whole-second precision.
        assert_eq!(
            session.expires_at.unix_timestamp(),
            output.expires_at.unix_timestamp(),
        );
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let service = testing::service();

        let result = service
            .execute(AuthorizeUserSession {
                token: "not-a-jwt".parse().unwrap(),
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_foreign_signature() {
        let service = testing::service();
        let claims = Session {
            user_id: user::Id::new(),
            expires_at: (DateTime::now() + Duration::from_secs(3600)).coerce(),
        };

        let result = service
            .execute(AuthorizeUserSession {
                token: token(&claims, b"not-the-signing-secret"),
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let service = testing::service();
        let claims = Session {
            user_id: user::Id::new(),
            expires_at: (DateTime::now() - Duration::from_secs(24 * 60 * 60))
                .coerce(),
        };

        let result = service
            .execute(AuthorizeUserSession {
                token: token(&claims, testing::JWT_SECRET),
            })
            .await;

        assert!(matches!(
            result.unwrap_err().as_ref(),
            E::JsonWebTokenDecodeError(_),
        ));
    }
}
