//! [`User`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A [`User`] of the system.
#[derive(Clone, Debug, From)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`domain::User`] representing this [`User`].
    user: OnceCell<domain::User>,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id.into(),
            user: OnceCell::new_with(Some(user)),
        }
    }
}

impl User {
    /// Creates a new [`User`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`User`] with the provided ID exists,
    /// otherwise accessing this [`User`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            user: OnceCell::new(),
        }
    }

    /// Returns the [`domain::User`] representing this [`User`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::User`] doesn't exist.
    async fn user(&self, ctx: &Context) -> Result<&domain::User, Error> {
        let id = self.id.into();
        self.user
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::user::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|u| {
                        future::ready(u.ok_or_else(|| {
                            api::query::UserError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A `User` of the system.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Email of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn email(&self, ctx: &Context) -> Result<Email, Error> {
        Ok(self.user(ctx).await?.email.clone().into())
    }

    /// Indicator whether logging in as this `User` requires a one-time code.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.isTwoFactorEnabled",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_two_factor_enabled(
        &self,
        ctx: &Context,
    ) -> Result<bool, Error> {
        Ok(self.user(ctx).await?.two_factor_enabled)
    }

    /// `DateTime` when this `User` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.user(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `User`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);

/// Email of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserEmail",
    with = scalar::Via::<domain::user::Email>,
)]
pub struct Email(domain::user::Email);

/// Password of a `User`.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserPassword",
    with = scalar::Via::<domain::user::Password>,
)]
pub struct Password(domain::user::Password);

pub mod session {
    //! [`Session`]-related definitions.
    //!
    //! [`Session`]: crate::Session

    use common::DateTime;
    use derive_more::{AsRef, From, Into};
    use juniper::{GraphQLObject, GraphQLScalar};
    use service::{command, domain};

    use crate::{
        api::{self, scalar},
        Context,
    };

    /// `Session` access token.
    #[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
    #[graphql(
        name = "UserAuthToken",
        with = scalar::Via::<domain::user::session::Token>,
    )]
    pub struct Token(domain::user::session::Token);

    /// Result of a `Session` creation.
    #[derive(Clone, Debug, From, GraphQLObject)]
    #[graphql(context = Context, name = "CreateSessionResult")]
    pub struct CreateResult {
        /// Access token of the created `Session`.
        pub token: Token,

        /// `User` associated with the created `Session`.
        pub user: api::User,

        /// `DateTime` when the created `Session` expires.
        pub expires_at: DateTime,
    }

    impl From<command::create_user_session::Output> for CreateResult {
        fn from(output: command::create_user_session::Output) -> Self {
            let command::create_user_session::Output {
                token,
                user,
                expires_at,
            } = output;
            Self {
                token: token.into(),
                user: user.into(),
                expires_at: expires_at.coerce(),
            }
        }
    }
}

pub mod two_factor {
    //! Second factor definitions of a [`User`].
    //!
    //! [`User`]: super::User

    use derive_more::{AsRef, Display, From, Into};
    use juniper::{GraphQLObject, GraphQLScalar};
    use service::{command, domain};

    use crate::{api::scalar, Context};

    /// One-time code confirming possession of a `TwoFactorSecret`.
    #[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
    #[graphql(
        name = "TwoFactorCode",
        with = scalar::Via::<domain::user::two_factor::Code>,
    )]
    pub struct Code(domain::user::two_factor::Code);

    /// Shared secret generating one-time `TwoFactorCode`s.
    #[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
    #[graphql(
        name = "TwoFactorSecret",
        with = scalar::Via::<domain::user::two_factor::Secret>,
    )]
    pub struct Secret(domain::user::two_factor::Secret);

    /// `otpauth://` URI for enrolling a `TwoFactorSecret` into an
    /// authenticator app.
    #[derive(Clone, Debug, Display, GraphQLScalar, Into)]
    #[graphql(name = "TwoFactorEnrollmentUri", transparent)]
    pub struct EnrollmentUri(String);

    impl From<domain::user::two_factor::EnrollmentUri> for EnrollmentUri {
        fn from(uri: domain::user::two_factor::EnrollmentUri) -> Self {
            Self(uri.to_string())
        }
    }

    /// Result of a second factor setup.
    #[derive(Clone, Debug, From, GraphQLObject)]
    #[graphql(context = Context, name = "SetupTwoFactorResult")]
    pub struct SetupResult {
        /// Generated `TwoFactorSecret`, for manual entry into an
        /// authenticator app.
        pub secret: Secret,

        /// Enrollment URI carrying the generated `TwoFactorSecret`.
        pub enrollment_uri: EnrollmentUri,
    }

    impl From<command::setup_user_two_factor::Output> for SetupResult {
        fn from(output: command::setup_user_two_factor::Output) -> Self {
            let command::setup_user_two_factor::Output {
                secret,
                enrollment_uri,
            } = output;
            Self {
                secret: secret.into(),
                enrollment_uri: enrollment_uri.into(),
            }
        }
    }
}
