//! [`Favorite`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, Context};

/// Bookmarked link kept within a `Project`.
#[derive(Clone, Debug, From, Into)]
pub struct Favorite(domain::Favorite);

/// Bookmarked link kept within a `Project`.
#[graphql_object(context = Context)]
impl Favorite {
    /// Unique identifier of this `Favorite`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Favorite.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Unique identifier of the `Project` this `Favorite` belongs to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Favorite.projectId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn project_id(&self) -> api::project::Id {
        self.0.project_id.into()
    }

    /// Title of this `Favorite`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Favorite.title",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn title(&self) -> Title {
        self.0.title.clone().into()
    }

    /// URL this `Favorite` points at.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Favorite.url",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn url(&self) -> Url {
        self.0.url.clone().into()
    }

    /// Category this `Favorite` is grouped under.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Favorite.category",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn category(&self) -> Category {
        self.0.category.clone().into()
    }

    /// `DateTime` when this `Favorite` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Favorite.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Favorite`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::favorite::Id)]
#[into(domain::favorite::Id)]
#[graphql(name = "FavoriteId", transparent)]
pub struct Id(Uuid);

/// Title of a `Favorite`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "FavoriteTitle",
    with = scalar::Via::<domain::favorite::Title>,
)]
pub struct Title(domain::favorite::Title);

/// URL a `Favorite` points at.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "FavoriteUrl",
    with = scalar::Via::<domain::favorite::Url>,
)]
pub struct Url(domain::favorite::Url);

/// Category a `Favorite` is grouped under.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "FavoriteCategory",
    with = scalar::Via::<domain::favorite::Category>,
)]
pub struct Category(domain::favorite::Category);
