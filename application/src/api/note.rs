//! [`Note`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, Context};

/// Text note kept within a `Project`.
#[derive(Clone, Debug, From, Into)]
pub struct Note(domain::Note);

/// Text note kept within a `Project`.
#[graphql_object(context = Context)]
impl Note {
    /// Unique identifier of this `Note`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Note.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Unique identifier of the `Project` this `Note` belongs to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Note.projectId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn project_id(&self) -> api::project::Id {
        self.0.project_id.into()
    }

    /// Title of this `Note`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Note.title",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn title(&self) -> Title {
        self.0.title.clone().into()
    }

    /// Category this `Note` is grouped under.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Note.category",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn category(&self) -> Category {
        self.0.category.clone().into()
    }

    /// Content of this `Note`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Note.content",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn content(&self) -> Content {
        self.0.content.clone().into()
    }

    /// Indicator whether this `Note` is pinned atop its category.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Note.pinned",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn pinned(&self) -> bool {
        self.0.pinned
    }

    /// `DateTime` when this `Note` was last changed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Note.updatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Unique identifier of a `Note`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::note::Id)]
#[into(domain::note::Id)]
#[graphql(name = "NoteId", transparent)]
pub struct Id(Uuid);

/// Title of a `Note`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "NoteTitle",
    with = scalar::Via::<domain::note::Title>,
)]
pub struct Title(domain::note::Title);

/// Category a `Note` is grouped under.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "NoteCategory",
    with = scalar::Via::<domain::note::Category>,
)]
pub struct Category(domain::note::Category);

/// Content of a `Note`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "NoteContent",
    with = scalar::Via::<domain::note::Content>,
)]
pub struct Content(domain::note::Content);
