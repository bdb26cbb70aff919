//! [`Project`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, Context};

/// Workspace a `User` organizes one work engagement in.
#[derive(Clone, Debug, From, Into)]
pub struct Project(domain::Project);

/// Workspace a `User` organizes one work engagement in.
#[graphql_object(context = Context)]
impl Project {
    /// Unique identifier of this `Project`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Project.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of this `Project`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Project.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Accent color of this `Project`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Project.color",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn color(&self) -> Color {
        self.0.color.clone().into()
    }

    /// Scratchpad note of this `Project`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Project.note",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn note(&self) -> Note {
        self.0.note.clone().into()
    }

    /// Indicator whether this `Project` is the one being worked in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Project.isActive",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn is_active(&self) -> bool {
        self.0.is_active
    }

    /// `DateTime`s when this `Project` was switched to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Project.switchedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn switched_at(&self) -> Vec<DateTime> {
        self.0.switched_at.iter().map(|dt| dt.coerce()).collect()
    }
}

/// Unique identifier of a `Project`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::project::Id)]
#[into(domain::project::Id)]
#[graphql(name = "ProjectId", transparent)]
pub struct Id(Uuid);

/// Name of a `Project`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ProjectName",
    with = scalar::Via::<domain::project::Name>,
)]
pub struct Name(domain::project::Name);

/// Accent color of a `Project`, as a `#rrggbb` hex triplet.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ProjectColor",
    with = scalar::Via::<domain::project::Color>,
)]
pub struct Color(domain::project::Color);

/// Scratchpad note of a `Project`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ProjectNote",
    with = scalar::Via::<domain::project::Note>,
)]
pub struct Note(domain::project::Note);
