//! [`DailyTask`]-related definitions.

use common::{Date, DateTime};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// Recurring task meant to be completed once per calendar day.
#[derive(Clone, Debug, From, Into)]
pub struct DailyTask(domain::DailyTask);

/// Recurring task meant to be completed once per calendar day.
#[graphql_object(context = Context)]
impl DailyTask {
    /// Unique identifier of this `DailyTask`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "DailyTask.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Unique identifier of the `Project` this `DailyTask` belongs to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "DailyTask.projectId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn project_id(&self) -> api::project::Id {
        self.0.project_id.into()
    }

    /// Title of this `DailyTask`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "DailyTask.title",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn title(&self) -> Title {
        self.0.title.clone().into()
    }

    /// Indicator whether this `DailyTask` was done today.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "DailyTask.doneToday",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn done_today(&self) -> bool {
        self.0.is_done_on(Date::today())
    }

    /// Number of consecutive days this `DailyTask` was done on, counting
    /// backward from today.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "DailyTask.streak",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn streak(&self, ctx: &Context) -> Result<i32, Error> {
        self.0
            .streak(Date::today())
            .try_into()
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Completion marks of this `DailyTask` on today and the 6 preceding
    /// days, oldest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "DailyTask.history",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn history(&self) -> Vec<bool> {
        self.0.history(Date::today()).to_vec()
    }

    /// `DateTime` when this `DailyTask` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "DailyTask.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `DailyTask`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::daily::Id)]
#[into(domain::daily::Id)]
#[graphql(name = "DailyTaskId", transparent)]
pub struct Id(Uuid);

/// Title of a `DailyTask`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DailyTaskTitle",
    with = scalar::Via::<domain::daily::Title>,
)]
pub struct Title(domain::daily::Title);
