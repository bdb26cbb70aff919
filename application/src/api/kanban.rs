//! [`KanbanTask`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, Context};

/// Task on the kanban board of a `Project`.
#[derive(Clone, Debug, From, Into)]
pub struct KanbanTask(domain::KanbanTask);

/// Task on the kanban board of a `Project`.
#[graphql_object(context = Context)]
impl KanbanTask {
    /// Unique identifier of this `KanbanTask`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "KanbanTask.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Unique identifier of the `Project` this `KanbanTask` belongs to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "KanbanTask.projectId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn project_id(&self) -> api::project::Id {
        self.0.project_id.into()
    }

    /// Title of this `KanbanTask`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "KanbanTask.title",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn title(&self) -> Title {
        self.0.title.clone().into()
    }

    /// Status of this `KanbanTask` on the board.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "KanbanTask.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Subtasks of this `KanbanTask`, in their checklist order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "KanbanTask.subtasks",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn subtasks(&self) -> Vec<Subtask> {
        self.0.subtasks.iter().cloned().map(Into::into).collect()
    }

    /// `DateTime` when this `KanbanTask` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "KanbanTask.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Single checklist entry of a `KanbanTask`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context, name = "KanbanSubtask")]
pub struct Subtask {
    /// Title of this `KanbanSubtask`.
    pub title: Title,

    /// Indicator whether this `KanbanSubtask` is completed.
    pub done: bool,
}

impl From<domain::kanban::Subtask> for Subtask {
    fn from(subtask: domain::kanban::Subtask) -> Self {
        let domain::kanban::Subtask { title, done } = subtask;
        Self {
            title: title.into(),
            done,
        }
    }
}

/// Unique identifier of a `KanbanTask`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::kanban::Id)]
#[into(domain::kanban::Id)]
#[graphql(name = "KanbanTaskId", transparent)]
pub struct Id(Uuid);

/// Title of a `KanbanTask` or its `KanbanSubtask`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "KanbanTaskTitle",
    with = scalar::Via::<domain::kanban::Title>,
)]
pub struct Title(domain::kanban::Title);

/// Status of a `KanbanTask` on the board.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "KanbanTaskStatus")]
pub enum Status {
    /// Queued for work.
    Todo,

    /// Being worked on.
    Doing,

    /// Completed.
    Done,
}

impl From<domain::kanban::Status> for Status {
    fn from(status: domain::kanban::Status) -> Self {
        use domain::kanban::Status as S;
        match status {
            S::Todo => Self::Todo,
            S::Doing => Self::Doing,
            S::Done => Self::Done,
        }
    }
}

impl From<Status> for domain::kanban::Status {
    fn from(status: Status) -> Self {
        use domain::kanban::Status as S;
        match status {
            Status::Todo => S::Todo,
            Status::Doing => S::Doing,
            Status::Done => S::Done,
        }
    }
}
