//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{command, query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all `Project`s of the current `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "projects",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn projects(ctx: &Context) -> Result<Vec<api::Project>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::projects::OfUser::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|projects| projects.into_iter().map(Into::into).collect())
    }

    /// Returns all `KanbanTask`s of the specified `Project`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROJECT_NOT_EXISTS` - the `Project` with the specified ID does not
    ///                          exist, or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "kanbanTasks",
            otel.name = Self::SPAN_NAME,
            project_id = %project_id,
        ),
    )]
    pub async fn kanban_tasks(
        project_id: api::project::Id,
        ctx: &Context,
    ) -> Result<Vec<api::KanbanTask>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        drop(
            ctx.service()
                .execute(query::project::ById::by(project_id.into()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())?
                .filter(|p| api::user::Id::from(p.user_id) == my_id)
                .ok_or_else(|| ProjectError::NotExists.into())
                .map_err(ctx.error())?,
        );

        ctx.service()
            .execute(query::kanban_tasks::OfProject::by(project_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|tasks| tasks.into_iter().map(Into::into).collect())
    }

    /// Returns all `DailyTask`s of the specified `Project`.
    ///
    /// Materializes today's ledger entries first, so every returned
    /// `DailyTask` carries an explicit mark for today.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROJECT_NOT_EXISTS` - the `Project` with the specified ID does not
    ///                          exist, or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "dailyTasks",
            otel.name = Self::SPAN_NAME,
            project_id = %project_id,
        ),
    )]
    pub async fn daily_tasks(
        project_id: api::project::Id,
        ctx: &Context,
    ) -> Result<Vec<api::DailyTask>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(command::EnsureDailyCompletions {
                project_id: project_id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::daily_tasks::OfProject::by(project_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|tasks| tasks.into_iter().map(Into::into).collect())
    }

    /// Returns all `DailyTask`s of all `Project`s of the current `User`.
    ///
    /// Unlike `dailyTasks`, doesn't materialize today's ledger entries: a
    /// `DailyTask` not listed for its `Project` today simply counts as not
    /// done.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "allDailyTasks",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn all_daily_tasks(
        ctx: &Context,
    ) -> Result<Vec<api::DailyTask>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::daily_tasks::OfUser::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|tasks| tasks.into_iter().map(Into::into).collect())
    }

    /// Returns all `Note`s of the specified `Project`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROJECT_NOT_EXISTS` - the `Project` with the specified ID does not
    ///                          exist, or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "notes",
            otel.name = Self::SPAN_NAME,
            project_id = %project_id,
        ),
    )]
    pub async fn notes(
        project_id: api::project::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Note>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        drop(
            ctx.service()
                .execute(query::project::ById::by(project_id.into()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())?
                .filter(|p| api::user::Id::from(p.user_id) == my_id)
                .ok_or_else(|| ProjectError::NotExists.into())
                .map_err(ctx.error())?,
        );

        ctx.service()
            .execute(query::notes::OfProject::by(project_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|notes| notes.into_iter().map(Into::into).collect())
    }

    /// Returns all `Favorite`s of the specified `Project`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROJECT_NOT_EXISTS` - the `Project` with the specified ID does not
    ///                          exist, or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "favorites",
            otel.name = Self::SPAN_NAME,
            project_id = %project_id,
        ),
    )]
    pub async fn favorites(
        project_id: api::project::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Favorite>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        drop(
            ctx.service()
                .execute(query::project::ById::by(project_id.into()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())?
                .filter(|p| api::user::Id::from(p.user_id) == my_id)
                .ok_or_else(|| ProjectError::NotExists.into())
                .map_err(ctx.error())?,
        );

        ctx.service()
            .execute(query::favorites::OfProject::by(project_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|favorites| favorites.into_iter().map(Into::into).collect())
    }

    /// Fetches the page of the current `User`'s `Income`s, newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "incomes",
            last = ?last,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn incomes(
        first: Option<i32>,
        after: Option<api::income::list::Cursor>,
        last: Option<i32>,
        before: Option<api::income::list::Cursor>,
        ctx: &Context,
    ) -> Result<api::income::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 10;

        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::incomes::List::by(read::income::list::Selector {
                arguments: read::income::list::Arguments::new(
                    first,
                    after.map(Into::into),
                    last,
                    before.map(Into::into),
                    DEFAULT_PAGE_SIZE,
                )
                .ok_or_else(|| api::PaginationError::Ambiguous.into())
                .map_err(ctx.error())?,
                filter: read::income::list::Filter {
                    user_id: my_id.into(),
                },
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::ensure_daily_completions::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProjectNotExists(_) => Some(ProjectError::NotExists.into()),
        }
    }
}

define_error! {
    enum IncomeError {
        #[code = "INCOME_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Income` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum ProjectError {
        #[code = "PROJECT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Project` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
