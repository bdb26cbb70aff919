//! GraphQL [`Mutation`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` with the provided credentials, signing it in
    /// immediately.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is occupied by another
    ///                      `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user(
        email: api::user::Email,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let user = ctx
            .service()
            .execute(command::CreateUser {
                email: email.into(),
                password: secrecy::SecretBox::init_with({
                    let password = password.clone();
                    move || password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession {
                email: user.email,
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                code: None,
                throttle_key: ctx.throttle_key(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any
    ///                         `User`;
    /// - `SECOND_FACTOR_REQUIRED` - second factor is enabled for the `User`,
    ///                              but no `TwoFactorCode` was provided;
    /// - `WRONG_SECOND_FACTOR_CODE` - provided `TwoFactorCode` is not valid;
    /// - `RATE_LIMITED` - too many failed attempts were performed recently.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        email: api::user::Email,
        password: api::user::Password,
        code: Option<api::user::two_factor::Code>,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession {
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                code: code.map(Into::into),
                throttle_key: ctx.throttle_key(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Begins a second factor enrollment for the authenticated `User`.
    ///
    /// The returned `TwoFactorSecret` is to be entered into an authenticator
    /// app (or rendered as a QR code via the `TwoFactorEnrollmentUri`), and
    /// then confirmed with the `enableUserTwoFactor` mutation.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SECOND_FACTOR_ALREADY_ENABLED` - second factor is already enabled
    ///                                     for the `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "setupUserTwoFactor",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn setup_user_two_factor(
        ctx: &Context,
    ) -> Result<api::user::two_factor::SetupResult, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::SetupUserTwoFactor {
                user_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Confirms the pending second factor enrollment of the authenticated
    /// `User`.
    ///
    /// After this succeeds, a valid `TwoFactorCode` is required for creating
    /// new `UserSession`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SECOND_FACTOR_ALREADY_ENABLED` - second factor is already enabled
    ///                                     for the `User`;
    /// - `SECOND_FACTOR_NOT_SET_UP` - no enrollment was begun with the
    ///                                `setupUserTwoFactor` mutation;
    /// - `WRONG_SECOND_FACTOR_CODE` - provided `TwoFactorCode` is not valid.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "enableUserTwoFactor",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn enable_user_two_factor(
        code: api::user::two_factor::Code,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::EnableUserTwoFactor {
                user_id: my_id.into(),
                code: code.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Project` of the authenticated `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            color = ?color,
            gql.name = "createProject",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_project(
        name: api::project::Name,
        color: Option<api::project::Color>,
        ctx: &Context,
    ) -> Result<api::Project, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateProject {
                user_id: my_id.into(),
                name: name.into(),
                color: color.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the specified `Project` with the provided details.
    ///
    /// Omitted arguments are left unchanged.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROJECT_NOT_EXISTS` - the `Project` with the specified ID does not
    ///                          exist or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            color = ?color,
            gql.name = "updateProject",
            name = ?name,
            note = ?note,
            otel.name = Self::SPAN_NAME,
            project_id = %project_id,
        ),
    )]
    pub async fn update_project(
        project_id: api::project::Id,
        name: Option<api::project::Name>,
        color: Option<api::project::Color>,
        note: Option<api::project::Note>,
        ctx: &Context,
    ) -> Result<api::Project, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateProject {
                project_id: project_id.into(),
                initiator_id: my_id.into(),
                name: name.map(Into::into),
                color: color.map(Into::into),
                note: note.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the specified `Project` along with all its `KanbanTask`s,
    /// `DailyTask`s, `Note`s and `Favorite`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROJECT_NOT_EXISTS` - the `Project` with the specified ID does not
    ///                          exist or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteProject",
            otel.name = Self::SPAN_NAME,
            project_id = %project_id,
        ),
    )]
    pub async fn delete_project(
        project_id: api::project::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteProject {
                project_id: project_id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Marks the specified `Project` as the active one, deactivating the
    /// previously active `Project` of the authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROJECT_NOT_EXISTS` - the `Project` with the specified ID does not
    ///                          exist or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "switchActiveProject",
            otel.name = Self::SPAN_NAME,
            project_id = %project_id,
        ),
    )]
    pub async fn switch_active_project(
        project_id: api::project::Id,
        ctx: &Context,
    ) -> Result<api::Project, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::SwitchActiveProject {
                project_id: project_id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `KanbanTask` on the board of the specified `Project`.
    ///
    /// The `KanbanTask` is placed into the `TODO` column, unless a
    /// `KanbanTaskStatus` is provided explicitly.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROJECT_NOT_EXISTS` - the `Project` with the specified ID does not
    ///                          exist or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createKanbanTask",
            otel.name = Self::SPAN_NAME,
            project_id = %project_id,
            status = ?status,
            title = %title,
        ),
    )]
    pub async fn create_kanban_task(
        project_id: api::project::Id,
        title: api::kanban::Title,
        status: Option<api::kanban::Status>,
        ctx: &Context,
    ) -> Result<api::KanbanTask, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateKanbanTask {
                project_id: project_id.into(),
                initiator_id: my_id.into(),
                title: title.into(),
                status: status.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Renames the specified `KanbanTask`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `KANBAN_TASK_NOT_EXISTS` - the `KanbanTask` with the specified ID
    ///                              does not exist or belongs to another
    ///                              `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateKanbanTaskTitle",
            otel.name = Self::SPAN_NAME,
            task_id = %task_id,
            title = %title,
        ),
    )]
    pub async fn update_kanban_task_title(
        task_id: api::kanban::Id,
        title: api::kanban::Title,
        ctx: &Context,
    ) -> Result<api::KanbanTask, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateKanbanTaskTitle {
                task_id: task_id.into(),
                initiator_id: my_id.into(),
                title: title.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Moves the specified `KanbanTask` into the provided `KanbanTaskStatus`
    /// column.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `KANBAN_TASK_NOT_EXISTS` - the `KanbanTask` with the specified ID
    ///                              does not exist or belongs to another
    ///                              `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateKanbanTaskStatus",
            otel.name = Self::SPAN_NAME,
            status = ?status,
            task_id = %task_id,
        ),
    )]
    pub async fn update_kanban_task_status(
        task_id: api::kanban::Id,
        status: api::kanban::Status,
        ctx: &Context,
    ) -> Result<api::KanbanTask, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateKanbanTaskStatus {
                task_id: task_id.into(),
                initiator_id: my_id.into(),
                status: status.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the specified `KanbanTask`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `KANBAN_TASK_NOT_EXISTS` - the `KanbanTask` with the specified ID
    ///                              does not exist or belongs to another
    ///                              `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteKanbanTask",
            otel.name = Self::SPAN_NAME,
            task_id = %task_id,
        ),
    )]
    pub async fn delete_kanban_task(
        task_id: api::kanban::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteKanbanTask {
                task_id: task_id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Appends a new `KanbanSubtask` to the checklist of the specified
    /// `KanbanTask`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `KANBAN_TASK_NOT_EXISTS` - the `KanbanTask` with the specified ID
    ///                              does not exist or belongs to another
    ///                              `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createKanbanSubtask",
            otel.name = Self::SPAN_NAME,
            task_id = %task_id,
            title = %title,
        ),
    )]
    pub async fn create_kanban_subtask(
        task_id: api::kanban::Id,
        title: api::kanban::Title,
        ctx: &Context,
    ) -> Result<api::KanbanTask, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateKanbanSubtask {
                task_id: task_id.into(),
                initiator_id: my_id.into(),
                title: title.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Toggles the done mark of the `KanbanSubtask` at the provided index.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `KANBAN_TASK_NOT_EXISTS` - the `KanbanTask` with the specified ID
    ///                              does not exist or belongs to another
    ///                              `User`;
    /// - `KANBAN_SUBTASK_NOT_EXISTS` - no `KanbanSubtask` exists at the
    ///                                 provided index.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "toggleKanbanSubtask",
            index = %index,
            otel.name = Self::SPAN_NAME,
            task_id = %task_id,
        ),
    )]
    pub async fn toggle_kanban_subtask(
        task_id: api::kanban::Id,
        index: i32,
        ctx: &Context,
    ) -> Result<api::KanbanTask, Error> {
        let index = index.try_into().map_err(AsError::into_error)?;

        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ToggleKanbanSubtask {
                task_id: task_id.into(),
                index,
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Removes the `KanbanSubtask` at the provided index.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `KANBAN_TASK_NOT_EXISTS` - the `KanbanTask` with the specified ID
    ///                              does not exist or belongs to another
    ///                              `User`;
    /// - `KANBAN_SUBTASK_NOT_EXISTS` - no `KanbanSubtask` exists at the
    ///                                 provided index.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteKanbanSubtask",
            index = %index,
            otel.name = Self::SPAN_NAME,
            task_id = %task_id,
        ),
    )]
    pub async fn delete_kanban_subtask(
        task_id: api::kanban::Id,
        index: i32,
        ctx: &Context,
    ) -> Result<api::KanbanTask, Error> {
        let index = index.try_into().map_err(AsError::into_error)?;

        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteKanbanSubtask {
                task_id: task_id.into(),
                index,
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new recurring `DailyTask` in the specified `Project`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROJECT_NOT_EXISTS` - the `Project` with the specified ID does not
    ///                          exist or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createDailyTask",
            otel.name = Self::SPAN_NAME,
            project_id = %project_id,
            title = %title,
        ),
    )]
    pub async fn create_daily_task(
        project_id: api::project::Id,
        title: api::daily::Title,
        ctx: &Context,
    ) -> Result<api::DailyTask, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateDailyTask {
                project_id: project_id.into(),
                initiator_id: my_id.into(),
                title: title.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Toggles today's completion of the specified `DailyTask`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DAILY_TASK_NOT_EXISTS` - the `DailyTask` with the specified ID
    ///                             does not exist or belongs to another
    ///                             `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "toggleDailyTask",
            otel.name = Self::SPAN_NAME,
            task_id = %task_id,
        ),
    )]
    pub async fn toggle_daily_task(
        task_id: api::daily::Id,
        ctx: &Context,
    ) -> Result<api::DailyTask, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ToggleDailyTask {
                task_id: task_id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Renames the specified `DailyTask`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DAILY_TASK_NOT_EXISTS` - the `DailyTask` with the specified ID
    ///                             does not exist or belongs to another
    ///                             `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateDailyTaskTitle",
            otel.name = Self::SPAN_NAME,
            task_id = %task_id,
            title = %title,
        ),
    )]
    pub async fn update_daily_task_title(
        task_id: api::daily::Id,
        title: api::daily::Title,
        ctx: &Context,
    ) -> Result<api::DailyTask, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateDailyTaskTitle {
                task_id: task_id.into(),
                initiator_id: my_id.into(),
                title: title.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the specified `DailyTask` along with its completion history.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DAILY_TASK_NOT_EXISTS` - the `DailyTask` with the specified ID
    ///                             does not exist or belongs to another
    ///                             `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteDailyTask",
            otel.name = Self::SPAN_NAME,
            task_id = %task_id,
        ),
    )]
    pub async fn delete_daily_task(
        task_id: api::daily::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteDailyTask {
                task_id: task_id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Creates a new empty `Note` in the specified `Project`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROJECT_NOT_EXISTS` - the `Project` with the specified ID does not
    ///                          exist or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            category = %category,
            gql.name = "createNote",
            otel.name = Self::SPAN_NAME,
            project_id = %project_id,
            title = %title,
        ),
    )]
    pub async fn create_note(
        project_id: api::project::Id,
        title: api::note::Title,
        category: api::note::Category,
        ctx: &Context,
    ) -> Result<api::Note, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateNote {
                project_id: project_id.into(),
                initiator_id: my_id.into(),
                title: title.into(),
                category: category.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the content of the specified `Note`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOTE_NOT_EXISTS` - the `Note` with the specified ID does not exist
    ///                       or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateNoteContent",
            note_id = %note_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_note_content(
        note_id: api::note::Id,
        content: api::note::Content,
        ctx: &Context,
    ) -> Result<api::Note, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateNoteContent {
                note_id: note_id.into(),
                initiator_id: my_id.into(),
                content: content.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the title and the category of the specified `Note`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOTE_NOT_EXISTS` - the `Note` with the specified ID does not exist
    ///                       or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            category = %category,
            gql.name = "updateNoteMeta",
            note_id = %note_id,
            otel.name = Self::SPAN_NAME,
            title = %title,
        ),
    )]
    pub async fn update_note_meta(
        note_id: api::note::Id,
        title: api::note::Title,
        category: api::note::Category,
        ctx: &Context,
    ) -> Result<api::Note, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateNoteMeta {
                note_id: note_id.into(),
                initiator_id: my_id.into(),
                title: title.into(),
                category: category.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Pins or unpins the specified `Note`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOTE_NOT_EXISTS` - the `Note` with the specified ID does not exist
    ///                       or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateNotePin",
            note_id = %note_id,
            otel.name = Self::SPAN_NAME,
            pinned = %pinned,
        ),
    )]
    pub async fn update_note_pin(
        note_id: api::note::Id,
        pinned: bool,
        ctx: &Context,
    ) -> Result<api::Note, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateNotePin {
                note_id: note_id.into(),
                initiator_id: my_id.into(),
                pinned,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the specified `Note`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOTE_NOT_EXISTS` - the `Note` with the specified ID does not exist
    ///                       or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteNote",
            note_id = %note_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_note(
        note_id: api::note::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteNote {
                note_id: note_id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Creates a new `Favorite` link in the specified `Project`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROJECT_NOT_EXISTS` - the `Project` with the specified ID does not
    ///                          exist or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            category = %category,
            gql.name = "createFavorite",
            otel.name = Self::SPAN_NAME,
            project_id = %project_id,
            title = %title,
            url = %url,
        ),
    )]
    pub async fn create_favorite(
        project_id: api::project::Id,
        title: api::favorite::Title,
        url: api::favorite::Url,
        category: api::favorite::Category,
        ctx: &Context,
    ) -> Result<api::Favorite, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateFavorite {
                project_id: project_id.into(),
                initiator_id: my_id.into(),
                title: title.into(),
                url: url.into(),
                category: category.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the specified `Favorite` with the provided details.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `FAVORITE_NOT_EXISTS` - the `Favorite` with the specified ID does
    ///                           not exist or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            category = %category,
            favorite_id = %favorite_id,
            gql.name = "updateFavorite",
            otel.name = Self::SPAN_NAME,
            title = %title,
            url = %url,
        ),
    )]
    pub async fn update_favorite(
        favorite_id: api::favorite::Id,
        title: api::favorite::Title,
        url: api::favorite::Url,
        category: api::favorite::Category,
        ctx: &Context,
    ) -> Result<api::Favorite, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateFavorite {
                favorite_id: favorite_id.into(),
                initiator_id: my_id.into(),
                title: title.into(),
                url: url.into(),
                category: category.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the specified `Favorite`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `FAVORITE_NOT_EXISTS` - the `Favorite` with the specified ID does
    ///                           not exist or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            favorite_id = %favorite_id,
            gql.name = "deleteFavorite",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_favorite(
        favorite_id: api::favorite::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteFavorite {
                favorite_id: favorite_id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Records a new `Income` of the authenticated `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            amount = %amount,
            date = %date,
            gql.name = "createIncome",
            otel.name = Self::SPAN_NAME,
            product = %product,
            source = %source,
        ),
    )]
    pub async fn create_income(
        date: Date,
        amount: api::income::Amount,
        source: api::income::Source,
        product: api::income::Product,
        ctx: &Context,
    ) -> Result<api::Income, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateIncome {
                user_id: my_id.into(),
                date,
                amount: amount.into(),
                source: source.into(),
                product: product.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the specified `Income` record.
    ///
    /// Omitted arguments are left unchanged.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INCOME_NOT_EXISTS` - the `Income` with the specified ID does not
    ///                         exist or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            amount = ?amount,
            date = ?date,
            gql.name = "updateIncome",
            income_id = %income_id,
            otel.name = Self::SPAN_NAME,
            product = ?product,
            source = ?source,
        ),
    )]
    pub async fn update_income(
        income_id: api::income::Id,
        date: Option<Date>,
        amount: Option<api::income::Amount>,
        source: Option<api::income::Source>,
        product: Option<api::income::Product>,
        ctx: &Context,
    ) -> Result<api::Income, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateIncome {
                income_id: income_id.into(),
                initiator_id: my_id.into(),
                date,
                amount: amount.map(Into::into),
                source: source.map(Into::into),
                product: product.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the specified `Income` record.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INCOME_NOT_EXISTS` - the `Income` with the specified ID does not
    ///                         exist or belongs to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteIncome",
            income_id = %income_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_income(
        income_id: api::income::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteIncome {
                income_id: income_id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "Provided `UserEmail` is occupied by another \
                             `User`"]
                EmailOccupied,
            }
        }

        match self {
            Self::CreatePasswordHashError(_) => None,
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "RATE_LIMITED"]
                #[status = TOO_MANY_REQUESTS]
                #[message = "Too many failed sign-in attempts, retry later"]
                TooManyAttempts,

                #[code = "SECOND_FACTOR_REQUIRED"]
                #[status = UNAUTHORIZED]
                #[message = "Second factor is enabled for the `User`, so a \
                             `TwoFactorCode` must be provided"]
                SecondFactorRequired,

                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,

                #[code = "WRONG_SECOND_FACTOR_CODE"]
                #[status = FORBIDDEN]
                #[message = "Provided `TwoFactorCode` is not valid"]
                WrongSecondFactorCode,
            }
        }

        Some(match self {
            Self::ClockError(_)
            | Self::JsonWebTokenEncodeError(_)
            | Self::TotpCreationError(_) => return None,
            Self::Db(e) => return e.try_as_error(),
            Self::SecondFactorRequired => Error::SecondFactorRequired.into(),
            Self::TooManyAttempts => Error::TooManyAttempts.into(),
            Self::WrongCredentials => Error::WrongCredentials.into(),
            Self::WrongSecondFactorCode => {
                Error::WrongSecondFactorCode.into()
            }
        })
    }
}

impl AsError for command::setup_user_two_factor::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SECOND_FACTOR_ALREADY_ENABLED"]
                #[status = CONFLICT]
                #[message = "Second factor is already enabled for the `User`"]
                AlreadyEnabled,
            }
        }

        match self {
            Self::AlreadyEnabled => Some(Error::AlreadyEnabled.into()),
            Self::Db(e) => e.try_as_error(),
            Self::TotpCreationError(_) | Self::UserNotExists(_) => None,
        }
    }
}

impl AsError for command::enable_user_two_factor::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SECOND_FACTOR_ALREADY_ENABLED"]
                #[status = CONFLICT]
                #[message = "Second factor is already enabled for the `User`"]
                AlreadyEnabled,

                #[code = "SECOND_FACTOR_NOT_SET_UP"]
                #[status = CONFLICT]
                #[message = "Second factor enrollment was not set up for the \
                             `User`"]
                NotSetUp,

                #[code = "WRONG_SECOND_FACTOR_CODE"]
                #[status = FORBIDDEN]
                #[message = "Provided `TwoFactorCode` is not valid"]
                WrongSecondFactorCode,
            }
        }

        Some(match self {
            Self::AlreadyEnabled => Error::AlreadyEnabled.into(),
            Self::ClockError(_) | Self::TotpCreationError(_) => return None,
            Self::Db(e) => return e.try_as_error(),
            Self::NotSetUp => Error::NotSetUp.into(),
            Self::UserNotExists(_) => return None,
            Self::WrongSecondFactorCode => {
                Error::WrongSecondFactorCode.into()
            }
        })
    }
}

impl AsError for command::update_project::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PROJECT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Project` with the specified ID does not exist"]
                ProjectNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProjectNotExists(_) => Some(Error::ProjectNotExists.into()),
        }
    }
}

impl AsError for command::delete_project::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PROJECT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Project` with the specified ID does not exist"]
                ProjectNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProjectNotExists(_) => Some(Error::ProjectNotExists.into()),
        }
    }
}

impl AsError for command::switch_active_project::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PROJECT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Project` with the specified ID does not exist"]
                ProjectNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProjectNotExists(_) => Some(Error::ProjectNotExists.into()),
        }
    }
}

impl AsError for command::create_kanban_task::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PROJECT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Project` with the specified ID does not exist"]
                ProjectNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProjectNotExists(_) => Some(Error::ProjectNotExists.into()),
        }
    }
}

impl AsError for command::update_kanban_task_title::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "KANBAN_TASK_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`KanbanTask` with the specified ID does not \
                             exist"]
                KanbanTaskNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::KanbanTaskNotExists(_) => {
                Some(Error::KanbanTaskNotExists.into())
            }
        }
    }
}

impl AsError for command::update_kanban_task_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "KANBAN_TASK_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`KanbanTask` with the specified ID does not \
                             exist"]
                KanbanTaskNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::KanbanTaskNotExists(_) => {
                Some(Error::KanbanTaskNotExists.into())
            }
        }
    }
}

impl AsError for command::delete_kanban_task::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "KANBAN_TASK_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`KanbanTask` with the specified ID does not \
                             exist"]
                KanbanTaskNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::KanbanTaskNotExists(_) => {
                Some(Error::KanbanTaskNotExists.into())
            }
        }
    }
}

impl AsError for command::create_kanban_subtask::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "KANBAN_TASK_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`KanbanTask` with the specified ID does not \
                             exist"]
                KanbanTaskNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::KanbanTaskNotExists(_) => {
                Some(Error::KanbanTaskNotExists.into())
            }
        }
    }
}

impl AsError for command::toggle_kanban_subtask::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "KANBAN_SUBTASK_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`KanbanSubtask` with the specified index does \
                             not exist"]
                SubtaskNotExists,

                #[code = "KANBAN_TASK_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`KanbanTask` with the specified ID does not \
                             exist"]
                KanbanTaskNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::KanbanTaskNotExists(_) => Error::KanbanTaskNotExists.into(),
            Self::SubtaskNotExists(_) => Error::SubtaskNotExists.into(),
        })
    }
}

impl AsError for command::delete_kanban_subtask::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "KANBAN_SUBTASK_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`KanbanSubtask` with the specified index does \
                             not exist"]
                SubtaskNotExists,

                #[code = "KANBAN_TASK_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`KanbanTask` with the specified ID does not \
                             exist"]
                KanbanTaskNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::KanbanTaskNotExists(_) => Error::KanbanTaskNotExists.into(),
            Self::SubtaskNotExists(_) => Error::SubtaskNotExists.into(),
        })
    }
}

impl AsError for command::create_daily_task::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PROJECT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Project` with the specified ID does not exist"]
                ProjectNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProjectNotExists(_) => Some(Error::ProjectNotExists.into()),
        }
    }
}

impl AsError for command::toggle_daily_task::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DAILY_TASK_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`DailyTask` with the specified ID does not \
                             exist"]
                DailyTaskNotExists,
            }
        }

        match self {
            Self::DailyTaskNotExists(_) => {
                Some(Error::DailyTaskNotExists.into())
            }
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_daily_task_title::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DAILY_TASK_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`DailyTask` with the specified ID does not \
                             exist"]
                DailyTaskNotExists,
            }
        }

        match self {
            Self::DailyTaskNotExists(_) => {
                Some(Error::DailyTaskNotExists.into())
            }
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_daily_task::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DAILY_TASK_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`DailyTask` with the specified ID does not \
                             exist"]
                DailyTaskNotExists,
            }
        }

        match self {
            Self::DailyTaskNotExists(_) => {
                Some(Error::DailyTaskNotExists.into())
            }
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_note::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PROJECT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Project` with the specified ID does not exist"]
                ProjectNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProjectNotExists(_) => Some(Error::ProjectNotExists.into()),
        }
    }
}

impl AsError for command::update_note_content::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NOTE_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Note` with the specified ID does not exist"]
                NoteNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoteNotExists(_) => Some(Error::NoteNotExists.into()),
        }
    }
}

impl AsError for command::update_note_meta::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NOTE_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Note` with the specified ID does not exist"]
                NoteNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoteNotExists(_) => Some(Error::NoteNotExists.into()),
        }
    }
}

impl AsError for command::update_note_pin::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NOTE_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Note` with the specified ID does not exist"]
                NoteNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoteNotExists(_) => Some(Error::NoteNotExists.into()),
        }
    }
}

impl AsError for command::delete_note::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NOTE_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Note` with the specified ID does not exist"]
                NoteNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoteNotExists(_) => Some(Error::NoteNotExists.into()),
        }
    }
}

impl AsError for command::create_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PROJECT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Project` with the specified ID does not exist"]
                ProjectNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProjectNotExists(_) => Some(Error::ProjectNotExists.into()),
        }
    }
}

impl AsError for command::update_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "FAVORITE_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Favorite` with the specified ID does not exist"]
                FavoriteNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::FavoriteNotExists(_) => {
                Some(Error::FavoriteNotExists.into())
            }
        }
    }
}

impl AsError for command::delete_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "FAVORITE_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Favorite` with the specified ID does not exist"]
                FavoriteNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::FavoriteNotExists(_) => {
                Some(Error::FavoriteNotExists.into())
            }
        }
    }
}

impl AsError for command::update_income::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INCOME_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Income` with the specified ID does not exist"]
                IncomeNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::IncomeNotExists(_) => Some(Error::IncomeNotExists.into()),
        }
    }
}

impl AsError for command::delete_income::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INCOME_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Income` with the specified ID does not exist"]
                IncomeNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::IncomeNotExists(_) => Some(Error::IncomeNotExists.into()),
        }
    }
}
