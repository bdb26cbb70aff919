//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_daily_task;
pub mod create_favorite;
pub mod create_income;
pub mod create_kanban_subtask;
pub mod create_kanban_task;
pub mod create_note;
pub mod create_project;
pub mod create_user;
pub mod create_user_session;
pub mod delete_daily_task;
pub mod delete_favorite;
pub mod delete_income;
pub mod delete_kanban_subtask;
pub mod delete_kanban_task;
pub mod delete_note;
pub mod delete_project;
pub mod enable_user_two_factor;
pub mod ensure_daily_completions;
pub mod setup_user_two_factor;
pub mod switch_active_project;
pub mod toggle_daily_task;
pub mod toggle_kanban_subtask;
pub mod update_daily_task_title;
pub mod update_favorite;
pub mod update_income;
pub mod update_kanban_task_status;
pub mod update_kanban_task_title;
pub mod update_note_content;
pub mod update_note_meta;
pub mod update_note_pin;
pub mod update_project;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_daily_task::CreateDailyTask, create_favorite::CreateFavorite,
    create_income::CreateIncome, create_kanban_subtask::CreateKanbanSubtask,
    create_kanban_task::CreateKanbanTask, create_note::CreateNote,
    create_project::CreateProject, create_user::CreateUser,
    create_user_session::CreateUserSession,
    delete_daily_task::DeleteDailyTask, delete_favorite::DeleteFavorite,
    delete_income::DeleteIncome, delete_kanban_subtask::DeleteKanbanSubtask,
    delete_kanban_task::DeleteKanbanTask, delete_note::DeleteNote,
    delete_project::DeleteProject,
    enable_user_two_factor::EnableUserTwoFactor,
    ensure_daily_completions::EnsureDailyCompletions,
    setup_user_two_factor::SetupUserTwoFactor,
    switch_active_project::SwitchActiveProject,
    toggle_daily_task::ToggleDailyTask,
    toggle_kanban_subtask::ToggleKanbanSubtask,
    update_daily_task_title::UpdateDailyTaskTitle,
    update_favorite::UpdateFavorite, update_income::UpdateIncome,
    update_kanban_task_status::UpdateKanbanTaskStatus,
    update_kanban_task_title::UpdateKanbanTaskTitle,
    update_note_content::UpdateNoteContent, update_note_meta::UpdateNoteMeta,
    update_note_pin::UpdateNotePin, update_project::UpdateProject,
};

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by [`Command`] tests.

    use std::{collections::BTreeMap, time::Duration};

    use secrecy::SecretBox;

    use crate::{
        domain::{
            daily, favorite, income, kanban, note, project,
            user::{self, two_factor},
            DailyTask, Favorite, Income, KanbanTask, Note, Project, User,
        },
        infra::database::Memory,
        task, throttle, Command as _, Config, Service,
    };

    use super::{CreateUser, EnableUserTwoFactor, SetupUserTwoFactor};

    /// Secret signing session tokens in tests.
    pub(crate) const JWT_SECRET: &[u8] = b"try-and-forge-me";

    /// Creates a [`Service`] upon a fresh in-memory database.
    pub(crate) fn service() -> Service<Memory> {
        Service {
            config: Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    JWT_SECRET,
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    JWT_SECRET,
                ),
                login_throttle: throttle::Config::default(),
                sweep_login_throttle: task::sweep_login_throttle::Config {
                    interval: Duration::from_secs(60),
                },
            },
            database: Memory::default(),
            throttle: throttle::Registry::default(),
        }
    }

    /// Registers a [`User`] with the given credentials.
    pub(crate) async fn register(
        service: &Service<Memory>,
        email: &str,
        password: &str,
    ) -> User {
        let password = user::Password::new(password).unwrap();
        service
            .execute(CreateUser {
                email: user::Email::new(email).unwrap(),
                password: SecretBox::init_with(move || password),
            })
            .await
            .unwrap()
    }

    /// Registers a `dev@example.com` [`User`] with a `s3cret` password and
    /// walks it through the whole second factor enrollment.
    pub(crate) async fn enroll(service: &Service<Memory>) -> User {
        let user = register(service, "dev@example.com", "s3cret").await;
        let secret = service
            .execute(SetupUserTwoFactor { user_id: user.id })
            .await
            .unwrap()
            .secret;
        let code = two_factor::totp(&secret, &user.email)
            .unwrap()
            .generate_current()
            .unwrap();
        service
            .execute(EnableUserTwoFactor {
                user_id: user.id,
                code: two_factor::Code::new(code).unwrap(),
            })
            .await
            .unwrap()
    }

    /// Creates an inactive [`Project`] owned by the given [`User`].
    pub(crate) fn project(user_id: user::Id, name: &str) -> Project {
        Project {
            id: project::Id::new(),
            user_id,
            name: project::Name::new(name).unwrap(),
            color: project::Color::default(),
            note: project::Note::default(),
            is_active: false,
            switched_at: vec![],
        }
    }

    /// Creates a [`KanbanTask`] of the given [`Project`] without subtasks.
    pub(crate) fn kanban_task(
        project_id: project::Id,
        title: &str,
    ) -> KanbanTask {
        KanbanTask {
            id: kanban::Id::new(),
            project_id,
            title: kanban::Title::new(title).unwrap(),
            status: kanban::Status::default(),
            subtasks: vec![],
            created_at: common::DateTime::now().coerce(),
        }
    }

    /// Creates a [`DailyTask`] of the given [`Project`] with an empty
    /// completion ledger.
    pub(crate) fn daily_task(
        project_id: project::Id,
        title: &str,
    ) -> DailyTask {
        DailyTask {
            id: daily::Id::new(),
            project_id,
            title: daily::Title::new(title).unwrap(),
            completions: BTreeMap::new(),
            created_at: common::DateTime::now().coerce(),
        }
    }

    /// Creates an unpinned empty [`Note`] of the given [`Project`].
    pub(crate) fn note(project_id: project::Id, title: &str) -> Note {
        Note {
            id: note::Id::new(),
            project_id,
            title: note::Title::new(title).unwrap(),
            category: note::Category::new("general").unwrap(),
            content: note::Content::default(),
            pinned: false,
            updated_at: common::DateTime::now().coerce(),
        }
    }

    /// Creates a [`Favorite`] of the given [`Project`].
    pub(crate) fn favorite(project_id: project::Id, title: &str) -> Favorite {
        Favorite {
            id: favorite::Id::new(),
            project_id,
            title: favorite::Title::new(title).unwrap(),
            url: favorite::Url::new("https://docs.rs").unwrap(),
            category: favorite::Category::new("docs").unwrap(),
            created_at: common::DateTime::now().coerce(),
        }
    }

    /// Creates an [`Income`] of the given [`User`] earned on the given day.
    pub(crate) fn income(user_id: user::Id, date: &str) -> Income {
        Income {
            id: income::Id::new(),
            user_id,
            date: date.parse().unwrap(),
            amount: "250.00".parse().unwrap(),
            source: income::Source::new("Upwork").unwrap(),
            product: income::Product::new("code review").unwrap(),
        }
    }
}
