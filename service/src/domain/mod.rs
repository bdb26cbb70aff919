//! Domain definitions.

pub mod daily;
pub mod favorite;
pub mod income;
pub mod kanban;
pub mod note;
pub mod project;
pub mod user;

pub use self::{
    daily::DailyTask, favorite::Favorite, income::Income, kanban::KanbanTask,
    note::Note, project::Project, user::User,
};
