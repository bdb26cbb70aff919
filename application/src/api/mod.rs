//! GraphQL API definitions.

pub mod daily;
pub mod favorite;
pub mod income;
pub mod kanban;
mod mutation;
pub mod note;
pub mod project;
mod query;
pub mod scalar;
pub mod user;

use crate::define_error;

pub use self::{
    daily::DailyTask, favorite::Favorite, income::Income, kanban::KanbanTask,
    mutation::Mutation, note::Note, project::Project, query::Query,
    user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<
    'static,
    Query,
    Mutation,
    juniper::EmptySubscription<crate::Context>,
>;

define_error! {
    enum PaginationError {
        #[code = "AMBIGUOUS_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Ambiguous pagination arguments"]
        Ambiguous,
    }
}
