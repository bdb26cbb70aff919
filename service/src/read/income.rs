//! [`Income`]-related read definitions.

#[cfg(doc)]
use crate::domain::Income;

pub mod list {
    //! [`Income`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{income, user};
    #[cfg(doc)]
    use crate::domain::Income;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = income::Id;

    /// Cursor pointing to a specific [`Income`] in a list.
    ///
    /// The list is ordered by the earning day descending (newest first),
    /// with the ID tie-breaking entries of the same day.
    pub type Cursor = income::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`User`] whose [`Income`]s should be listed.
        ///
        /// [`User`]: crate::domain::User
        pub user_id: user::Id,
    }

    /// Total count of [`Income`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
