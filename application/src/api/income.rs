//! [`Income`]-related definitions.

use common::Date;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// Freelance income record of a `User`.
#[derive(Clone, Debug, From)]
pub struct Income {
    /// ID of this [`Income`].
    pub id: Id,

    /// [`domain::Income`] representing this [`Income`].
    income: OnceCell<domain::Income>,
}

impl From<domain::Income> for Income {
    fn from(income: domain::Income) -> Self {
        Self {
            id: income.id.into(),
            income: OnceCell::new_with(Some(income)),
        }
    }
}

impl Income {
    /// Creates a new [`Income`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Income`] with the provided ID exists,
    /// otherwise accessing this [`Income`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            income: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Income`] representing this [`Income`].
    ///
    /// An [`Income`] of another `User` is reported as not existing.
    ///
    /// # Errors
    ///
    /// Error if the [`domain::Income`] doesn't exist.
    async fn income(&self, ctx: &Context) -> Result<&domain::Income, Error> {
        let id = self.id.into();
        self.income
            .get_or_try_init(|| async {
                let my_id = ctx.current_session().await?.user_id;
                ctx.service()
                    .execute(query::income::ById::by(id))
                    .await
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())?
                    .filter(|i| api::user::Id::from(i.user_id) == my_id)
                    .ok_or_else(|| {
                        api::query::IncomeError::NotExists.into()
                    })
                    .map_err(ctx.error())
            })
            .await
    }
}

/// Freelance income record of a `User`.
#[graphql_object(context = Context)]
impl Income {
    /// Unique identifier of this `Income`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Income.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `Date` this `Income` was received on.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Income.date",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn date(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.income(ctx).await?.date)
    }

    /// Amount of this `Income`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Income.amount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn amount(&self, ctx: &Context) -> Result<Amount, Error> {
        Ok(self.income(ctx).await?.amount.into())
    }

    /// Site or stream this `Income` came from.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Income.source",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn source(&self, ctx: &Context) -> Result<Source, Error> {
        Ok(self.income(ctx).await?.source.clone().into())
    }

    /// Product or service this `Income` was earned with.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Income.product",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn product(&self, ctx: &Context) -> Result<Product, Error> {
        Ok(self.income(ctx).await?.product.clone().into())
    }
}

/// Unique identifier of an `Income`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::income::Id)]
#[into(domain::income::Id)]
#[graphql(name = "IncomeId", transparent)]
pub struct Id(Uuid);

/// Amount of an `Income`, in the freelancer's bookkeeping currency.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "IncomeAmount",
    with = scalar::Via::<domain::income::Amount>,
)]
pub struct Amount(domain::income::Amount);

/// Site or stream an `Income` came from.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "IncomeSource",
    with = scalar::Via::<domain::income::Source>,
)]
pub struct Source(domain::income::Source);

/// Product or service an `Income` was earned with.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "IncomeProduct",
    with = scalar::Via::<domain::income::Product>,
)]
pub struct Product(domain::income::Product);

pub mod list {
    //! Definitions related to the [`Income`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use super::{Id, Income};
    use crate::{api::scalar, AsError, Context, Error};

    /// Cursor for the `Income` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::income::list::Cursor)]
    #[graphql(
        name = "IncomeListCursor",
        with = scalar::Via::<read::income::list::Cursor>,
    )]
    pub struct Cursor(pub read::income::list::Cursor);

    /// Edge in the [`Income`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::income::list::Edge);

    /// Edge in the `Income` list.
    #[graphql_object(name = "IncomeListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `IncomeListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `IncomeListEdge`.
        #[must_use]
        pub fn node(&self) -> Income {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees `Income` \
                          existence"
            )]
            unsafe {
                Income::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Income`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct Connection(read::income::list::Connection);

    /// Connection of the `Income` list.
    #[graphql_object(name = "IncomeListConnection", context = Context)]
    impl Connection {
        /// Edges in this `IncomeListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.0.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.0.page_info(),
                start_cursor: self.0.edges.first().map(|e| e.cursor.into()),
                end_cursor: self.0.edges.last().map(|e| e.cursor.into()),
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::income::list::PageInfo`].
        info: read::income::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,

        /// End cursor of the page.
        end_cursor: Option<Cursor>,
    }

    /// Information about an `IncomeListConnection` page.
    #[graphql_object(name = "IncomeListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> &Option<Cursor> {
            &self.start_cursor
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> &Option<Cursor> {
            &self.end_cursor
        }

        /// Total count of the current `User`'s `Income`s.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            let my_id = ctx.current_session().await?.user_id;
            ctx.service()
                .execute(query::incomes::TotalCount::by(my_id.into()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }
}
