//! In-memory [`Database`] implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::{
    operations::{By, Commit, Delete, Insert, Lock, Select, Transact, Update},
    pagination::{Kind, Order},
};
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    domain::{
        daily, favorite, income, kanban, note, project, user, DailyTask,
        Favorite, Income, KanbanTask, Note, Project, User,
    },
    infra::{database, Database},
    read,
};

/// In-memory [`Database`] implementation.
///
/// Nothing ever hits a disk here: the whole state lives in the process and
/// vanishes with it, which makes this implementation a natural fit for tests.
///
/// Transactions are flattened: [`Transact`] hands out the same store, every
/// operation applies immediately, and [`Commit`] and [`Lock`]s are no-ops.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Store>);

/// State of a [`Memory`] database.
#[derive(Debug, Default)]
struct Store {
    /// Stored [`User`]s.
    users: Mutex<Vec<User>>,

    /// Stored [`Project`]s.
    projects: Mutex<Vec<Project>>,

    /// Stored [`KanbanTask`]s.
    kanban_tasks: Mutex<Vec<KanbanTask>>,

    /// Stored [`DailyTask`]s.
    daily_tasks: Mutex<Vec<DailyTask>>,

    /// Stored [`Note`]s.
    notes: Mutex<Vec<Note>>,

    /// Stored [`Favorite`]s.
    favorites: Mutex<Vec<Favorite>>,

    /// Stored [`Income`]s.
    incomes: Mutex<Vec<Income>>,
}

/// Acquires the given [`Mutex`], shrugging off its poisoning.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

/// Implements the [`Select`]-by-ID, [`Insert`], [`Update`] and [`Lock`]
/// operations of a single entity for the [`Memory`] database.
macro_rules! impl_entity_ops {
    ($entity:ty, $id:ty, $field:ident) => {
        impl Database<Select<By<Option<$entity>, $id>>> for Memory {
            type Ok = Option<$entity>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<$entity>, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                Ok(lock(&self.0.$field)
                    .iter()
                    .find(|e| e.id == id)
                    .cloned())
            }
        }

        impl Database<Insert<$entity>> for Memory {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Insert(entity): Insert<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                lock(&self.0.$field).push(entity);
                Ok(())
            }
        }

        impl Database<Update<$entity>> for Memory {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Update(entity): Update<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                let mut entities = lock(&self.0.$field);
                if let Some(e) =
                    entities.iter_mut().find(|e| e.id == entity.id)
                {
                    *e = entity;
                } else {
                    entities.push(entity);
                }
                Ok(())
            }
        }

        impl Database<Lock<By<$entity, $id>>> for Memory {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                _: Lock<By<$entity, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                // Single-process store, nothing to lock.
                Ok(())
            }
        }
    };
}

impl_entity_ops!(User, user::Id, users);
impl_entity_ops!(Project, project::Id, projects);
impl_entity_ops!(KanbanTask, kanban::Id, kanban_tasks);
impl_entity_ops!(DailyTask, daily::Id, daily_tasks);
impl_entity_ops!(Note, note::Id, notes);
impl_entity_ops!(Favorite, favorite::Id, favorites);
impl_entity_ops!(Income, income::Id, incomes);

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(lock(&self.0.users)
            .iter()
            .find(|u| u.email == *email)
            .cloned())
    }
}

impl Database<Select<By<Vec<Project>, user::Id>>> for Memory {
    type Ok = Vec<Project>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Project>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        let mut projects = lock(&self.0.projects)
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        projects.sort_by(|a, b| {
            AsRef::<str>::as_ref(&a.name)
                .cmp(b.name.as_ref())
                .then_with(|| Uuid::from(a.id).cmp(&Uuid::from(b.id)))
        });
        Ok(projects)
    }
}

impl Database<Lock<By<Project, user::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Project, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Single-process store, nothing to lock.
        Ok(())
    }
}

impl Database<Delete<By<Project, project::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Project, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        lock(&self.0.projects).retain(|p| p.id != id);
        // Everything attached to the `Project` goes down with it.
        lock(&self.0.kanban_tasks).retain(|t| t.project_id != id);
        lock(&self.0.daily_tasks).retain(|t| t.project_id != id);
        lock(&self.0.notes).retain(|n| n.project_id != id);
        lock(&self.0.favorites).retain(|f| f.project_id != id);
        Ok(())
    }
}

impl Database<Select<By<Vec<KanbanTask>, project::Id>>> for Memory {
    type Ok = Vec<KanbanTask>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<KanbanTask>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let project_id = by.into_inner();
        let mut tasks = lock(&self.0.kanban_tasks)
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect::<Vec<_>>();
        tasks.sort_by_key(|t| (t.created_at, Uuid::from(t.id)));
        Ok(tasks)
    }
}

impl Database<Delete<By<KanbanTask, kanban::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<KanbanTask, kanban::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        lock(&self.0.kanban_tasks).retain(|t| t.id != id);
        Ok(())
    }
}

impl Database<Select<By<Vec<DailyTask>, project::Id>>> for Memory {
    type Ok = Vec<DailyTask>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<DailyTask>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let project_id = by.into_inner();
        let mut tasks = lock(&self.0.daily_tasks)
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect::<Vec<_>>();
        tasks.sort_by_key(|t| (t.created_at, Uuid::from(t.id)));
        Ok(tasks)
    }
}

impl Database<Select<By<Vec<DailyTask>, user::Id>>> for Memory {
    type Ok = Vec<DailyTask>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<DailyTask>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        let project_ids = lock(&self.0.projects)
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.id)
            .collect::<Vec<_>>();
        let mut tasks = lock(&self.0.daily_tasks)
            .iter()
            .filter(|t| project_ids.contains(&t.project_id))
            .cloned()
            .collect::<Vec<_>>();
        tasks.sort_by_key(|t| (t.created_at, Uuid::from(t.id)));
        Ok(tasks)
    }
}

impl Database<Update<daily::Completion>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(completion): Update<daily::Completion>,
    ) -> Result<Self::Ok, Self::Err> {
        let daily::Completion { task_id, date } = completion;

        // A missing mark toggles straight to done.
        Ok(lock(&self.0.daily_tasks)
            .iter_mut()
            .find(|t| t.id == task_id)
            .map_or(true, |task| {
                let done = !task.is_done_on(date);
                let _ = task.completions.insert(date, done);
                done
            }))
    }
}

impl Database<Insert<daily::Today>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(today): Insert<daily::Today>,
    ) -> Result<Self::Ok, Self::Err> {
        let daily::Today { project_id, date } = today;

        for task in lock(&self.0.daily_tasks)
            .iter_mut()
            .filter(|t| t.project_id == project_id)
        {
            // Existing marks are left untouched.
            let _ = task.completions.entry(date).or_insert(false);
        }
        Ok(())
    }
}

impl Database<Delete<By<DailyTask, daily::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<DailyTask, daily::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        lock(&self.0.daily_tasks).retain(|t| t.id != id);
        Ok(())
    }
}

impl Database<Select<By<Vec<Note>, project::Id>>> for Memory {
    type Ok = Vec<Note>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Note>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let project_id = by.into_inner();
        let mut notes = lock(&self.0.notes)
            .iter()
            .filter(|n| n.project_id == project_id)
            .cloned()
            .collect::<Vec<_>>();
        // Pinned notes first, then the freshest ones.
        notes.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
                .then_with(|| Uuid::from(a.id).cmp(&Uuid::from(b.id)))
        });
        Ok(notes)
    }
}

impl Database<Delete<By<Note, note::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Note, note::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        lock(&self.0.notes).retain(|n| n.id != id);
        Ok(())
    }
}

impl Database<Select<By<Vec<Favorite>, project::Id>>> for Memory {
    type Ok = Vec<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Favorite>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let project_id = by.into_inner();
        let mut favorites = lock(&self.0.favorites)
            .iter()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect::<Vec<_>>();
        favorites.sort_by_key(|f| (f.created_at, Uuid::from(f.id)));
        Ok(favorites)
    }
}

impl Database<Delete<By<Favorite, favorite::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Favorite, favorite::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        lock(&self.0.favorites).retain(|f| f.id != id);
        Ok(())
    }
}

impl Database<Delete<By<Income, income::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Income, income::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        lock(&self.0.incomes).retain(|i| i.id != id);
        Ok(())
    }
}

impl
    Database<Select<By<read::income::list::Page, read::income::list::Selector>>>
    for Memory
{
    type Ok = read::income::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::income::list::Page, read::income::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::income::list::Selector {
            arguments,
            filter: read::income::list::Filter { user_id },
        } = by.into_inner();

        let mut keyed = lock(&self.0.incomes)
            .iter()
            .filter(|i| i.user_id == user_id)
            .map(|i| ((i.date, Uuid::from(i.id)), i.id))
            .collect::<Vec<_>>();
        keyed.sort_by_key(|(key, _)| *key);

        // The list is walked newest first, so the requested kind mirrors.
        let kind = arguments.kind().reversed();

        if let Some(cursor) = arguments.cursor() {
            let at = keyed
                .iter()
                .find(|(_, id)| id == cursor)
                .map(|(key, _)| *key);
            if let Some(at) = at {
                keyed.retain(|(key, _)| match kind {
                    Kind::Forward => *key > at,
                    Kind::ForwardIncluding => *key >= at,
                    Kind::Backward => *key < at,
                    Kind::BackwardIncluding => *key <= at,
                });
            } else {
                // Unknown cursors yield an empty page.
                keyed.clear();
            }
        }

        if kind.order() == Order::Descending {
            keyed.reverse();
        }

        let has_more = keyed.len() > arguments.limit();
        let edges = keyed
            .into_iter()
            .take(arguments.limit())
            .map(|(_, id)| (id, id))
            .collect::<Vec<_>>();

        Ok(read::income::list::Page::new(&arguments, edges, has_more))
    }
}

impl Database<Select<By<read::income::list::TotalCount, user::Id>>>
    for Memory
{
    type Ok = read::income::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::income::list::TotalCount, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        let count = lock(&self.0.incomes)
            .iter()
            .filter(|i| i.user_id == user_id)
            .count();
        Ok(read::income::list::TotalCount::from(
            i32::try_from(count).unwrap_or(i32::MAX),
        ))
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Insert, Select},
        DateTime,
    };
    use uuid::Uuid;

    use crate::{
        command::testing,
        domain::{income, project, user, Note, Project},
        read::income::list::{Arguments, Filter, Page, Selector, TotalCount},
        Command as _,
    };

    use super::Memory;

    /// Inserts an [`Income`] of the given [`User`] earned on the given day.
    ///
    /// [`Income`]: crate::domain::Income
    /// [`User`]: crate::domain::User
    async fn earn(db: &Memory, user_id: user::Id, date: &str) -> income::Id {
        let income = testing::income(user_id, date);
        let id = income.id;
        db.execute(Insert(income)).await.unwrap();
        id
    }

    /// Selects a [`Page`] of the [`User`]'s [`Income`]s.
    ///
    /// [`Income`]: crate::domain::Income
    /// [`User`]: crate::domain::User
    async fn list(
        db: &Memory,
        user_id: user::Id,
        arguments: Arguments,
    ) -> Page {
        db.execute(Select(By::<Page, _>::new(Selector {
            arguments,
            filter: Filter { user_id },
        })))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn pages_newest_incomes_first() {
        let db = Memory::default();
        let user_id = user::Id::new();
        let _ = earn(&db, user_id, "2025-03-01").await;
        let middle = earn(&db, user_id, "2025-03-02").await;
        let newest = earn(&db, user_id, "2025-03-03").await;
        let _ = earn(&db, user::Id::new(), "2025-03-04").await;

        let arguments =
            Arguments::new(Some(2), None, None, None, 10).unwrap();
        let page = list(&db, user_id, arguments).await;

        assert_eq!(
            page.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            vec![newest, middle],
        );
        let info = page.page_info();
        assert_eq!(info.end_cursor, Some(middle));
        assert!(info.has_next_page);
        assert!(!info.has_previous_page);
    }

    #[tokio::test]
    async fn resumes_after_the_cursor() {
        let db = Memory::default();
        let user_id = user::Id::new();
        let oldest = earn(&db, user_id, "2025-03-01").await;
        let middle = earn(&db, user_id, "2025-03-02").await;
        let _ = earn(&db, user_id, "2025-03-03").await;

        let arguments =
            Arguments::new(Some(2), Some(middle), None, None, 10).unwrap();
        let page = list(&db, user_id, arguments).await;

        assert_eq!(
            page.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            vec![oldest],
        );
        let info = page.page_info();
        assert!(!info.has_next_page);
        assert!(!info.has_previous_page);
    }

    #[tokio::test]
    async fn walks_backward_from_the_oldest() {
        let db = Memory::default();
        let user_id = user::Id::new();
        let oldest = earn(&db, user_id, "2025-03-01").await;
        let middle = earn(&db, user_id, "2025-03-02").await;
        let _ = earn(&db, user_id, "2025-03-03").await;

        let arguments =
            Arguments::new(None, None, Some(2), None, 10).unwrap();
        let page = list(&db, user_id, arguments).await;

        assert_eq!(
            page.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            vec![oldest, middle],
        );
        let info = page.page_info();
        assert_eq!(info.end_cursor, Some(middle));
        assert!(!info.has_next_page);
        assert!(info.has_previous_page);
    }

    #[tokio::test]
    async fn unknown_cursor_yields_an_empty_page() {
        let db = Memory::default();
        let user_id = user::Id::new();
        let _ = earn(&db, user_id, "2025-03-01").await;

        let arguments =
            Arguments::new(Some(10), Some(income::Id::new()), None, None, 10)
                .unwrap();
        let page = list(&db, user_id, arguments).await;

        assert!(page.edges.is_empty());
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn ties_on_the_same_day_break_by_id() {
        let db = Memory::default();
        let user_id = user::Id::new();
        let a = earn(&db, user_id, "2025-03-01").await;
        let b = earn(&db, user_id, "2025-03-01").await;
        let (first, second) = if Uuid::from(a) > Uuid::from(b) {
            (a, b)
        } else {
            (b, a)
        };

        let arguments =
            Arguments::new(Some(1), None, None, None, 10).unwrap();
        let page = list(&db, user_id, arguments).await;
        assert_eq!(page.edges[0].node, first);

        let arguments =
            Arguments::new(Some(1), Some(first), None, None, 10).unwrap();
        let page = list(&db, user_id, arguments).await;
        assert_eq!(page.edges[0].node, second);
    }

    #[tokio::test]
    async fn counts_only_the_owners_incomes() {
        let db = Memory::default();
        let user_id = user::Id::new();
        let _ = earn(&db, user_id, "2025-03-01").await;
        let _ = earn(&db, user_id, "2025-03-02").await;
        let _ = earn(&db, user::Id::new(), "2025-03-03").await;

        let count = db
            .execute(Select(By::<TotalCount, _>::new(user_id)))
            .await
            .unwrap();

        assert_eq!(count, TotalCount::from(2));
    }

    #[tokio::test]
    async fn lists_notes_pinned_first() {
        let db = Memory::default();
        let project_id = project::Id::new();
        let hour_ago =
            (DateTime::now() - Duration::from_secs(3600)).coerce();
        let mut stale = testing::note(project_id, "stale");
        stale.updated_at = hour_ago;
        let mut pinned = testing::note(project_id, "pinned");
        pinned.pinned = true;
        pinned.updated_at = hour_ago;
        let fresh = testing::note(project_id, "fresh");
        db.execute(Insert(fresh.clone())).await.unwrap();
        db.execute(Insert(stale.clone())).await.unwrap();
        db.execute(Insert(pinned.clone())).await.unwrap();

        let notes = db
            .execute(Select(By::<Vec<Note>, _>::new(project_id)))
            .await
            .unwrap();

        assert_eq!(
            notes.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![pinned.id, fresh.id, stale.id],
        );
    }

    #[tokio::test]
    async fn lists_projects_by_name() {
        let db = Memory::default();
        let user_id = user::Id::new();
        let zebra = testing::project(user_id, "Zebra");
        let atlas = testing::project(user_id, "Atlas");
        db.execute(Insert(zebra.clone())).await.unwrap();
        db.execute(Insert(atlas.clone())).await.unwrap();
        db.execute(Insert(testing::project(user::Id::new(), "Aardvark")))
            .await
            .unwrap();

        let projects = db
            .execute(Select(By::<Vec<Project>, _>::new(user_id)))
            .await
            .unwrap();

        assert_eq!(
            projects.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![atlas.id, zebra.id],
        );
    }
}
