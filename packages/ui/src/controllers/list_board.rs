use api::{AuthProvider, Backend, SessionChange};
use store::{
    BlobStore, Direction, ListCollection, NewList, Profile, Scope, SyncError, TableStore, TodoList,
    UserId,
};

use super::{Notifier, Pending, Shared};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListBoardState {
    pub user: Option<UserId>,
    pub profile: Option<Profile>,
    pub lists: Vec<TodoList>,
    pub show_input: bool,
    pub draft: String,
    pub error: Option<String>,
    pub in_flight: usize,
}

impl ListBoardState {
    pub fn busy(&self) -> bool {
        self.in_flight > 0
    }

    /// "Hello <name>!" once the profile is known.
    pub fn greeting(&self) -> Option<String> {
        let name = self.profile.as_ref()?.display_name();
        (!name.is_empty()).then(|| format!("Hello {name}!"))
    }
}

impl Pending for ListBoardState {
    fn in_flight(&mut self) -> &mut usize {
        &mut self.in_flight
    }

    fn error(&mut self) -> &mut Option<String> {
        &mut self.error
    }
}

/// The signed-in user's lists.
#[derive(Clone)]
pub struct ListBoard<A, T, B> {
    backend: Backend<A, T, B>,
    lists: ListCollection<T>,
    shared: Shared<ListBoardState>,
}

impl<A, T, B> ListBoard<A, T, B>
where
    A: AuthProvider,
    T: TableStore + Clone,
    B: BlobStore,
{
    pub fn new(backend: Backend<A, T, B>, notify: Notifier) -> Self {
        let lists = backend.lists();
        let shared = Shared::new(ListBoardState::default(), notify);
        let mirror = shared.clone();
        lists.observe(move |rows: &[TodoList]| mirror.update(|s| s.lists = rows.to_vec()));
        Self {
            backend,
            lists,
            shared,
        }
    }

    pub fn snapshot(&self) -> ListBoardState {
        self.shared.snapshot()
    }

    /// Load the profile and the lists of the signed-in user.
    pub async fn mount(&self) -> Result<(), SyncError> {
        let session = self.backend.gateway.require_session().await?;
        let user = session.user.id;
        self.shared.update(|s| s.user = Some(user.clone()));

        match self.backend.profiles().fetch_profile(&user).await {
            Ok(profile) => self.shared.update(|s| s.profile = profile),
            Err(e) => tracing::warn!("Error fetching profile: {e}"),
        }

        self.shared.track(self.lists.load(Scope::user(user))).await?;
        Ok(())
    }

    pub fn open_input(&self) {
        self.shared.update(|s| {
            s.show_input = true;
            s.error = None;
        });
    }

    pub fn dismiss_input(&self) {
        self.shared.update(|s| {
            s.show_input = false;
            s.error = None;
        });
    }

    pub fn set_draft(&self, text: &str) {
        self.shared.update(|s| s.draft = text.to_string());
    }

    /// Create a list from the draft. The input closes unless the name was
    /// rejected, in which case the message is shown next to it.
    pub async fn add_list(&self) -> Result<TodoList, SyncError> {
        let session = self.backend.gateway.require_session().await?;
        let draft = NewList {
            name: self.shared.read(|s| s.draft.clone()),
            user_id: session.user.id,
        };

        let result = self.shared.track(self.lists.create(draft)).await;
        self.shared.update(|s| match &result {
            Ok(_) => {
                s.draft.clear();
                s.show_input = false;
            }
            Err(SyncError::Validation(_)) => {}
            Err(_) => s.show_input = false,
        });
        result
    }

    pub async fn toggle_list(&self, list_id: i64) -> Result<bool, SyncError> {
        self.backend.gateway.require_session().await?;
        self.shared.track(self.lists.toggle_completion(list_id)).await
    }

    /// Delete a list together with its tasks; returns the removed list.
    pub async fn delete_list(&self, list_id: i64) -> Result<Option<TodoList>, SyncError> {
        self.backend.gateway.require_session().await?;
        let removed = self.lists.get(list_id);
        self.shared.track(self.lists.remove(list_id)).await?;
        Ok(removed)
    }

    pub fn move_up(&self, index: usize) -> bool {
        self.lists.reorder_adjacent(index, Direction::Up)
    }

    pub fn move_down(&self, index: usize) -> bool {
        self.lists.reorder_adjacent(index, Direction::Down)
    }

    /// Reload for a new session, or forget everything on sign-out.
    pub async fn on_session_change(&self, change: &SessionChange) -> Result<(), SyncError> {
        if change.session.is_none() {
            self.lists.clear();
            self.shared.update(|s| *s = ListBoardState::default());
            return Err(SyncError::NotAuthenticated);
        }
        self.mount().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::silent;
    use api::MemoryBackend;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn signed_in() -> (MemoryBackend, UserId) {
        let backend = MemoryBackend::in_memory();
        let user = backend.auth().register("ada@example.com", "secret1");
        backend.auth().restore_session(&user);
        (backend, user)
    }

    #[tokio::test]
    async fn test_mount_without_session_is_not_authenticated() {
        let backend = MemoryBackend::in_memory();
        let board = ListBoard::new(backend.clone(), silent());

        assert_eq!(board.mount().await, Err(SyncError::NotAuthenticated));
        assert_eq!(backend.tables.calls(), 0);
    }

    #[tokio::test]
    async fn test_mount_loads_profile_and_lists() {
        let (backend, user) = signed_in();
        backend.tables.seed(
            "profiles",
            vec![json!({ "id": user.as_str(), "name": "Ada" })],
        );
        backend.tables.seed(
            "lists",
            vec![
                json!({ "name": "Work", "user_id": user.as_str() }),
                json!({ "name": "Elsewhere", "user_id": "someone-else" }),
            ],
        );
        let board = ListBoard::new(backend, silent());

        board.mount().await.unwrap();

        let state = board.snapshot();
        assert_eq!(state.greeting().as_deref(), Some("Hello Ada!"));
        assert_eq!(state.lists.len(), 1);
        assert!(!state.busy());
    }

    #[tokio::test]
    async fn test_add_list_closes_input_and_clears_draft() {
        let (backend, _) = signed_in();
        let board = ListBoard::new(backend, silent());
        board.mount().await.unwrap();

        board.open_input();
        board.set_draft("  Groceries ");
        let list = board.add_list().await.unwrap();

        let state = board.snapshot();
        assert_eq!(list.name, "Groceries");
        assert_eq!(state.lists, vec![list]);
        assert!(!state.show_input);
        assert!(state.draft.is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_stays_open_with_inline_error() {
        let (backend, _) = signed_in();
        let board = ListBoard::new(backend.clone(), silent());
        board.mount().await.unwrap();
        let calls = backend.tables.calls();

        board.open_input();
        board.set_draft("   ");
        let result = board.add_list().await;

        let state = board.snapshot();
        assert!(matches!(result, Err(SyncError::Validation(_))));
        assert!(state.show_input);
        assert!(state.error.is_some());
        assert_eq!(backend.tables.calls(), calls);
    }

    #[tokio::test]
    async fn test_delete_list_returns_removed_list() {
        let (backend, user) = signed_in();
        backend.tables.seed(
            "lists",
            vec![json!({ "name": "Groceries", "user_id": user.as_str() })],
        );
        backend.tables.seed(
            "tasks",
            vec![json!({ "task_name": "Milk", "list_id": 1, "user_id": user.as_str() })],
        );
        let board = ListBoard::new(backend.clone(), silent());
        board.mount().await.unwrap();

        let removed = board.delete_list(1).await.unwrap();

        assert_eq!(removed.map(|l| l.name).as_deref(), Some("Groceries"));
        assert!(board.snapshot().lists.is_empty());
        assert!(backend.tables.rows("tasks").is_empty());
    }

    #[tokio::test]
    async fn test_actions_after_sign_out_require_login() {
        let (backend, user) = signed_in();
        backend.tables.seed(
            "lists",
            vec![json!({ "name": "Work", "user_id": user.as_str() })],
        );
        let board = ListBoard::new(backend.clone(), silent());
        board.mount().await.unwrap();

        backend.gateway.sign_out().await.unwrap();

        assert_eq!(board.toggle_list(1).await, Err(SyncError::NotAuthenticated));
        assert_eq!(
            board.on_session_change(&SessionChange::signed_out()).await,
            Err(SyncError::NotAuthenticated)
        );
        assert!(board.snapshot().lists.is_empty());
    }

    #[tokio::test]
    async fn test_reorder_and_notifications() {
        let (backend, user) = signed_in();
        backend.tables.seed(
            "lists",
            vec![
                json!({ "name": "A", "user_id": user.as_str() }),
                json!({ "name": "B", "user_id": user.as_str() }),
            ],
        );
        let renders = Rc::new(Cell::new(0));
        let counter = renders.clone();
        let board = ListBoard::new(backend, Rc::new(move || counter.set(counter.get() + 1)));
        board.mount().await.unwrap();
        let before = renders.get();

        assert!(board.move_down(0));
        assert!(!board.move_down(1));

        let names: Vec<_> = board.snapshot().lists.into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(renders.get(), before + 1);
    }
}
