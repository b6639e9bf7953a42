use std::cell::Cell;
use std::rc::Rc;

use api::{AuthProvider, Backend, SessionChange};
use store::{
    resolve_list_by_name, BlobStore, NewTask, Scope, SyncError, TableStore, Task, TaskCollection,
    TodoList,
};

use super::{Notifier, Pending, Shared};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskBoardState {
    /// Name from the route; `None` means no list was chosen yet.
    pub list_name: Option<String>,
    /// The resolved list; `None` with a name set means it does not exist.
    pub list: Option<TodoList>,
    pub tasks: Vec<Task>,
    pub show_input: bool,
    pub task_name: String,
    pub description: String,
    pub selected: Option<i64>,
    pub error: Option<String>,
    pub in_flight: usize,
}

impl TaskBoardState {
    pub fn busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn is_selected(&self, task_id: i64) -> bool {
        self.selected == Some(task_id)
    }
}

impl Pending for TaskBoardState {
    fn in_flight(&mut self) -> &mut usize {
        &mut self.in_flight
    }

    fn error(&mut self) -> &mut Option<String> {
        &mut self.error
    }
}

/// Tasks of the list named in the route.
#[derive(Clone)]
pub struct TaskBoard<A, T, B> {
    backend: Backend<A, T, B>,
    tasks: TaskCollection<T>,
    shared: Shared<TaskBoardState>,
    /// Bumped by every [`mount`](TaskBoard::mount); older mounts drop their results.
    generation: Rc<Cell<u64>>,
}

impl<A, T, B> TaskBoard<A, T, B>
where
    A: AuthProvider,
    T: TableStore + Clone,
    B: BlobStore,
{
    pub fn new(backend: Backend<A, T, B>, notify: Notifier) -> Self {
        let tasks = backend.tasks();
        let shared = Shared::new(TaskBoardState::default(), notify);
        let mirror = shared.clone();
        tasks.observe(move |rows: &[Task]| mirror.update(|s| s.tasks = rows.to_vec()));
        Self {
            backend,
            tasks,
            shared,
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn snapshot(&self) -> TaskBoardState {
        self.shared.snapshot()
    }

    /// Resolve `list_name` and load its tasks.
    ///
    /// Without a name, or when no list of that name exists, the board is
    /// left empty. A mount overtaken by a later one discards what it fetched.
    pub async fn mount(&self, list_name: Option<String>) -> Result<(), SyncError> {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        let session = self.backend.gateway.require_session().await?;
        let user = session.user.id;
        if self.is_stale(generation) {
            return Ok(());
        }

        let changed = self.shared.read(|s| s.list_name != list_name);
        self.shared.update(|s| {
            if changed {
                s.list = None;
                s.selected = None;
                s.show_input = false;
            }
            s.list_name = list_name.clone();
        });
        if changed {
            self.tasks.clear();
        }

        let Some(name) = list_name else {
            self.tasks.clear();
            self.shared.update(|s| s.list = None);
            return Ok(());
        };

        let list = self
            .shared
            .track(resolve_list_by_name(&self.backend.tables, &user, &name))
            .await?;
        if self.is_stale(generation) {
            tracing::debug!(list = name, "Dropping superseded list lookup");
            return Ok(());
        }
        self.shared.update(|s| s.list = list.clone());

        match list {
            Some(list) => {
                let scope = Scope::child(user, list.list_id);
                self.shared.track(self.tasks.load(scope.clone())).await?;
                if self.is_stale(generation) && self.tasks.scope() == Some(scope) {
                    tracing::debug!(list = name, "Dropping superseded task load");
                    self.tasks.clear();
                }
            }
            None => {
                tracing::info!(list = name, "List not found");
                self.tasks.clear();
            }
        }
        Ok(())
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.get() != generation
    }

    pub fn open_input(&self) {
        self.shared.update(|s| {
            s.show_input = true;
            s.error = None;
        });
    }

    /// Close the input and collapse the selected task.
    pub fn dismiss(&self) {
        self.shared.update(|s| {
            s.show_input = false;
            s.selected = None;
            s.error = None;
        });
    }

    pub fn set_task_name(&self, text: &str) {
        self.shared.update(|s| s.task_name = text.to_string());
    }

    pub fn set_description(&self, text: &str) {
        self.shared.update(|s| s.description = text.to_string());
    }

    /// Add a task from the drafts. A blank description is stored as absent.
    pub async fn add_task(&self) -> Result<Task, SyncError> {
        let session = self.backend.gateway.require_session().await?;
        let (list, task_name, description) = self
            .shared
            .read(|s| (s.list.clone(), s.task_name.clone(), s.description.clone()));
        let Some(list) = list else {
            let error = SyncError::Validation("Choose a list first".to_string());
            self.shared.update(|s| s.error = Some(error.to_string()));
            return Err(error);
        };

        let draft = NewTask {
            task_name,
            description: Some(description),
            list_id: list.list_id,
            user_id: session.user.id,
        };
        let result = self.shared.track(self.tasks.create(draft)).await;
        self.shared.update(|s| match &result {
            Ok(_) => {
                s.task_name.clear();
                s.description.clear();
                s.show_input = false;
            }
            Err(SyncError::Validation(_)) => {}
            Err(_) => s.show_input = false,
        });
        result
    }

    pub async fn toggle_task(&self, task_id: i64) -> Result<bool, SyncError> {
        self.backend.gateway.require_session().await?;
        self.shared.track(self.tasks.toggle_completion(task_id)).await
    }

    pub async fn delete_task(&self, task_id: i64) -> Result<(), SyncError> {
        self.backend.gateway.require_session().await?;
        self.shared.track(self.tasks.remove(task_id)).await?;
        self.shared.update(|s| {
            if s.selected == Some(task_id) {
                s.selected = None;
            }
        });
        Ok(())
    }

    /// Expand a task's description, or collapse it when already expanded.
    pub fn select_task(&self, task_id: i64) {
        self.shared.update(|s| {
            s.selected = if s.selected == Some(task_id) {
                None
            } else {
                Some(task_id)
            };
        });
    }

    pub async fn on_session_change(&self, change: &SessionChange) -> Result<(), SyncError> {
        if change.session.is_none() {
            self.tasks.clear();
            self.shared.update(|s| *s = TaskBoardState::default());
            return Err(SyncError::NotAuthenticated);
        }
        let list_name = self.shared.read(|s| s.list_name.clone());
        self.mount(list_name).await
    }
}
