//! # View controllers
//!
//! Each screen's behavior lives in a plain struct that owns its state and
//! talks to a [`api::Backend`]; the Dioxus components in [`crate::views`]
//! only render snapshots and forward user input. Controllers are generic over
//! the backend so the same code runs against the hosted service and the
//! in-memory doubles used in tests.
//!
//! | Controller | Screen |
//! |------------|--------|
//! | [`ListBoard`] | the user's lists |
//! | [`TaskBoard`] | tasks of one list |
//! | [`AccountPanel`] | password, username, avatar, logout |
//! | [`auth_forms`] | login and sign-up submissions |
//!
//! Every remote-touching action checks the session first and fails with
//! `NotAuthenticated` when there is none; views answer that with a redirect
//! to `/login`. State changes are announced through a [`Notifier`] so the
//! renderer knows when to take a new snapshot.

mod account_panel;
pub mod auth_forms;
mod list_board;
mod task_board;

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use store::SyncError;

pub use account_panel::{AccountPanel, AccountState, Notice};
pub use list_board::{ListBoard, ListBoardState};
pub use task_board::{TaskBoard, TaskBoardState};

/// Minimum password length accepted by the auth provider.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Called after every controller state change.
pub type Notifier = Rc<dyn Fn()>;

pub fn silent() -> Notifier {
    Rc::new(|| {})
}

/// Fields every controller state carries.
pub trait Pending {
    fn in_flight(&mut self) -> &mut usize;
    fn error(&mut self) -> &mut Option<String>;
}

/// Controller state shared between the controller and its collection observers.
pub(crate) struct Shared<S> {
    state: Rc<RefCell<S>>,
    notify: Notifier,
}

impl<S> Clone for Shared<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            notify: self.notify.clone(),
        }
    }
}

impl<S: Clone + Pending> Shared<S> {
    pub fn new(state: S, notify: Notifier) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
            notify,
        }
    }

    pub fn snapshot(&self) -> S {
        self.state.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn update(&self, f: impl FnOnce(&mut S)) {
        f(&mut self.state.borrow_mut());
        (self.notify)();
    }

    /// Run a remote operation with the in-flight counter raised. A validation
    /// failure is kept as the inline error; any outcome clears the old one.
    pub async fn track<R>(
        &self,
        op: impl Future<Output = Result<R, SyncError>>,
    ) -> Result<R, SyncError> {
        self.update(|s| {
            *s.in_flight() += 1;
            *s.error() = None;
        });
        let result = op.await;
        self.update(|s| {
            let count = s.in_flight();
            *count = count.saturating_sub(1);
            if let Err(SyncError::Validation(message)) = &result {
                *s.error() = Some(message.clone());
            }
        });
        result
    }
}
