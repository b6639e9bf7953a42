//! Screens of the app.
//!
//! Platform packages render [`PageView`] for the current URL and pass an
//! `on_navigate` handler; views never touch the router directly.

use std::rc::Rc;

use api::SessionChange;
use dioxus::prelude::*;
use store::SyncError;

use crate::activity_log::{log_failure, ActivityLog};
use crate::backend_context::{use_backend, AppBackend};
use crate::controllers::Notifier;
use crate::layout::use_layout;
use crate::lifecycle::{ViewLifecycle, VisibilityWatch};
use crate::routes::{compose, Composition, Page, Screen};

mod account;
mod auth_forms;
mod list_board;
mod task_board;

pub use account::{AccountView, AvatarBadge, PLACEHOLDER_AVATAR_URL};
pub use auth_forms::{LoginView, SignUpView};
pub use list_board::ListBoardView;
pub use task_board::TaskBoardView;

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Why a mounted view (re)loads its data.
#[derive(Clone, Debug)]
pub(crate) enum Trigger {
    Mount,
    Visible,
    Session(SessionChange),
}

/// Build a controller once per mounted view. The returned revision bumps on
/// every controller state change; read it to re-render.
pub(crate) fn use_controller<C: Clone + 'static>(
    make: impl FnOnce(AppBackend, Notifier) -> C,
) -> (C, Signal<u64>) {
    let backend = use_backend();
    let revision = use_signal(|| 0u64);
    let controller = use_hook(move || {
        let notify: Notifier = Rc::new(move || {
            let mut revision = revision;
            *revision.write() += 1;
        });
        make(backend, notify)
    });
    (controller, revision)
}

/// Session and visibility watchers for the lifetime of the calling view.
pub(crate) fn use_view_lifecycle() -> Signal<Trigger> {
    let backend = use_backend();
    let trigger = use_signal(|| Trigger::Mount);
    use_hook(move || {
        let session = backend.gateway.on_session_change(move |change| {
            let mut trigger = trigger;
            trigger.set(Trigger::Session(change.clone()));
        });
        let visibility = VisibilityWatch::new(move || {
            let mut trigger = trigger;
            trigger.set(Trigger::Visible);
        });
        Rc::new(ViewLifecycle::new(session, visibility))
    });
    trigger
}

/// Route a controller result: missing sessions go to the login screen,
/// remote failures to the activity log, tagged with the `origin` screen.
/// Validation messages are already in the controller state.
pub(crate) fn settle<T>(
    result: Result<T, SyncError>,
    action: &str,
    origin: Page,
    mut log: Signal<ActivityLog>,
    on_navigate: EventHandler<Page>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(SyncError::NotAuthenticated) => {
            on_navigate.call(Page::Login);
            None
        }
        Err(SyncError::Validation(_)) => None,
        Err(e) => {
            log_failure(&mut log, action, origin, &e);
            None
        }
    }
}

/// Everything rendered for one URL.
#[component]
pub fn PageView(page: Page, on_navigate: EventHandler<Page>) -> Element {
    let layout = use_layout();

    match compose(&page, layout()) {
        Composition::ThreePane { list_name } => rsx! {
            DesktopView { list_name, on_navigate }
        },
        Composition::Single(Screen::Login) => rsx! {
            LoginView { on_navigate }
        },
        Composition::Single(Screen::SignUp) => rsx! {
            SignUpView { on_navigate }
        },
        Composition::Single(Screen::Lists) => rsx! {
            ListBoardView { compact: true, on_navigate }
        },
        Composition::Single(Screen::Account) => rsx! {
            AccountView { compact: true, on_navigate }
        },
        Composition::Single(Screen::Tasks { list_name }) => rsx! {
            TaskBoardView { list_name, compact: true, on_navigate }
        },
        Composition::NotFound => rsx! {
            NotFoundView { on_navigate }
        },
    }
}

/// Lists, tasks and account side by side.
#[component]
pub fn DesktopView(list_name: Option<String>, on_navigate: EventHandler<Page>) -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "three-pane",
            ListBoardView { active_list: list_name.clone(), compact: false, on_navigate }
            TaskBoardView { list_name, compact: false, on_navigate }
            AccountView { compact: false, on_navigate }
        }
    }
}

#[component]
pub fn NotFoundView(on_navigate: EventHandler<Page>) -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "not-found",
            h1 { "404 - Page Not Found" }
            a {
                href: Page::Lists.href(),
                onclick: move |evt: MouseEvent| {
                    evt.prevent_default();
                    on_navigate.call(Page::Lists);
                },
                "Go back to your TODO's"
            }
        }
    }
}
