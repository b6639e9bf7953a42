use dioxus::prelude::*;

use ui::views::PageView;
use ui::{ActivityLog, ActivityLogPanel, ActivityLogToggle, BackendProvider, LayoutProvider, Page};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Lists {},
    #[route("/login")]
    Login {},
    #[route("/signup")]
    SignUp {},
    #[route("/account")]
    Account {},
    #[route("/tasks")]
    Tasks {},
    #[route("/tasks/:list_name")]
    ListTasks { list_name: String },
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

impl From<Page> for Route {
    fn from(page: Page) -> Self {
        match page {
            Page::Login => Route::Login {},
            Page::SignUp => Route::SignUp {},
            Page::Lists | Page::NotFound => Route::Lists {},
            Page::Account => Route::Account {},
            Page::Tasks { list_name: None } => Route::Tasks {},
            Page::Tasks {
                list_name: Some(list_name),
            } => Route::ListTasks { list_name },
        }
    }
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        // Global app resources
        document::Title { "TODO" }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        BackendProvider {
            LayoutProvider {
                ActivityLogProvider {
                    Router::<Route> {}
                }
            }
        }
    }
}

#[component]
fn ActivityLogProvider(children: Element) -> Element {
    use_context_provider(|| Signal::new(ActivityLog::default()));

    rsx! {
        {children}
    }
}

/// Renders `page` and the activity log, navigating through the typed router.
#[component]
fn Screen(page: Page) -> Element {
    let nav = use_navigator();
    let on_navigate = move |next: Page| {
        tracing::debug!(?next, "Navigate");
        nav.push(Route::from(next));
    };

    rsx! {
        PageView { page, on_navigate }
        ActivityLogPanel { on_navigate }
        ActivityLogToggle {}
    }
}

#[component]
fn Lists() -> Element {
    rsx! { Screen { page: Page::Lists } }
}

#[component]
fn Login() -> Element {
    rsx! { Screen { page: Page::Login } }
}

#[component]
fn SignUp() -> Element {
    rsx! { Screen { page: Page::SignUp } }
}

#[component]
fn Account() -> Element {
    rsx! { Screen { page: Page::Account } }
}

#[component]
fn Tasks() -> Element {
    rsx! { Screen { page: Page::Tasks { list_name: None } } }
}

#[component]
fn ListTasks(list_name: String) -> Element {
    rsx! { Screen { page: Page::tasks_of(&list_name) } }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    tracing::info!(path = %segments.join("/"), "No route");
    rsx! { Screen { page: Page::NotFound } }
}
