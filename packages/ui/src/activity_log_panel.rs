use dioxus::prelude::*;

use crate::activity_log::{use_activity_log, LogEntry, LogLevel};
use crate::routes::Page;

const ACTIVITY_LOG_CSS: Asset = asset!("/assets/styling/activity_log.css");

fn level_class(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "activity-entry error",
        LogLevel::Warning => "activity-entry warning",
        LogLevel::Success => "activity-entry success",
        LogLevel::Info => "activity-entry info",
    }
}

/// Failed actions first, each linking back to its screen, then the rest.
#[component]
pub fn ActivityLogPanel(on_navigate: EventHandler<Page>) -> Element {
    let mut log = use_activity_log();

    if !log().visible {
        return rsx! {};
    }

    let failures = log().failures();
    let recent = log().recent();

    rsx! {
        document::Stylesheet { href: ACTIVITY_LOG_CSS }

        aside {
            class: "activity-panel",
            header {
                class: "activity-panel-header",
                span { "Activity" }
                button { onclick: move |_| log.write().clear(), "Clear" }
                button { onclick: move |_| log.write().visible = false, "Close" }
            }
            if !failures.is_empty() {
                section {
                    h4 { "Needs attention" }
                    for entry in failures {
                        FailureRow { key: "{entry.id}", entry, on_navigate }
                    }
                }
            }
            if !recent.is_empty() {
                section {
                    h4 { "Recent" }
                    for entry in recent {
                        div {
                            key: "{entry.id}",
                            class: level_class(entry.activity.level()),
                            time { "{entry.timestamp}" }
                            span { "{entry.activity.message()}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn FailureRow(entry: LogEntry, on_navigate: EventHandler<Page>) -> Element {
    let mut log = use_activity_log();
    let id = entry.id;
    let link = entry.activity.origin().map(|page| (page.title(), page.clone()));

    rsx! {
        div {
            class: level_class(entry.activity.level()),
            time { "{entry.timestamp}" }
            span { "{entry.activity.message()}" }
            if entry.repeats > 1 {
                span { class: "activity-repeats", "×{entry.repeats}" }
            }
            if let Some((title, page)) = link {
                button {
                    class: "activity-link",
                    onclick: move |_| {
                        log.write().visible = false;
                        on_navigate.call(page.clone());
                    },
                    "Open {title}"
                }
            }
            button {
                class: "activity-dismiss",
                title: "Dismiss",
                onclick: move |_| log.write().dismiss(id),
                "×"
            }
        }
    }
}

/// Floating button that shows and hides the panel. It counts failures when
/// there are any, otherwise all entries.
#[component]
pub fn ActivityLogToggle() -> Element {
    let mut log = use_activity_log();
    let failed = log().failures().len();
    let total = log().entries.len();
    let label = match (failed, total) {
        (0, 0) => "Log".to_string(),
        (0, total) => total.to_string(),
        (failed, _) => format!("{failed} failed"),
    };

    rsx! {
        document::Stylesheet { href: ACTIVITY_LOG_CSS }

        button {
            class: if log().has_errors() { "activity-toggle failing" } else { "activity-toggle" },
            title: "Activity",
            onclick: move |_| {
                let visible = log().visible;
                log.write().visible = !visible;
            },
            "{label}"
        }
    }
}
