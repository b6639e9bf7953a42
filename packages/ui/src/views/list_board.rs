use dioxus::prelude::*;

use crate::activity_log::use_activity_log;
use crate::controllers::ListBoard;
use crate::icons::{FaArrowDown, FaArrowUp, FaPlus, FaTrash};
use crate::routes::Page;
use crate::Icon;

use super::{settle, use_controller, use_view_lifecycle, AvatarBadge, Trigger, VIEWS_CSS};

/// The signed-in user's lists.
#[component]
pub fn ListBoardView(
    /// Name of the list whose tasks are on screen, highlighted.
    active_list: Option<String>,
    /// Single-screen layout: show the avatar link to the account screen.
    #[props(default)]
    compact: bool,
    on_navigate: EventHandler<Page>,
) -> Element {
    let trigger = use_view_lifecycle();
    let (board, revision) = use_controller(ListBoard::new);
    let log = use_activity_log();

    {
        let board = board.clone();
        use_effect(move || {
            let trigger = trigger();
            let board = board.clone();
            spawn(async move {
                let result = match trigger {
                    Trigger::Session(change) => board.on_session_change(&change).await,
                    Trigger::Mount | Trigger::Visible => board.mount().await,
                };
                settle(result, "Loading lists", Page::Lists, log, on_navigate);
            });
        });
    }

    let _ = revision();
    let state = board.snapshot();
    let busy = state.busy();
    let count = state.lists.len();
    let avatar_url = state.profile.as_ref().and_then(|p| p.avatar_url.clone());
    let title = state.greeting().unwrap_or_else(|| "My lists".to_string());

    let handle_add = {
        let board = board.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let board = board.clone();
            spawn(async move {
                settle(board.add_list().await, "Adding list", Page::Lists, log, on_navigate);
            });
        }
    };

    let rows = state.lists.iter().enumerate().map(|(index, list)| {
        let list_id = list.list_id;
        let name = list.name.clone();
        let href = Page::tasks_of(&name).href();
        let is_active = active_list.as_deref() == Some(list.name.as_str());
        let toggle = board.clone();
        let remove = board.clone();
        let up = board.clone();
        let down = board.clone();
        let shown = active_list.clone();

        rsx! {
            li {
                key: "{list_id}",
                class: if is_active { "list-row active" } else { "list-row" },
                input {
                    r#type: "checkbox",
                    checked: list.completed,
                    disabled: busy,
                    onchange: move |_| {
                        let board = toggle.clone();
                        spawn(async move {
                            settle(board.toggle_list(list_id).await, "Updating list", Page::Lists, log, on_navigate);
                        });
                    },
                }
                a {
                    class: if list.completed { "list-name completed" } else { "list-name" },
                    href,
                    onclick: move |evt: MouseEvent| {
                        evt.prevent_default();
                        on_navigate.call(Page::tasks_of(&name));
                    },
                    "{list.name}"
                }
                div {
                    class: "row-actions",
                    button {
                        class: "icon-button",
                        title: "Move up",
                        disabled: index == 0,
                        onclick: move |_| {
                            up.move_up(index);
                        },
                        Icon { icon: FaArrowUp, width: 12, height: 12 }
                    }
                    button {
                        class: "icon-button",
                        title: "Move down",
                        disabled: index + 1 == count,
                        onclick: move |_| {
                            down.move_down(index);
                        },
                        Icon { icon: FaArrowDown, width: 12, height: 12 }
                    }
                    button {
                        class: "icon-button danger",
                        title: "Delete list",
                        disabled: busy,
                        onclick: move |_| {
                            let board = remove.clone();
                            let shown = shown.clone();
                            spawn(async move {
                                let removed = settle(board.delete_list(list_id).await, "Deleting list", Page::Lists, log, on_navigate);
                                if let Some(Some(list)) = removed {
                                    if shown.as_deref() == Some(list.name.as_str()) {
                                        on_navigate.call(Page::Lists);
                                    }
                                }
                            });
                        },
                        Icon { icon: FaTrash, width: 12, height: 12 }
                    }
                }
            }
        }
    });

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        section {
            class: "pane list-board",
            header {
                class: "pane-header",
                h1 { "{title}" }
                if compact {
                    a {
                        class: "avatar-link",
                        href: Page::Account.href(),
                        onclick: move |evt: MouseEvent| {
                            evt.prevent_default();
                            on_navigate.call(Page::Account);
                        },
                        AvatarBadge { url: avatar_url }
                    }
                }
            }

            if state.lists.is_empty() && !busy {
                p { class: "empty-state", "No lists yet." }
            }
            ul {
                class: "rows",
                {rows}
            }

            if state.show_input {
                form {
                    class: "add-form",
                    onsubmit: handle_add,
                    input {
                        r#type: "text",
                        placeholder: "List name",
                        autofocus: true,
                        value: state.draft.clone(),
                        oninput: {
                            let board = board.clone();
                            move |evt: FormEvent| board.set_draft(&evt.value())
                        },
                    }
                    button { r#type: "submit", disabled: busy, "Add" }
                    button {
                        r#type: "button",
                        onclick: {
                            let board = board.clone();
                            move |_| board.dismiss_input()
                        },
                        "Cancel"
                    }
                }
            } else {
                button {
                    class: "add-button",
                    onclick: {
                        let board = board.clone();
                        move |_| board.open_input()
                    },
                    Icon { icon: FaPlus, width: 12, height: 12 }
                    " New list"
                }
            }
            if let Some(error) = state.error.clone() {
                p { class: "inline-error", "{error}" }
            }
        }
    }
}
