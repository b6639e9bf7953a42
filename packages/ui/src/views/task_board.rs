use dioxus::prelude::*;

use crate::activity_log::use_activity_log;
use crate::controllers::TaskBoard;
use crate::icons::{FaArrowLeft, FaPlus, FaTrash};
use crate::routes::Page;
use crate::Icon;

use super::{settle, use_controller, use_view_lifecycle, Trigger, VIEWS_CSS};

/// Tasks of the list named in the URL.
#[component]
pub fn TaskBoardView(
    list_name: Option<String>,
    /// Single-screen layout: show a back link to the lists.
    #[props(default)]
    compact: bool,
    on_navigate: EventHandler<Page>,
) -> Element {
    let trigger = use_view_lifecycle();
    let (board, revision) = use_controller(TaskBoard::new);
    let log = use_activity_log();

    {
        let board = board.clone();
        use_effect(use_reactive((&list_name,), move |(list_name,)| {
            let trigger = trigger();
            let board = board.clone();
            let origin = Page::Tasks {
                list_name: list_name.clone(),
            };
            spawn(async move {
                let result = match trigger {
                    Trigger::Session(change) if change.session.is_none() => {
                        board.on_session_change(&change).await
                    }
                    _ => board.mount(list_name).await,
                };
                settle(result, "Loading tasks", origin, log, on_navigate);
            });
        }));
    }

    let _ = revision();
    let state = board.snapshot();
    let busy = state.busy();
    let missing = state.list_name.is_some() && state.list.is_none() && !busy;
    let heading = state.list_name.clone().unwrap_or_else(|| "Tasks".to_string());

    let origin = Page::Tasks {
        list_name: list_name.clone(),
    };

    let handle_add = {
        let board = board.clone();
        let origin = origin.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let board = board.clone();
            let origin = origin.clone();
            spawn(async move {
                settle(board.add_task().await, "Adding task", origin, log, on_navigate);
            });
        }
    };

    let rows = state.tasks.iter().map(|task| {
        let task_id = task.task_id;
        let expanded = state.is_selected(task_id);
        let toggle = board.clone();
        let select = board.clone();
        let remove = board.clone();
        let toggle_origin = origin.clone();
        let remove_origin = origin.clone();

        rsx! {
            li {
                key: "{task_id}",
                class: if expanded { "task-row expanded" } else { "task-row" },
                div {
                    class: "task-line",
                    input {
                        r#type: "checkbox",
                        checked: task.completed,
                        disabled: busy,
                        onchange: move |_| {
                            let board = toggle.clone();
                            let origin = toggle_origin.clone();
                            spawn(async move {
                                settle(board.toggle_task(task_id).await, "Updating task", origin, log, on_navigate);
                            });
                        },
                    }
                    span {
                        class: if task.completed { "task-name completed" } else { "task-name" },
                        onclick: move |_| select.select_task(task_id),
                        "{task.task_name}"
                    }
                    button {
                        class: "icon-button danger",
                        title: "Delete task",
                        disabled: busy,
                        onclick: move |_| {
                            let board = remove.clone();
                            let origin = remove_origin.clone();
                            spawn(async move {
                                settle(board.delete_task(task_id).await, "Deleting task", origin, log, on_navigate);
                            });
                        },
                        Icon { icon: FaTrash, width: 12, height: 12 }
                    }
                }
                if expanded {
                    p {
                        class: "task-description",
                        {task.description.clone().unwrap_or_else(|| "No description".to_string())}
                    }
                }
            }
        }
    });

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        section {
            class: "pane task-board",
            tabindex: "-1",
            onkeydown: {
                let board = board.clone();
                move |evt: KeyboardEvent| {
                    if evt.key() == Key::Escape {
                        board.dismiss();
                    }
                }
            },
            header {
                class: "pane-header",
                if compact {
                    a {
                        class: "back-link",
                        href: Page::Lists.href(),
                        onclick: move |evt: MouseEvent| {
                            evt.prevent_default();
                            on_navigate.call(Page::Lists);
                        },
                        Icon { icon: FaArrowLeft, width: 12, height: 12 }
                        " Lists"
                    }
                }
                h1 { "{heading}" }
            }

            if state.list_name.is_none() {
                p { class: "empty-state", "Choose a list to see its tasks." }
            } else if missing {
                p { class: "empty-state", "This list does not exist." }
            } else {
                if state.tasks.is_empty() && !busy {
                    p { class: "empty-state", "No tasks yet." }
                }
                ul {
                    class: "rows",
                    {rows}
                }

                if state.show_input {
                    form {
                        class: "add-form stacked",
                        onsubmit: handle_add,
                        input {
                            r#type: "text",
                            placeholder: "Task",
                            autofocus: true,
                            value: state.task_name.clone(),
                            oninput: {
                                let board = board.clone();
                                move |evt: FormEvent| board.set_task_name(&evt.value())
                            },
                        }
                        textarea {
                            placeholder: "Description (optional)",
                            value: state.description.clone(),
                            oninput: {
                                let board = board.clone();
                                move |evt: FormEvent| board.set_description(&evt.value())
                            },
                        }
                        div {
                            class: "form-actions",
                            button { r#type: "submit", disabled: busy, "Add" }
                            button {
                                r#type: "button",
                                onclick: {
                                    let board = board.clone();
                                    move |_| board.dismiss()
                                },
                                "Cancel"
                            }
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
                        " New task"
                    }
                }
            }
            if let Some(error) = state.error.clone() {
                p { class: "inline-error", "{error}" }
            }
        }
    }
}
