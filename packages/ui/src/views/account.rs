use dioxus::prelude::*;

use crate::activity_log::{log_activity, log_notice, use_activity_log, LogLevel};
use crate::controllers::AccountPanel;
use crate::icons::FaArrowLeft;
use crate::routes::Page;
use crate::Icon;

use super::{settle, use_controller, use_view_lifecycle, Trigger, VIEWS_CSS};

/// Shown for users who never uploaded an avatar.
pub const PLACEHOLDER_AVATAR_URL: &str =
    "https://ohcixuchvhkjkmhhtmgv.supabase.co/storage/v1/object/public/avatars/placeholder_avatar.JPG";

/// Round avatar image, the placeholder when `url` is empty.
#[component]
pub fn AvatarBadge(
    url: Option<String>,
    #[props(default = 40)]
    size: u32,
) -> Element {
    let src = url
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_AVATAR_URL.to_string());

    rsx! {
        img {
            class: "avatar",
            src,
            alt: "Avatar",
            width: "{size}",
            height: "{size}",
        }
    }
}

#[component]
pub fn AccountView(
    /// Single-screen layout: show a back link to the lists.
    #[props(default)]
    compact: bool,
    on_navigate: EventHandler<Page>,
) -> Element {
    let trigger = use_view_lifecycle();
    let (panel, revision) = use_controller(AccountPanel::new);
    let log = use_activity_log();

    {
        let panel = panel.clone();
        use_effect(move || {
            let trigger = trigger();
            let panel = panel.clone();
            spawn(async move {
                let result = match trigger {
                    Trigger::Session(change) if change.session.is_none() => {
                        Err(store::SyncError::NotAuthenticated)
                    }
                    _ => panel.mount().await,
                };
                settle(result, "Loading account", Page::Account, log, on_navigate);
            });
        });
    }

    let _ = revision();
    let state = panel.snapshot();
    let busy = state.busy();
    let name = state
        .profile
        .as_ref()
        .map(|p| p.display_name())
        .unwrap_or_default();
    let email = state.email.clone().unwrap_or_default();

    let handle_password = {
        let panel = panel.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let panel = panel.clone();
            spawn(async move {
                let mut log = log;
                if let Some(notice) = settle(panel.change_password().await, "Changing password", Page::Account, log, on_navigate) {
                    log_notice(&mut log, &notice);
                }
            });
        }
    };

    let handle_username = {
        let panel = panel.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let panel = panel.clone();
            spawn(async move {
                let mut log = log;
                if let Some(notice) = settle(panel.change_username().await, "Changing username", Page::Account, log, on_navigate) {
                    log_notice(&mut log, &notice);
                }
            });
        }
    };

    let handle_avatar = {
        let panel = panel.clone();
        move |evt: Event<FormData>| {
            let mut files = evt.files();
            let Some(file) = files.pop() else {
                return;
            };
            let panel = panel.clone();
            spawn(async move {
                let mut log = log;
                let file_name = file.name();
                let content_type = file
                    .content_type()
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = match file.read_bytes().await {
                    Ok(bytes) => bytes.to_vec(),
                    Err(e) => {
                        tracing::warn!("Failed to read {file_name}: {e}");
                        log_activity(&mut log, LogLevel::Error, &format!("Could not read {file_name}"));
                        return;
                    }
                };
                let result = panel.change_avatar(&file_name, bytes, &content_type).await;
                if let Some(notice) = settle(result, "Changing avatar", Page::Account, log, on_navigate) {
                    log_notice(&mut log, &notice);
                }
            });
        }
    };

    let handle_logout = {
        let panel = panel.clone();
        move |_: MouseEvent| {
            let panel = panel.clone();
            spawn(async move {
                let mut log = log;
                if let Some(notice) = settle(panel.logout().await, "Signing out", Page::Account, log, on_navigate) {
                    log_notice(&mut log, &notice);
                }
                on_navigate.call(Page::Login);
            });
        }
    };

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        section {
            class: "pane account",
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
                h1 { "Account" }
            }

            div {
                class: "account-summary",
                AvatarBadge { url: state.avatar_url().map(str::to_string), size: 96 }
                div {
                    p { class: "account-name", "{name}" }
                    p { class: "account-email", "{email}" }
                }
            }

            div {
                class: "account-actions",
                button {
                    onclick: {
                        let panel = panel.clone();
                        move |_| panel.toggle_username_editor()
                    },
                    "Change username"
                }
                if state.editing_username {
                    form {
                        class: "add-form",
                        onsubmit: handle_username,
                        input {
                            r#type: "text",
                            placeholder: "New username",
                            value: state.username_draft.clone(),
                            oninput: {
                                let panel = panel.clone();
                                move |evt: FormEvent| panel.set_username_draft(&evt.value())
                            },
                        }
                        button { r#type: "submit", disabled: busy, "Save" }
                    }
                }

                button {
                    onclick: {
                        let panel = panel.clone();
                        move |_| panel.toggle_password_editor()
                    },
                    "Change password"
                }
                if state.editing_password {
                    form {
                        class: "add-form",
                        onsubmit: handle_password,
                        input {
                            r#type: "password",
                            placeholder: "New password",
                            value: state.password_draft.clone(),
                            oninput: {
                                let panel = panel.clone();
                                move |evt: FormEvent| panel.set_password_draft(&evt.value())
                            },
                        }
                        button { r#type: "submit", disabled: busy, "Save" }
                    }
                }

                button {
                    onclick: {
                        let panel = panel.clone();
                        move |_| panel.toggle_avatar_picker()
                    },
                    "Change avatar"
                }
                if state.picking_avatar {
                    input {
                        r#type: "file",
                        accept: "image/*",
                        disabled: busy,
                        onchange: handle_avatar,
                    }
                }

                if let Some(error) = state.error.clone() {
                    p { class: "inline-error", "{error}" }
                }

                button {
                    class: "logout-button",
                    disabled: busy,
                    onclick: handle_logout,
                    "Log out"
                }
            }
        }
    }
}
