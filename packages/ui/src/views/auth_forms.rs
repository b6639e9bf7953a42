use dioxus::prelude::*;
use store::SyncError;

use crate::activity_log::{log_activity, log_failure, use_activity_log, LogLevel};
use crate::backend_context::use_backend;
use crate::controllers::auth_forms;
use crate::routes::Page;

use super::VIEWS_CSS;

fn inline_message(error: &SyncError) -> String {
    match error {
        SyncError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}

#[component]
pub fn LoginView(on_navigate: EventHandler<Page>) -> Element {
    let backend = use_backend();
    let mut log = use_activity_log();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        let backend = backend.clone();
        spawn(async move {
            error.set(None);
            loading.set(true);
            let result = auth_forms::sign_in(&backend, &email(), &password()).await;
            loading.set(false);
            email.set(String::new());
            password.set(String::new());

            match result {
                Ok(_) => on_navigate.call(Page::Lists),
                Err(e) => {
                    if !matches!(e, SyncError::Validation(_)) {
                        log_failure(&mut log, "Signing in", Page::Login, &e);
                    }
                    error.set(Some(inline_message(&e)));
                }
            }
        });
    };

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "auth-screen",
            h1 { "Sign in" }
            form {
                class: "auth-form",
                onsubmit: handle_login,

                if let Some(err) = error() {
                    div { class: "inline-error", "Error: {err}" }
                }

                input {
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
                input {
                    r#type: "password",
                    placeholder: "Password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                button {
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Signing in..." } else { "Sign in" }
                }
            }
            p {
                "Don't have an account? "
                a {
                    href: Page::SignUp.href(),
                    onclick: move |evt: MouseEvent| {
                        evt.prevent_default();
                        on_navigate.call(Page::SignUp);
                    },
                    "Sign up"
                }
            }
        }
    }
}

#[component]
pub fn SignUpView(on_navigate: EventHandler<Page>) -> Element {
    let backend = use_backend();
    let mut log = use_activity_log();
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_signup = move |evt: FormEvent| {
        evt.prevent_default();
        let backend = backend.clone();
        spawn(async move {
            error.set(None);
            loading.set(true);
            let result = auth_forms::sign_up(&backend, &name(), &email(), &password()).await;
            loading.set(false);
            name.set(String::new());
            email.set(String::new());
            password.set(String::new());

            match result {
                Ok(_) => {
                    log_activity(&mut log, LogLevel::Success, "Account created");
                    on_navigate.call(Page::Login);
                }
                Err(e) => {
                    if !matches!(e, SyncError::Validation(_)) {
                        log_failure(&mut log, "Signing up", Page::SignUp, &e);
                    }
                    error.set(Some(inline_message(&e)));
                }
            }
        });
    };

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "auth-screen",
            h1 { "Create an account" }
            form {
                class: "auth-form",
                onsubmit: handle_signup,

                if let Some(err) = error() {
                    div { class: "inline-error", "Error: {err}" }
                }

                input {
                    r#type: "text",
                    placeholder: "Name",
                    value: name(),
                    oninput: move |evt: FormEvent| name.set(evt.value()),
                }
                input {
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
                input {
                    r#type: "password",
                    placeholder: "Password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                button {
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Creating account..." } else { "Sign up" }
                }
            }
            p {
                "Already have an account? "
                a {
                    href: Page::Login.href(),
                    onclick: move |evt: MouseEvent| {
                        evt.prevent_default();
                        on_navigate.call(Page::Login);
                    },
                    "Sign in"
                }
            }
        }
    }
}
