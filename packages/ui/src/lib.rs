//! This crate contains all shared UI for the workspace.
//!
//! Screen behavior lives in [`controllers`]; [`views`] renders it with
//! Dioxus. Platform packages wrap their router in [`BackendProvider`],
//! [`LayoutProvider`] and an [`ActivityLog`] context, then render
//! [`views::PageView`] for each route.

pub mod activity_log;
pub use activity_log::{log_activity, use_activity_log, Activity, ActivityLog, LogLevel};

mod activity_log_panel;
pub use activity_log_panel::{ActivityLogPanel, ActivityLogToggle};

mod backend_context;
pub use backend_context::{use_backend, AppBackend, BackendProvider, BrowserSessionStorage};

pub mod controllers;

pub mod layout;
pub use layout::{use_layout, LayoutProvider, LayoutVariant};

pub mod lifecycle;

pub mod routes;
pub use routes::Page;

pub mod views;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}
