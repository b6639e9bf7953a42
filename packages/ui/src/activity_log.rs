use dioxus::prelude::*;
use store::SyncError;

use crate::controllers::Notice;
use crate::routes::Page;

/// Oldest entries are dropped beyond this.
const MAX_ENTRIES: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Something the user should hear about outside a form field.
#[derive(Clone, Debug, PartialEq)]
pub enum Activity {
    /// An account change went through.
    Notice(Notice),
    /// `action` failed on the `origin` screen.
    Failed {
        action: String,
        error: SyncError,
        origin: Page,
    },
    Message(LogLevel, String),
}

impl Activity {
    pub fn level(&self) -> LogLevel {
        match self {
            Activity::Notice(_) => LogLevel::Success,
            Activity::Failed {
                error: SyncError::Validation(_),
                ..
            } => LogLevel::Warning,
            Activity::Failed { .. } => LogLevel::Error,
            Activity::Message(level, _) => *level,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Activity::Notice(notice) => notice.to_string(),
            Activity::Failed { action, error, .. } => format!("{action} failed: {error}"),
            Activity::Message(_, text) => text.clone(),
        }
    }

    /// Screen to go back to for a failure.
    pub fn origin(&self) -> Option<&Page> {
        match self {
            Activity::Failed { origin, .. } => Some(origin),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub id: u64,
    /// Time of the latest occurrence.
    pub timestamp: String,
    pub activity: Activity,
    /// How many times in a row this activity was recorded.
    pub repeats: usize,
}

/// Messages for the user that don't belong next to a form field: remote
/// failures and the confirmations of account changes.
///
/// Failures are kept apart from the rest so the panel can list them first,
/// each with a way back to the screen it happened on.
#[derive(Clone, Debug, Default)]
pub struct ActivityLog {
    pub entries: Vec<LogEntry>,
    pub visible: bool,
    next_id: u64,
}

impl ActivityLog {
    pub fn record(&mut self, activity: Activity) {
        // Failures open the panel so they are not missed.
        if activity.level() == LogLevel::Error {
            self.visible = true;
        }
        if let Some(last) = self.entries.last_mut() {
            if last.activity == activity {
                last.repeats += 1;
                last.timestamp = current_time();
                return;
            }
        }

        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.next_id += 1;
        self.entries.push(LogEntry {
            id: self.next_id,
            timestamp: current_time(),
            activity,
            repeats: 1,
        });
    }

    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|e| e.id != id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Failed actions, newest first.
    pub fn failures(&self) -> Vec<LogEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.activity.origin().is_some())
            .cloned()
            .collect()
    }

    /// Everything that is not a failure, newest first.
    pub fn recent(&self) -> Vec<LogEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.activity.origin().is_none())
            .cloned()
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.activity.level() == LogLevel::Error)
    }
}

pub fn use_activity_log() -> Signal<ActivityLog> {
    use_context::<Signal<ActivityLog>>()
}

pub fn log_activity(log: &mut Signal<ActivityLog>, level: LogLevel, message: &str) {
    log.write().record(Activity::Message(level, message.to_string()));
}

pub fn log_notice(log: &mut Signal<ActivityLog>, notice: &Notice) {
    log.write().record(Activity::Notice(notice.clone()));
}

/// Record a failed action. Validation messages are shown inline by the
/// views, so they are only logged as warnings here.
pub fn log_failure(log: &mut Signal<ActivityLog>, action: &str, origin: Page, error: &SyncError) {
    tracing::warn!(?origin, "{action} failed: {error}");
    log.write().record(Activity::Failed {
        action: action.to_string(),
        error: error.clone(),
        origin,
    });
}

#[cfg(target_arch = "wasm32")]
fn current_time() -> String {
    let date = js_sys::Date::new_0();
    let h = date.get_hours();
    let m = date.get_minutes();
    let s = date.get_seconds();
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(not(target_arch = "wasm32"))]
fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(action: &str, origin: Page) -> Activity {
        Activity::Failed {
            action: action.to_string(),
            error: SyncError::Remote("timeout".to_string()),
            origin,
        }
    }

    #[test]
    fn test_failures_open_the_panel_and_keep_their_screen() {
        let mut log = ActivityLog::default();
        log.record(Activity::Notice(Notice::AvatarUpdated));
        assert!(!log.visible);
        assert!(!log.has_errors());

        log.record(failed("Deleting task", Page::tasks_of("Groceries")));

        assert!(log.visible);
        assert!(log.has_errors());
        let failures = log.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].activity.origin(), Some(&Page::tasks_of("Groceries")));
        assert_eq!(failures[0].activity.message(), "Deleting task failed: timeout");
        assert_eq!(log.recent().len(), 1);
    }

    #[test]
    fn test_repeated_failure_is_counted_once() {
        let mut log = ActivityLog::default();
        log.record(failed("Loading lists", Page::Lists));
        log.record(failed("Loading lists", Page::Lists));
        log.record(failed("Loading lists", Page::Account));

        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.entries[0].repeats, 2);
        assert_eq!(log.entries[1].repeats, 1);
    }

    #[test]
    fn test_validation_failure_is_a_warning() {
        let mut log = ActivityLog::default();
        log.record(Activity::Failed {
            action: "Adding list".to_string(),
            error: SyncError::Validation("a list named \"A\" already exists".to_string()),
            origin: Page::Lists,
        });

        assert!(!log.visible);
        assert_eq!(log.entries[0].activity.level(), LogLevel::Warning);
    }

    #[test]
    fn test_dismiss_removes_only_that_entry() {
        let mut log = ActivityLog::default();
        log.record(failed("Loading lists", Page::Lists));
        log.record(Activity::Notice(Notice::SignedOut));
        let id = log.failures()[0].id;

        log.dismiss(id);

        assert!(log.failures().is_empty());
        assert_eq!(log.recent().len(), 1);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = ActivityLog::default();
        for i in 0..MAX_ENTRIES + 5 {
            log.record(Activity::Message(LogLevel::Info, format!("entry {i}")));
        }
        assert_eq!(log.entries.len(), MAX_ENTRIES);
        assert_eq!(log.entries[0].activity.message(), "entry 5");
    }
}
