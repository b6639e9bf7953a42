use super::session::Session;

/// Where a session survives page reloads.
pub trait SessionStorage {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session);
    fn clear(&self);
}

/// Keeps the session in memory only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistence;

impl SessionStorage for NoPersistence {
    fn load(&self) -> Option<Session> {
        None
    }

    fn save(&self, _session: &Session) {}

    fn clear(&self) {}
}
