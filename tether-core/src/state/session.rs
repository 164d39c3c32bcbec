//! Host-side session registry.
//!
//! The host owns exactly one session identity, fixed at startup. A
//! viewer links to it by registering the same identifier; any other
//! identifier unlinks it. The link gates screen capture only.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

/// The host's single session.
///
/// ```text
///            register(id == own)
///  Unlinked ─────────────────────► Linked
///      ▲                             │
///      └──── register(id != own) ────┘
/// ```
#[derive(Debug)]
pub struct Session {
    id: String,
    linked: AtomicBool,
}

impl Session {
    /// Create an unlinked session with the operator-chosen identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            linked: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Compare `id` with the host's own identifier (exact, case
    /// sensitive) and link or unlink accordingly. Never fails.
    ///
    /// Returns the new link state.
    pub fn register(&self, id: &str) -> bool {
        let matched = id == self.id;
        let was = self.linked.swap(matched, Ordering::SeqCst);
        if matched {
            info!(session = %self.id, "Viewer registered; session linked");
        } else {
            warn!(
                session = %self.id,
                offered = %id,
                was_linked = was,
                "Viewer registered with a foreign identifier; session unlinked"
            );
        }
        matched
    }

    pub fn is_linked(&self) -> bool {
        self.linked.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unlinked() {
        assert!(!Session::new("s1").is_linked());
    }

    #[test]
    fn matching_id_links() {
        let session = Session::new("s1");
        assert!(session.register("s1"));
        assert!(session.is_linked());
    }

    #[test]
    fn foreign_id_unlinks_a_linked_session() {
        let session = Session::new("s1");
        session.register("s1");
        assert!(!session.register("other"));
        assert!(!session.is_linked());
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let session = Session::new("Office");
        assert!(!session.register("office"));
    }

    #[test]
    fn re_registering_is_idempotent() {
        let session = Session::new("s1");
        session.register("s1");
        session.register("s1");
        assert!(session.is_linked());
    }
}
