//! Process-wide login state.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// A logged-in user
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name for greetings, falling back to "User"
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("User")
    }
}

// Keep tokens out of logs
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Shared handle to the current session.
///
/// Cloning is cheap and every clone sees the same state. Observers such as a
/// navigation header call [`SessionContext::subscribe`] and are woken on
/// login and logout.
#[derive(Clone)]
pub struct SessionContext {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn current_token(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn login(&self, token: impl Into<String>) {
        self.login_session(Session::new(token));
    }

    pub fn login_session(&self, session: Session) {
        info!(email = ?session.email, "Session started");
        self.tx.send_replace(Some(session));
    }

    pub fn logout(&self) {
        if self.tx.send_replace(None).is_some() {
            info!("Session ended");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_and_logout_update_token() {
        let ctx = SessionContext::new();
        assert_eq!(ctx.current_token(), None);

        ctx.login("abc123");
        assert_eq!(ctx.current_token().as_deref(), Some("abc123"));

        let clone = ctx.clone();
        clone.logout();
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn observers_are_notified() {
        let ctx = SessionContext::new();
        let mut rx = ctx.subscribe();

        ctx.login_session(Session::new("t").with_display_name("Amina"));
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|s| s.greeting_name().to_string()),
            Some("Amina".to_string())
        );

        ctx.logout();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn debug_output_hides_token() {
        let session = Session::new("secret-token").with_email("a@b.co");
        let printed = format!("{session:?}");
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("a@b.co"));
    }
}
