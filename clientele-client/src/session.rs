/// Client-side session manager
///
/// Holds the issued token together with its absolute expiry and keeps a
/// single scheduled timer armed at that instant. When the timer fires the
/// session is cleared and subscribers of [`SessionManager::signed_out`]
/// are notified so the embedding application can navigate to its login
/// view.
///
/// Storing a new token re-arms the timer — the previous one is aborted
/// and replaced, never stacked. An epoch counter guards the small window
/// where an aborted timer has already woken: a stale timer finds the
/// epoch moved on and does nothing.
///
/// None of this is a security boundary. The server re-verifies signature
/// and expiry per request; this type only spares the user a string of
/// failing calls after expiry.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// A stored token and its absolute expiry
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

struct Inner {
    session: Option<Session>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every store/clear; stale timers check it before acting.
    epoch: u64,
}

/// Token storage with a self-arming expiry timer
///
/// Cheap to clone; all clones share one session and one timer.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Mutex<Inner>>,
    signed_out_tx: Arc<watch::Sender<u64>>,
}

impl SessionManager {
    /// Creates an empty, signed-out manager.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);

        Self {
            inner: Arc::new(Mutex::new(Inner {
                session: None,
                timer: None,
                epoch: 0,
            })),
            signed_out_tx: Arc::new(tx),
        }
    }

    /// Stores a token with its lifetime and (re-)arms the expiry timer.
    ///
    /// A non-positive lifetime signs out immediately.
    pub fn store(&self, token: String, expires_in_seconds: i64) {
        if expires_in_seconds <= 0 {
            self.sign_out();
            return;
        }

        let expires_at = Utc::now() + Duration::seconds(expires_in_seconds);

        let epoch = {
            let mut inner = self.inner.lock().expect("session lock poisoned");
            inner.epoch += 1;
            if let Some(timer) = inner.timer.take() {
                timer.abort();
            }
            inner.session = Some(Session { token, expires_at });
            inner.epoch
        };

        let manager = self.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(expires_in_seconds as u64)).await;
            manager.expire(epoch);
        });

        self.inner.lock().expect("session lock poisoned").timer = Some(timer);

        debug!(expires_in_seconds, "Session stored, expiry timer armed");
    }

    /// Returns the token while the session is live.
    ///
    /// A session found to be past its expiry here (timer starvation,
    /// clock jumps) is cleared on the spot, exactly as if the timer had
    /// fired.
    pub fn token(&self) -> Option<String> {
        let expired = {
            let inner = self.inner.lock().expect("session lock poisoned");
            match inner.session.as_ref() {
                None => return None,
                Some(session) if Utc::now() >= session.expires_at => true,
                Some(session) => return Some(session.token.clone()),
            }
        };

        if expired {
            self.sign_out();
        }
        None
    }

    /// Whether a live session is present
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Absolute expiry of the current session, if any
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner
            .lock()
            .expect("session lock poisoned")
            .session
            .as_ref()
            .map(|s| s.expires_at)
    }

    /// Clears the session and cancels the timer, notifying subscribers
    /// when a session was actually dropped.
    pub fn sign_out(&self) {
        let had_session = {
            let mut inner = self.inner.lock().expect("session lock poisoned");
            inner.epoch += 1;
            if let Some(timer) = inner.timer.take() {
                timer.abort();
            }
            inner.session.take().is_some()
        };

        if had_session {
            debug!("Session cleared");
            self.signed_out_tx.send_modify(|n| *n += 1);
        }
    }

    /// Subscribes to sign-out events (timer expiry or explicit sign-out).
    pub fn signed_out(&self) -> watch::Receiver<u64> {
        self.signed_out_tx.subscribe()
    }

    /// Timer callback: clears the session only if no newer store or
    /// sign-out superseded this timer.
    fn expire(&self, epoch: u64) {
        let fired = {
            let mut inner = self.inner.lock().expect("session lock poisoned");
            if inner.epoch != epoch {
                return;
            }
            inner.timer = None;
            inner.session.take().is_some()
        };

        if fired {
            debug!("Session expired");
            self.signed_out_tx.send_modify(|n| *n += 1);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn test_store_then_token_is_live() {
        let manager = SessionManager::new();
        manager.store("tok".to_string(), 900);

        assert_eq!(manager.token(), Some("tok".to_string()));
        assert!(manager.is_authenticated());
        assert!(manager.expires_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_and_notifies() {
        let manager = SessionManager::new();
        let mut signed_out = manager.signed_out();

        manager.store("tok".to_string(), 60);

        timeout(StdDuration::from_secs(120), signed_out.changed())
            .await
            .expect("Timer should fire within the lifetime")
            .expect("Sender should be alive");

        assert_eq!(manager.token(), None);
        assert!(!manager.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_token_rearms_instead_of_stacking() {
        let manager = SessionManager::new();
        let mut signed_out = manager.signed_out();

        manager.store("short".to_string(), 10);
        manager.store("long".to_string(), 300);

        // Past the first token's lifetime: the replaced timer must not
        // have killed the new session.
        tokio::time::sleep(StdDuration::from_secs(30)).await;
        assert_eq!(manager.token(), Some("long".to_string()));

        // The single surviving timer fires exactly once.
        timeout(StdDuration::from_secs(600), signed_out.changed())
            .await
            .expect("Second timer should fire")
            .expect("Sender should be alive");
        assert_eq!(manager.token(), None);
        assert!(!signed_out.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_positive_lifetime_signs_out_immediately() {
        let manager = SessionManager::new();
        manager.store("tok".to_string(), 900);
        manager.store("dead".to_string(), 0);

        assert_eq!(manager.token(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_sign_out_cancels_timer() {
        let manager = SessionManager::new();
        let mut signed_out = manager.signed_out();

        manager.store("tok".to_string(), 60);
        manager.sign_out();

        signed_out
            .changed()
            .await
            .expect("Sign-out should notify");
        assert_eq!(manager.token(), None);

        // Long after the aborted timer would have fired: no second event.
        tokio::time::sleep(StdDuration::from_secs(120)).await;
        assert!(!signed_out.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_without_session_is_silent() {
        let manager = SessionManager::new();
        let signed_out = manager.signed_out();

        manager.sign_out();

        assert!(!signed_out.has_changed().unwrap());
    }
}
