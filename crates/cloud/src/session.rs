//! Signed-in users known to the process.
//!
//! [`AuthContext`] is created at startup, shared through the application
//! state, and closed at shutdown. Sign-in and sign-out go through it so
//! that interested components can [`subscribe`](AuthContext::subscribe) to
//! [`AuthChange`]s. A subscription ends when its [`AuthSubscription`] is
//! dropped or [`unsubscribed`](AuthSubscription::unsubscribe).

use std::collections::HashMap;

use postforge_core::types::UserId;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

use crate::identity::SessionUser;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthChange {
    SignedIn { user: SessionUser },
    SignedOut { user_id: UserId },
}

pub struct AuthContext {
    users: RwLock<HashMap<UserId, SessionUser>>,
    sender: RwLock<Option<broadcast::Sender<AuthChange>>>,
}

impl AuthContext {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            users: RwLock::new(HashMap::new()),
            sender: RwLock::new(Some(sender)),
        }
    }

    /// Record a sign-in (or a refreshed user profile).
    pub async fn signed_in(&self, user: SessionUser) {
        self.users.write().await.insert(user.id, user.clone());
        self.notify(AuthChange::SignedIn { user }).await;
    }

    /// Forget a user. Returns `false` if the user was not known.
    pub async fn signed_out(&self, user_id: UserId) -> bool {
        let removed = self.users.write().await.remove(&user_id).is_some();
        self.notify(AuthChange::SignedOut { user_id }).await;
        removed
    }

    pub async fn user(&self, user_id: UserId) -> Option<SessionUser> {
        self.users.read().await.get(&user_id).cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Start receiving auth changes. After [`close`](Self::close) the
    /// returned subscription yields nothing.
    pub async fn subscribe(&self) -> AuthSubscription {
        let receiver = self.sender.read().await.as_ref().map(|s| s.subscribe());
        AuthSubscription { receiver }
    }

    /// Number of live subscriptions.
    pub async fn subscriber_count(&self) -> usize {
        self.sender
            .read()
            .await
            .as_ref()
            .map_or(0, |s| s.receiver_count())
    }

    /// End every subscription and forget all users.
    pub async fn close(&self) {
        let subscribers = self.subscriber_count().await;
        self.sender.write().await.take();
        let mut users = self.users.write().await;
        let count = users.len();
        users.clear();
        tracing::info!(count, subscribers, "Auth context closed");
    }

    async fn notify(&self, change: AuthChange) {
        if let Some(sender) = self.sender.read().await.as_ref() {
            let _ = sender.send(change);
        }
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to [`AuthChange`]s.
pub struct AuthSubscription {
    receiver: Option<broadcast::Receiver<AuthChange>>,
}

impl AuthSubscription {
    /// Next change, or `None` once the context is closed. Changes missed
    /// by a lagging subscriber are skipped.
    pub async fn recv(&mut self) -> Option<AuthChange> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    pub fn unsubscribe(mut self) {
        self.receiver.take();
    }
}
