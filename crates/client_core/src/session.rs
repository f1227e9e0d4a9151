//! Current identity: durable slot plus the login/register/logout round trips that move it.

use std::sync::Arc;

use shared::{
    domain::Identity,
    protocol::{FormData, Reply},
};
use tracing::{error, info, warn};

use crate::{
    error::{RequestError, StorageError},
    orchestrator::{AppState, Orchestrator},
    storage::SlotStorage,
    transport::{Request, RequestClient},
};

pub const IDENTITY_SLOT: &str = "user";

/// Sole writer of the persisted identity. Callers only ever get copies.
pub struct Session {
    client: RequestClient,
    base_url: String,
    storage: Arc<dyn SlotStorage>,
    orchestrator: Arc<dyn Orchestrator>,
}

impl Session {
    pub fn new(
        client: RequestClient,
        base_url: impl Into<String>,
        storage: Arc<dyn SlotStorage>,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            storage,
            orchestrator,
        }
    }

    fn url(&self, action: &str) -> String {
        format!("{}/user/{action}", self.base_url)
    }

    pub fn set_current(&self, identity: &Identity) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(identity)?;
        self.storage.write(IDENTITY_SLOT, &encoded)
    }

    pub fn unset_current(&self) -> Result<(), StorageError> {
        if self.storage.read(IDENTITY_SLOT)?.is_some() {
            self.storage.remove(IDENTITY_SLOT)?;
        }
        Ok(())
    }

    pub fn current(&self) -> Option<Identity> {
        let raw = match self.storage.read(IDENTITY_SLOT) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(error = %err, "failed to read stored identity");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(err) => {
                warn!(error = %err, "stored identity is unreadable");
                None
            }
        }
    }

    /// Asks the server who is signed in. Without `params` nothing is sent and `None` is
    /// returned.
    pub async fn fetch_current(
        &self,
        params: Option<&FormData>,
    ) -> Option<Result<Reply, RequestError>> {
        let params = params?;
        let outcome = self
            .client
            .send_json::<Reply>(Request::get(self.url("current")).with_data(params.clone()))
            .await;

        match &outcome {
            Ok(reply) if reply.success => self.persist_user(reply),
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "fetching current user failed; dropping stored identity");
                self.forget();
            }
        }
        Some(outcome)
    }

    pub async fn login(&self, credentials: &FormData) -> Result<Reply, RequestError> {
        let outcome = self
            .client
            .send_json::<Reply>(Request::post(self.url("login")).with_data(credentials.clone()))
            .await;

        match &outcome {
            Ok(reply) if reply.success => self.persist_user(reply),
            Ok(reply) => {
                let reason = reply.rejection().map(|r| r.message).unwrap_or_default();
                warn!(reason = %reason, "authorization failed");
            }
            Err(err) => warn!(error = %err, "authorization failed"),
        }
        outcome
    }

    pub async fn register(&self, fields: &FormData) -> Result<Reply, RequestError> {
        let outcome = self
            .client
            .send_json::<Reply>(Request::post(self.url("register")).with_data(fields.clone()))
            .await;

        if let Ok(reply) = &outcome {
            if reply.success {
                self.persist_user(reply);
            }
        }
        outcome
    }

    pub async fn logout(&self, params: &FormData) -> Result<Reply, RequestError> {
        let outcome = self
            .client
            .send_json::<Reply>(Request::post(self.url("logout")).with_data(params.clone()))
            .await;

        if let Ok(reply) = &outcome {
            if reply.success {
                self.forget();
                info!("signed out");
                self.orchestrator.set_state(AppState::Init).await;
            }
        }
        outcome
    }

    fn persist_user(&self, reply: &Reply) {
        let Some(user) = &reply.user else {
            warn!("successful reply carried no user record");
            return;
        };
        let identity = Identity {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        };
        match self.set_current(&identity) {
            Ok(()) => info!(user_id = %identity.id, "identity stored"),
            Err(err) => error!(error = %err, "failed to store identity"),
        }
    }

    fn forget(&self) {
        if let Err(err) = self.unset_current() {
            error!(error = %err, "failed to drop stored identity");
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
