//! Name of the signed-in user in the sidebar header.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{require_mount, Mount, Region, UiEvent, ViewUnit};
use crate::{error::ViewError, session::Session};

pub struct UserWidget {
    mount: Arc<dyn Mount>,
    session: Arc<Session>,
}

impl UserWidget {
    pub fn new(mount: Option<Arc<dyn Mount>>, session: Arc<Session>) -> Result<Self, ViewError> {
        Ok(Self {
            mount: require_mount("user widget", mount)?,
            session,
        })
    }
}

#[async_trait]
impl ViewUnit for UserWidget {
    fn name(&self) -> &'static str {
        "user widget"
    }

    async fn update(&self) {
        if let Some(identity) = self.session.current() {
            self.mount.set_text(Region::UserName, &identity.name);
        }
    }

    async fn handle(&self, event: UiEvent) {
        debug!(event = ?event.kind(), "user widget ignores event");
    }
}
