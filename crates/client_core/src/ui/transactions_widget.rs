//! "New income" / "new expense" launcher buttons.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{require_mount, EventKind, Mount, UiEvent, ViewUnit};
use crate::{
    error::ViewError,
    orchestrator::{modal_names, Orchestrator},
};

pub struct TransactionsWidget {
    mount: Arc<dyn Mount>,
    orchestrator: Arc<dyn Orchestrator>,
}

impl TransactionsWidget {
    const EVENTS: &'static [EventKind] = &[EventKind::CreateIncome, EventKind::CreateExpense];

    pub fn new(
        mount: Option<Arc<dyn Mount>>,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Result<Self, ViewError> {
        let widget = Self {
            mount: require_mount("transactions widget", mount)?,
            orchestrator,
        };
        widget.register_events();
        Ok(widget)
    }

    fn register_events(&self) {
        self.mount.bind(Self::EVENTS);
    }

    fn open(&self, name: &str) {
        match self.orchestrator.modal(name) {
            Some(modal) => modal.open(),
            None => warn!(modal = name, "modal is not registered"),
        }
    }
}

#[async_trait]
impl ViewUnit for TransactionsWidget {
    fn name(&self) -> &'static str {
        "transactions widget"
    }

    async fn handle(&self, event: UiEvent) {
        match event {
            UiEvent::CreateIncome => self.open(modal_names::NEW_INCOME),
            UiEvent::CreateExpense => self.open(modal_names::NEW_EXPENSE),
            other => debug!(event = ?other.kind(), "transactions widget ignores event"),
        }
    }
}
