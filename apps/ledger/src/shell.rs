//! Application shell: owns the modal registry and fans refreshes out to mounted units.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use async_trait::async_trait;
use client_core::{
    orchestrator::modal_names,
    ui::{TransactionsPage, ViewUnit},
    AppState, Modal, Orchestrator, Page,
};
use tracing::{info, warn};

use crate::terminal::TerminalModal;

#[derive(Default)]
struct Registry {
    units: Vec<Weak<dyn ViewUnit>>,
    page: Option<Weak<TransactionsPage>>,
}

pub struct Shell {
    modals: HashMap<&'static str, Arc<dyn Modal>>,
    registry: Mutex<Registry>,
    state: Mutex<AppState>,
}

impl Shell {
    pub fn new() -> Self {
        let modals = [
            modal_names::LOGIN,
            modal_names::REGISTER,
            modal_names::CREATE_ACCOUNT,
            modal_names::NEW_INCOME,
            modal_names::NEW_EXPENSE,
        ]
        .into_iter()
        .map(|name| (name, Arc::new(TerminalModal::new(name)) as Arc<dyn Modal>))
        .collect();

        Self {
            modals,
            registry: Mutex::new(Registry::default()),
            state: Mutex::new(AppState::Init),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Units are held weakly; they already hold the shell.
    pub fn attach(&self, unit: &Arc<dyn ViewUnit>) {
        self.registry().units.push(Arc::downgrade(unit));
    }

    pub fn attach_page(&self, page: &Arc<TransactionsPage>) {
        self.registry().page = Some(Arc::downgrade(page));
    }

    pub fn state(&self) -> AppState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live_units(&self) -> Vec<Arc<dyn ViewUnit>> {
        let mut registry = self.registry();
        registry.units.retain(|unit| unit.strong_count() > 0);
        registry.units.iter().filter_map(Weak::upgrade).collect()
    }
}

#[async_trait]
impl Orchestrator for Shell {
    async fn show_page(&self, page: Page) {
        let target = self.registry().page.as_ref().and_then(Weak::upgrade);
        let Some(target) = target else {
            warn!(page = page.name(), "no page mounted");
            return;
        };
        match page {
            Page::Transactions(options) => target.render(Some(options)).await,
        }
    }

    async fn update(&self) {
        for unit in self.live_units() {
            unit.update().await;
        }
    }

    fn modal(&self, name: &str) -> Option<Arc<dyn Modal>> {
        self.modals.get(name).cloned()
    }

    async fn set_state(&self, state: AppState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        info!(state = state.as_str(), "app state changed");
        if state == AppState::UserLogged {
            self.update().await;
        }
    }
}
