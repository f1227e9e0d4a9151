//! Sidebar list of the signed-in user's accounts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use shared::domain::{Account, AccountId, Identity};
use tracing::{debug, error, warn};

use super::{require_mount, templates, EventKind, Mount, Region, UiEvent, ViewUnit};
use crate::{
    error::ViewError,
    orchestrator::{modal_names, Orchestrator, Page, TransactionsOptions},
    resources::AccountApi,
    session::Session,
};

#[derive(Default)]
struct SidebarState {
    shown: Vec<AccountId>,
    active: Option<AccountId>,
    generation: u64,
}

pub struct AccountsWidget {
    mount: Arc<dyn Mount>,
    session: Arc<Session>,
    accounts: Arc<dyn AccountApi>,
    orchestrator: Arc<dyn Orchestrator>,
    state: Mutex<SidebarState>,
}

impl AccountsWidget {
    const EVENTS: &'static [EventKind] = &[EventKind::CreateAccount, EventKind::SelectAccount];

    /// Mounts the sidebar and loads the accounts of the current identity, if any.
    pub async fn new(
        mount: Option<Arc<dyn Mount>>,
        session: Arc<Session>,
        accounts: Arc<dyn AccountApi>,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Result<Self, ViewError> {
        let widget = Self {
            mount: require_mount("accounts widget", mount)?,
            session,
            accounts,
            orchestrator,
            state: Mutex::new(SidebarState::default()),
        };
        widget.register_events();
        widget.update().await;
        Ok(widget)
    }

    fn register_events(&self) {
        self.mount.bind(Self::EVENTS);
    }

    fn state(&self) -> MutexGuard<'_, SidebarState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn active(&self) -> Option<AccountId> {
        self.state().active
    }

    /// Lists the accounts owned by `owner`. Without an owner nothing is requested.
    pub async fn render(&self, owner: Option<Identity>) {
        let Some(owner) = owner else {
            return;
        };
        let generation = {
            let mut state = self.state();
            state.generation += 1;
            state.generation
        };

        match self.accounts.list(&owner).await {
            Ok(reply) if reply.success => {
                if self.state().generation != generation {
                    debug!(user_id = %owner.id, "dropping stale account list");
                    return;
                }
                self.render_items(&reply.data.unwrap_or_default());
            }
            Ok(reply) => {
                let reason = reply.rejection().map(|r| r.message).unwrap_or_default();
                warn!(user_id = %owner.id, reason = %reason, "account list rejected");
            }
            Err(err) => error!(user_id = %owner.id, error = %err, "account list failed"),
        }
    }

    /// Removes every rendered account. Lists still in flight are dropped when they land.
    pub fn clear(&self) {
        {
            let mut state = self.state();
            state.generation += 1;
            state.shown.clear();
        }
        self.mount.replace(Region::AccountList, Vec::new());
    }

    fn render_items(&self, items: &[Account]) {
        let fragments = items.iter().map(templates::account_item).collect();
        self.mount.replace(Region::AccountList, fragments);

        let active = {
            let mut state = self.state();
            state.shown = items.iter().map(|account| account.id).collect();
            if let Some(active) = state.active {
                if !state.shown.contains(&active) {
                    state.active = None;
                }
            }
            state.active
        };
        if let Some(active) = active {
            self.mount
                .set_active(Region::AccountList, &active.to_string(), true);
        }
    }

    /// Marks `account_id` as the only active item and opens its transactions page.
    pub async fn on_select_account(&self, account_id: AccountId) {
        let previous = {
            let mut state = self.state();
            if !state.shown.contains(&account_id) {
                debug!(%account_id, "selected account is not rendered");
                return;
            }
            state.active.replace(account_id)
        };
        if let Some(previous) = previous {
            self.mount
                .set_active(Region::AccountList, &previous.to_string(), false);
        }
        self.mount
            .set_active(Region::AccountList, &account_id.to_string(), true);

        self.orchestrator
            .show_page(Page::Transactions(TransactionsOptions::new(account_id)))
            .await;
    }

    fn open_create_account(&self) {
        match self.orchestrator.modal(modal_names::CREATE_ACCOUNT) {
            Some(modal) => modal.open(),
            None => warn!(modal = modal_names::CREATE_ACCOUNT, "modal is not registered"),
        }
    }
}

#[async_trait]
impl ViewUnit for AccountsWidget {
    fn name(&self) -> &'static str {
        "accounts widget"
    }

    /// The sidebar's options are the current identity, read from the session.
    async fn update(&self) {
        let owner = self.session.current();
        self.render(owner).await;
    }

    async fn handle(&self, event: UiEvent) {
        match event {
            UiEvent::CreateAccount => self.open_create_account(),
            UiEvent::SelectAccount(account_id) => self.on_select_account(account_id).await,
            other => debug!(event = ?other.kind(), "accounts widget ignores event"),
        }
    }
}

#[cfg(test)]
#[path = "tests/accounts_widget_tests.rs"]
mod tests;
