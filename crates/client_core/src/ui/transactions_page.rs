//! Income/expense list for the selected account.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use shared::{
    domain::{AccountId, Transaction, TransactionId},
    protocol::FormData,
};
use tracing::{debug, error, info, warn};

use super::{require_mount, templates, EventKind, Mount, Prompt, Region, UiEvent, ViewUnit};
use crate::{
    error::ViewError,
    orchestrator::{Orchestrator, TransactionsOptions},
    resources::{AccountApi, TransactionApi},
};

pub const TITLE_PLACEHOLDER: &str = "Название счёта";
const CONFIRM_REMOVE_ACCOUNT: &str = "Вы действительно хотите удалить счёт?";
const CONFIRM_REMOVE_TRANSACTION: &str = "Вы действительно хотите удалить эту транзакцию?";

#[derive(Default)]
struct PageState {
    last_options: Option<TransactionsOptions>,
    /// Bumped by every render and clear; responses from older generations are dropped.
    generation: u64,
}

pub struct TransactionsPage {
    mount: Arc<dyn Mount>,
    accounts: Arc<dyn AccountApi>,
    transactions: Arc<dyn TransactionApi>,
    prompt: Arc<dyn Prompt>,
    orchestrator: Arc<dyn Orchestrator>,
    state: Mutex<PageState>,
}

impl TransactionsPage {
    const EVENTS: &'static [EventKind] = &[EventKind::RemoveTransaction, EventKind::RemoveAccount];

    pub fn new(
        mount: Option<Arc<dyn Mount>>,
        accounts: Arc<dyn AccountApi>,
        transactions: Arc<dyn TransactionApi>,
        prompt: Arc<dyn Prompt>,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Result<Self, ViewError> {
        let page = Self {
            mount: require_mount("transactions page", mount)?,
            accounts,
            transactions,
            prompt,
            orchestrator,
            state: Mutex::new(PageState::default()),
        };
        page.register_events();
        Ok(page)
    }

    fn register_events(&self) {
        self.mount.bind(Self::EVENTS);
    }

    fn state(&self) -> std::sync::MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn last_options(&self) -> Option<TransactionsOptions> {
        self.state().last_options.clone()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state().generation == generation
    }

    /// Loads the account title and its transactions. `None` leaves everything untouched.
    pub async fn render(&self, options: Option<TransactionsOptions>) {
        let Some(options) = options else {
            return;
        };
        let generation = {
            let mut state = self.state();
            state.last_options = Some(options.clone());
            state.generation += 1;
            state.generation
        };
        let account_id = options.account_id;

        futures::join!(
            self.load_title(account_id, generation),
            self.load_transactions(&options, generation)
        );
    }

    async fn load_title(&self, account_id: AccountId, generation: u64) {
        match self.accounts.get(account_id, &FormData::new()).await {
            Ok(reply) if reply.success => match reply.data {
                Some(account) if self.is_current(generation) => {
                    self.render_title(&account.name)
                }
                Some(_) => debug!(%account_id, "dropping stale account title"),
                None => warn!(%account_id, "account reply carried no data"),
            },
            Ok(reply) => {
                let reason = reply.rejection().map(|r| r.message).unwrap_or_default();
                warn!(%account_id, reason = %reason, "account lookup rejected");
            }
            Err(err) => error!(%account_id, error = %err, "account lookup failed"),
        }
    }

    async fn load_transactions(&self, options: &TransactionsOptions, generation: u64) {
        let account_id = options.account_id;
        match self.transactions.list(&options.to_form()).await {
            Ok(reply) if reply.success => {
                if self.is_current(generation) {
                    self.render_transactions(&reply.data.unwrap_or_default());
                } else {
                    debug!(%account_id, "dropping stale transaction list");
                }
            }
            Ok(reply) => {
                let reason = reply.rejection().map(|r| r.message).unwrap_or_default();
                warn!(%account_id, reason = %reason, "transaction list rejected");
            }
            Err(err) => error!(%account_id, error = %err, "transaction list failed"),
        }
    }

    pub fn clear(&self) {
        {
            let mut state = self.state();
            state.last_options = None;
            state.generation += 1;
        }
        self.render_transactions(&[]);
        self.render_title(TITLE_PLACEHOLDER);
    }

    fn render_title(&self, name: &str) {
        self.mount.set_text(Region::Title, name);
    }

    fn render_transactions(&self, items: &[Transaction]) {
        let fragments = items.iter().map(templates::transaction_item).collect();
        self.mount.replace(Region::Content, fragments);
    }

    /// Deletes the account the page currently shows, after confirmation.
    pub async fn remove_account(&self) {
        let Some(options) = self.last_options() else {
            return;
        };
        if !self.prompt.confirm(CONFIRM_REMOVE_ACCOUNT) {
            return;
        }
        let account_id: AccountId = options.account_id;
        match self.accounts.remove(account_id, &FormData::new()).await {
            Ok(reply) if reply.success => {
                info!(%account_id, "account removed");
                self.clear();
                self.orchestrator.update().await;
            }
            Ok(reply) => {
                let reason = reply.rejection().map(|r| r.message).unwrap_or_default();
                warn!(%account_id, reason = %reason, "account removal rejected");
            }
            Err(err) => error!(%account_id, error = %err, "account removal failed"),
        }
    }

    pub async fn remove_transaction(&self, id: TransactionId) {
        if !self.prompt.confirm(CONFIRM_REMOVE_TRANSACTION) {
            return;
        }
        match self.transactions.remove(id, &FormData::new()).await {
            Ok(reply) if reply.success => {
                info!(transaction_id = %id, "transaction removed");
                self.orchestrator.update().await;
            }
            Ok(reply) => {
                let reason = reply.rejection().map(|r| r.message).unwrap_or_default();
                warn!(transaction_id = %id, reason = %reason, "transaction removal rejected");
            }
            Err(err) => error!(transaction_id = %id, error = %err, "transaction removal failed"),
        }
    }
}

#[async_trait]
impl ViewUnit for TransactionsPage {
    fn name(&self) -> &'static str {
        "transactions page"
    }

    async fn update(&self) {
        let options = self.last_options();
        self.render(options).await;
    }

    async fn handle(&self, event: UiEvent) {
        match event {
            UiEvent::RemoveTransaction(id) => self.remove_transaction(id).await,
            UiEvent::RemoveAccount => self.remove_account().await,
            other => debug!(event = ?other.kind(), "transactions page ignores event"),
        }
    }
}

#[cfg(test)]
#[path = "tests/transactions_page_tests.rs"]
mod tests;
