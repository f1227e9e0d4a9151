//! Collaborators owned by the application shell: navigation, global refresh, modals.

use std::sync::Arc;

use async_trait::async_trait;
use shared::{domain::AccountId, protocol::FormData};

/// Top-level application mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Init,
    UserLogged,
}

impl AppState {
    pub fn as_str(self) -> &'static str {
        match self {
            AppState::Init => "init",
            AppState::UserLogged => "user-logged",
        }
    }
}

/// Parameters that scope the transactions page to one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionsOptions {
    pub account_id: AccountId,
}

impl TransactionsOptions {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }

    pub fn to_form(&self) -> FormData {
        FormData::new().with("account_id", self.account_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Transactions(TransactionsOptions),
}

impl Page {
    pub fn name(&self) -> &'static str {
        match self {
            Page::Transactions(_) => "transactions",
        }
    }
}

pub mod modal_names {
    pub const LOGIN: &str = "login";
    pub const REGISTER: &str = "register";
    pub const CREATE_ACCOUNT: &str = "createAccount";
    pub const NEW_INCOME: &str = "newIncome";
    pub const NEW_EXPENSE: &str = "newExpense";
}

pub trait Modal: Send + Sync {
    fn open(&self);
    fn close(&self);
}

#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn show_page(&self, page: Page);
    /// Re-render every visible view unit from fresh server state.
    async fn update(&self);
    fn modal(&self, name: &str) -> Option<Arc<dyn Modal>>;
    async fn set_state(&self, state: AppState);
}
