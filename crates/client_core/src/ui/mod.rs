//! View units and the seams they render through.
//!
//! Every unit follows the same lifecycle: construction validates the mount and binds
//! event listeners, `render` is the only path that reads remote state, `update` replays
//! the last render, and `clear` resets to the empty view without touching the server.

use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{AccountId, TransactionId},
    protocol::FormData,
};

use crate::error::ViewError;

pub mod accounts_widget;
pub mod forms;
pub mod templates;
pub mod transactions_page;
pub mod transactions_widget;
pub mod user_widget;

pub use accounts_widget::AccountsWidget;
pub use forms::{AsyncForm, CreateAccountForm, CreateTransactionForm, LoginForm, RegisterForm};
pub use transactions_page::TransactionsPage;
pub use transactions_widget::TransactionsWidget;
pub use user_widget::UserWidget;

/// Named areas inside a mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Title,
    Content,
    AccountList,
    AccountSelect,
    UserName,
}

/// Rendered markup for one item, tagged with the id gestures resolve back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub id: Option<String>,
    pub markup: String,
    /// Plain-text rendition for surfaces without markup.
    pub text: String,
}

/// Root element a unit is mounted on.
pub trait Mount: Send + Sync {
    fn is_attached(&self) -> bool {
        true
    }
    /// Registers delegated listeners for `events`. Called once per unit.
    fn bind(&self, events: &[EventKind]);
    /// Drops every child of `region` and appends `fragments` in order.
    fn replace(&self, region: Region, fragments: Vec<Fragment>);
    fn set_text(&self, region: Region, text: &str);
    fn set_active(&self, region: Region, id: &str, active: bool);
    /// Resets form inputs to their defaults.
    fn reset(&self);
}

/// Blocking user interaction.
pub trait Prompt: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
    fn alert(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RemoveTransaction,
    RemoveAccount,
    CreateAccount,
    SelectAccount,
    CreateIncome,
    CreateExpense,
    Submit,
}

/// A user gesture delivered through a mount's delegated listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    RemoveTransaction(TransactionId),
    RemoveAccount,
    CreateAccount,
    SelectAccount(AccountId),
    CreateIncome,
    CreateExpense,
    Submit(FormData),
}

impl UiEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            UiEvent::RemoveTransaction(_) => EventKind::RemoveTransaction,
            UiEvent::RemoveAccount => EventKind::RemoveAccount,
            UiEvent::CreateAccount => EventKind::CreateAccount,
            UiEvent::SelectAccount(_) => EventKind::SelectAccount,
            UiEvent::CreateIncome => EventKind::CreateIncome,
            UiEvent::CreateExpense => EventKind::CreateExpense,
            UiEvent::Submit(_) => EventKind::Submit,
        }
    }
}

#[async_trait]
pub trait ViewUnit: Send + Sync {
    fn name(&self) -> &'static str;
    /// Re-renders from the unit's cached options. Units without remote state do nothing.
    async fn update(&self) {}
    async fn handle(&self, event: UiEvent);
}

pub(crate) fn require_mount(
    unit: &'static str,
    mount: Option<Arc<dyn Mount>>,
) -> Result<Arc<dyn Mount>, ViewError> {
    let mount = mount.ok_or(ViewError::MissingMount { unit })?;
    if !mount.is_attached() {
        return Err(ViewError::DetachedMount { unit });
    }
    Ok(mount)
}
