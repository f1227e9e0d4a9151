//! Form units: each collects a field set on submit and sends it to one endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::TransactionKind,
    protocol::{FormData, Reply},
};
use tracing::{debug, error, info, warn};

use super::{require_mount, templates, EventKind, Mount, Prompt, Region, UiEvent, ViewUnit};
use crate::{
    error::{RequestError, ViewError},
    orchestrator::{modal_names, AppState, Orchestrator},
    resources::{AccountApi, TransactionApi},
    session::Session,
};

const TRANSPORT_ALERT: &str = "Не удалось связаться с сервером, попробуйте ещё раз";

#[async_trait]
pub trait AsyncForm: Send + Sync {
    /// Final field set sent to the server.
    fn prepare(&self, fields: FormData) -> FormData {
        fields
    }

    async fn on_submit(&self, fields: FormData);

    async fn submit(&self, fields: FormData) {
        let fields = self.prepare(fields);
        self.on_submit(fields).await;
    }
}

/// Mount, overlay and user-feedback plumbing every form shares.
struct FormCore {
    mount: Arc<dyn Mount>,
    prompt: Arc<dyn Prompt>,
    orchestrator: Arc<dyn Orchestrator>,
    modal: &'static str,
}

impl FormCore {
    fn new(
        unit: &'static str,
        mount: Option<Arc<dyn Mount>>,
        prompt: Arc<dyn Prompt>,
        orchestrator: Arc<dyn Orchestrator>,
        modal: &'static str,
    ) -> Result<Self, ViewError> {
        let core = Self {
            mount: require_mount(unit, mount)?,
            prompt,
            orchestrator,
            modal,
        };
        core.mount.bind(&[EventKind::Submit]);
        Ok(core)
    }

    fn close_modal(&self) {
        match self.orchestrator.modal(self.modal) {
            Some(modal) => modal.close(),
            None => warn!(modal = self.modal, "modal is not registered"),
        }
    }

    /// Returns true when the server accepted the request; otherwise tells the user why.
    fn accepted(&self, action: &str, outcome: &Result<Reply, RequestError>) -> bool {
        match outcome {
            Ok(reply) if reply.success => true,
            Ok(reply) => {
                let reason = reply.rejection().map(|r| r.message).unwrap_or_default();
                warn!(action, reason = %reason, "server rejected form");
                self.prompt.alert(&reason);
                false
            }
            Err(err) => {
                error!(action, error = %err, "form request failed");
                self.prompt.alert(TRANSPORT_ALERT);
                false
            }
        }
    }
}

pub struct LoginForm {
    core: FormCore,
    session: Arc<Session>,
}

impl LoginForm {
    pub fn new(
        mount: Option<Arc<dyn Mount>>,
        session: Arc<Session>,
        prompt: Arc<dyn Prompt>,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Result<Self, ViewError> {
        Ok(Self {
            core: FormCore::new("login form", mount, prompt, orchestrator, modal_names::LOGIN)?,
            session,
        })
    }
}

#[async_trait]
impl AsyncForm for LoginForm {
    async fn on_submit(&self, fields: FormData) {
        let outcome = self.session.login(&fields).await;
        if self.core.accepted("login", &outcome) {
            self.core.mount.reset();
            self.core.orchestrator.set_state(AppState::UserLogged).await;
            self.core.close_modal();
        }
    }
}

pub struct RegisterForm {
    core: FormCore,
    session: Arc<Session>,
}

impl RegisterForm {
    pub fn new(
        mount: Option<Arc<dyn Mount>>,
        session: Arc<Session>,
        prompt: Arc<dyn Prompt>,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Result<Self, ViewError> {
        Ok(Self {
            core: FormCore::new(
                "register form",
                mount,
                prompt,
                orchestrator,
                modal_names::REGISTER,
            )?,
            session,
        })
    }
}

#[async_trait]
impl AsyncForm for RegisterForm {
    async fn on_submit(&self, fields: FormData) {
        let outcome = self.session.register(&fields).await;
        if self.core.accepted("register", &outcome) {
            self.core.mount.reset();
            self.core.orchestrator.set_state(AppState::UserLogged).await;
            self.core.close_modal();
        }
    }
}

pub struct CreateAccountForm {
    core: FormCore,
    accounts: Arc<dyn AccountApi>,
}

impl CreateAccountForm {
    pub fn new(
        mount: Option<Arc<dyn Mount>>,
        accounts: Arc<dyn AccountApi>,
        prompt: Arc<dyn Prompt>,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Result<Self, ViewError> {
        Ok(Self {
            core: FormCore::new(
                "create account form",
                mount,
                prompt,
                orchestrator,
                modal_names::CREATE_ACCOUNT,
            )?,
            accounts,
        })
    }
}

#[async_trait]
impl AsyncForm for CreateAccountForm {
    async fn on_submit(&self, fields: FormData) {
        let outcome = self.accounts.create(&fields).await;
        if self.core.accepted("create account", &outcome) {
            info!("account created");
            self.core.close_modal();
            self.core.mount.reset();
            self.core.orchestrator.update().await;
        }
    }
}

/// Income or expense entry form; also keeps its account drop-down current.
pub struct CreateTransactionForm {
    core: FormCore,
    kind: TransactionKind,
    session: Arc<Session>,
    accounts: Arc<dyn AccountApi>,
    transactions: Arc<dyn TransactionApi>,
}

impl CreateTransactionForm {
    pub async fn new(
        mount: Option<Arc<dyn Mount>>,
        kind: TransactionKind,
        session: Arc<Session>,
        accounts: Arc<dyn AccountApi>,
        transactions: Arc<dyn TransactionApi>,
        prompt: Arc<dyn Prompt>,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Result<Self, ViewError> {
        let modal = match kind {
            TransactionKind::Income => modal_names::NEW_INCOME,
            TransactionKind::Expense => modal_names::NEW_EXPENSE,
        };
        let form = Self {
            core: FormCore::new("create transaction form", mount, prompt, orchestrator, modal)?,
            kind,
            session,
            accounts,
            transactions,
        };
        form.render_accounts_list().await;
        Ok(form)
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Refills the account drop-down for the current identity.
    pub async fn render_accounts_list(&self) {
        let Some(owner) = self.session.current() else {
            return;
        };
        match self.accounts.list(&owner).await {
            Ok(reply) if reply.success => {
                let options = reply
                    .data
                    .unwrap_or_default()
                    .iter()
                    .map(templates::account_option)
                    .collect();
                self.core.mount.replace(Region::AccountSelect, options);
            }
            Ok(reply) => {
                let reason = reply.rejection().map(|r| r.message).unwrap_or_default();
                warn!(reason = %reason, "account list for form rejected");
            }
            Err(err) => error!(error = %err, "account list for form failed"),
        }
    }
}

#[async_trait]
impl AsyncForm for CreateTransactionForm {
    fn prepare(&self, fields: FormData) -> FormData {
        fields.with("type", self.kind.as_str())
    }

    async fn on_submit(&self, fields: FormData) {
        let outcome = self.transactions.create(&fields).await;
        if self.core.accepted("create transaction", &outcome) {
            info!(kind = self.kind.as_str(), "transaction created");
            self.core.mount.reset();
            self.core.close_modal();
            self.core.orchestrator.update().await;
        }
    }
}

macro_rules! form_view_unit {
    ($form:ty, $name:literal) => {
        #[async_trait]
        impl ViewUnit for $form {
            fn name(&self) -> &'static str {
                $name
            }

            async fn handle(&self, event: UiEvent) {
                match event {
                    UiEvent::Submit(fields) => self.submit(fields).await,
                    other => debug!(event = ?other.kind(), unit = $name, "form ignores event"),
                }
            }
        }
    };
}

form_view_unit!(LoginForm, "login form");
form_view_unit!(RegisterForm, "register form");
form_view_unit!(CreateAccountForm, "create account form");

#[async_trait]
impl ViewUnit for CreateTransactionForm {
    fn name(&self) -> &'static str {
        "create transaction form"
    }

    async fn update(&self) {
        self.render_accounts_list().await;
    }

    async fn handle(&self, event: UiEvent) {
        match event {
            UiEvent::Submit(fields) => self.submit(fields).await,
            other => debug!(event = ?other.kind(), "create transaction form ignores event"),
        }
    }
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
