//! Recording doubles for the collaborators view units talk to.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, Weak,
    },
    time::Duration,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use shared::{
    domain::{
        Account, AccountId, Identity, Transaction, TransactionId, TransactionKind, UserId,
    },
    protocol::{FormData, Reply},
};

use crate::{
    error::RequestError,
    orchestrator::{modal_names, AppState, Modal, Orchestrator, Page},
    resources::{AccountApi, TransactionApi},
    session::Session,
    storage::MemoryStorage,
    transport::RequestClient,
    ui::{EventKind, Fragment, Mount, Prompt, Region, ViewUnit},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MountOp {
    Bind(Vec<EventKind>),
    Replace(Region, Vec<String>),
    Text(Region, String),
    Active(Region, String, bool),
    Reset,
}

pub(crate) struct RecordingMount {
    ops: Mutex<Vec<MountOp>>,
    attached: bool,
}

impl RecordingMount {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            ops: Mutex::new(Vec::new()),
            attached: true,
        })
    }

    pub(crate) fn detached() -> Arc<Self> {
        Arc::new(Self {
            ops: Mutex::new(Vec::new()),
            attached: false,
        })
    }

    pub(crate) fn ops(&self) -> Vec<MountOp> {
        self.ops.lock().unwrap().clone()
    }

    pub(crate) fn bound(&self) -> Vec<EventKind> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                MountOp::Bind(kinds) => Some(kinds),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub(crate) fn bind_calls(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, MountOp::Bind(_)))
            .count()
    }

    pub(crate) fn replacements(&self, region: Region) -> Vec<Vec<String>> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                MountOp::Replace(r, ids) if r == region => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_replace(&self, region: Region) -> Option<Vec<String>> {
        self.replacements(region).pop()
    }

    pub(crate) fn texts(&self, region: Region) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                MountOp::Text(r, text) if r == region => Some(text),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn active_marks(&self) -> Vec<(String, bool)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                MountOp::Active(_, id, active) => Some((id, active)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn resets(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, MountOp::Reset))
            .count()
    }

    fn push(&self, op: MountOp) {
        self.ops.lock().unwrap().push(op);
    }
}

impl Mount for RecordingMount {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn bind(&self, events: &[EventKind]) {
        self.push(MountOp::Bind(events.to_vec()));
    }

    fn replace(&self, region: Region, fragments: Vec<Fragment>) {
        let ids = fragments
            .into_iter()
            .map(|f| f.id.unwrap_or_default())
            .collect();
        self.push(MountOp::Replace(region, ids));
    }

    fn set_text(&self, region: Region, text: &str) {
        self.push(MountOp::Text(region, text.to_string()));
    }

    fn set_active(&self, region: Region, id: &str, active: bool) {
        self.push(MountOp::Active(region, id.to_string(), active));
    }

    fn reset(&self) {
        self.push(MountOp::Reset);
    }
}

pub(crate) struct ScriptedPrompt {
    answer: bool,
    confirms: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub(crate) fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            confirms: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn confirms(&self) -> Vec<String> {
        self.confirms.lock().unwrap().clone()
    }

    pub(crate) fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, question: &str) -> bool {
        self.confirms.lock().unwrap().push(question.to_string());
        self.answer
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub(crate) struct TestModal {
    opens: AtomicUsize,
    closes: AtomicUsize,
}

impl Modal for TestModal {
    fn open(&self) {
        self.opens.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) struct RecordingOrchestrator {
    updates: AtomicUsize,
    states: Mutex<Vec<AppState>>,
    pages: Mutex<Vec<Page>>,
    modals: HashMap<&'static str, Arc<TestModal>>,
    units: Mutex<Vec<Weak<dyn ViewUnit>>>,
}

impl RecordingOrchestrator {
    pub(crate) fn new() -> Arc<Self> {
        let modals = [
            modal_names::LOGIN,
            modal_names::REGISTER,
            modal_names::CREATE_ACCOUNT,
            modal_names::NEW_INCOME,
            modal_names::NEW_EXPENSE,
        ]
        .into_iter()
        .map(|name| (name, Arc::new(TestModal::default())))
        .collect();
        Arc::new(Self {
            updates: AtomicUsize::new(0),
            states: Mutex::new(Vec::new()),
            pages: Mutex::new(Vec::new()),
            modals,
            units: Mutex::new(Vec::new()),
        })
    }

    /// Units refreshed by every global update.
    pub(crate) fn attach(&self, unit: &Arc<dyn ViewUnit>) {
        self.units.lock().unwrap().push(Arc::downgrade(unit));
    }

    pub(crate) fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub(crate) fn states(&self) -> Vec<AppState> {
        self.states.lock().unwrap().clone()
    }

    pub(crate) fn pages(&self) -> Vec<Page> {
        self.pages.lock().unwrap().clone()
    }

    pub(crate) fn modal_opens(&self, name: &str) -> usize {
        self.modals[name].opens.load(Ordering::SeqCst)
    }

    pub(crate) fn modal_closes(&self, name: &str) -> usize {
        self.modals[name].closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Orchestrator for RecordingOrchestrator {
    async fn show_page(&self, page: Page) {
        self.pages.lock().unwrap().push(page);
    }

    async fn update(&self) {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let units: Vec<_> = self
            .units
            .lock()
            .unwrap()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for unit in units {
            unit.update().await;
        }
    }

    fn modal(&self, name: &str) -> Option<Arc<dyn Modal>> {
        self.modals
            .get(name)
            .map(|modal| Arc::clone(modal) as Arc<dyn Modal>)
    }

    async fn set_state(&self, state: AppState) {
        self.states.lock().unwrap().push(state);
    }
}

fn outage() -> RequestError {
    RequestError::Status(StatusCode::BAD_GATEWAY)
}

pub(crate) fn identity() -> Identity {
    Identity {
        id: UserId(1),
        name: "A".into(),
        email: "a@b.c".into(),
    }
}

pub(crate) fn sample_accounts() -> Vec<Account> {
    vec![
        Account {
            id: AccountId(5),
            name: "Main".into(),
            sum: 1200.5,
        },
        Account {
            id: AccountId(6),
            name: "Savings".into(),
            sum: 0.0,
        },
    ]
}

pub(crate) fn sample_transactions() -> Vec<Transaction> {
    vec![
        Transaction {
            id: TransactionId(11),
            account_id: AccountId(5),
            kind: TransactionKind::Income,
            name: "Зарплата".into(),
            sum: 1500.0,
            date: "2019-03-10 03:20:41".into(),
        },
        Transaction {
            id: TransactionId(12),
            account_id: AccountId(5),
            kind: TransactionKind::Expense,
            name: "Кофе".into(),
            sum: 299.5,
            date: "2019-03-11 09:00:00".into(),
        },
        Transaction {
            id: TransactionId(21),
            account_id: AccountId(6),
            kind: TransactionKind::Income,
            name: "Проценты".into(),
            sum: 12.0,
            date: "2019-04-01 00:00:00".into(),
        },
    ]
}

/// Session whose storage lives in memory and whose server is never contacted.
pub(crate) fn offline_session() -> Arc<Session> {
    Arc::new(Session::new(
        RequestClient::new().expect("client"),
        "http://127.0.0.1:9",
        Arc::new(MemoryStorage::new()),
        RecordingOrchestrator::new(),
    ))
}

pub(crate) fn signed_in_session() -> Arc<Session> {
    let session = offline_session();
    session.set_current(&identity()).expect("store identity");
    session
}

pub(crate) struct FakeAccounts {
    accounts: Mutex<Vec<Account>>,
    calls: Mutex<Vec<String>>,
    failing: AtomicBool,
    reject_writes: AtomicBool,
    next_list_delay: Mutex<Option<Duration>>,
}

impl FakeAccounts {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            accounts: Mutex::new(sample_accounts()),
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            reject_writes: AtomicBool::new(false),
            next_list_delay: Mutex::new(None),
        })
    }

    /// Delays only the next `list` call; its answer is the list as it was when called.
    pub(crate) fn slow_down_next_list(&self, delay: Duration) {
        *self.next_list_delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub(crate) fn set_accounts(&self, accounts: Vec<Account>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AccountApi for FakeAccounts {
    async fn list(&self, owner: &Identity) -> Result<Reply<Vec<Account>>, RequestError> {
        self.record(format!("list owner={}", owner.id));
        if self.failing.load(Ordering::SeqCst) {
            return Err(outage());
        }
        let snapshot = self.accounts.lock().unwrap().clone();
        let delay = self.next_list_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Reply::ok(snapshot))
    }

    async fn get(&self, id: AccountId, _options: &FormData) -> Result<Reply<Account>, RequestError> {
        self.record(format!("get {id}"));
        if self.failing.load(Ordering::SeqCst) {
            return Err(outage());
        }
        let found = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|account| account.id == id)
            .cloned();
        Ok(match found {
            Some(account) => Reply::ok(account),
            None => Reply::rejected("Счёт не найден"),
        })
    }

    async fn create(&self, fields: &FormData) -> Result<Reply, RequestError> {
        self.record(format!("create name={}", fields.get("name").unwrap_or_default()));
        if self.reject_writes.load(Ordering::SeqCst) {
            return Ok(Reply::rejected("Имя счёта не заполнено"));
        }
        Ok(Reply::ok(serde_json::Value::Null))
    }

    async fn remove(&self, id: AccountId, _options: &FormData) -> Result<Reply, RequestError> {
        self.record(format!("remove {id}"));
        if self.reject_writes.load(Ordering::SeqCst) {
            return Ok(Reply::rejected("Нельзя удалить счёт"));
        }
        self.accounts
            .lock()
            .unwrap()
            .retain(|account| account.id != id);
        Ok(Reply::ok(serde_json::Value::Null))
    }
}

pub(crate) struct FakeTransactions {
    items: Mutex<Vec<Transaction>>,
    calls: Mutex<Vec<String>>,
    failing: AtomicBool,
    reject_writes: AtomicBool,
    slow_account: Mutex<Option<(String, Duration)>>,
}

impl FakeTransactions {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            items: Mutex::new(sample_transactions()),
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            reject_writes: AtomicBool::new(false),
            slow_account: Mutex::new(None),
        })
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Delays list replies for one account so responses can arrive out of order.
    pub(crate) fn slow_down(&self, account_id: AccountId, delay: Duration) {
        *self.slow_account.lock().unwrap() = Some((account_id.to_string(), delay));
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TransactionApi for FakeTransactions {
    async fn list(&self, options: &FormData) -> Result<Reply<Vec<Transaction>>, RequestError> {
        let account_id = options.get("account_id").unwrap_or_default().to_string();
        self.record(format!("list account_id={account_id}"));

        let delay = self
            .slow_account
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(slow, _)| *slow == account_id)
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(outage());
        }
        let items = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.account_id.to_string() == account_id)
            .cloned()
            .collect();
        Ok(Reply::ok(items))
    }

    async fn create(&self, fields: &FormData) -> Result<Reply, RequestError> {
        let summary = fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        self.record(format!("create {summary}"));
        if self.failing.load(Ordering::SeqCst) {
            return Err(outage());
        }
        if self.reject_writes.load(Ordering::SeqCst) {
            return Ok(Reply::rejected("Сумма должна быть больше нуля"));
        }
        Ok(Reply::ok(serde_json::Value::Null))
    }

    async fn remove(
        &self,
        id: TransactionId,
        _options: &FormData,
    ) -> Result<Reply, RequestError> {
        self.record(format!("remove {id}"));
        if self.reject_writes.load(Ordering::SeqCst) {
            return Ok(Reply::rejected("Нельзя удалить"));
        }
        self.items.lock().unwrap().retain(|item| item.id != id);
        Ok(Reply::ok(serde_json::Value::Null))
    }
}
