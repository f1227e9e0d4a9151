mod config;
mod shell;
mod terminal;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ui::{
        AccountsWidget, AsyncForm, CreateAccountForm, CreateTransactionForm, LoginForm, Mount,
        RegisterForm, TransactionsPage, TransactionsWidget, UiEvent, UserWidget, ViewUnit,
    },
    AccountApi, FileStorage, RemoteAccounts, RemoteTransactions, RequestClient, Session,
    TransactionApi, TransactionsOptions,
};
use shared::{
    domain::{AccountId, TransactionId, TransactionKind},
    protocol::FormData,
};
use tracing_subscriber::EnvFilter;

use crate::{
    shell::Shell,
    terminal::{Console, TerminalMount, TerminalPrompt},
};

#[derive(Parser, Debug)]
#[command(name = "ledger", about = "Personal finance tracker client")]
struct Cli {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Answer yes to every confirmation.
    #[arg(long, short = 'y')]
    yes: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        email: String,
        password: String,
    },
    Register {
        name: String,
        email: String,
        password: String,
    },
    Logout,
    Whoami {
        /// Ask the server instead of trusting the stored identity.
        #[arg(long)]
        refresh: bool,
    },
    Accounts,
    Transactions {
        account: i64,
    },
    CreateAccount {
        name: String,
    },
    AddIncome {
        account: i64,
        name: String,
        sum: f64,
    },
    AddExpense {
        account: i64,
        name: String,
        sum: f64,
    },
    RemoveTransaction {
        account: i64,
        id: i64,
    },
    RemoveAccount {
        account: i64,
    },
    /// Read commands line by line, keeping one server session.
    Repl,
}

/// A single line typed into the repl.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

struct App {
    console: Arc<Console>,
    shell: Arc<Shell>,
    session: Arc<Session>,
    user: Arc<UserWidget>,
    sidebar: Arc<AccountsWidget>,
    page: Arc<TransactionsPage>,
    launcher: Arc<TransactionsWidget>,
    login: Arc<LoginForm>,
    register: Arc<RegisterForm>,
    create_account: Arc<CreateAccountForm>,
    income: Arc<CreateTransactionForm>,
    expense: Arc<CreateTransactionForm>,
}

fn mount(label: &'static str) -> Option<Arc<dyn Mount>> {
    Some(Arc::new(TerminalMount::new(label)))
}

impl App {
    async fn build(
        server_url: &str,
        data_dir: PathBuf,
        console: Arc<Console>,
        assume_yes: bool,
    ) -> Result<Self> {
        let client = RequestClient::new().context("building http client")?;
        let storage = Arc::new(FileStorage::new(data_dir));
        let shell = Arc::new(Shell::new());
        let prompt = Arc::new(TerminalPrompt::new(console.clone(), assume_yes));

        let session = Arc::new(Session::new(
            client.clone(),
            server_url,
            storage,
            shell.clone(),
        ));
        let accounts: Arc<dyn AccountApi> =
            Arc::new(RemoteAccounts::new(client.clone(), server_url));
        let transactions: Arc<dyn TransactionApi> =
            Arc::new(RemoteTransactions::new(client, server_url));

        let user = Arc::new(UserWidget::new(mount("user"), session.clone())?);
        let sidebar = Arc::new(
            AccountsWidget::new(
                mount("sidebar"),
                session.clone(),
                accounts.clone(),
                shell.clone(),
            )
            .await?,
        );
        let page = Arc::new(TransactionsPage::new(
            mount("page"),
            accounts.clone(),
            transactions.clone(),
            prompt.clone(),
            shell.clone(),
        )?);
        let launcher = Arc::new(TransactionsWidget::new(mount("launcher"), shell.clone())?);
        let login = Arc::new(LoginForm::new(
            mount("login"),
            session.clone(),
            prompt.clone(),
            shell.clone(),
        )?);
        let register = Arc::new(RegisterForm::new(
            mount("register"),
            session.clone(),
            prompt.clone(),
            shell.clone(),
        )?);
        let create_account = Arc::new(CreateAccountForm::new(
            mount("new account"),
            accounts.clone(),
            prompt.clone(),
            shell.clone(),
        )?);
        let income = Arc::new(
            CreateTransactionForm::new(
                mount("new income"),
                TransactionKind::Income,
                session.clone(),
                accounts.clone(),
                transactions.clone(),
                prompt.clone(),
                shell.clone(),
            )
            .await?,
        );
        let expense = Arc::new(
            CreateTransactionForm::new(
                mount("new expense"),
                TransactionKind::Expense,
                session.clone(),
                accounts,
                transactions,
                prompt,
                shell.clone(),
            )
            .await?,
        );

        let units: [Arc<dyn ViewUnit>; 9] = [
            user.clone(),
            sidebar.clone(),
            page.clone(),
            launcher.clone(),
            login.clone(),
            register.clone(),
            create_account.clone(),
            income.clone(),
            expense.clone(),
        ];
        for unit in &units {
            shell.attach(unit);
        }
        shell.attach_page(&page);

        Ok(Self {
            console,
            shell,
            session,
            user,
            sidebar,
            page,
            launcher,
            login,
            register,
            create_account,
            income,
            expense,
        })
    }

    async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Login { email, password } => {
                self.login
                    .submit(FormData::new().with("email", email).with("password", password))
                    .await;
            }
            Command::Register {
                name,
                email,
                password,
            } => {
                self.register
                    .submit(
                        FormData::new()
                            .with("name", name)
                            .with("email", email)
                            .with("password", password),
                    )
                    .await;
            }
            Command::Logout => {
                let reply = self.session.logout(&FormData::new()).await?;
                if !reply.success {
                    tracing::warn!(reason = ?reply.error, "server refused logout");
                }
                println!("logged out");
            }
            Command::Whoami { refresh } => {
                if refresh {
                    let outcome = self.session.fetch_current(Some(&FormData::new())).await;
                    if let Some(Err(err)) = outcome {
                        tracing::warn!(error = %err, "identity refresh failed");
                    }
                }
                match self.session.current() {
                    Some(identity) => {
                        println!("#{} {} <{}>", identity.id, identity.name, identity.email)
                    }
                    None => println!("not logged in"),
                }
            }
            Command::Accounts => {
                self.user.update().await;
                self.sidebar.update().await;
            }
            Command::Transactions { account } => {
                self.sidebar
                    .handle(UiEvent::SelectAccount(AccountId(account)))
                    .await;
                if self.sidebar.active() != Some(AccountId(account)) {
                    println!("account #{account} is not in your list");
                }
            }
            Command::CreateAccount { name } => {
                self.sidebar.handle(UiEvent::CreateAccount).await;
                self.create_account
                    .submit(FormData::new().with("name", name))
                    .await;
            }
            Command::AddIncome { account, name, sum } => {
                self.launcher.handle(UiEvent::CreateIncome).await;
                self.income.submit(entry(account, name, sum)).await;
            }
            Command::AddExpense { account, name, sum } => {
                self.launcher.handle(UiEvent::CreateExpense).await;
                self.expense.submit(entry(account, name, sum)).await;
            }
            Command::RemoveTransaction { account, id } => {
                self.open_account(account).await;
                self.page
                    .handle(UiEvent::RemoveTransaction(TransactionId(id)))
                    .await;
            }
            Command::RemoveAccount { account } => {
                self.open_account(account).await;
                self.page.handle(UiEvent::RemoveAccount).await;
            }
            Command::Repl => anyhow::bail!("already in the repl"),
        }
        Ok(())
    }

    async fn open_account(&self, account: i64) {
        self.page
            .render(Some(TransactionsOptions::new(AccountId(account))))
            .await;
    }

    async fn repl(&self) -> Result<()> {
        loop {
            let console = self.console.clone();
            let line = tokio::task::block_in_place(move || console.read_line())?;
            let Some(line) = line else {
                break;
            };
            let words: Vec<&str> = line.split_whitespace().collect();
            match words.first() {
                None => continue,
                Some(&"quit") | Some(&"exit") => break,
                Some(_) => {}
            }
            match Line::try_parse_from(words) {
                Ok(Line { command }) => {
                    if let Err(err) = self.run(command).await {
                        eprintln!("! {err:#}");
                    }
                }
                Err(err) => eprintln!("{err}"),
            }
            tracing::debug!(state = self.shell.state().as_str(), "command finished");
        }
        Ok(())
    }
}

fn entry(account: i64, name: String, sum: f64) -> FormData {
    FormData::new()
        .with("account_id", account)
        .with("name", name)
        .with("sum", sum)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = config::load_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url.trim_end_matches('/').to_string();
    }
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(std::io::stderr)
        .init();
    tracing::info!(
        server_url = %settings.server_url,
        data_dir = %settings.data_dir.display(),
        "starting ledger client"
    );

    let console = Arc::new(Console::stdin());
    let app = App::build(&settings.server_url, settings.data_dir, console, cli.yes).await?;
    match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => app.repl().await,
        command => app.run(command).await,
    }
}
