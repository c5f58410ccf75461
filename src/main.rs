//! `reportdesk` command-line client.
//!
//! Every command opens the session store against the configured token file,
//! so a login in one invocation signs the requests of the next.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use reportdesk::config::{ClientConfig, ConfigError};
use reportdesk::net::error::ApiError;
use reportdesk::net::types::{
    AnalysisKind, AnalysisRequest, CompanyQuery, NewsQuery, Registration, ReportGenerateRequest, ReportQuery,
    UserUpdate,
};
use reportdesk::router::navigator::{Location, Navigation, NavigationError, Navigator};
use reportdesk::router::table::RouteTable;
use reportdesk::state::session::{RefreshOutcome, SessionStore, StartupRefresh};
use reportdesk::state::storage::FileTokenStorage;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("navigation failed: {0}")]
    Navigation(#[from] NavigationError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("not logged in; run `reportdesk login` first")]
    NotLoggedIn,
    #[error("session refresh did not complete")]
    RefreshIncomplete,
}

#[derive(Parser, Debug)]
#[command(name = "reportdesk", about = "Reportdesk API client")]
struct Cli {
    /// Overrides `REPORTDESK_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `REPORTDESK_TOKEN_FILE`.
    #[arg(long)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        birth_date: Option<String>,
    },
    Logout,
    /// Restore the session and print the refreshed profile.
    Whoami,
    /// List the route table.
    Routes,
    /// Run the navigation guard for a path against the stored session.
    Navigate {
        path: String,
    },
    Company(CompanyCommand),
    News(NewsCommand),
    Report(ReportCommand),
    User(UserCommand),
}

#[derive(Args, Debug)]
struct CompanyCommand {
    #[command(subcommand)]
    command: CompanySubcommand,
}

#[derive(Subcommand, Debug)]
enum CompanySubcommand {
    List {
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        country: Option<String>,
    },
    Get {
        oem_id: String,
    },
    /// Toggle a company in the caller's favorites.
    Favorite {
        oem_id: String,
    },
    Favorites,
    Financials,
}

#[derive(Args, Debug)]
struct NewsCommand {
    #[command(subcommand)]
    command: NewsSubcommand,
}

#[derive(Subcommand, Debug)]
enum NewsSubcommand {
    List {
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        oem_id: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    Get {
        news_id: String,
    },
    Latest {
        oem_id: String,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Args, Debug)]
struct ReportCommand {
    #[command(subcommand)]
    command: ReportSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReportSubcommand {
    List {
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        oem_id: Option<String>,
    },
    Get {
        report_id: String,
    },
    Code {
        code: String,
    },
    Generate {
        #[arg(long)]
        company: String,
        #[arg(long)]
        oem_id: Option<String>,
        #[arg(long = "section")]
        sections: Vec<String>,
    },
    Analysis {
        /// stock, value_chain, esg or tech_search
        kind: AnalysisKind,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        oem_id: Option<String>,
    },
}

#[derive(Args, Debug)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
enum UserSubcommand {
    Me,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        birth_date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Err(e) = dotenv
        && !e.not_found()
    {
        tracing::warn!(error = %e, "failed to load .env");
    }

    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.base_url.as_deref(), cli.token_file)?;

    match cli.command {
        Command::Login { email, password } => run_login(&config, &email, &password).await,
        Command::Register { email, name, password, phone, birth_date } => {
            let registration =
                Registration { email, name, password, phone_number: phone, birth_date, role: None };
            run_register(&config, &registration).await
        }
        Command::Logout => {
            open_store(&config)?.logout();
            print_json(&json!({ "logged_out": true }))
        }
        Command::Whoami => run_whoami(&config).await,
        Command::Routes => run_routes(),
        Command::Navigate { path } => run_navigate(&config, &path),
        Command::Company(company) => {
            let store = open_store(&config)?;
            run_company(&store, company).await
        }
        Command::News(news) => {
            let store = open_store(&config)?;
            run_news(&store, news).await
        }
        Command::Report(report) => {
            let store = open_store(&config)?;
            run_report(&store, report).await
        }
        Command::User(user) => {
            let store = open_store(&config)?;
            run_user(&store, user).await
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(base_url: Option<&str>, token_file: Option<PathBuf>) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(token_file) = token_file {
        config.token_file = token_file;
    }
    Ok(config)
}

fn open_store(config: &ClientConfig) -> Result<Arc<SessionStore>, CliError> {
    Ok(SessionStore::open(config, FileTokenStorage::new(&config.token_file))?)
}

fn start_store(config: &ClientConfig) -> Result<(Arc<SessionStore>, StartupRefresh), CliError> {
    Ok(SessionStore::start(config, FileTokenStorage::new(&config.token_file))?)
}

// =============================================================================
// SESSION COMMANDS
// =============================================================================

async fn run_login(config: &ClientConfig, email: &str, password: &str) -> Result<(), CliError> {
    let store = open_store(config)?;
    let token = store.login(email, password).await?;
    print_json(&json!({ "token_type": token.token_type, "user": store.user() }))
}

async fn run_register(config: &ClientConfig, registration: &Registration) -> Result<(), CliError> {
    let store = open_store(config)?;
    let created = store.register(registration).await?;
    print_json(&created)
}

async fn run_whoami(config: &ClientConfig) -> Result<(), CliError> {
    let (_store, refresh) = start_store(config)?;
    match refresh.wait().await {
        RefreshOutcome::Loaded(user) => print_json(&user),
        RefreshOutcome::NoToken => Err(CliError::NotLoggedIn),
        RefreshOutcome::LoggedOut(e) | RefreshOutcome::Kept(e) => Err(e.into()),
        RefreshOutcome::Superseded | RefreshOutcome::Aborted => Err(CliError::RefreshIncomplete),
    }
}

fn run_routes() -> Result<(), CliError> {
    let routes: Vec<_> = RouteTable::standard()
        .routes()
        .iter()
        .map(|route| {
            json!({
                "path": route.path,
                "name": route.name,
                "view": format!("{:?}", route.view),
                "requires_auth": route.requires_auth,
            })
        })
        .collect();
    print_json(&routes)
}

fn run_navigate(config: &ClientConfig, path: &str) -> Result<(), CliError> {
    let (store, refresh) = start_store(config)?;
    let mut navigator = Navigator::new(RouteTable::standard(), store.subscribe());
    // Decided from the restored token alone; the profile refresh is not awaited.
    let result = navigator.start(path);
    refresh.cancel();
    let navigation = result?;

    let (requested, location) = match &navigation {
        Navigation::Arrived(location) => (location.path.clone(), location),
        Navigation::Redirected { requested, location } => (requested.clone(), location),
    };
    print_json(&json!({
        "requested": requested,
        "redirected": navigation.was_redirected(),
        "location": location_json(location),
    }))
}

fn location_json(location: &Location) -> serde_json::Value {
    json!({
        "path": location.path,
        "name": location.name,
        "view": format!("{:?}", location.view),
        "params": location.params,
    })
}

// =============================================================================
// API COMMANDS
// =============================================================================

async fn run_company(store: &SessionStore, company: CompanyCommand) -> Result<(), CliError> {
    let companies = store.http().companies();
    match company.command {
        CompanySubcommand::List { skip, limit, country } => {
            print_json(&companies.list(&CompanyQuery { skip, limit, country }).await?)
        }
        CompanySubcommand::Get { oem_id } => print_json(&companies.get(&oem_id).await?),
        CompanySubcommand::Favorite { oem_id } => print_json(&companies.toggle_favorite(&oem_id).await?),
        CompanySubcommand::Favorites => print_json(&companies.favorites().await?),
        CompanySubcommand::Financials => print_json(&companies.financial_summary().await?),
    }
}

async fn run_news(store: &SessionStore, news: NewsCommand) -> Result<(), CliError> {
    let service = store.http().news();
    match news.command {
        NewsSubcommand::List { skip, limit, oem_id, category } => {
            print_json(&service.list(&NewsQuery { skip, limit, oem_id, category }).await?)
        }
        NewsSubcommand::Get { news_id } => print_json(&service.get(&news_id).await?),
        NewsSubcommand::Latest { oem_id, limit } => print_json(&service.latest_for_company(&oem_id, limit).await?),
    }
}

async fn run_report(store: &SessionStore, report: ReportCommand) -> Result<(), CliError> {
    let reports = store.http().reports();
    match report.command {
        ReportSubcommand::List { skip, limit, oem_id } => {
            print_json(&reports.list(&ReportQuery { skip, limit, oem_id }).await?)
        }
        ReportSubcommand::Get { report_id } => print_json(&reports.get(&report_id).await?),
        ReportSubcommand::Code { code } => print_json(&reports.by_code(&code).await?),
        ReportSubcommand::Generate { company, oem_id, sections } => {
            let request = ReportGenerateRequest {
                company_name: company,
                oem_id,
                include_sections: if sections.is_empty() { None } else { Some(sections) },
            };
            print_json(&reports.generate(&request).await?)
        }
        ReportSubcommand::Analysis { kind, company, oem_id } => {
            let request = AnalysisRequest { company_name: company, oem_id, analysis_type: kind };
            print_json(&reports.run_analysis(&request).await?)
        }
    }
}

async fn run_user(store: &SessionStore, user: UserCommand) -> Result<(), CliError> {
    let users = store.http().users();
    match user.command {
        UserSubcommand::Me => print_json(&users.me().await?),
        UserSubcommand::Update { name, phone, birth_date } => {
            print_json(&users.update(&UserUpdate { name, phone_number: phone, birth_date }).await?)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
