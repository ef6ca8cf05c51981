// src/main.rs
use clap::{Parser, Subcommand};
use env_logger::Builder;
use fundfolio::api::FIRST_PAGE;
use fundfolio::forms::{AddHoldingForm, CredentialsForm};
use fundfolio::notify::{Level, NotificationCenter};
use fundfolio::storage::FileStorage;
use fundfolio::views::{filter_schemes, Pager, DEFAULT_FUND_HOUSE, FUND_HOUSES};
use fundfolio::{Api, ApiError, Config, Gateway, SessionStore};
use log::{error, LevelFilter};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "fundfolio", version, about = "Personal mutual fund portfolio tracker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account
    Register { email: String, password: String },
    /// Log in and remember the session
    Login { email: String, password: String },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List the known fund houses
    Houses,
    /// Browse schemes of a fund house
    Funds {
        #[arg(long, default_value = DEFAULT_FUND_HOUSE)]
        house: String,
        #[arg(long, default_value_t = FIRST_PAGE)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show every holding
    Portfolio,
    /// Show the portfolio summary
    Dashboard,
    /// Add a holding
    Add { fund_name: String, units: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    Builder::new()
        .filter_level(LevelFilter::Warn)
        .format_timestamp_secs()
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let center = Arc::new(NotificationCenter::new());
    let api = Api::new(Gateway::from_config(&config), center.clone());
    let storage = Arc::new(FileStorage::new(config.session_file.clone()));
    let store = Arc::new(SessionStore::new(api, storage));

    let restored = store.restore_in_background().await;
    if let Err(e) = restored {
        error!("Session restore task failed: {}", e);
    }

    let outcome = run(&store, args.command).await;
    print_notifications(&center);

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

/// Request failures were already shown by the api layer; validation
/// failures are shown here, once.
async fn run(store: &SessionStore, command: Command) -> Result<(), ApiError> {
    let result = dispatch(store, command).await;
    if let Err(e @ ApiError::ValidationFailed(_)) = &result {
        store.api().notifier().error(e.message());
    }
    result
}

async fn dispatch(store: &SessionStore, command: Command) -> Result<(), ApiError> {
    match command {
        Command::Register { email, password } => {
            let credentials = CredentialsForm::new(email, password).validate()?;
            store.register(&credentials).await?;
        }
        Command::Login { email, password } => {
            let credentials = CredentialsForm::new(email, password).validate()?;
            store.login(&credentials).await?;
        }
        Command::Logout => store.logout(),
        Command::Whoami => match store.user() {
            Some(user) => println!("{} (id {})", user.email, user.id),
            None => println!("Not logged in"),
        },
        Command::Houses => {
            for house in FUND_HOUSES {
                println!("{}", house);
            }
        }
        Command::Funds {
            house,
            page,
            search,
        } => {
            store.require_session()?;
            let pager = Pager::at(page);
            let schemes = store
                .api()
                .funds()
                .get_schemes(&house, Some(pager.page()))
                .await?;
            let shown = filter_schemes(&schemes, search.as_deref().unwrap_or(""));
            if shown.is_empty() {
                println!("No funds found");
            }
            for scheme in shown {
                println!(
                    "{:<60} {:<14} NAV ₹{:.2}",
                    scheme.scheme_name, scheme.fund_house, scheme.nav
                );
            }
            if !schemes.is_empty() {
                println!(
                    "page {} (previous: {}, next: {})",
                    pager.page(),
                    pager.previous().page(),
                    pager.next().page()
                );
            }
        }
        Command::Portfolio => {
            let session = store.require_session()?;
            let snapshot = store.api().portfolio().get_portfolio(&session.token).await?;
            if snapshot.items.is_empty() {
                println!("No funds in your portfolio");
            }
            for item in &snapshot.items {
                println!(
                    "{:<60} {:>12.4} units  ₹{}  NAV ₹{}",
                    item.fund_name,
                    item.units,
                    item.current_value
                        .map(|v| format!("{:.2}", v))
                        .unwrap_or_else(|| "N/A".to_string()),
                    item.nav
                        .map(|v| format!("{:.2}", v))
                        .unwrap_or_else(|| "N/A".to_string()),
                );
            }
            if !snapshot.items.is_empty() {
                println!(
                    "Total portfolio value across {} funds: ₹{:.2}",
                    snapshot.items.len(),
                    snapshot.holdings_value()
                );
            }
        }
        Command::Dashboard => {
            let session = store.require_session()?;
            let summary = store
                .api()
                .portfolio()
                .get_portfolio(&session.token)
                .await?
                .summary();
            println!("Total Portfolio Value: ₹{:.2}", summary.total_value);
            println!("Funds: {}", summary.fund_count);
            println!(
                "Top Performer: {}",
                summary.top_performer.as_deref().unwrap_or("N/A")
            );
        }
        Command::Add { fund_name, units } => {
            let holding = AddHoldingForm::new(fund_name, units).validate()?;
            let session = store.require_session()?;
            store
                .api()
                .portfolio()
                .add_holding(&session.token, &holding)
                .await?;
            store.api().notifier().success("Fund added to portfolio");
        }
    }
    Ok(())
}

fn print_notifications(center: &NotificationCenter) {
    for notification in center.drain() {
        match notification.level {
            Level::Error => eprintln!("[{}] {}", notification.level, notification.message),
            _ => println!("[{}] {}", notification.level, notification.message),
        }
    }
}
