mod config;
mod item_list;
mod logging;
mod signals;

use anyhow::{Context, Result};
use bank_testbed::{perform_search_scenario, run_search_scenario, wire_frontend_testbed};
use calculator::{Operation, Service};
use clap::{Parser, Subcommand};
use fixturekit::{FixtureError, FixtureRuntime};
use std::path::PathBuf;

use config::AppConfig;
use item_list::ItemList;

/// Testbed - calculator, item list and layered fixture demos
#[derive(Parser)]
#[command(name = "testbed")]
#[command(about = "Testbed - calculator, item list and layered fixture demos")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the calculator demo, or evaluate a single operation
    Calc {
        /// add, sub, mul or div (or + - * /)
        #[arg(requires_all = ["a", "b"])]
        op: Option<Operation>,
        #[arg(allow_negative_numbers = true)]
        a: Option<i64>,
        #[arg(allow_negative_numbers = true)]
        b: Option<i64>,
    },
    /// Render the item list
    Items {
        /// Number of items to append before rendering
        #[arg(long, default_value_t = 0)]
        add: usize,
    },
    /// Acquire the frontend fixture tree and run the search scenario
    Scenario {
        /// Search query submitted on the search page
        #[arg(long, default_value = "test query")]
        query: String,
        /// Keep the fixtures active until Ctrl+C or SIGTERM
        #[arg(long)]
        hold: bool,
    },
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.verbose);
    logging::init(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Testbed starting");

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    let command = cli.command.unwrap_or(Commands::Calc {
        op: None,
        a: None,
        b: None,
    });
    match command {
        Commands::Calc { op, a, b } => run_calc(op, a, b),
        Commands::Items { add } => {
            run_items(add);
            Ok(())
        }
        Commands::Scenario { query, hold } => run_scenario(&config, &query, hold).await,
        Commands::Check => check_config(&config),
    }
}

fn run_calc(op: Option<Operation>, a: Option<i64>, b: Option<i64>) -> Result<()> {
    let calc = Service::new();

    if let (Some(op), Some(a), Some(b)) = (op, a, b) {
        let result = op.apply(&calc, a, b)?;
        println!("{a} {op} {b} = {result}");
        return Ok(());
    }

    println!("Using the calculator:");
    for (op, a, b) in [
        (Operation::Add, 5, 3),
        (Operation::Subtract, 10, 4),
        (Operation::Multiply, 6, 7),
        (Operation::Divide, 20, 5),
    ] {
        println!("{a} {op} {b} = {}", op.apply(&calc, a, b)?);
    }
    Ok(())
}

fn run_items(add: usize) {
    let mut list = ItemList::default();
    for _ in 0..add {
        list.add_item();
    }
    println!("{list}");
}

async fn run_scenario(config: &AppConfig, query: &str, hold: bool) -> Result<()> {
    let runtime = FixtureRuntime::new(config.runtime.clone());
    let frontend = wire_frontend_testbed(config).context("invalid fixture configuration")?;

    if !hold {
        let report = run_search_scenario(&runtime, frontend, query).await?;
        println!("{report}");
        return Ok(());
    }

    // Signals cancel the root token; the scope then releases the tree.
    // Handlers must be in place before the tree is announced as active.
    let signals = signals::ShutdownSignals::install()?;
    let cancel = runtime.cancellation_token().clone();
    tokio::spawn(async move {
        signals.recv().await;
        cancel.cancel();
    });

    let held = runtime
        .run_scoped(frontend, |frontend| async move {
            let report = perform_search_scenario(&frontend, query).await?;
            println!("{report}");
            println!("Fixtures active, press Ctrl+C to release");
            std::future::pending::<()>().await;
            Ok(())
        })
        .await;

    match held {
        Err(err)
            if matches!(
                err.downcast_ref::<FixtureError>(),
                Some(FixtureError::Cancelled { .. })
            ) =>
        {
            println!("Fixtures released");
            Ok(())
        }
        other => other,
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    wire_frontend_testbed(config).context("invalid fixture configuration")?;

    let known = [
        bank_testbed::FrontendContext::NAME,
        bank_testbed::BankApiContext::NAME,
        bank_testbed::DatabaseContext::NAME,
        bank_testbed::WebhookContext::NAME,
    ];
    for name in config.fixtures.keys() {
        if !known.contains(&name.as_str()) {
            tracing::warn!(fixture = %name, "Config section for unknown fixture is ignored");
        }
    }

    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}
