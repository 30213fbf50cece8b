use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hrp_core::config::Settings;
use hrp_core::domain::portfolio::ViewModel;
use hrp_core::enrich::polygon::PolygonBrandingClient;
use hrp_core::enrich::{DisabledEnrichment, EnrichmentClient};
use hrp_core::form::SymbolList;
use hrp_core::optimize::hrp::HrpBackendClient;
use hrp_core::orchestrator::{SubmissionOrchestrator, SubmitError, MIN_FILLED_SYMBOLS};
use hrp_core::suggest::keyword::KeywordLookupClient;
use hrp_core::suggest::SymbolSuggester;

#[derive(Debug, Parser)]
#[command(name = "hrp_cli")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Optimize up to ten symbols and print the weight table.
    Run {
        /// Ticker symbols, filled into the form slots in order.
        #[arg(required = true, num_args = 1..=10)]
        symbols: Vec<String>,

        /// Validate the input without calling any service.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print ticker candidates for a partial query.
    Suggest { query: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Run { symbols, dry_run } => run(&settings, symbols, dry_run).await,
        Command::Suggest { query } => suggest(&settings, &query).await,
    }
}

async fn run(settings: &Settings, symbols: Vec<String>, dry_run: bool) -> anyhow::Result<()> {
    let list = SymbolList::from_symbols(symbols)?;

    if dry_run {
        let filled = list.non_empty_trimmed();
        tracing::info!(
            filled = filled.len(),
            accepted = filled.len() >= MIN_FILLED_SYMBOLS,
            dry_run = true,
            "validated symbols"
        );
        return Ok(());
    }

    let optimizer = Arc::new(HrpBackendClient::from_settings(settings)?);
    let enricher: Arc<dyn EnrichmentClient> = match PolygonBrandingClient::from_settings(settings)
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "branding lookups disabled");
            Arc::new(DisabledEnrichment)
        }
    };

    let orchestrator = SubmissionOrchestrator::new(optimizer, enricher);
    for (index, text) in list.trimmed_all().into_iter().enumerate() {
        orchestrator.set_slot(index, text).await?;
    }

    match orchestrator.submit().await {
        Ok(view) => {
            print_table(&view);
            Ok(())
        }
        Err(SubmitError::Validation(err)) => anyhow::bail!("{err}"),
        Err(err) => {
            let err = anyhow::Error::new(err).context("portfolio optimization failed");
            sentry_anyhow::capture_anyhow(&err);
            Err(err)
        }
    }
}

async fn suggest(settings: &Settings, query: &str) -> anyhow::Result<()> {
    let lookup = KeywordLookupClient::from_settings(settings)
        .context("failed to configure symbol lookup")?;
    let suggester = SymbolSuggester::new(Arc::new(lookup));

    for symbol in suggester.suggest(query).await.symbols {
        println!("{symbol}");
    }
    Ok(())
}

fn print_table(view: &ViewModel) {
    let width = view
        .rows
        .iter()
        .map(|r| r.ticker.len())
        .max()
        .unwrap_or(0)
        .max("TICKER".len());

    println!("{:<width$}  {:>7}  LOGO", "TICKER", "WEIGHT");
    for row in &view.rows {
        println!(
            "{:<width$}  {:>7}  {}",
            row.ticker,
            row.weight_percent(),
            row.logo_url.as_deref().unwrap_or("-")
        );
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
