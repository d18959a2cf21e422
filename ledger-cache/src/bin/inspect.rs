//! Ledger inspection console
//!
//! Small operations console over the local ledger cache: view the latest
//! entries, aggregate statistics, search, export to CSV, clear the local
//! history. Hydrates remote-preferred with silent local fallback, exactly
//! like the dashboard does.

use anyhow::Context;
use ledger_cache::{
    Config, FeatureSchema, HttpRemoteLedger, LedgerEntry, LedgerMetrics, LedgerService,
    QueryParams, SnapshotStore, TracingNotifier, DEFAULT_IDENTITY,
};
use std::sync::Arc;

const USAGE: &str = "\
Usage: ledger-inspect <command>

Commands:
  latest [n]      Show the n most recent entries (default 10)
  stats           Show aggregate statistics
  search <term>   Search by amount or prediction label
  export <path>   Write the snapshot as CSV to <path>
  clear           Delete the local history (remote ledger unaffected)

Environment:
  LEDGER_DATA_DIR, LEDGER_REMOTE_URL, LEDGER_REMOTE_TIMEOUT_SECS, LEDGER_CAPACITY";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match args.first() {
        Some(command) => command.as_str(),
        None => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    // Load configuration
    let config = Config::from_env()?;
    let service = build_service(&config)?;

    service.hydrate(DEFAULT_IDENTITY).await?;

    match command {
        "latest" => {
            let count = args
                .get(1)
                .map(|raw| raw.parse())
                .transpose()
                .context("Entry count must be a number")?
                .unwrap_or(10);
            cmd_latest(&service, count)?;
        }
        "stats" => cmd_stats(&service)?,
        "search" => {
            let term = args.get(1).context("Usage: ledger-inspect search <term>")?;
            cmd_search(&service, term)?;
        }
        "export" => {
            let path = args.get(1).context("Usage: ledger-inspect export <path>")?;
            cmd_export(&service, path)?;
        }
        "clear" => {
            service.clear()?;
            println!("Local transaction history cleared");
        }
        other => {
            eprintln!("Unknown command '{}'\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}

fn build_service(config: &Config) -> anyhow::Result<LedgerService> {
    let schema = Arc::new(FeatureSchema::builtin());
    let store = SnapshotStore::open(config)?;
    let remote = Arc::new(HttpRemoteLedger::new(config.remote.clone(), schema.clone())?);
    let notifier = Arc::new(TracingNotifier);
    let metrics = LedgerMetrics::new(&prometheus::Registry::new())?;

    let service = LedgerService::new(store, remote, notifier, schema, metrics, config)?;
    Ok(service)
}

fn cmd_latest(service: &LedgerService, count: usize) -> anyhow::Result<()> {
    let snapshot = service.snapshot()?;
    if snapshot.is_empty() {
        println!("Ledger is empty");
        return Ok(());
    }

    for entry in snapshot.iter().take(count) {
        println!("{}", format_entry(entry));
    }

    Ok(())
}

fn cmd_stats(service: &LedgerService) -> anyhow::Result<()> {
    let stats = service.stats()?;

    println!("Entries:        {}", stats.total);
    println!("Fraudulent:     {}", stats.frauds);
    println!("Legitimate:     {}", stats.legitimate);
    println!("Accuracy proxy: {:.1}%", stats.accuracy_proxy);

    Ok(())
}

fn cmd_search(service: &LedgerService, term: &str) -> anyhow::Result<()> {
    let page = service.query(&QueryParams::default().with_search(term))?;

    for entry in &page.items {
        println!("{}", format_entry(entry));
    }
    println!(
        "{} match(es), showing page {} of {}",
        page.total_matches,
        page.page,
        page.total_pages.max(1)
    );

    Ok(())
}

fn cmd_export(service: &LedgerService, path: &str) -> anyhow::Result<()> {
    let csv = service.export_csv()?;
    let rows = csv.lines().count().saturating_sub(1);

    std::fs::write(path, &csv).with_context(|| format!("Failed to write {}", path))?;
    println!("Exported {} entries to {}", rows, path);

    Ok(())
}

fn format_entry(entry: &LedgerEntry) -> String {
    let verdict = match &entry.verdict {
        Some(verdict) => format!("{} (p={:.2})", verdict.prediction, verdict.probability),
        None => "unscored".to_string(),
    };

    format!(
        "{}  {:>12}  {:<22}  {} -> {}  {}",
        entry.created_at.format("%Y-%m-%d %H:%M:%S"),
        entry.amount,
        verdict,
        entry.account_from,
        entry.account_to,
        entry.id
    )
}
