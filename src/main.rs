use std::fs::File;

use clap::Parser;
use tracing::warn;

use wallet_ledger::engine::AdmissionEngine;
use wallet_ledger::output;
use wallet_ledger::parsing;
use wallet_ledger::rates::RateTable;
use wallet_ledger::store::InMemoryLedger;

/// Replays a CSV of transaction submissions through the admission engine and
/// prints one receipt per admitted transaction.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();
    if let Some(log_level) = args.log_level {
        tracing_subscriber::fmt().with_max_level(log_level).init();
    }

    let file = File::open(&args.input_file)?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let engine = AdmissionEngine::new(InMemoryLedger::new(), RateTable::default());

    let mut receipts = Vec::new();
    for request in parsing::deserialize_csv(&mut rdr) {
        match engine.admit(request).await {
            Ok(receipt) => receipts.push(receipt),
            Err(error) => warn!("Admission rejected: {error}"),
        }
    }

    output::print_receipts(&receipts, std::io::stdout())
}

#[derive(Parser)]
struct Arguments {
    input_file: String,
    log_level: Option<tracing::Level>,
}
