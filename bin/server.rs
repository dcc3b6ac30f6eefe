// Debt Ledger - Web Server
// Serves the summary page and the JSON API on one port

use anyhow::Result;
use std::env;
use std::path::Path;
use std::sync::{Arc, Mutex};

use debt_ledger::{telemetry, web, LedgerStore, Roster};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    println!("🌐 Debt Ledger v{} - Web Server", debt_ledger::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let roster_file = env::var("DEBT_ROSTER_FILE").unwrap_or_else(|_| "roster.csv".to_string());
    let ledger_file = env::var("DEBT_LEDGER_FILE").unwrap_or_else(|_| "debt.csv".to_string());
    let addr = env::var("DEBT_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    if !Path::new(&roster_file).exists() {
        eprintln!("❌ Roster not found at {}", roster_file);
        eprintln!("   Run: debt-ledger init <name> <name>");
        eprintln!("   to set up the parties first.");
        std::process::exit(1);
    }

    let roster = Roster::load(Path::new(&roster_file))?;
    let store = LedgerStore::open(&ledger_file, roster)?;
    println!("✓ Ledger ready: {} entries from {}", store.entries().len(), ledger_file);

    let app = web::build_app(Arc::new(Mutex::new(store)));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);

    println!("\n🚀 Server running on http://{}", addr);
    println!("   UI:  http://{}/", addr);
    println!("   API: http://{}/api/summary", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;

    Ok(())
}
