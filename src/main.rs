use anyhow::Result;
use std::env;
use std::path::Path;

use debt_ledger::{balances, migrate_legacy, summarize, telemetry, LedgerStore, Roster};

fn main() -> Result<()> {
    telemetry::init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None => run_summary()?,
        Some("init") => run_init(&args[2..])?,
        Some("migrate") => run_migrate(&args[2..])?,
        Some("help") | Some("--help") | Some("-h") => print_usage(),
        Some(other) => {
            eprintln!("❌ Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  debt-ledger                                Show balances and the current summary");
    eprintln!("  debt-ledger init <name> <name> [name...]   Create the party roster");
    eprintln!("  debt-ledger migrate <old.csv> <new.csv>    Convert a legacy 4-field ledger");
}

fn roster_path() -> String {
    env::var("DEBT_ROSTER_FILE").unwrap_or_else(|_| "roster.csv".to_string())
}

fn ledger_path() -> String {
    env::var("DEBT_LEDGER_FILE").unwrap_or_else(|_| "debt.csv".to_string())
}

fn run_summary() -> Result<()> {
    println!("💰 Debt Ledger v{}", debt_ledger::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let roster_file = roster_path();
    let ledger_file = ledger_path();

    if !Path::new(&roster_file).exists() {
        eprintln!("❌ Roster not found at {}", roster_file);
        eprintln!("   Run: debt-ledger init <name> <name>");
        eprintln!("   to set up the parties first.");
        std::process::exit(1);
    }

    let roster = Roster::load(Path::new(&roster_file))?;
    let store = LedgerStore::open(&ledger_file, roster)?;

    let names: Vec<&str> = store.roster().parties().iter().map(|p| p.name.as_str()).collect();
    println!("✓ Roster: {}", names.join(", "));
    println!("✓ Loaded {} entries from {}", store.entries().len(), ledger_file);

    let net = balances(store.roster(), store.entries());
    println!("\n📊 Balances:");
    for (party, amount) in store.roster().parties().iter().zip(&net) {
        println!("   {:<16} {:>12}", party.name, amount.to_string());
    }

    if !store.entries().is_empty() {
        println!("\n🧾 Recent entries:");
        for entry in store.entries().iter().rev().take(3).rev() {
            println!(
                "   {}  {} → {}  {}  {}",
                entry.created_at.format("%Y-%m-%d"),
                store.roster().name(entry.debtor),
                store.roster().name(entry.creditor),
                entry.amount,
                entry.note
            );
        }
    }

    let summary = summarize(store.roster(), store.entries());
    println!(
        "\n💸 {} owes {} {}",
        store.roster().name(summary.debtor),
        store.roster().name(summary.creditor),
        summary.amount
    );

    Ok(())
}

fn run_init(names: &[String]) -> Result<()> {
    println!("💰 Debt Ledger - Roster Setup");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if names.len() < 2 {
        eprintln!("❌ Need at least two names.");
        eprintln!("   Run: debt-ledger init <name> <name>");
        std::process::exit(1);
    }

    let roster_file = roster_path();
    if Path::new(&roster_file).exists() {
        eprintln!("❌ Roster already exists at {}", roster_file);
        eprintln!("   Remove it first if you really want to start over.");
        std::process::exit(1);
    }

    let roster = Roster::new(names.iter().map(String::as_str))?;
    roster.save(Path::new(&roster_file))?;

    println!("✓ Created {} with {} parties", roster_file, roster.len());
    println!("\n🚀 Next: record debts via the web UI (debt-server) or check");
    println!("   balances any time by running debt-ledger with no arguments.");

    Ok(())
}

fn run_migrate(args: &[String]) -> Result<()> {
    println!("💰 Debt Ledger - Legacy Migration");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let (old, new) = match args {
        [old, new] => (old, new),
        _ => {
            eprintln!("❌ Expected exactly two paths.");
            eprintln!("   Run: debt-ledger migrate <old.csv> <new.csv>");
            std::process::exit(1);
        }
    };

    println!("\n📂 Reading legacy ledger {}...", old);
    let migrated = migrate_legacy(Path::new(old), Path::new(new))?;
    println!("✓ Migrated {} rows to {}", migrated, new);
    println!("\n🔍 Verify with: DEBT_LEDGER_FILE={} debt-ledger", new);

    Ok(())
}
