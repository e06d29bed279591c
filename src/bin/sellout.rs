//! Sellout stress tool
//!
//! Many buyers race for the seats of one section. Every buyer runs on its own
//! thread and submits one `Issue` transaction, resubmitting when the ledger
//! rejects it for an MVCC conflict. At the end the section's sold count must
//! equal the number of issued tickets and never exceed its capacity.
//!
//! Run with: cargo run --bin sellout --release -- --buyers 200 --capacity 50

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::Context;
use uuid::Uuid;

use ticken_ledger::event::Event;
use ticken_ledger::ledger::TracingSink;
use ticken_ledger::ticket::Ticket;
use ticken_ledger::{build_ledger, ClientIdentity, Config, Ledger};

const SECTION: &str = "GA";
const MAX_ATTEMPTS: u32 = 100;

fn arg_value(args: &[String], flag: &str, default: u64) -> anyhow::Result<u64> {
    match args.iter().position(|a| a == flag) {
        Some(i) => args
            .get(i + 1)
            .with_context(|| format!("{} needs a value", flag))?
            .parse()
            .with_context(|| format!("{} must be a positive integer", flag)),
        None => Ok(default),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let buyers = arg_value(&args, "--buyers", 200)?;
    let capacity = arg_value(&args, "--capacity", 50)?;
    anyhow::ensure!(capacity > 0, "--capacity must be greater than 0");

    let config = Config::from_env()?;
    let ledger = Arc::new(build_ledger(&config, Arc::new(TracingSink)));
    let organizer = ClientIdentity::new("Org1MSP", "organizer");
    let event_id = Uuid::new_v4().to_string();

    println!(
        "Sellout - {} buyers for {} seats in section {}",
        buyers, capacity, SECTION
    );

    let event_module = config.event_module_name.as_str();
    ledger.submit(
        &organizer,
        event_module,
        "Create",
        &strings(&[&event_id, "Sellout", "2026-12-31T21:00:00Z"]),
    )?;
    ledger.submit(
        &organizer,
        event_module,
        "AddSection",
        &strings(&[&event_id, SECTION, &capacity.to_string(), "25.00"]),
    )?;
    ledger.submit(&organizer, event_module, "SetOnSale", &strings(&[&event_id]))?;

    let issued = AtomicU64::new(0);
    let refused = AtomicU64::new(0);
    let retries = AtomicU64::new(0);
    let start = Instant::now();

    thread::scope(|scope| {
        for _ in 0..buyers {
            scope.spawn(|| {
                buy(
                    &ledger,
                    &config.ticket_module_name,
                    &event_id,
                    &issued,
                    &refused,
                    &retries,
                )
            });
        }
    });

    let elapsed = start.elapsed();
    let issued = issued.load(Ordering::Relaxed);

    let event: Event = query(&ledger, &organizer, event_module, "GetEvent", &[&event_id])?;
    let section = event
        .section(SECTION)
        .context("section missing after sellout")?;
    let listed: Vec<Ticket> = query(
        &ledger,
        &organizer,
        &config.ticket_module_name,
        "GetSectionTickets",
        &[&event_id, SECTION],
    )?;

    println!("\n=== Sellout Results ===");
    println!("Issued: {}", issued);
    println!("Refused: {}", refused.load(Ordering::Relaxed));
    println!("MVCC retries: {}", retries.load(Ordering::Relaxed));
    println!("Sold (event): {}", section.sold_tickets());
    println!("Listed (index): {}", listed.len());
    println!("Blocks: {}", ledger.height()?);
    println!("Time: {:.2}s", elapsed.as_secs_f64());

    anyhow::ensure!(
        u64::from(section.sold_tickets()) == issued,
        "sold count {} differs from issued tickets {}",
        section.sold_tickets(),
        issued
    );
    anyhow::ensure!(issued <= capacity, "oversold: {} > {}", issued, capacity);
    anyhow::ensure!(
        listed.len() as u64 == issued,
        "section index lists {} tickets, {} issued",
        listed.len(),
        issued
    );
    println!("OK");

    Ok(())
}

fn buy(
    ledger: &Ledger,
    ticket_module: &str,
    event_id: &str,
    issued: &AtomicU64,
    refused: &AtomicU64,
    retries: &AtomicU64,
) {
    let buyer = ClientIdentity::new("Org1MSP", "box-office");
    let args = strings(&[
        &Uuid::new_v4().to_string(),
        event_id,
        SECTION,
        &Uuid::new_v4().to_string(),
    ]);

    for _ in 0..MAX_ATTEMPTS {
        match ledger.submit(&buyer, ticket_module, "Issue", &args) {
            Ok(_) => {
                issued.fetch_add(1, Ordering::Relaxed);
                return;
            }
            Err(err) if err.is_conflict() => {
                retries.fetch_add(1, Ordering::Relaxed);
                thread::yield_now();
            }
            Err(_) => {
                refused.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
    }
    refused.fetch_add(1, Ordering::Relaxed);
}

fn query<T: serde::de::DeserializeOwned>(
    ledger: &Ledger,
    caller: &ClientIdentity,
    module: &str,
    function: &str,
    args: &[&str],
) -> anyhow::Result<T> {
    let response = ledger.evaluate(caller, module, function, &strings(args));
    anyhow::ensure!(
        response.is_success(),
        "{} failed with status {}: {}",
        function,
        response.status,
        response.message
    );
    Ok(serde_json::from_slice(&response.payload)?)
}
