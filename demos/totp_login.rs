//! TOTP login demonstration.
//!
//! Demonstrates:
//! - Resolving form elements that appear late
//! - Submitting a token with synthetic key events
//! - Retrying once with a fresh token when the first submit does not navigate
//!
//! Usage:
//!   cargo run --example totp_login
//!   cargo run --example totp_login -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use form_pilot::{
    By, LookupSet, MemoryPage, ResolutionConfig, Resolver, SubmissionContext, SubmissionTimings,
    TotpSubmitter,
};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const LOGIN_URL: &str = "https://mail.example.com/login";
const INBOX_URL: &str = "https://mail.example.com/inbox";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|a| a == "--debug");
    init_logging(debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    println!("=== TOTP Login ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    println!("[Setup] Creating page at {LOGIN_URL}...");
    let page = MemoryPage::new(LOGIN_URL);
    page.insert(By::name("totp"));

    // The submit button is rendered late, and the first click is ignored.
    let late = page.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(700)).await;
        let button = late.insert(By::css("button[type='submit']"));
        let handler = button.on_click(Arc::new(|page: &MemoryPage, clicks: u32| {
            if clicks >= 2 {
                page.set_location(INBOX_URL);
            }
        }));
        if let Err(e) = handler {
            eprintln!("[ERROR] {e}");
        }
    });
    println!("        ✓ Input attached, button scheduled\n");

    // ========================================================================
    // Resolve
    // ========================================================================

    println!("[1] Resolving form elements...");
    let mut lookups = LookupSet::new();
    lookups
        .query("input", &page, By::name("totp"))?
        .query("button", &page, By::css("button[type='submit']"))?;

    let config = ResolutionConfig::new()
        .with_timeout_ms(5_000)
        .with_delay_min_ms(100);
    let elements = Resolver::with_config(config).resolve(lookups).await?;
    println!("    ✓ Resolved {} elements\n", elements.len());

    // ========================================================================
    // Submit
    // ========================================================================

    println!("[2] Submitting token...");
    let counter = AtomicU32::new(0);
    let token = || -> form_pilot::Result<String> {
        Ok(format!("{:06}", 483_920 + counter.fetch_add(1, Ordering::SeqCst)))
    };

    let timings = SubmissionTimings::new()
        .with_settle_delay_ms(1_000)
        .with_retry_delay_ms(500);
    TotpSubmitter::new(&page)
        .with_timings(timings)
        .submit(SubmissionContext::new(
            &elements["input"],
            &elements["button"],
            &token,
        ))
        .await?;

    println!("    ✓ Navigated to {}", page.location());
    println!("    Tokens typed: '{}'", elements["input"].typed_text());
    println!("    Clicks: {}\n", elements["button"].clicks());

    println!("=== Done ===");
    Ok(())
}

// ============================================================================
// Functions
// ============================================================================

fn init_logging(debug: bool) {
    let filter = if debug {
        "form_pilot=debug"
    } else {
        "form_pilot=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
