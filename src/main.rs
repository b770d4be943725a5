//! main.rs - Entry point for the KuCoin triangular arbitrage scanner
//!
//! Downloads trade precision once, then runs detection passes on a fixed
//! interval (or a single one with `TRIARB_RUN_ONCE=1`) and prints every
//! confirmed opportunity.

use kucoin_triarb::{ArbitrageDetector, Config, KucoinFeed, MarketFeed, ScanReport, NAME, VERSION};
use log::{debug, error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║     🔺 KuCoin Triangular Arbitrage Scanner v{}        ║", VERSION);
    println!("║     Detection only, no orders are placed                 ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    info!("Starting {} v{}", NAME, VERSION);

    let config = Config::from_env()?;
    info!("  - Symbols: {}", config.symbols_url);
    info!("  - Order books: {}", config.order_book_url);
    info!("  - Request timeout: {}s", config.request_timeout.as_secs());
    debug!("Trade fee {} is not applied to detection", config.trade_fee);

    let feed: Arc<dyn MarketFeed> = Arc::new(KucoinFeed::new(config.clone())?);
    let detector = ArbitrageDetector::connect(feed, &config).await?;
    info!("✓ Detector ready");

    if config.run_once {
        let report = detector.run().await?;
        print_report(&report);
        return Ok(());
    }

    info!("🔄 Starting scan loop (interval: {}s)...", config.scan_interval.as_secs());
    let mut interval = tokio::time::interval(config.scan_interval);
    let mut scan_count: u64 = 0;

    loop {
        interval.tick().await;
        scan_count += 1;

        info!("📡 Scan #{}", scan_count);
        match detector.run().await {
            Ok(report) => print_report(&report),
            Err(e) => error!("✗ Scan #{} failed: {}", scan_count, e),
        }
    }
}

fn print_report(report: &ScanReport) {
    for opportunity in &report.opportunities {
        println!(
            "Arbitrage: {} [{} / {} / {}]",
            opportunity.route, opportunity.market1, opportunity.market2, opportunity.market3
        );
        println!("  {}", opportunity);
    }

    info!(
        "✓ Pass complete in {:.2}s: {} markets, {} candidates, {} rejected, {} confirmed",
        report.elapsed.as_secs_f64(),
        report.graph_markets,
        report.candidates,
        report.rejected,
        report.opportunities.len()
    );
}
