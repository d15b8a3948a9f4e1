//! Frontier gunfight driver.
//!
//! Runs a single weapon engagement against an automated opponent over a
//! line-oriented stdin/stdout protocol:
//!
//! ```bash
//! cargo run -p frontier -- --name "Doc" --weapon "shotgun" --seed 7
//! ```
//!
//! Engine settings come from `FRONTIER_*` environment variables (a `.env`
//! file is honoured). Set `RUST_LOG=frontier_core=debug` to trace every roll.

mod headless;

use anyhow::Context;
use frontier_core::EngineConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let engine = EngineConfig::from_env().context("reading FRONTIER_* settings")?;
    tracing::debug!(?engine, "engine configuration");

    let config = headless::parse_config_from_args(&args);
    headless::run_headless(config, engine).await
}

fn print_help() {
    println!("Frontier - Western gunfight engine");
    println!();
    println!("Usage: frontier [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --name <NAME>               Your gunfighter's name");
    println!("  --weapon <WEAPON>           Your weapon (matched against the catalog)");
    println!("  --opponent <NAME>           The opponent's name");
    println!("  --opponent-weapon <WEAPON>  The opponent's weapon");
    println!("  --seed <N>                  Fixed dice seed");
    println!("  -h, --help                  Show this help");
    println!();
    println!("Environment:");
    println!("  FRONTIER_DEBUG_MODE         Force the player's fire roll to 1");
    println!("  FRONTIER_DEFAULT_RANGE      Starting range in yards (default 15)");
    println!("  FRONTIER_OPPONENT_DELAY_MS  Pause before the opponent acts");
    println!("  FRONTIER_FIRE_PERCENT       Opponent fire share (0-100) or 'always'");
    println!("  RUST_LOG                    Log filter (default 'warn')");
}
