//! cachesim - replay a request workload and print the hit count

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use evictkit::builder::CachePolicy;
use evictkit::sim::{Workload, simulate};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Replacement policy: lru, 2q or ideal
    #[arg(short, long, default_value = "2q")]
    policy: CachePolicy,

    /// Workload file (`capacity count key...`); reads stdin when omitted
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        },
    };

    let workload = Workload::parse(&text).context("malformed workload")?;
    info!(
        policy = %args.policy,
        capacity = workload.capacity,
        requests = workload.requests.len(),
        "replaying workload"
    );

    let report = simulate(args.policy, &workload)?;
    info!(
        misses = report.misses,
        loads = report.loads,
        hit_ratio = report.hit_ratio(),
        "replay finished"
    );
    println!("{report}");
    Ok(())
}
