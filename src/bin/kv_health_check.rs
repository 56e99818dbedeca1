//! Poll deployed health endpoints and exit non-zero when any check fails.

use clap::Parser;
use std::process::ExitCode;

use arkaios_gateway::{endpoints_for_base, fetch_check};

#[derive(Parser, Debug)]
#[command(name = "kv-health-check", about = "Check Arkaios storage health endpoints")]
struct Args {
    /// Full URL of a health endpoint. May be repeated.
    #[arg(long = "url")]
    urls: Vec<String>,

    /// Deployment base URL; checks `/kv-health` and `/autopilot-flag?health=kv`.
    #[arg(long, env = "KV_HEALTH_BASE")]
    base: Option<String>,

    /// Roundtrip ceiling in milliseconds. Exceeding it warns, or fails with `--strict`.
    #[arg(long, default_value_t = 1000)]
    threshold: u64,

    /// Treat a slow roundtrip as a failure.
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut urls = args.urls;
    if let Some(base) = &args.base {
        urls.extend(endpoints_for_base(base));
    }
    if urls.is_empty() {
        anyhow::bail!("nothing to check: pass --url or --base");
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let mut failed = 0usize;
    for url in &urls {
        let result = fetch_check(&client, url, args.threshold, args.strict).await;
        println!("{}", result.summary());
        if !result.passed() {
            failed += 1;
        }
    }

    println!(
        "checked={} success={} failures={} threshold={}ms strict={}",
        urls.len(),
        urls.len() - failed,
        failed,
        args.threshold,
        args.strict
    );
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
