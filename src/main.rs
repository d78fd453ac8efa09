use anyhow::Result;
use clap::Parser;
use log::warn;
use proxy_check::{
    CheckerConfig, ProxyChecker, ProxyParser, DEFAULT_TEST_URL, DEFAULT_TIMEOUT_SECS,
};
use std::path::PathBuf;
use std::time::Duration;

/// Proxies checked when none are given
const EXAMPLE_PROXIES: [&str; 2] = ["http://10.10.1.10:3128", "socks5://127.0.0.1:9050"];

/// Check whether HTTP, HTTPS, SOCKS4 or SOCKS5 proxies are working
#[derive(Parser)]
#[command(name = "proxy-check")]
#[command(about = "Check whether HTTP, HTTPS, SOCKS4 or SOCKS5 proxies are working")]
struct Cli {
    /// Proxy URLs, e.g. http://10.10.1.10:3128 or socks5://127.0.0.1:9050
    proxies: Vec<String>,

    /// File containing proxies (one per line)
    #[arg(short = 'f', long)]
    input: Option<PathBuf>,

    /// Proxy type (http, https, socks4, socks5); detected from the URL if omitted
    #[arg(short = 't', long)]
    proxy_type: Option<String>,

    /// Timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// URL to test proxies against
    #[arg(long, default_value = DEFAULT_TEST_URL)]
    test_url: String,

    /// Print one JSON result per line
    #[arg(long)]
    json: bool,

    /// Request the test URL without a proxy before checking
    #[arg(long)]
    baseline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut proxies = cli.proxies.clone();
    if let Some(path) = &cli.input {
        let entries = ProxyParser::read_file(path)?;
        if !cli.json {
            println!("Loaded {} proxies from {:?}", entries.len(), path);
        }
        proxies.extend(entries);
    }
    if proxies.is_empty() {
        proxies = EXAMPLE_PROXIES.iter().map(|p| p.to_string()).collect();
    }

    let config = CheckerConfig::new()
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_test_url(cli.test_url.clone());
    let checker = ProxyChecker::with_config(config);

    if cli.baseline {
        match checker.check_direct().await {
            Ok(message) if !cli.json => println!("Baseline: {}\n", message),
            Ok(_) => {}
            Err(e) => warn!(
                "Test URL {} not reachable without a proxy: {}",
                cli.test_url, e
            ),
        }
    }

    for proxy in &proxies {
        let result = checker.check_proxy(proxy, cli.proxy_type.as_deref()).await;

        if cli.json {
            println!("{}", serde_json::to_string(&result)?);
        } else {
            println!("Proxy: {}", proxy);
            println!("Status: {}\n", result);
        }
    }

    Ok(())
}
