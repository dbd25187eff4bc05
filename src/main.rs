use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use proxygrab::proxy::{
    GimmeProxyClient, ParamValue, Params, RotatingProxyClient, TransportConfig,
};
use proxygrab::Error;
use serde::Serialize;
use std::fmt::Display;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Fetch proxies from the GimmeProxy and ProxyRotator APIs
#[derive(Parser)]
#[command(name = "proxygrab")]
#[command(about = "Fetch proxies from the GimmeProxy and ProxyRotator APIs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Route API requests through this proxy (http, https or socks5 URL)
    #[arg(long, global = true)]
    upstream: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch proxies from gimmeproxy.com
    Gimme {
        /// GimmeProxy API key (optional)
        #[arg(long, env = "GIMMEPROXY_API_KEY")]
        api_key: Option<String>,
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Fetch proxies from the ProxyRotator Rotating Proxy API
    Rotator {
        /// Rotating Proxy API key
        #[arg(long, env = "ROTATING_PROXY_API_KEY")]
        api_key: String,
        #[command(flatten)]
        fetch: FetchArgs,
    },
}

#[derive(Args)]
struct FetchArgs {
    /// Filter as key=value, can be repeated (e.g. -f get=true -f country=US)
    #[arg(short, long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, ParamValue)>,

    /// Number of proxies to fetch
    #[arg(short = 'n', long, default_value = "1")]
    count: usize,

    /// Print one JSON object per proxy
    #[arg(long)]
    json: bool,
}

impl FetchArgs {
    fn filter_params(&self) -> Params {
        self.filters.iter().cloned().collect()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = TransportConfig::new();
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(upstream) = cli.upstream {
        config = config.with_upstream_proxy(upstream);
    }

    match cli.command {
        Commands::Gimme { api_key, fetch } => {
            let mut client = GimmeProxyClient::with_config(api_key, config)?;
            client.set_filter(fetch.filter_params(), Params::new());

            for _ in 0..fetch.count {
                match client.get_proxy() {
                    Ok(record) => print_record(&record, fetch.json)?,
                    Err(e) => eprintln!("Error fetching proxy: {}", e),
                }
            }
        }
        Commands::Rotator { api_key, fetch } => {
            let mut client = RotatingProxyClient::with_config(api_key, config)?;
            client.set_filter(fetch.filter_params(), Params::new());

            for _ in 0..fetch.count {
                match client.get_proxy(None) {
                    Ok(Some(record)) => print_record(&record, fetch.json)?,
                    Ok(None) => eprintln!("No response from the Rotating Proxy API"),
                    Err(Error::QuotaOrQuery(message)) => {
                        eprintln!("Request rejected: {}", message);
                        break;
                    }
                    Err(e) => eprintln!("Error fetching proxy: {}", e),
                }
                if !fetch.json {
                    if let Some(remaining) = client.remaining_requests() {
                        println!("Remaining requests: {}", remaining);
                    }
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "proxygrab=debug"
    } else {
        "proxygrab=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Print a record either as JSON or as one `field: value` line per field
fn print_record<R: Serialize + Display>(record: &R, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(record)?);
        return Ok(());
    }

    println!("{}", record);
    if let serde_json::Value::Object(fields) = serde_json::to_value(record)? {
        for (name, value) in fields {
            match value {
                serde_json::Value::String(s) => println!("  {}: {}", name, s),
                other => println!("  {}: {}", name, other),
            }
        }
    }
    println!("-----------------------");
    Ok(())
}

fn parse_filter(s: &str) -> std::result::Result<(String, ParamValue), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid filter `{}`: expected key=value", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid filter `{}`: empty key", s));
    }
    let value = match value.parse::<ParamValue>() {
        Ok(value) => value,
        Err(never) => match never {},
    };
    Ok((key.to_string(), value))
}
