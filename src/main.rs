//! Create a curl config file to send commands to an Ezlo hub over HTTPS
//!
//! Logs on to the Ezlo cloud, looks up the hub's local credential by serial
//! and prints curl options on stdout:
//!
//! ```text
//! ezlo-curl-config 192.168.1.50 45006642 alice > ezlo.curl
//! curl -K ezlo.curl https://192.168.1.50:17000/v1/method/hub.info.get
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use ezlo_curl_config::{
    config::HUB_LOCAL_PORT,
    create_client,
    logging::{init_logging, LogConfig},
    login, CloudConfig, CurlConfig, EzloCredentials, EzloError,
};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Create a curl config file to send commands to an Ezlo hub using HTTPS
#[derive(Parser, Debug)]
#[command(name = "ezlo-curl-config")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Your Ezlo hub IP address
    ip: String,

    /// Your Ezlo hub serial
    serial: String,

    /// Your Ezlo account user id
    user: String,

    /// Your Ezlo account password (prompted for when not given)
    #[arg(env = "EZLO_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Show request and response details on stderr
    #[arg(short, long)]
    debug: bool,

    /// Config file with endpoint and timeout overrides
    #[arg(short, long, env = "EZLO_CONFIG")]
    config: Option<PathBuf>,

    /// Verify TLS certificates of the cloud endpoints
    #[arg(long)]
    verify_tls: bool,

    /// Per-request timeout (e.g. "30s", "1m")
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Write the curl config to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also emit separate `user` and `token` headers
    #[arg(long)]
    user_token_headers: bool,
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        let config = LogConfig::from_env();
        if self.debug {
            config.debug()
        } else {
            config
        }
    }

    fn cloud_config(&self) -> ezlo_curl_config::Result<CloudConfig> {
        let mut config = CloudConfig::load(self.config.as_deref())?;
        if self.verify_tls {
            config.verify_ssl = true;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        config.validate()?;
        Ok(config)
    }

    fn password(&self) -> anyhow::Result<String> {
        match &self.password {
            Some(password) => Ok(password.clone()),
            None => rpassword::prompt_password(format!("Password for {}: ", self.user))
                .context("Failed to read password"),
        }
    }
}

fn check_hub_address(ip: &str) -> anyhow::Result<()> {
    let ip = ip.trim();
    if ip.is_empty() {
        bail!("No hub IP address specified");
    }
    if ip.chars().any(char::is_whitespace) {
        bail!("Invalid hub IP address '{ip}'");
    }
    match ip.parse::<IpAddr>() {
        Ok(addr) => debug!("Hub address {addr}"),
        Err(_) => debug!("Hub address {ip} is not an IP literal, treating it as a host name"),
    }
    info!("Hub local API is expected at https://{ip}:{HUB_LOCAL_PORT}; the cloud login does not contact it");
    Ok(())
}

async fn run(cli: &Cli) -> anyhow::Result<CurlConfig> {
    check_hub_address(&cli.ip)?;
    if cli.serial.trim().is_empty() {
        bail!("No hub serial specified");
    }

    let config = cli.cloud_config()?;
    let credentials = EzloCredentials::new(cli.user.clone(), cli.password()?)?;
    let client = create_client(&config)?;

    let credential = login(&client, &credentials, &cli.serial).await?;
    info!("Resolved credential for hub {} (user {})", cli.serial, credential.user);

    let curl = CurlConfig::from_credential(&credential);
    Ok(if cli.user_token_headers {
        curl.with_user_token_headers(&credential)
    } else {
        curl
    })
}

fn print_failure(err: &anyhow::Error) {
    eprintln!("❌ Failed to login: {err:#}");
    match err.downcast_ref::<EzloError>() {
        Some(e) if e.is_transport_error() => {
            eprintln!("💡 Network problem: check connectivity to the Ezlo cloud or raise --timeout");
        }
        Some(e) if e.is_auth_error() => {
            eprintln!("💡 Check the user id and password");
        }
        Some(EzloError::SerialNotFound(_)) => {
            eprintln!("💡 The account has no hub with that serial; run with --debug to list the serials it has");
        }
        _ => {}
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_config()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(&cli).await {
        Ok(curl) => {
            if let Some(path) = &cli.output {
                if let Err(e) = curl.write_to(path) {
                    print_failure(&anyhow::Error::new(e));
                    std::process::exit(1);
                }
            } else {
                print!("{}", curl.render());
            }
        }
        Err(e) => {
            print_failure(&e);
            std::process::exit(1);
        }
    }
}
