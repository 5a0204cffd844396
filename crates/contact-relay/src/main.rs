//! Contact Relay - contact form intake service
//!
//! This is the main entry point for the Contact Relay server binary.

#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use contact_relay_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contact-relay")]
#[command(version, about = "Contact form intake service (HTTP endpoint + mail dispatch)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the intake endpoint (default)
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show the effective configuration
    Config,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if cli.verbose {
        tracing::info!("Configuration loaded: {:?}", config);
    }

    match cli.command {
        None | Some(Commands::Serve { host: None, port: None }) => {
            serve(&config);
        }
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.http_host = host;
            }
            if let Some(port) = port {
                config.http_port = port;
            }
            serve(&config);
        }
        Some(Commands::Config) => {
            print_config(&config);
        }
    }
}

fn serve(config: &Config) {
    tracing::info!(
        host = %config.http_host,
        port = config.http_port,
        path = %config.http_path,
        "starting Contact Relay"
    );
    if let Err(err) = contact_relay_server::run_http(config) {
        tracing::error!(error = %err, "server exited with error");
        std::process::exit(1);
    }
}

fn print_config(config: &Config) {
    println!("endpoint        http://{}:{}{}", config.http_host, config.http_port, config.http_path);
    println!("mail to         {} <{}>", config.mail_to_name, config.mail_to_address);
    println!("mail from       {} <{}>", config.mail_from_name, config.mail_from_address);
    println!("sendmail        {}", config.sendmail_command);
    println!(
        "rate limit      {} per {}s",
        config.rate_limit_max, config.rate_limit_window_secs
    );
    println!(
        "consent token   {}",
        if config.consent_token.is_some() { "configured" } else { "unset" }
    );
    println!("ledger dir      {}", config.ledger_dir.display());
    println!("audit log       {}", config.audit_log_path.display());
}
