use clap::{Parser, Subcommand};

/// rate-proxy — serves the payment page rate from the backend API
#[derive(Parser)]
#[command(name = "rate-proxy", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Serve {
        /// Port to bind (defaults to RATE_PROXY_PORT, then 3001)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve the payment rate once and print the JSON payload
    Check {
        /// Backend base URL; overrides RATE_PROXY_API_URL
        #[arg(long)]
        base: Option<String>,
    },
}
