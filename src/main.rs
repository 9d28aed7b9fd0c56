/// Finauth - account authentication and verification service
///
/// A Rust implementation of a fintech account backend: progressive login
/// lockout, OTP-based channel verification, referral codes, and JWT
/// session issuance behind an HTTP API.

mod account;
mod api;
mod auth;
mod config;
mod context;
mod crypto;
mod db;
mod error;
mod metrics;
mod notify;
mod otp;
mod server;
mod validation;

use config::AppConfig;
use context::AppContext;
use error::AuthResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> AuthResult<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize logging
    init_logging(&config);

    // Print banner
    print_banner();

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("finauth={},tower_http=info", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn print_banner() {
    println!(
        r#"
   _____                         __  __
  / __(_)___  ____ ___  __  __ / /_/ /_
 / /_/ / __ \/ __ `/ / / / / // __/ __ \
/ __/ / / / / /_/ / /_/ / /_// /_/ / / /
/_/ /_/_/ /_/\__,_/\__,_/\__,_\__/_/ /_/

        Account Authentication Service v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
