//! # payrail
//!
//! Payment provider host.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export PAYPAL_CLIENT_ID=...
//! export PAYPAL_SECRET=...
//! export PAYPAL_ENV=sandbox
//! export SITE_URL=https://shop.example.com
//!
//! # Run the server
//! payrail
//! ```

use payrail_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    // Providers connect here; a bad credential aborts startup
    let state = AppState::from_env().await?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Orders loaded: {}", state.orders.len().await);

    let app = routes::create_router(state);

    info!("payrail starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Preauthorize: POST http://{}/api/v1/paypal/preauthorize", addr);
        info!("Charge: POST http://{}/api/v1/paypal/orders/{{order_id}}/charge", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  payrail
  ━━━━━━━━━━━━━━━━━━━━━━━
  Payment provider host
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
