//! # payrail-api
//!
//! HTTP host and composition root for payrail.
//!
//! Builds the provider registry at startup and exposes each provider's
//! operations over REST. Charge amounts are always taken from the order book,
//! never from the request.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/{provider}/preauthorize` | Create a pending payment |
//! | POST | `/api/v1/{provider}/orders/{order_id}/charge` | Verify and capture |
//! | POST | `/api/v1/{provider}/refunds` | Refund a captured transaction |

pub mod handlers;
pub mod orders;
pub mod routes;
pub mod state;

pub use orders::{ChargeClaim, OrderBook};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
