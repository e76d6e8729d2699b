//! HTTP gateway translating JSON metric pushes to Prometheus text exposition.
//!
//! The gateway accepts pushes in two JSON shapes, rewrites each body to the
//! text exposition format and hands it to a downstream, normally a
//! Pushgateway.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   JSON client   │────>│     Adapter     │────>│   Downstream    │
//! │  (POST / PUT)   │     │ (parse, render) │     │  (Pushgateway)  │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Routes
//!
//! - `{structured_prefix}/:job` - `{metrics, labels}` bodies, labelled `job`
//! - `{flat_prefix}/:identify` - flat key/value bodies, labelled `identify`
//! - `/health`, `/stats`
//!
//! # Usage
//!
//! ```bash
//! promgate-gateway --config promgate.json5
//! ```
//!
//! See [`config::GatewayConfig`] for configuration options.

pub mod adapter;
pub mod config;
pub mod downstream;
pub mod http;
pub mod state;

pub use adapter::{AdapterError, PushKind, translate_flat, translate_structured};
pub use config::GatewayConfig;
pub use downstream::{Downstream, ForwardRequest, HttpForwarder, RoutingParams, SharedDownstream};
pub use http::{HttpServer, create_router};
pub use state::{GatewayState, GatewayStats};
