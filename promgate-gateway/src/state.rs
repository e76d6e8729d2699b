//! State shared by the push handlers.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::adapter::AdapterError;
use crate::downstream::SharedDownstream;

/// Gateway request statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GatewayStats {
    /// Push requests received on either adapter.
    pub requests_received: u64,
    /// Pushes handed to the downstream.
    pub requests_forwarded: u64,
    /// Pushes rejected for a missing token or an unusable body.
    pub rejected_bad_request: u64,
    /// Pushes whose body could not be read.
    pub body_read_failures: u64,
    /// Pushes the downstream could not be reached for.
    pub forward_failures: u64,
}

/// Application state shared across handlers.
///
/// Holds no per-request data; routing parameters travel with each request.
#[derive(Clone)]
pub struct GatewayState {
    pub(crate) downstream: SharedDownstream,
    pub(crate) flat_target: String,
    pub(crate) max_body_bytes: usize,
    stats: Arc<RwLock<GatewayStats>>,
}

impl GatewayState {
    /// Create the state for a downstream.
    pub fn new(downstream: SharedDownstream, flat_target: String, max_body_bytes: usize) -> Self {
        Self {
            downstream,
            flat_target,
            max_body_bytes,
            stats: Arc::new(RwLock::new(GatewayStats::default())),
        }
    }

    /// Get gateway statistics.
    pub fn stats(&self) -> GatewayStats {
        self.stats.read().clone()
    }

    pub(crate) fn record_received(&self) {
        self.stats.write().requests_received += 1;
    }

    pub(crate) fn record_outcome<T>(&self, outcome: &Result<T, AdapterError>) {
        let mut stats = self.stats.write();
        match outcome {
            Ok(_) => stats.requests_forwarded += 1,
            Err(AdapterError::MissingRoutingToken(_)) | Err(AdapterError::Translate(_)) => {
                stats.rejected_bad_request += 1
            }
            Err(AdapterError::BodyRead(_)) => stats.body_read_failures += 1,
            Err(AdapterError::Forward(_)) => stats.forward_failures += 1,
        }
    }
}
