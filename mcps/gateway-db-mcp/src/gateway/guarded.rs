//! Policy-checked gateway access
//!
//! The only route from a tool to the gateway. Refused operations return
//! before the inner gateway is touched.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::{Gateway, GatewayError, Operation};
use crate::policy::{Access, Policy, PolicyRefusal};

#[derive(Error, Debug)]
pub enum CallError {
    #[error(transparent)]
    Refused(#[from] PolicyRefusal),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// A gateway behind the read-only policy
#[derive(Clone)]
pub struct GuardedGateway {
    policy: Policy,
    inner: Arc<dyn Gateway>,
}

impl GuardedGateway {
    pub fn new(policy: Policy, inner: Arc<dyn Gateway>) -> Self {
        Self { policy, inner }
    }

    /// Check an access class against the policy, logging refusals
    pub fn admit(&self, name: &str, access: &Access<'_>) -> Result<(), PolicyRefusal> {
        self.policy.check(access).inspect_err(|refusal| {
            tracing::warn!(op = name, mode = self.policy.mode().as_str(), %refusal, "operation refused");
        })
    }

    /// Check the operation against the policy, then forward it once
    pub async fn call(&self, operation: &Operation) -> Result<Value, CallError> {
        self.admit(operation.name(), &operation.access())?;

        tracing::info!(op = operation.name(), gateway = self.inner.name(), "forwarding");

        self.inner.call(operation).await.map_err(|e| {
            tracing::error!(op = operation.name(), error = %e, "gateway call failed");
            CallError::Gateway(e)
        })
    }
}
