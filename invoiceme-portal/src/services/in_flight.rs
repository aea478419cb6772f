//! Backend mutations currently running, one per session and invoice.

use dashmap::DashSet;
use invoiceme_client::workflow::WorkflowError;
use invoiceme_core::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Claims on (session, invoice) pairs whose action request is in flight.
///
/// A confirm or submit claims its pair before touching the backend, so a
/// repeated click from the same browser is rejected instead of issuing a
/// second mutation.
#[derive(Clone, Default)]
pub struct InFlightActions {
    claims: Arc<DashSet<String>>,
}

/// Held for the duration of one action; dropping it releases the claim.
pub struct InFlightGuard {
    claims: Arc<DashSet<String>>,
    key: String,
}

impl InFlightActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&self, session: &str, invoice_id: Uuid) -> Result<InFlightGuard, AppError> {
        let key = format!("{}:{}", session, invoice_id);
        if !self.claims.insert(key.clone()) {
            tracing::warn!(%invoice_id, "Invoice action already in flight");
            return Err(WorkflowError::AlreadyProcessing.into());
        }
        Ok(InFlightGuard {
            claims: self.claims.clone(),
            key,
        })
    }

    pub fn is_claimed(&self, session: &str, invoice_id: Uuid) -> bool {
        self.claims.contains(&format!("{}:{}", session, invoice_id))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.claims.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_on_same_invoice_is_rejected_until_released() {
        let actions = InFlightActions::new();
        let id = Uuid::new_v4();

        let guard = actions.claim("session-a", id).unwrap();
        assert!(matches!(
            actions.claim("session-a", id),
            Err(AppError::Conflict(_))
        ));

        drop(guard);
        assert!(!actions.is_claimed("session-a", id));
        assert!(actions.claim("session-a", id).is_ok());
    }

    #[test]
    fn claims_are_independent_per_session_and_invoice() {
        let actions = InFlightActions::new();
        let id = Uuid::new_v4();

        let _first = actions.claim("session-a", id).unwrap();
        assert!(actions.claim("session-b", id).is_ok());
        assert!(actions.claim("session-a", Uuid::new_v4()).is_ok());
    }
}
