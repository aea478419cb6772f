//! Common test utilities for workflow integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use invoiceme_client::View;
use std::time::Duration;
use workflow_tests::{
    wait_for_backend, BackendEndpoint, FakeBackend, WorkflowTestContext, DEMO_PASSWORD,
    DEMO_USERNAME,
};

/// Default timeout for waiting on a live backend.
pub const BACKEND_TIMEOUT: Duration = Duration::from_secs(60);

/// The date every fake-backend scenario runs on.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

pub fn days_ago(days: i64) -> NaiveDate {
    today() - chrono::Duration::days(days)
}

/// A fake backend plus a session already signed in to it.
pub async fn setup() -> (FakeBackend, WorkflowTestContext) {
    let backend = FakeBackend::start(DEMO_USERNAME, DEMO_PASSWORD, today()).await;
    let ctx = WorkflowTestContext::new(&backend.uri(), View::Login)
        .await
        .expect("Failed to create workflow test context");
    ctx.sign_in(DEMO_USERNAME, DEMO_PASSWORD)
        .await
        .expect("Failed to sign in");
    (backend, ctx)
}

/// A signed-in session against the live backend, once it is healthy.
pub async fn live_setup() -> WorkflowTestContext {
    let endpoint = BackendEndpoint::from_env().expect("Invalid backend configuration");
    wait_for_backend(&endpoint, BACKEND_TIMEOUT)
        .await
        .expect("Backend not healthy - start the InvoiceMe backend first");

    let ctx = WorkflowTestContext::new(endpoint.settings.normalized_base_url(), View::Login)
        .await
        .expect("Failed to create workflow test context");
    ctx.sign_in(&endpoint.username, &endpoint.password)
        .await
        .expect("Failed to sign in");
    ctx
}

/// Helper to check if live tests should be skipped.
///
/// Returns true if SKIP_WORKFLOW_TESTS env var is set.
pub fn should_skip() -> bool {
    std::env::var("SKIP_WORKFLOW_TESTS").is_ok()
}

/// Macro to skip live tests when asked to.
#[macro_export]
macro_rules! skip_if_no_backend {
    () => {
        if common::should_skip() {
            eprintln!("Skipping workflow test (SKIP_WORKFLOW_TESTS is set)");
            return;
        }
    };
}
