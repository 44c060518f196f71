//! HTTP contract of the `/services` endpoint.

use e2e_tests::{PatchInbox, RegistryHarness};
use hyper::StatusCode;
use svc_common::{Patch, PatchEntry};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_status_codes() {
    let harness = RegistryHarness::start().await;
    let a = PatchInbox::start().await;

    let body = serde_json::to_vec(&a.registration("svcA", &[])).unwrap();
    assert_eq!(harness.raw_request("POST", body).await, StatusCode::OK);

    assert_eq!(
        harness.raw_request("POST", "{\"ServiceName\":").await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        harness.raw_request("GET", "").await,
        StatusCode::METHOD_NOT_ALLOWED
    );
    assert_eq!(
        harness.raw_request("PUT", "").await,
        StatusCode::METHOD_NOT_ALLOWED
    );

    assert_eq!(
        harness.raw_request("DELETE", a.service_url().to_string()).await,
        StatusCode::OK
    );
    assert_eq!(
        harness.raw_request("DELETE", a.service_url().to_string()).await,
        StatusCode::INTERNAL_SERVER_ERROR
    );

    harness.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_second_deregistration_fails() {
    let harness = RegistryHarness::start().await;
    let client = harness.client();
    let a = PatchInbox::start().await;

    client.register(&a.registration("svcA", &[])).await.unwrap();
    client.deregister(a.service_url()).await.unwrap();

    let err = client.deregister(a.service_url()).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("500"), "{}", message);
    assert!(message.contains("not found"), "{}", message);

    harness.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reregistration_replaces_entry() {
    let harness = RegistryHarness::start().await;
    let client = harness.client();
    let a = PatchInbox::start().await;
    let mut b = PatchInbox::start().await;

    client.register(&a.registration("svcA", &[])).await.unwrap();
    client
        .register(&b.registration("svcB", &["svcA"]))
        .await
        .unwrap();
    let bootstrap = b.expect_patch().await;
    assert_eq!(
        bootstrap,
        Patch::added(vec![PatchEntry::new("svcA", a.service_url())])
    );

    // Same name again: dependents hear the entry re-announced.
    client.register(&a.registration("svcA", &[])).await.unwrap();
    assert_eq!(
        b.expect_patch().await,
        Patch::added(vec![PatchEntry::new("svcA", a.service_url())])
    );

    // New name at the same URL: the old name is retired.
    client.register(&a.registration("svcA-v2", &[])).await.unwrap();
    assert_eq!(
        b.expect_patch().await,
        Patch::removed(vec![PatchEntry::new("svcA", a.service_url())])
    );

    let all = harness.registry().registrations();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].service_name.as_str(), "svcA-v2");

    client.deregister(a.service_url()).await.unwrap();
    b.assert_no_patch().await;

    harness.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_registrations_over_http() {
    let harness = Arc::new(RegistryHarness::start().await);

    let mut handles = vec![];
    for i in 0..32 {
        let harness = Arc::clone(&harness);
        handles.push(tokio::spawn(async move {
            let client = harness.client();
            let url = format!("http://worker-{}.invalid", i);
            let registration = svc_common::Registration::new(
                "Worker",
                url.clone(),
                vec![],
                format!("{}/updates", url),
            );

            client.register(&registration).await.unwrap();
            if i % 4 == 0 {
                client.deregister(&url).await.unwrap();
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(harness.registry().len(), 24);

    if let Ok(harness) = Arc::try_unwrap(harness) {
        harness.stop().await;
    }
}
