//! Fan-out reaches only declared dependents, and one unreachable dependent
//! does not keep the others from being notified.

use e2e_tests::{dead_address, PatchInbox, RegistryHarness};
use svc_common::{Error, Patch, PatchEntry, Registration, ServiceName};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_removal_is_announced_only_to_dependents() {
    let harness = RegistryHarness::start().await;
    let client = harness.client();

    let mut a = PatchInbox::start().await;
    let mut b = PatchInbox::start().await;
    let mut c = PatchInbox::start().await;

    client.register(&c.registration("svcC", &[])).await.unwrap();
    client
        .register(&a.registration("svcA", &["svcC"]))
        .await
        .unwrap();
    client.register(&b.registration("svcB", &[])).await.unwrap();

    let bootstrap = a.expect_patch().await;
    assert_eq!(bootstrap.added.len(), 1);

    client.deregister(c.service_url()).await.unwrap();

    let removal = a.expect_patch().await;
    assert_eq!(
        removal,
        Patch::removed(vec![PatchEntry::new("svcC", c.service_url())])
    );

    b.assert_no_patch().await;
    c.assert_no_patch().await;

    harness.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unreachable_dependent_does_not_block_others() {
    let harness = RegistryHarness::start().await;
    let client = harness.client();

    let c = PatchInbox::start().await;
    let mut d = PatchInbox::start().await;

    client.register(&c.registration("svcC", &[])).await.unwrap();

    // A dependent whose update endpoint is gone. Its bootstrap push fails,
    // which the caller sees, but the registration is kept.
    let dead = dead_address().await;
    let ghost = Registration::new(
        "svcGhost",
        dead.clone(),
        vec![ServiceName::from("svcC")],
        format!("{}/updates", dead),
    );
    let result = client.register(&ghost).await;
    match result {
        Err(Error::Protocol(message)) => assert!(message.contains("400"), "{}", message),
        other => panic!("Expected a 400 rejection, got {:?}", other),
    }
    assert!(harness.registry().find(&dead).is_some());

    client
        .register(&d.registration("svcD", &["svcC"]))
        .await
        .unwrap();
    let _bootstrap = d.expect_patch().await;

    client.deregister(c.service_url()).await.unwrap();

    let removal = d.expect_patch().await;
    assert_eq!(
        removal,
        Patch::removed(vec![PatchEntry::new("svcC", c.service_url())])
    );

    harness.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_dependent_gets_only_its_entries() {
    let harness = RegistryHarness::start().await;
    let client = harness.client();

    let mut wants_log = PatchInbox::start().await;
    let mut wants_grades = PatchInbox::start().await;
    let log = PatchInbox::start().await;

    client
        .register(&wants_log.registration("Portal", &["LogService"]))
        .await
        .unwrap();
    client
        .register(&wants_grades.registration("Teacher", &["GradingService"]))
        .await
        .unwrap();
    assert!(wants_log.expect_patch().await.is_empty());
    assert!(wants_grades.expect_patch().await.is_empty());

    client
        .register(&log.registration("LogService", &[]))
        .await
        .unwrap();

    let patch = wants_log.expect_patch().await;
    assert_eq!(
        patch,
        Patch::added(vec![PatchEntry::new("LogService", log.service_url())])
    );
    wants_grades.assert_no_patch().await;

    harness.stop().await;
}
