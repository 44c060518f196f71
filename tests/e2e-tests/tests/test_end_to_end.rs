//! Scenario: two services, one depending on the other.
//!
//! svcA registers without dependencies, svcB registers requiring svcA and
//! receives svcA in its bootstrap push, then svcA deregisters and svcB is
//! told about the removal.

use e2e_tests::{PatchInbox, RegistryHarness};
use svc_common::{Patch, PatchEntry};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_register_bootstrap_and_deregister() {
    let harness = RegistryHarness::start().await;
    let client = harness.client();

    let mut a = PatchInbox::start().await;
    let mut b = PatchInbox::start().await;

    // Step 1: svcA registers
    client.register(&a.registration("svcA", &[])).await.unwrap();
    a.assert_no_patch().await;

    // Step 2: svcB registers and learns about svcA
    client
        .register(&b.registration("svcB", &["svcA"]))
        .await
        .unwrap();

    let bootstrap = b.expect_patch().await;
    assert_eq!(
        bootstrap,
        Patch::added(vec![PatchEntry::new("svcA", a.service_url())])
    );

    // svcA does not depend on svcB, so it hears nothing
    a.assert_no_patch().await;

    // Step 3: svcA deregisters
    client.deregister(a.service_url()).await.unwrap();

    let removal = b.expect_patch().await;
    assert_eq!(
        removal,
        Patch::removed(vec![PatchEntry::new("svcA", a.service_url())])
    );

    assert_eq!(harness.registry().len(), 1);
    harness.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dependent_registered_first_is_told_later() {
    let harness = RegistryHarness::start().await;
    let client = harness.client();

    let mut a = PatchInbox::start().await;
    let mut b = PatchInbox::start().await;

    client
        .register(&b.registration("svcB", &["svcA"]))
        .await
        .unwrap();

    // Nothing is live yet: the bootstrap push is empty
    assert!(b.expect_patch().await.is_empty());

    client.register(&a.registration("svcA", &[])).await.unwrap();

    let announcement = b.expect_patch().await;
    assert_eq!(
        announcement,
        Patch::added(vec![PatchEntry::new("svcA", a.service_url())])
    );
    a.assert_no_patch().await;

    harness.stop().await;
}
