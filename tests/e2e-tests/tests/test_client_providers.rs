//! A service built on the client crate: registers, receives its
//! dependencies through its update endpoint and tracks them in `Providers`.

use e2e_tests::{PatchInbox, RegistryHarness, PATCH_WAIT};
use std::sync::Arc;
use std::time::Duration;
use svc_common::{Registration, ServiceName};
use svc_registry_client::{update_router, Providers};
use tokio::net::TcpListener;

/// Starts an update endpoint backed by `providers`, returns the service URL.
async fn serve_updates(providers: Arc<Providers>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = update_router(providers);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}

async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + PATCH_WAIT;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_providers_follow_registry() {
    let harness = RegistryHarness::start().await;
    let client = harness.client();
    let log_service = ServiceName::from("LogService");

    let log = PatchInbox::start().await;
    client
        .register(&log.registration("LogService", &[]))
        .await
        .unwrap();

    let providers = Arc::new(Providers::new());
    let service_url = serve_updates(Arc::clone(&providers)).await;
    let registration = Registration::new(
        "GradingService",
        service_url.clone(),
        vec![log_service.clone()],
        format!("{}/services", service_url),
    );

    // The bootstrap push completes before register returns.
    client.register(&registration).await.unwrap();
    assert_eq!(providers.get(&log_service).unwrap(), log.service_url());

    // A second provider shows up later
    let log2 = PatchInbox::start().await;
    client
        .register(&log2.registration("LogService", &[]))
        .await
        .unwrap();
    assert!(wait_until(|| providers.all(&log_service).len() == 2).await);

    // Both go away
    client.deregister(log.service_url()).await.unwrap();
    client.deregister(log2.service_url()).await.unwrap();
    assert!(wait_until(|| providers.get(&log_service).is_err()).await);

    client.deregister(&service_url).await.unwrap();
    assert!(harness.registry().is_empty());

    harness.stop().await;
}
