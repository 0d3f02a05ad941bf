use std::{sync::Arc, time::Duration};

use alertbridge::{
    engine::{ServiceSynchronizer, SyncError},
    models::Host,
    object_store::{FailoverError, FailoverStore, InMemoryObjectStore, ObjectStore},
    test_helpers::{AlertBuilder, TEST_HOST_NAME, create_test_app_config},
};
use url::Url;

fn urls() -> (Url, Url) {
    (
        Url::parse("https://icinga-1.example.com:5665").unwrap(),
        Url::parse("https://icinga-2.example.com:5665").unwrap(),
    )
}

async fn create_test_store(active: &Url) -> Arc<InMemoryObjectStore> {
    let store = Arc::new(InMemoryObjectStore::new(active.clone()));
    store.insert_host(Host::new(TEST_HOST_NAME, "dummy")).await;
    store
}

#[tokio::test]
async fn connect_skips_unreachable_primary() {
    let (a, b) = urls();
    let inner = create_test_store(&a).await;
    inner.set_reachable(&a, false).await;

    let failover = FailoverStore::new(inner.clone(), vec![a.clone(), b.clone()], Duration::ZERO);

    assert_eq!(failover.connect().await.unwrap(), b);
    assert_eq!(failover.active_url().await, b);
    assert_eq!(inner.probes().await, vec![a, b]);
}

#[tokio::test]
async fn connect_fails_when_nothing_answers() {
    let (a, b) = urls();
    let inner = create_test_store(&a).await;
    inner.set_reachable(&a, false).await;
    inner.set_reachable(&b, false).await;

    let failover = FailoverStore::new(inner, vec![a, b], Duration::ZERO);

    assert!(matches!(failover.connect().await, Err(FailoverError::NoneReachable(2))));
}

#[tokio::test]
async fn fails_over_and_returns_to_primary() {
    let (a, b) = urls();
    let inner = create_test_store(&a).await;
    let failover = Arc::new(FailoverStore::new(
        inner.clone(),
        vec![a.clone(), b.clone()],
        Duration::from_millis(10),
    ));
    failover.connect().await.unwrap();

    let synchronizer = ServiceSynchronizer::new(failover.clone(), Arc::new(create_test_app_config()));
    let alert = AlertBuilder::new("DiskFull").label("severity", "critical").build();

    // The primary goes away: the failing operation triggers the switch.
    inner.set_reachable(&a, false).await;
    assert!(matches!(synchronizer.sync_alert(&alert).await, Err(SyncError::Store(_))));
    assert_eq!(failover.active_url().await, b);

    // Work continues on the secondary.
    synchronizer.sync_alert(&alert).await.unwrap();
    assert_eq!(inner.services().await.len(), 1);
    assert_eq!(failover.active_url().await, b);

    // Once the primary answers again the next success moves back.
    inner.set_reachable(&a, true).await;
    synchronizer.sync_alert(&alert).await.unwrap();
    assert_eq!(failover.active_url().await, a);
}

#[tokio::test]
async fn transient_blip_keeps_active_endpoint() {
    let (a, b) = urls();
    let inner = create_test_store(&a).await;
    let failover = FailoverStore::new(inner.clone(), vec![a.clone(), b.clone()], Duration::from_millis(50));
    failover.connect().await.unwrap();

    inner.set_reachable(&a, false).await;
    let restore = {
        let inner = inner.clone();
        let a = a.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            inner.set_reachable(&a, true).await;
        })
    };

    assert!(failover.get_host(TEST_HOST_NAME).await.is_err());
    restore.await.unwrap();

    assert_eq!(failover.active_url().await, a);
    assert!(failover.get_host(TEST_HOST_NAME).await.unwrap().is_some());
}
