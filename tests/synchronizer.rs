use std::sync::Arc;

use alertbridge::{
    engine::{ServiceSynchronizer, SkipReason, SyncError, SyncOutcome},
    models::{ExitStatus, Host, VarValue},
    object_store::InMemoryObjectStore,
    test_helpers::{AlertBuilder, TEST_HOST_NAME, TEST_UUID, create_test_app_config},
};
use url::Url;

async fn create_test_store() -> Arc<InMemoryObjectStore> {
    let store = Arc::new(InMemoryObjectStore::new(Url::parse("http://icinga:5665").unwrap()));
    store.insert_host(Host::new(TEST_HOST_NAME, "dummy")).await;
    store
}

fn create_synchronizer(store: &Arc<InMemoryObjectStore>) -> ServiceSynchronizer {
    ServiceSynchronizer::new(store.clone(), Arc::new(create_test_app_config()))
}

#[tokio::test]
async fn firing_then_resolved_follows_alert_state() {
    let store = create_test_store().await;
    let synchronizer = create_synchronizer(&store);
    let firing = AlertBuilder::new("DiskFull")
        .label("severity", "warning")
        .label("instance", "db-1")
        .annotation("message", "disk 91% full")
        .build();

    let outcome = synchronizer.sync_alert(&firing).await.unwrap();
    let SyncOutcome::Created(name) = outcome else { panic!("expected creation, got {outcome:?}") };
    let full_name = format!("{TEST_HOST_NAME}!{name}");

    let service = store.service(&full_name).await.unwrap();
    assert_eq!(service.state, Some(ExitStatus::Warning));
    assert_eq!(service.vars.get("bridge_uuid"), Some(&VarValue::from(TEST_UUID)));
    assert_eq!(service.vars.get("label_instance"), Some(&VarValue::from("db-1")));
    assert_eq!(service.vars.get("team"), Some(&VarValue::from("ops")));

    let resolved = AlertBuilder::new("DiskFull")
        .label("severity", "warning")
        .label("instance", "db-1")
        .resolved()
        .build();
    assert_eq!(synchronizer.sync_alert(&resolved).await.unwrap(), SyncOutcome::Updated(name));
    assert_eq!(store.service(&full_name).await.unwrap().state, Some(ExitStatus::Ok));
    assert_eq!(store.create_count().await, 1);
}

#[tokio::test]
async fn resolved_alert_without_service_touches_nothing() {
    let store = create_test_store().await;
    let synchronizer = create_synchronizer(&store);
    let resolved = AlertBuilder::new("DiskFull").label("severity", "critical").resolved().build();

    let outcome = synchronizer.sync_alert(&resolved).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::NoServiceToUpdate));
    assert!(store.services().await.is_empty());
    assert!(store.check_results().await.is_empty());
}

#[tokio::test]
async fn distinct_label_sets_get_distinct_services() {
    let store = create_test_store().await;
    let synchronizer = create_synchronizer(&store);
    let alerts = vec![
        AlertBuilder::new("DiskFull").label("instance", "db-1").label("severity", "critical").build(),
        AlertBuilder::new("DiskFull").label("instance", "db-2").label("severity", "critical").build(),
        AlertBuilder::new("DiskFull").label("instance", "db-1").label("severity", "critical").build(),
    ];

    let results = synchronizer.sync_alerts(&alerts).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(store.services().await.len(), 2);
    assert_eq!(store.create_count().await, 2);
    assert_eq!(store.update_count().await, 1);
}

#[tokio::test]
async fn heartbeat_alert_pushes_ok_and_arms_fallback() {
    let store = create_test_store().await;
    let synchronizer = create_synchronizer(&store);
    let heartbeat = AlertBuilder::new("Watchdog")
        .label("heartbeat", "5m")
        .label("severity", "critical")
        .annotation("message", "alerting pipeline is dead")
        .build();

    let SyncOutcome::Created(name) = synchronizer.sync_alert(&heartbeat).await.unwrap() else {
        panic!("expected creation");
    };
    let service = store.service(&format!("{TEST_HOST_NAME}!{name}")).await.unwrap();

    assert!(service.enable_active_checks);
    assert!((service.check_interval - 330.0).abs() < 1e-6);
    assert_eq!(service.vars.get("dummy_state"), Some(&VarValue::Number(2)));
    assert_eq!(service.state, Some(ExitStatus::Ok));

    let resolved = AlertBuilder::new("Watchdog").label("heartbeat", "5m").resolved().build();
    assert_eq!(
        synchronizer.sync_alert(&resolved).await.unwrap(),
        SyncOutcome::Skipped(SkipReason::ResolvedHeartbeat)
    );
    assert_eq!(store.check_results().await.len(), 1);
}

#[tokio::test]
async fn one_bad_alert_does_not_block_the_batch() {
    let store = create_test_store().await;
    let synchronizer = create_synchronizer(&store);
    let alerts = vec![
        AlertBuilder::new("Broken").label("heartbeat", "sometimes").build(),
        AlertBuilder::new("DiskFull").label("severity", "critical").build(),
    ];

    let results = synchronizer.sync_alerts(&alerts).await;

    assert!(matches!(results[0], Err(SyncError::InvalidHeartbeat { .. })));
    assert!(matches!(results[1], Ok(SyncOutcome::Created(_))));
    assert_eq!(store.services().await.len(), 1);
}
