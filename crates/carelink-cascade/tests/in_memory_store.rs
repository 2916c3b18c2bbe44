//! Integration tests for the in-memory reference backend.
//!
//! These pin down the store-level contract the engine relies on: stable
//! dependent ordering, all-or-nothing plan application, conflict detection,
//! and index consistency across many removals.

use carelink_cascade::catalog::RelationCatalog;
use carelink_cascade::domain::{EntityId, EntityRef, EntityType};
use carelink_cascade::error::Error;
use carelink_cascade::store::in_memory::InMemoryStore;
use carelink_cascade::store::{CascadePlan, DependentStore, PlannedOp};

fn coordinators_relation() -> carelink_cascade::catalog::RelationDescriptor {
    RelationCatalog::carelink().descriptors_for(EntityType::Hospital)[0]
}

fn communications_relation() -> carelink_cascade::catalog::RelationDescriptor {
    RelationCatalog::carelink().descriptors_for(EntityType::Hospital)[3]
}

// ========== Reads ==========

#[tokio::test]
async fn fetch_root_returns_name_or_none() {
    let store = InMemoryStore::new();
    store
        .insert(EntityType::Hospital, "H1", "General North")
        .await;

    let root = store
        .fetch_root(EntityType::Hospital, &EntityId::from("H1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(root.name, "General North");

    assert!(store
        .fetch_root(EntityType::Hospital, &EntityId::from("H2"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn find_dependents_filters_by_relation_and_type() {
    let store = InMemoryStore::new();
    let hospital = store
        .insert(EntityType::Hospital, "H1", "General North")
        .await;
    let c1 = store.insert(EntityType::Coordinator, "C1", "One").await;
    let c2 = store.insert(EntityType::Coordinator, "C2", "Two").await;
    let thread = store
        .insert(EntityType::CommunicationThread, "T1", "Thread")
        .await;
    store.link(&c1, &hospital, "coordinators").await.unwrap();
    store.link(&c2, &hospital, "coordinators").await.unwrap();
    store
        .link(&thread, &hospital, "communications")
        .await
        .unwrap();

    let ids = store
        .find_dependents(&hospital, &coordinators_relation())
        .await
        .unwrap();
    assert_eq!(ids, vec![EntityId::from("C1"), EntityId::from("C2")]);

    let ids = store
        .find_dependents(&hospital, &communications_relation())
        .await
        .unwrap();
    assert_eq!(ids, vec![EntityId::from("T1")]);
}

#[tokio::test]
async fn find_dependents_returns_sorted_ids_regardless_of_insertion_order() {
    let store = InMemoryStore::new();
    let hospital = store
        .insert(EntityType::Hospital, "H1", "General North")
        .await;
    for id in ["C3", "C1", "C2"] {
        let coordinator = store.insert(EntityType::Coordinator, id, id).await;
        store
            .link(&coordinator, &hospital, "coordinators")
            .await
            .unwrap();
    }

    let ids = store
        .find_dependents(&hospital, &coordinators_relation())
        .await
        .unwrap();
    assert_eq!(
        ids,
        vec![
            EntityId::from("C1"),
            EntityId::from("C2"),
            EntityId::from("C3")
        ]
    );
}

#[tokio::test]
async fn find_dependents_of_unknown_owner_is_empty() {
    let store = InMemoryStore::new();
    let ghost = EntityRef::new(EntityType::Hospital, "H404");
    let ids = store
        .find_dependents(&ghost, &coordinators_relation())
        .await
        .unwrap();
    assert!(ids.is_empty());
}

// ========== Seeding ==========

#[tokio::test]
async fn link_requires_both_endpoints() {
    let store = InMemoryStore::new();
    let hospital = store
        .insert(EntityType::Hospital, "H1", "General North")
        .await;
    let ghost = EntityRef::new(EntityType::Coordinator, "C404");

    let result = store.link(&ghost, &hospital, "coordinators").await;
    assert!(matches!(result.unwrap_err(), Error::Store(_)));
}

#[tokio::test]
async fn relinking_is_idempotent() {
    let store = InMemoryStore::new();
    let hospital = store
        .insert(EntityType::Hospital, "H1", "General North")
        .await;
    let coordinator = store.insert(EntityType::Coordinator, "C1", "One").await;
    store
        .link(&coordinator, &hospital, "coordinators")
        .await
        .unwrap();
    store
        .link(&coordinator, &hospital, "coordinators")
        .await
        .unwrap();

    let ids = store
        .find_dependents(&hospital, &coordinators_relation())
        .await
        .unwrap();
    assert_eq!(ids.len(), 1);
}

// ========== Plan application ==========

#[tokio::test]
async fn apply_removes_planned_records_and_root() {
    let store = InMemoryStore::new();
    let hospital = store
        .insert(EntityType::Hospital, "H1", "General North")
        .await;
    let coordinator = store.insert(EntityType::Coordinator, "C1", "One").await;
    store
        .link(&coordinator, &hospital, "coordinators")
        .await
        .unwrap();

    let plan = CascadePlan {
        root: hospital.clone(),
        ops: vec![PlannedOp::DeleteMany {
            entity_type: EntityType::Coordinator,
            ids: vec![EntityId::from("C1")],
        }],
    };
    store.apply(plan).await.unwrap();

    assert!(!store.contains(&hospital).await);
    assert!(!store.contains(&coordinator).await);
}

#[tokio::test]
async fn apply_with_missing_record_is_a_conflict_and_changes_nothing() {
    let store = InMemoryStore::new();
    let hospital = store
        .insert(EntityType::Hospital, "H1", "General North")
        .await;
    let coordinator = store.insert(EntityType::Coordinator, "C1", "One").await;
    store
        .link(&coordinator, &hospital, "coordinators")
        .await
        .unwrap();

    let before = store.export_all().await;
    let plan = CascadePlan {
        root: hospital.clone(),
        ops: vec![PlannedOp::DeleteMany {
            entity_type: EntityType::Coordinator,
            // C2 was never created; the plan is stale.
            ids: vec![EntityId::from("C1"), EntityId::from("C2")],
        }],
    };

    let err = store.apply(plan).await.unwrap_err();
    assert!(matches!(err, Error::ConcurrentModification(_)));
    assert_eq!(store.export_all().await, before);
}

#[tokio::test]
async fn apply_on_missing_root_is_a_conflict() {
    let store = InMemoryStore::new();
    let plan = CascadePlan {
        root: EntityRef::new(EntityType::Hospital, "H404"),
        ops: vec![],
    };
    let err = store.apply(plan).await.unwrap_err();
    assert!(matches!(err, Error::ConcurrentModification(_)));
}

#[tokio::test]
async fn detach_severs_only_links_into_the_deleted_set() {
    let store = InMemoryStore::new();
    let doomed = store
        .insert(EntityType::Hospital, "H1", "General North")
        .await;
    let surviving = store.insert(EntityType::Hospital, "H2", "Lakeside").await;
    let thread = store
        .insert(EntityType::CommunicationThread, "T1", "Thread")
        .await;
    store.link(&thread, &doomed, "communications").await.unwrap();
    store
        .link(&thread, &surviving, "communications")
        .await
        .unwrap();

    let plan = CascadePlan {
        root: doomed.clone(),
        ops: vec![PlannedOp::DetachMany {
            relation: communications_relation(),
            ids: vec![EntityId::from("T1")],
        }],
    };
    store.apply(plan).await.unwrap();

    assert!(store.contains(&thread).await);
    assert!(!store.is_linked(&thread, &doomed).await);
    // The join row to the other hospital is untouched.
    assert!(store.is_linked(&thread, &surviving).await);
}

// ========== Index consistency ==========

#[tokio::test]
async fn graph_index_stays_consistent_across_many_removals() {
    // Node removal swap-relocates graph indices; a cascade removes many
    // nodes in one call, so the store must keep its node map straight.
    let store = InMemoryStore::new();
    let doomed = store
        .insert(EntityType::Hospital, "H1", "General North")
        .await;
    let surviving = store.insert(EntityType::Hospital, "H2", "Lakeside").await;

    let mut doomed_ids = Vec::new();
    for i in 0..10 {
        let coordinator = store
            .insert(EntityType::Coordinator, format!("D{i}"), format!("D{i}"))
            .await;
        store.link(&coordinator, &doomed, "coordinators").await.unwrap();
        doomed_ids.push(EntityId::from(format!("D{i}")));

        let keeper = store
            .insert(EntityType::Coordinator, format!("K{i}"), format!("K{i}"))
            .await;
        store
            .link(&keeper, &surviving, "coordinators")
            .await
            .unwrap();
    }

    let plan = CascadePlan {
        root: doomed.clone(),
        ops: vec![PlannedOp::DeleteMany {
            entity_type: EntityType::Coordinator,
            ids: doomed_ids,
        }],
    };
    store.apply(plan).await.unwrap();

    // The surviving hospital still resolves all of its coordinators.
    let ids = store
        .find_dependents(&surviving, &coordinators_relation())
        .await
        .unwrap();
    assert_eq!(ids.len(), 10);
    assert_eq!(store.count_of(EntityType::Coordinator).await, 10);
}
