// ABOUTME: Tests for loading, generating, selecting and deleting specification versions
// ABOUTME: Runs the controller against the in-memory store and mocked collaborators

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockall::mock;
use pretty_assertions::assert_eq;
use rstest::rstest;
use specgen_ai::{EngineError, EngineResult, GenerationService};
use specgen_core::{GeneratedSections, NewSpecificationVersion, ProjectRef, SpecificationVersion};
use specgen_specs::{Resolution, SpecError, VersionController};
use specgen_storage::{DocumentStore, InMemoryDocumentStore, StorageError, StorageResult};

mock! {
    Store {}

    #[async_trait]
    impl DocumentStore for Store {
        async fn list_versions(&self, project_id: &str) -> StorageResult<Vec<SpecificationVersion>>;
        async fn create_version(&self, input: NewSpecificationVersion) -> StorageResult<SpecificationVersion>;
        async fn update_version(&self, version_id: &str, record: &SpecificationVersion) -> StorageResult<SpecificationVersion>;
        async fn delete_version(&self, version_id: &str) -> StorageResult<()>;
    }
}

mock! {
    Generator {}

    #[async_trait]
    impl GenerationService for Generator {
        async fn generate(&self, project_id: &str, requirement: &str) -> EngineResult<SpecificationVersion>;
    }
}

/// Generator that fills every section and persists through the store, like the AI engine does
struct StoreBackedGenerator {
    store: Arc<InMemoryDocumentStore>,
}

#[async_trait]
impl GenerationService for StoreBackedGenerator {
    async fn generate(
        &self,
        project_id: &str,
        requirement: &str,
    ) -> EngineResult<SpecificationVersion> {
        let version = self
            .store
            .create_version(NewSpecificationVersion {
                project_id: project_id.to_string(),
                requirement_description: requirement.to_string(),
                sections: GeneratedSections {
                    interface_spec: format!("openapi: 3.0.0\ninfo:\n  title: {}", requirement),
                    schema_spec: "CREATE TABLE users(id INTEGER PRIMARY KEY);".to_string(),
                    interaction_diagram: "sequenceDiagram\nUser->>API: request".to_string(),
                    sample_data: "{\"id\": 1}".to_string(),
                },
            })
            .await?;
        Ok(version)
    }
}

fn seeded(id: &str, project_id: &str, minute: u32) -> SpecificationVersion {
    SpecificationVersion::from_parts(
        id.to_string(),
        project_id.to_string(),
        Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap(),
        format!("requirement {}", id),
        GeneratedSections {
            interface_spec: format!("api {}", id),
            schema_spec: format!("schema {}", id),
            interaction_diagram: "sequenceDiagram\nA->>B: hi".to_string(),
            sample_data: "{}".to_string(),
        },
    )
}

fn project() -> ProjectRef {
    ProjectRef::new("p1", "Shop")
}

fn controller_with(versions: Vec<SpecificationVersion>) -> (VersionController, Arc<InMemoryDocumentStore>) {
    let store = Arc::new(InMemoryDocumentStore::with_versions(versions));
    let generator = Arc::new(StoreBackedGenerator {
        store: store.clone(),
    });
    (VersionController::new(store.clone(), generator), store)
}

fn active_id(controller: &VersionController) -> Option<String> {
    controller.active_id().map(str::to_string)
}

#[tokio::test]
async fn test_load_empty_project_has_no_active_version() {
    let (mut controller, _) = controller_with(vec![]);
    controller.load_versions(project()).await.unwrap();

    assert!(controller.versions().is_empty());
    assert!(controller.active().is_none());
}

#[rstest]
#[case(vec![seeded("a", "p1", 1)], "a")]
#[case(vec![seeded("a", "p1", 1), seeded("b", "p1", 2), seeded("c", "p1", 3)], "c")]
#[case(vec![seeded("c", "p1", 3), seeded("a", "p1", 1), seeded("b", "p1", 2)], "c")]
#[tokio::test]
async fn test_load_activates_newest_version(
    #[case] versions: Vec<SpecificationVersion>,
    #[case] expected: &str,
) {
    let (mut controller, _) = controller_with(versions);
    controller.load_versions(project()).await.unwrap();

    assert_eq!(controller.active_id(), Some(expected));
    assert_eq!(
        controller.versions().last().map(|v| v.id.as_str()),
        Some(expected)
    );
    let times: Vec<_> = controller.versions().iter().map(|v| v.created_at).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
}

#[tokio::test]
async fn test_load_only_includes_requested_project() {
    let (mut controller, _) =
        controller_with(vec![seeded("a", "p1", 1), seeded("x", "p2", 2)]);
    controller.load_versions(project()).await.unwrap();

    assert_eq!(controller.versions().len(), 1);
    assert_eq!(controller.active_id(), Some("a"));
}

#[tokio::test]
async fn test_load_failure_empties_list() {
    let mut store = MockStore::new();
    let mut calls = 0;
    store.expect_list_versions().times(2).returning(move |_| {
        calls += 1;
        if calls == 1 {
            Ok(vec![seeded("a", "p1", 1)])
        } else {
            Err(StorageError::Io(std::io::Error::other("disk unavailable")))
        }
    });
    let mut controller = VersionController::new(Arc::new(store), Arc::new(MockGenerator::new()));

    controller.load_versions(project()).await.unwrap();
    assert_eq!(controller.active_id(), Some("a"));

    let err = controller
        .load_versions(ProjectRef::new("p2", "Other"))
        .await
        .unwrap_err();
    assert!(matches!(err, SpecError::Storage(_)));
    assert!(controller.versions().is_empty());
    assert!(controller.active().is_none());
    assert_eq!(controller.project().map(|p| p.id.as_str()), Some("p2"));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t ")]
#[tokio::test]
async fn test_blank_requirement_never_calls_generator(#[case] requirement: &str) {
    let mut store = MockStore::new();
    store
        .expect_list_versions()
        .returning(|_| Ok(vec![seeded("a", "p1", 1)]));
    let mut generator = MockGenerator::new();
    generator.expect_generate().times(0);
    let mut controller = VersionController::new(Arc::new(store), Arc::new(generator));
    controller.load_versions(project()).await.unwrap();

    let err = controller.create_version("p1", requirement).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(controller.versions().len(), 1);
    assert_eq!(controller.active_id(), Some("a"));
    assert!(!controller.is_generating());
}

#[tokio::test]
async fn test_generation_into_empty_project() {
    let (mut controller, store) = controller_with(vec![]);
    controller.load_versions(project()).await.unwrap();

    let resolution = controller
        .create_version("p1", "user login with JWT")
        .await
        .unwrap();

    assert_eq!(resolution, Resolution::Applied);
    let active = controller.active().unwrap();
    assert_eq!(active.requirement_description, "user login with JWT");
    for kind in specgen_core::SectionKind::ALL {
        assert!(!active.section(kind).is_empty(), "{} is empty", kind);
    }
    assert_eq!(controller.versions().len(), 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_generation_appends_and_activates() {
    let (mut controller, _) = controller_with(vec![seeded("a", "p1", 1)]);
    controller.load_versions(project()).await.unwrap();

    controller.create_version("p1", "add orders").await.unwrap();

    assert_eq!(controller.versions().len(), 2);
    assert_eq!(controller.versions()[0].id, "a");
    assert_eq!(
        controller.active().map(|v| v.requirement_description.as_str()),
        Some("add orders")
    );
}

#[tokio::test]
async fn test_generation_requires_loaded_project() {
    let (mut controller, _) = controller_with(vec![]);
    let err = controller.create_version("p1", "login").await.unwrap_err();
    assert!(matches!(err, SpecError::NoProject));

    controller.load_versions(project()).await.unwrap();
    let err = controller.create_version("p2", "login").await.unwrap_err();
    assert!(matches!(err, SpecError::ProjectMismatch { .. }));
}

#[tokio::test]
async fn test_generation_is_single_flight() {
    let (mut controller, _) = controller_with(vec![]);
    controller.load_versions(project()).await.unwrap();

    let ticket = controller.begin_generation("p1", "first").unwrap();
    assert!(controller.is_generating());
    assert!(matches!(
        controller.begin_generation("p1", "second"),
        Err(SpecError::Busy)
    ));

    controller
        .finish_generation(ticket, Ok(seeded("g1", "p1", 5)))
        .unwrap();
    assert!(!controller.is_generating());
    assert!(controller.begin_generation("p1", "second").is_ok());
}

#[tokio::test]
async fn test_generation_failure_leaves_state_unchanged() {
    let (mut controller, _) = controller_with(vec![seeded("a", "p1", 1)]);
    controller.load_versions(project()).await.unwrap();

    let ticket = controller.begin_generation("p1", "login").unwrap();
    let err = controller
        .finish_generation(
            ticket,
            Err(EngineError::Upstream("API returned 529: overloaded".to_string())),
        )
        .unwrap_err();

    assert_eq!(err.user_message(), "API returned 529: overloaded");
    assert_eq!(controller.versions().len(), 1);
    assert_eq!(controller.active_id(), Some("a"));
    assert!(!controller.is_generating());
}

#[tokio::test]
async fn test_generation_result_from_previous_load_is_discarded() {
    let (mut controller, _) = controller_with(vec![seeded("a", "p1", 1)]);
    controller.load_versions(project()).await.unwrap();
    let ticket = controller.begin_generation("p1", "login").unwrap();

    controller
        .load_versions(ProjectRef::new("p2", "Other"))
        .await
        .unwrap();
    let resolution = controller
        .finish_generation(ticket, Ok(seeded("late", "p1", 9)))
        .unwrap();

    assert_eq!(resolution, Resolution::Discarded);
    assert!(controller.versions().is_empty());
    assert!(controller.active().is_none());
}

#[tokio::test]
async fn test_select_version() {
    let (mut controller, _) =
        controller_with(vec![seeded("a", "p1", 1), seeded("b", "p1", 2)]);
    controller.load_versions(project()).await.unwrap();

    assert!(controller.select_version("a"));
    assert_eq!(controller.active_id(), Some("a"));

    assert!(!controller.select_version("missing"));
    assert_eq!(controller.active_id(), Some("a"));
}

#[tokio::test]
async fn test_delete_only_version_leaves_nothing_active() {
    let (mut controller, store) = controller_with(vec![seeded("a", "p1", 1)]);
    controller.load_versions(project()).await.unwrap();

    let confirmation = controller.request_delete("a").unwrap();
    controller.confirm_delete(confirmation).await.unwrap();

    assert!(controller.versions().is_empty());
    assert!(controller.active().is_none());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_delete_non_active_keeps_active() {
    let (mut controller, _) = controller_with(vec![
        seeded("a", "p1", 1),
        seeded("b", "p1", 2),
        seeded("c", "p1", 3),
    ]);
    controller.load_versions(project()).await.unwrap();
    controller.select_version("b");

    let confirmation = controller.request_delete("a").unwrap();
    controller.confirm_delete(confirmation).await.unwrap();

    assert_eq!(controller.active_id(), Some("b"));
    assert_eq!(controller.versions().len(), 2);
}

#[tokio::test]
async fn test_delete_active_falls_back_to_newest() {
    let (mut controller, _) = controller_with(vec![
        seeded("a", "p1", 1),
        seeded("b", "p1", 2),
        seeded("c", "p1", 3),
    ]);
    controller.load_versions(project()).await.unwrap();
    controller.select_version("b");

    let confirmation = controller.request_delete("b").unwrap();
    controller.confirm_delete(confirmation).await.unwrap();

    assert_eq!(controller.active_id(), Some("c"));
}

#[tokio::test]
async fn test_declined_delete_makes_no_call() {
    let (mut controller, store) = controller_with(vec![seeded("a", "p1", 1)]);
    controller.load_versions(project()).await.unwrap();

    let confirmation = controller.request_delete("a").unwrap();
    drop(confirmation);

    assert_eq!(store.len().await, 1);
    assert_eq!(controller.active_id(), Some("a"));
}

#[tokio::test]
async fn test_delete_unknown_version() {
    let (controller, _) = controller_with(vec![]);
    assert!(matches!(
        controller.request_delete("nope"),
        Err(SpecError::VersionNotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_failure_leaves_state_unchanged() {
    let mut store = MockStore::new();
    store
        .expect_list_versions()
        .returning(|_| Ok(vec![seeded("a", "p1", 1), seeded("b", "p1", 2)]));
    store
        .expect_delete_version()
        .times(1)
        .returning(|id| Err(StorageError::NotFound(id.to_string())));
    let mut controller = VersionController::new(Arc::new(store), Arc::new(MockGenerator::new()));
    controller.load_versions(project()).await.unwrap();

    let before = active_id(&controller);
    let confirmation = controller.request_delete("b").unwrap();
    let err = controller.confirm_delete(confirmation).await.unwrap_err();

    assert!(matches!(err, SpecError::Storage(_)));
    assert_eq!(controller.versions().len(), 2);
    assert_eq!(active_id(&controller), before);
}

#[tokio::test]
async fn test_confirmation_from_previous_load_is_rejected() {
    let mut store = MockStore::new();
    store
        .expect_list_versions()
        .returning(|_| Ok(vec![seeded("a", "p1", 1)]));
    store.expect_delete_version().times(0);
    let mut controller = VersionController::new(Arc::new(store), Arc::new(MockGenerator::new()));
    controller.load_versions(project()).await.unwrap();

    let confirmation = controller.request_delete("a").unwrap();
    controller.load_versions(project()).await.unwrap();

    assert!(matches!(
        controller.confirm_delete(confirmation).await,
        Err(SpecError::VersionNotFound(_))
    ));
}

#[tokio::test]
async fn test_replace_version_follows_active_by_id() {
    let (mut controller, _) =
        controller_with(vec![seeded("a", "p1", 1), seeded("b", "p1", 2)]);
    controller.load_versions(project()).await.unwrap();

    let updated = controller.versions()[1].with_section(specgen_core::SectionKind::Schema, "new");
    assert!(controller.replace_version(&updated));
    assert_eq!(controller.active().unwrap().schema_spec, "new");

    assert!(!controller.replace_version(&seeded("zzz", "p1", 9)));
    assert_eq!(controller.versions().len(), 2);
}

#[tokio::test]
async fn test_version_options_labels() {
    let (mut controller, _) =
        controller_with(vec![seeded("a", "p1", 1), seeded("b", "p1", 2)]);
    controller.load_versions(project()).await.unwrap();

    let options = controller.version_options();
    let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["v1 - 10:01:00", "v2 - 10:02:00"]);
    assert!(!options[0].active);
    assert!(options[1].active);
}
