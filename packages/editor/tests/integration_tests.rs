//! Integration tests for the editor crate

use quizfunnel_editor::{
    default_document, form_for, ComponentType, Document, DocumentStore, EditSession, EditorConfig,
    FileStorage, FormKind, MoveDirection, Mutation, MutationOutcome, SaveState, SnapshotStore,
};
use std::sync::Arc;

#[test]
fn test_document_lifecycle_on_disk() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = EditorConfig::default();

    let store = Arc::new(SnapshotStore::new(FileStorage::new(dir.path())?, &config));
    let mut session = EditSession::open(store.clone(), &config);
    assert_eq!(session.document(), &default_document());

    session.apply(Mutation::AddStep)?;
    session.apply(Mutation::AddComponent {
        component_type: ComponentType::Options,
    })?;
    let receipt = session.save_now()?;
    assert!(receipt.backup_key.starts_with("quiz-editor-backup-"));

    // A second session over the same directory sees the saved document
    let store = Arc::new(SnapshotStore::new(FileStorage::new(dir.path())?, &config));
    let reopened = EditSession::open(store, &config);

    assert_eq!(reopened.document(), session.document());
    assert_eq!(reopened.document().steps.len(), 2);
    assert_eq!(reopened.active_step().map(|s| s.name.as_str()), Some("Etapa 2"));

    Ok(())
}

#[test]
fn test_property_form_edit_round() -> anyhow::Result<()> {
    let mut session = EditSession::new(default_document()).with_id_seed("forms");

    let outcome = session.apply(Mutation::AddComponent {
        component_type: ComponentType::Options,
    })?;
    let MutationOutcome::ComponentCreated { component_id } = outcome else {
        panic!("Expected a created component, got {:?}", outcome);
    };

    let selected = session.selected_component().cloned().expect("new component is selected");
    assert_eq!(selected.id, component_id);

    let form = form_for(&selected);
    assert_eq!(form.kind(), FormKind::Options);

    let change = form.options()?.add_choice("Romântico");
    session.apply_props_change(change)?;

    let change = form_for(session.selected_component().unwrap()).edit("columns", "2")?;
    session.apply_props_change(change)?;

    let stored = serde_json::to_value(session.document().component(&component_id).unwrap())?;
    assert_eq!(stored["type"], "options");
    assert_eq!(stored["columns"], 2);
    assert_eq!(stored["choices"].as_array().unwrap().len(), 3);
    assert_eq!(stored["choices"][2]["value"], "romântico");

    Ok(())
}

#[test]
fn test_document_json_shape() -> anyhow::Result<()> {
    let json = serde_json::to_value(default_document())?;

    assert_eq!(json["activeStepId"], "quiz-intro");
    assert_eq!(json["header"]["showProgressBar"], true);

    let components = json["steps"][0]["components"].as_array().unwrap();
    let types: Vec<&str> = components.iter().map(|c| c["type"].as_str().unwrap()).collect();
    assert_eq!(types, ["image", "heading", "text", "input", "button"]);

    let orders: Vec<u64> = components.iter().map(|c| c["order"].as_u64().unwrap()).collect();
    assert_eq!(orders, [0, 1, 2, 3, 4]);

    let back: Document = serde_json::from_value(json)?;
    assert_eq!(back, default_document());
    Ok(())
}

#[test]
fn test_unknown_stored_document_falls_back() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("quiz-editor-latest.json"), "{\"data\": 42}")?;

    let config = EditorConfig::default();
    let store = Arc::new(SnapshotStore::new(FileStorage::new(dir.path())?, &config));
    let session = EditSession::open(store, &config);

    assert_eq!(session.document(), &default_document());
    assert_eq!(session.save_status().map(|s| s.state), Some(SaveState::Idle));
    Ok(())
}

#[test]
fn test_stale_stored_document_is_editable_after_open() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = EditorConfig::default();
    let store = Arc::new(SnapshotStore::new(FileStorage::new(dir.path())?, &config));

    let mut stale = default_document();
    stale.active_step_id = "gone".to_string();
    for (i, component) in stale.steps[0].components.iter_mut().enumerate() {
        component.order = i * 3;
    }
    store.save(&stale)?;

    let mut session = EditSession::open(store, &config);
    assert!(session.document().is_consistent());

    let outcome = session.apply(Mutation::AddComponent {
        component_type: ComponentType::Text,
    })?;
    assert!(outcome.is_change());
    assert_eq!(session.document().component_count(), 6);

    // Already first: no swap, orders stay dense
    session.apply(Mutation::MoveComponent {
        component_id: "intro-logo".to_string(),
        direction: MoveDirection::Up,
    })?;
    let orders: Vec<usize> = session.document().steps[0]
        .components
        .iter()
        .map(|c| c.order)
        .collect();
    assert_eq!(orders, vec![0, 1, 2, 3, 4, 5]);
    Ok(())
}
