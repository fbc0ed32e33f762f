/*!
 * Tests for project document normalization
 */

use anyhow::Result;
use serde_json::json;
use scenegen::errors::DocumentError;
use scenegen::project::{FixedId, ImagePromptSet, UNTITLED_PROJECT};
use scenegen::Normalizer;
use crate::common;

/// Test that the sample document normalizes into the expected tree
#[test]
fn test_normalize_withSampleDocument_shouldBuildTree() -> Result<()> {
    let document = common::test_normalizer().parse_str(&common::sample_project_json()?)?;

    assert_eq!(document.project_name, "The Last Ledger");
    assert_eq!(document.scenes.len(), 2);
    assert_eq!(document.shot_count(), 2);

    let scene = &document.scenes[0];
    assert_eq!(scene.scene_id, "S01");
    assert_eq!(scene.project_id, common::TEST_PROJECT_ID);
    assert_eq!(scene.title.as_deref(), Some("The Archive"));
    assert_eq!(scene.timestamp.as_deref(), Some("00:00"));

    let shot = &scene.shots[0];
    assert_eq!(shot.shot_id, "A");
    assert_eq!(shot.scene_id, "S01");
    assert_eq!(shot.order_index, 1);
    assert_eq!(shot.name.as_deref(), Some("Establishing shot of the archive"));
    assert_eq!(shot.image_prompts.start, "[Universal Style Block] establishing shot");

    // Numeric identifiers are accepted in their string form
    let second = &scene.shots[1];
    assert_eq!(second.shot_id, "2");
    assert_eq!(second.order_index, 2);
    assert_eq!(second.name.as_deref(), Some(""));
    assert_eq!(second.image_prompts.middle, "");
    assert!(second.video_prompt.is_none());

    assert!(document.scenes[1].shots.is_empty());
    Ok(())
}

/// Test that list-shaped and mapping-shaped prompts normalize identically
#[test]
fn test_normalize_withEquivalentPromptShapes_shouldProduceSamePrompts() -> Result<()> {
    let normalizer = common::test_normalizer();
    let list = json!({"scenes": [{"scene_id": "S", "shots": [{"shot_id": "1",
        "nano_banana_pro_prompts": [
            {"frame": "end", "prompt": "door closes"},
            {"frame": "start", "prompt": "door opens"}
        ]}]}]});
    let mapping = json!({"scenes": [{"scene_id": "S", "shots": [{"shot_id": "1",
        "nano_banana_pro_prompts": {"start": "door opens", "end": "door closes"}}]}]});

    let from_list = normalizer.normalize(&list)?;
    let from_mapping = normalizer.normalize(&mapping)?;

    assert_eq!(from_list, from_mapping);
    assert_eq!(
        from_list.scenes[0].shots[0].image_prompts,
        ImagePromptSet::new("door opens", "", "door closes")
    );
    Ok(())
}

/// Test that invalid list entries are skipped and the last valid entry wins
#[test]
fn test_normalize_withInvalidListEntries_shouldSkipThem() -> Result<()> {
    let raw = json!({"scenes": [{"scene_id": "S", "shots": [{"shot_id": "1",
        "nano_banana_pro_prompts": [
            {"frame": "start", "prompt": "first"},
            {"frame": "start", "prompt": "second"},
            {"frame": "middle", "prompt": ""},
            {"frame": "closing", "prompt": "unknown frame"},
            {"prompt": "no frame"},
            "not an object"
        ]}]}]});

    let document = common::test_normalizer().normalize(&raw)?;
    let prompts = &document.scenes[0].shots[0].image_prompts;

    assert_eq!(prompts.start, "second");
    assert_eq!(prompts.middle, "");
    assert_eq!(prompts.end, "");
    Ok(())
}

/// Test that order_index follows array position, not any source field
#[test]
fn test_normalize_withSourceIndices_shouldUseArrayPosition() -> Result<()> {
    let raw = json!({"scenes": [{"scene_id": "S", "shots": [
        {"shot_id": "c", "order_index": 9},
        {"shot_id": "a", "order_index": 1},
        {"shot_id": "b"}
    ]}]});

    let document = common::test_normalizer().normalize(&raw)?;
    let order: Vec<(String, usize)> = document.scenes[0]
        .shots
        .iter()
        .map(|shot| (shot.shot_id.clone(), shot.order_index))
        .collect();

    assert_eq!(
        order,
        vec![("c".to_string(), 1), ("a".to_string(), 2), ("b".to_string(), 3)]
    );
    Ok(())
}

/// Test that an empty object yields the default project
#[test]
fn test_normalize_withEmptyObject_shouldUseDefaults() -> Result<()> {
    let document = common::test_normalizer().normalize(&json!({}))?;

    assert_eq!(document.project_name, UNTITLED_PROJECT);
    assert!(document.core_style.is_empty());
    assert!(document.character_references.is_empty());
    assert!(document.scenes.is_empty());
    Ok(())
}

/// Test that a top-level array is rejected as malformed
#[test]
fn test_normalize_withTopLevelArray_shouldFailMalformed() {
    let result = common::test_normalizer().normalize(&json!([1, 2, 3]));

    match result {
        Err(e @ DocumentError::NotAnObject { .. }) => assert!(e.is_malformed()),
        other => panic!("Expected NotAnObject, got {:?}", other),
    }
}

/// Test that a shot without an identifier reports where it is
#[test]
fn test_normalize_withMissingShotId_shouldReportPath() {
    let raw = json!({"scenes": [{"scene_id": "S", "shots": [{"shot_id": "1"}, {"description": "x"}]}]});

    let error = common::test_normalizer().normalize(&raw).unwrap_err();

    assert!(error.is_malformed());
    match error {
        DocumentError::MissingIdentifier { path, field } => {
            assert_eq!(path, "scenes[0].shots[1]");
            assert_eq!(field, "shot_id");
        }
        other => panic!("Expected MissingIdentifier, got {:?}", other),
    }
}

/// Test that a blank scene identifier is treated as missing
#[test]
fn test_normalize_withBlankSceneId_shouldFail() {
    let raw = json!({"scenes": [{"scene_id": "  ", "shots": []}]});

    let error = common::test_normalizer().normalize(&raw).unwrap_err();

    assert!(matches!(error, DocumentError::MissingIdentifier { field: "scene_id", .. }));
}

/// Test that a non-object scene entry is rejected
#[test]
fn test_normalize_withNonObjectScene_shouldFail() {
    let raw = json!({"scenes": ["S01"]});

    let error = common::test_normalizer().normalize(&raw).unwrap_err();

    assert!(matches!(error, DocumentError::InvalidEntry { ref path } if path == "scenes[0]"));
}

/// Test that undecodable text is reported as invalid JSON, not malformed
#[test]
fn test_parseStr_withInvalidJson_shouldFailInvalidJson() {
    let error = common::test_normalizer().parse_str("{\"scenes\": [").unwrap_err();

    assert!(matches!(error, DocumentError::InvalidJson(_)));
    assert!(!error.is_malformed());
}

/// Test that every scene shares the injected project id
#[test]
fn test_normalize_withFixedId_shouldAssignItToEveryScene() -> Result<()> {
    let normalizer = Normalizer::with_id_generator(FixedId("project_001".to_string()));
    let raw = json!({"scenes": [{"scene_id": "S1"}, {"scene_id": "S2"}]});

    let document = normalizer.normalize(&raw)?;

    assert!(document.scenes.iter().all(|scene| scene.project_id == "project_001"));
    Ok(())
}

/// Test that the default normalizer assigns one id per document
#[test]
fn test_normalize_withDefaultGenerator_shouldShareIdWithinDocument() -> Result<()> {
    let raw = json!({"scenes": [{"scene_id": "S1"}, {"scene_id": "S2"}]});

    let document = Normalizer::new().normalize(&raw)?;

    assert!(!document.scenes[0].project_id.is_empty());
    assert_eq!(document.scenes[0].project_id, document.scenes[1].project_id);
    Ok(())
}
