/*!
 * Tests for style block and character reference substitution
 */

use anyhow::Result;
use serde_json::json;
use scenegen::prompts::{CharacterReferenceTable, StyleBlockTable};
use scenegen::{process_all_prompts, PromptProcessor};
use crate::common;

fn processor() -> PromptProcessor {
    let core_style = json!({
        "universal_style_block": {"tone": "noir", "palette": "muted"},
        "Lighting": "low key"
    });
    let references = json!({
        "Murata": "a weary detective",
        "old_man_murata": "an old detective"
    });

    PromptProcessor::new(
        StyleBlockTable::from_core_style(core_style.as_object().unwrap()),
        CharacterReferenceTable::from_map(references.as_object().unwrap()),
    )
}

/// Test that a title-cased token resolves to the flattened block
#[test]
fn test_processPrompt_withTitleCasedToken_shouldInsertFlattenedBlock() {
    let result = processor().process_prompt("[Universal Style Block] establishing shot");

    assert_eq!(result, "tone: noir, palette: muted establishing shot");
}

/// Test that style block lookup ignores case
#[test]
fn test_processPrompt_withOddCasing_shouldStillResolve() {
    let processor = processor();

    assert_eq!(processor.process_prompt("[UNIVERSAL_STYLE_BLOCK]"), "tone: noir, palette: muted");
    assert_eq!(processor.process_prompt("[lighting]"), "low key");
}

/// Test that a reference directive resolves by exact name
#[test]
fn test_processPrompt_withReference_shouldInsertDescription() {
    let result = processor().process_prompt("([Ref: Murata]) enters the room");

    assert_eq!(result, "a weary detective enters the room");
}

/// Test that a reference name falls back to its snake_case form
#[test]
fn test_processPrompt_withSpacedReferenceName_shouldUseSnakeCase() {
    let result = processor().process_prompt("([Ref:   Old Man Murata  ]) waits");

    assert_eq!(result, "an old detective waits");
}

/// Test that unknown placeholders are left untouched
#[test]
fn test_processPrompt_withUnknownPlaceholders_shouldLeaveThemVerbatim() {
    let prompt = "[Missing Block] and ([Ref: Nobody]) in the rain";

    assert_eq!(processor().process_prompt(prompt), prompt);
}

/// Test that processing is idempotent once nothing resolvable remains
#[test]
fn test_processPrompt_twice_shouldBeStable() {
    let processor = processor();
    let once = processor.process_prompt("[Lighting] ([Ref: Murata]) [Unknown]");
    let twice = processor.process_prompt(&once);

    assert_eq!(once, "low key a weary detective [Unknown]");
    assert_eq!(once, twice);
}

/// Test that both placeholder kinds resolve in one prompt
#[test]
fn test_processPrompt_withMixedPlaceholders_shouldResolveBoth() {
    let result = processor().process_prompt("[Lighting], ([Ref: Murata]) at the desk, [Lighting]");

    assert_eq!(result, "low key, a weary detective at the desk, low key");
}

/// Test that every prompt of the sample document is rewritten
#[test]
fn test_processAllPrompts_withSampleDocument_shouldRewritePrompts() -> Result<()> {
    let mut document = common::test_normalizer().parse_str(&common::sample_project_json()?)?;

    let summary = process_all_prompts(&mut document);

    let shot = document.find_shot("S01", "A").expect("shot A exists");
    assert_eq!(shot.image_prompts.start, "tone: noir, palette: muted establishing shot");
    assert_eq!(
        shot.image_prompts.middle,
        "a weary detective in a grey trench coat enters the room, low key, hard shadows"
    );
    assert_eq!(
        shot.image_prompts.end,
        "a young archivist with round glasses looks up from a ledger"
    );
    assert_eq!(
        shot.video_prompt.as_deref(),
        Some("focal_length: 35mm, aperture: 2.8 slow push in as a weary detective in a grey trench coat walks forward")
    );

    let second = document.find_shot("S01", "2").expect("shot 2 exists");
    assert_eq!(second.image_prompts.start, "[Unknown Block] empty desk");
    assert_eq!(second.image_prompts.end, "([Ref: Nobody]) leaves");
    assert_eq!(second.image_prompts.middle, "");

    assert_eq!(summary.prompts_processed, 6);
    assert_eq!(summary.style_blocks_resolved, 3);
    assert_eq!(summary.references_resolved, 3);
    assert_eq!(summary.unresolved_style_blocks, 1);
    assert_eq!(summary.unresolved_references, 1);
    assert!(summary.has_unresolved());
    Ok(())
}

/// Test that style data and references are left as they were
#[test]
fn test_processAllPrompts_shouldNotTouchStyleData() -> Result<()> {
    let mut document = common::test_normalizer().parse_str(&common::sample_project_json()?)?;
    let core_style = document.core_style.clone();
    let references = document.character_references.clone();

    process_all_prompts(&mut document);

    assert_eq!(document.core_style, core_style);
    assert_eq!(document.character_references, references);
    Ok(())
}

/// Test that a document without style data passes prompts through
#[test]
fn test_processAllPrompts_withoutStyleData_shouldKeepPrompts() -> Result<()> {
    let raw = json!({"scenes": [{"scene_id": "S", "shots": [{"shot_id": "1",
        "nano_banana_pro_prompts": {"start": "[Style] plain"},
        "veo_3_1_prompt": "([Ref: Someone]) moves"}]}]});
    let mut document = common::test_normalizer().normalize(&raw)?;

    let summary = process_all_prompts(&mut document);

    let shot = &document.scenes[0].shots[0];
    assert_eq!(shot.image_prompts.start, "[Style] plain");
    assert_eq!(shot.video_prompt.as_deref(), Some("([Ref: Someone]) moves"));
    assert_eq!(summary.unresolved_style_blocks, 1);
    assert_eq!(summary.unresolved_references, 1);
    Ok(())
}

/// Test that a capitalized reference finds a lowercase key
#[test]
fn test_processPrompt_withLowercaseReferenceKey_shouldResolve() {
    let references = json!({"murata": "a tall detective in a grey coat"});
    let processor = PromptProcessor::new(
        StyleBlockTable::new(),
        CharacterReferenceTable::from_map(references.as_object().unwrap()),
    );

    let result = processor.process_prompt("([Ref: Murata]) enters the room");

    assert_eq!(result, "a tall detective in a grey coat enters the room");
}

/// Test that text without placeholders passes through unchanged
#[test]
fn test_processPrompt_withResolvedText_shouldReturnItUnchanged() {
    let processor = processor();
    let prompt = "tone: noir, a weary detective (left) walks in, 35mm";

    assert_eq!(processor.process_prompt(prompt), prompt);
    assert_eq!(processor.process_prompt(""), "");
}

/// Test that text inserted for a style block is not scanned again
#[test]
fn test_processPrompt_withBlockInsideBlockText_shouldNotExpandNested() {
    let core_style = json!({"a": "x [b]", "b": "y"});
    let processor = PromptProcessor::new(
        StyleBlockTable::from_core_style(core_style.as_object().unwrap()),
        CharacterReferenceTable::new(),
    );

    assert_eq!(processor.process_prompt("[a]"), "x [b]");
    assert_eq!(processor.process_prompt("[a] [b]"), "x [b] y");
}
