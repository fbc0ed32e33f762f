/*!
 * Normalizer for loosely structured project documents.
 *
 * Documents come from several generations of authoring tools, so the
 * normalizer accepts every historical shape it knows about and fills
 * optional data with deterministic defaults. It only fails when no valid
 * tree can be built at all: a non-object document, a non-object scene or
 * shot entry, or a scene/shot without an identifier.
 */

use log::debug;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::errors::DocumentError;
use crate::project::model::{
    FrameSlot, ImagePromptSet, ProjectDocument, Scene, Shot, UNTITLED_PROJECT,
};

/// Source of project identifiers for normalized documents.
///
/// Documents do not carry a trustworthy project id, so the caller decides
/// how one is assigned.
pub trait IdGenerator: Send + Sync {
    /// Produce the project id for a document with the given name
    fn project_id(&self, project_name: &str) -> String;
}

/// Assigns a fresh random UUID to every document
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn project_id(&self, _project_name: &str) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Assigns the same caller-chosen id to every document
#[derive(Debug, Clone)]
pub struct FixedId(pub String);

impl IdGenerator for FixedId {
    fn project_id(&self, _project_name: &str) -> String {
        self.0.clone()
    }
}

/// Converts decoded JSON into a [`ProjectDocument`]
#[derive(Debug, Clone, Default)]
pub struct Normalizer<G = UuidIdGenerator> {
    id_generator: G,
}

impl Normalizer {
    /// Create a normalizer that assigns random project ids
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: IdGenerator> Normalizer<G> {
    /// Create a normalizer with a caller-supplied id generator
    pub fn with_id_generator(id_generator: G) -> Self {
        Self { id_generator }
    }

    /// Decode a JSON string and normalize it.
    pub fn parse_str(&self, text: &str) -> Result<ProjectDocument, DocumentError> {
        let raw: Value =
            serde_json::from_str(text).map_err(|e| DocumentError::InvalidJson(e.to_string()))?;
        self.normalize(&raw)
    }

    /// Normalize an already decoded document.
    pub fn normalize(&self, raw: &Value) -> Result<ProjectDocument, DocumentError> {
        let root = raw.as_object().ok_or(DocumentError::NotAnObject {
            found: json_type_name(raw),
        })?;

        let project_name = root
            .get("project")
            .and_then(Value::as_str)
            .unwrap_or(UNTITLED_PROJECT)
            .to_string();
        let core_style = object_or_empty(root.get("core_style"));
        let character_references = object_or_empty(root.get("character_references"));

        let project_id = self.id_generator.project_id(&project_name);

        let scenes = array_items(root.get("scenes"))
            .iter()
            .enumerate()
            .map(|(index, raw_scene)| {
                normalize_scene(raw_scene, &format!("scenes[{}]", index), &project_id)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Normalized project '{}' with {} scene(s)",
            project_name,
            scenes.len()
        );

        Ok(ProjectDocument {
            project_name,
            core_style,
            character_references,
            scenes,
        })
    }
}

fn normalize_scene(raw: &Value, path: &str, project_id: &str) -> Result<Scene, DocumentError> {
    let entry = raw.as_object().ok_or_else(|| DocumentError::InvalidEntry {
        path: path.to_string(),
    })?;

    let scene_id = identifier(entry, "scene_id", path)?;

    let shots = array_items(entry.get("shots"))
        .iter()
        .enumerate()
        .map(|(index, raw_shot)| {
            normalize_shot(raw_shot, &format!("{}.shots[{}]", path, index), &scene_id, index + 1)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Scene {
        scene_id,
        project_id: project_id.to_string(),
        title: optional_string(entry, "scene_title"),
        timestamp: optional_string(entry, "timestamp"),
        shots,
    })
}

fn normalize_shot(
    raw: &Value,
    path: &str,
    scene_id: &str,
    order_index: usize,
) -> Result<Shot, DocumentError> {
    let entry = raw.as_object().ok_or_else(|| DocumentError::InvalidEntry {
        path: path.to_string(),
    })?;

    let shot_id = identifier(entry, "shot_id", path)?;
    let description = optional_string(entry, "description");

    Ok(Shot {
        shot_id,
        scene_id: scene_id.to_string(),
        // Legacy documents have no dedicated name field
        name: Some(description.clone().unwrap_or_default()),
        description,
        order_index,
        image_prompts: normalize_image_prompts(entry.get("nano_banana_pro_prompts"), path),
        video_prompt: optional_string(entry, "veo_3_1_prompt"),
    })
}

/// Build the three-slot prompt set from either the list shape
/// (`[{"frame": "start", "prompt": "..."}]`) or the mapping shape
/// (`{"start": "...", "middle": "...", "end": "..."}`).
pub fn normalize_image_prompts(raw: Option<&Value>, path: &str) -> ImagePromptSet {
    let partial = match raw {
        Some(Value::Array(entries)) => prompts_from_list(entries, path),
        Some(Value::Object(mapping)) => prompts_from_mapping(mapping),
        _ => HashMap::new(),
    };

    let mut prompts = ImagePromptSet::default();
    for (slot, text) in partial {
        *prompts.get_mut(slot) = text;
    }
    prompts
}

fn prompts_from_list(entries: &[Value], path: &str) -> HashMap<FrameSlot, String> {
    let mut partial = HashMap::new();

    for (index, entry) in entries.iter().enumerate() {
        let frame = entry.get("frame").and_then(Value::as_str).unwrap_or("");
        let prompt = entry.get("prompt").and_then(Value::as_str).unwrap_or("");

        if frame.is_empty() || prompt.is_empty() {
            debug!(
                "Skipping {}.nano_banana_pro_prompts[{}]: missing frame or prompt",
                path, index
            );
            continue;
        }

        match frame.parse::<FrameSlot>() {
            // Later entries for the same frame win
            Ok(slot) => {
                partial.insert(slot, prompt.to_string());
            }
            Err(_) => debug!(
                "Skipping {}.nano_banana_pro_prompts[{}]: unknown frame '{}'",
                path, index, frame
            ),
        }
    }

    partial
}

fn prompts_from_mapping(mapping: &Map<String, Value>) -> HashMap<FrameSlot, String> {
    FrameSlot::ALL
        .into_iter()
        .filter_map(|slot| {
            mapping
                .get(slot.as_str())
                .and_then(Value::as_str)
                .map(|text| (slot, text.to_string()))
        })
        .collect()
}

fn identifier(
    entry: &Map<String, Value>,
    field: &'static str,
    path: &str,
) -> Result<String, DocumentError> {
    let value = match entry.get(field) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    if value.is_empty() {
        return Err(DocumentError::MissingIdentifier {
            path: path.to_string(),
            field,
        });
    }

    Ok(value)
}

fn optional_string(entry: &Map<String, Value>, field: &str) -> Option<String> {
    entry.get(field).and_then(Value::as_str).map(str::to_string)
}

fn object_or_empty(value: Option<&Value>) -> Map<String, Value> {
    value.and_then(Value::as_object).cloned().unwrap_or_default()
}

fn array_items(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
