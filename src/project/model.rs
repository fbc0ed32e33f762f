/*!
 * Normalized project tree.
 *
 * The serde names follow the keys used by project documents so the resolved
 * tree can be written back out and read by the same downstream tools.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Project name used when the document does not carry one
pub const UNTITLED_PROJECT: &str = "Untitled Project";

/// A fully normalized project document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// Human readable project name
    #[serde(rename = "project")]
    pub project_name: String,

    /// Raw style block definitions, flattened later by the prompt processor
    #[serde(default)]
    pub core_style: Map<String, Value>,

    /// Raw character reference definitions
    #[serde(default)]
    pub character_references: Map<String, Value>,

    /// Scenes in source order
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl ProjectDocument {
    /// Iterate over every shot of every scene in source order.
    pub fn shots(&self) -> impl Iterator<Item = &Shot> {
        self.scenes.iter().flat_map(|scene| scene.shots.iter())
    }

    /// Find a shot by scene and shot identifier.
    pub fn find_shot(&self, scene_id: &str, shot_id: &str) -> Option<&Shot> {
        self.scenes
            .iter()
            .find(|scene| scene.scene_id == scene_id)
            .and_then(|scene| scene.shots.iter().find(|shot| shot.shot_id == shot_id))
    }

    /// Total number of shots across all scenes
    pub fn shot_count(&self) -> usize {
        self.scenes.iter().map(|scene| scene.shots.len()).sum()
    }
}

/// A scene: an ordered group of shots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_id: String,

    /// Owning project identifier, assigned during normalization
    pub project_id: String,

    #[serde(rename = "scene_title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub shots: Vec<Shot>,
}

/// A single shot with its image and video prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub shot_id: String,

    /// Identifier of the parent scene (a back-reference, not ownership)
    pub scene_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 1-based position within the parent scene
    pub order_index: usize,

    #[serde(rename = "nano_banana_pro_prompts", default)]
    pub image_prompts: ImagePromptSet,

    #[serde(rename = "veo_3_1_prompt", default, skip_serializing_if = "Option::is_none")]
    pub video_prompt: Option<String>,
}

/// The three key frames of a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameSlot {
    Start,
    Middle,
    End,
}

impl FrameSlot {
    /// All slots in display order
    pub const ALL: [FrameSlot; 3] = [FrameSlot::Start, FrameSlot::Middle, FrameSlot::End];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

impl fmt::Display for FrameSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameSlot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "start" => Ok(Self::Start),
            "middle" => Ok(Self::Middle),
            "end" => Ok(Self::End),
            _ => Err(anyhow::anyhow!("Invalid frame slot: {} (expected start, middle or end)", s)),
        }
    }
}

/// Image prompts for the start, middle and end frames of a shot.
///
/// Slots that were absent from the source are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePromptSet {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub middle: String,
    #[serde(default)]
    pub end: String,
}

impl ImagePromptSet {
    pub fn new(start: impl Into<String>, middle: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            middle: middle.into(),
            end: end.into(),
        }
    }

    pub fn get(&self, slot: FrameSlot) -> &str {
        match slot {
            FrameSlot::Start => &self.start,
            FrameSlot::Middle => &self.middle,
            FrameSlot::End => &self.end,
        }
    }

    pub fn get_mut(&mut self, slot: FrameSlot) -> &mut String {
        match slot {
            FrameSlot::Start => &mut self.start,
            FrameSlot::Middle => &mut self.middle,
            FrameSlot::End => &mut self.end,
        }
    }

    /// Slots paired with their prompt text, in frame order
    pub fn iter(&self) -> impl Iterator<Item = (FrameSlot, &str)> {
        FrameSlot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }
}
