/*!
 * Generation jobs and their results.
 *
 * A job carries resolved prompt text plus where the output belongs
 * (project, scene, shot). Results describe the stored file.
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::project::{FrameSlot, ProjectDocument, Scene, Shot};
use crate::providers::MediaKind;

/// Request to generate one key frame image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageJob {
    pub project_name: String,
    pub scene_id: String,
    pub shot_id: String,
    pub frame: FrameSlot,
    pub prompt: String,
    pub reference_image: Option<PathBuf>,
}

impl ImageJob {
    /// Job for one frame slot of a resolved shot
    pub fn for_shot(project: &ProjectDocument, shot: &Shot, frame: FrameSlot) -> Self {
        Self {
            project_name: project.project_name.clone(),
            scene_id: shot.scene_id.clone(),
            shot_id: shot.shot_id.clone(),
            frame,
            prompt: shot.image_prompts.get(frame).to_string(),
            reference_image: None,
        }
    }

    /// `<scene>_<shot>_<frame>.png`
    pub fn file_name(&self) -> String {
        format!("{}_{}_{}.png", self.scene_id, self.shot_id, self.frame)
    }
}

/// Request to generate the video for one shot
#[derive(Debug, Clone, PartialEq)]
pub struct VideoJob {
    pub project_name: String,
    pub scene_id: String,
    pub shot_id: String,
    pub prompt: String,
    /// Start frame the video should animate from
    pub start_image: Option<PathBuf>,
}

impl VideoJob {
    /// Job for a resolved shot, or `None` when the shot has no video prompt
    pub fn for_shot(project: &ProjectDocument, shot: &Shot) -> Option<Self> {
        let prompt = shot.video_prompt.as_deref().filter(|p| !p.trim().is_empty())?;
        Some(Self {
            project_name: project.project_name.clone(),
            scene_id: shot.scene_id.clone(),
            shot_id: shot.shot_id.clone(),
            prompt: prompt.to_string(),
            start_image: None,
        })
    }

    /// `<scene>_<shot>_video.mp4`
    pub fn file_name(&self) -> String {
        format!("{}_{}_video.mp4", self.scene_id, self.shot_id)
    }
}

/// A generated and stored file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub file_id: String,
    pub shot_id: String,
    pub file_type: MediaKind,
    pub file_path: PathBuf,
    /// Path under the output directory with `/` separators
    pub relative_path: String,
    pub file_name: String,
    pub file_size: u64,
    /// RFC 3339 timestamp
    pub created_at: String,
}

/// Which parts of a project a batch run generates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub images: bool,
    pub videos: bool,
    /// Restrict to one scene
    pub scene_id: Option<String>,
    /// Restrict to one shot id (within the selected scenes)
    pub shot_id: Option<String>,
}

impl Default for GenerationPlan {
    fn default() -> Self {
        Self {
            images: true,
            videos: true,
            scene_id: None,
            shot_id: None,
        }
    }
}

impl GenerationPlan {
    pub fn images_only() -> Self {
        Self {
            videos: false,
            ..Self::default()
        }
    }

    pub fn videos_only() -> Self {
        Self {
            images: false,
            ..Self::default()
        }
    }

    pub fn includes_scene(&self, scene: &Scene) -> bool {
        self.scene_id.as_deref().is_none_or(|id| id == scene.scene_id)
    }

    pub fn includes_shot(&self, shot: &Shot) -> bool {
        self.shot_id.as_deref().is_none_or(|id| id == shot.shot_id)
    }

    /// Number of provider calls this plan makes for the project
    pub fn job_count(&self, project: &ProjectDocument) -> usize {
        project
            .scenes
            .iter()
            .filter(|scene| self.includes_scene(scene))
            .flat_map(|scene| scene.shots.iter())
            .filter(|shot| self.includes_shot(shot))
            .map(|shot| {
                let images = if self.images {
                    shot.image_prompts.iter().filter(|(_, p)| !p.trim().is_empty()).count()
                } else {
                    0
                };
                let videos = usize::from(self.videos && VideoJob::for_shot(project, shot).is_some());
                images + videos
            })
            .sum()
    }
}

/// A job that failed during a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationFailure {
    pub scene_id: String,
    pub shot_id: String,
    /// `start`, `middle`, `end` or `video`
    pub target: String,
    pub error: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    pub files: Vec<GeneratedFile>,
    pub failures: Vec<GenerationFailure>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
