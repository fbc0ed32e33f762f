use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::{AppError, DocumentError, ProviderError};
use crate::file_utils::{FileManager, FileStorage};
use crate::generation::{
    GeneratedFile, GenerationFailure, GenerationPlan, GenerationReport, ImageJob, VideoJob,
};
use crate::project::{FrameSlot, Normalizer, ProjectDocument, Shot};
use crate::prompts::{process_all_prompts, ProcessingSummary};
use crate::providers::gemini::Gemini;
use crate::providers::veo::Veo;
use crate::providers::{GenerationRequest, MediaKind, MediaProvider};

// @module: Application controller for project processing and generation

/// Suffix of the resolved documents written next to their sources
pub const RESOLVED_SUFFIX: &str = ".resolved.json";

/// A project document after normalization and placeholder resolution
#[derive(Debug, Clone)]
pub struct ProcessedProject {
    pub document: ProjectDocument,
    pub summary: ProcessingSummary,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    storage: FileStorage,
    normalizer: Normalizer,
    image_provider: Arc<dyn MediaProvider>,
    video_provider: Arc<dyn MediaProvider>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;

        let image_provider: Arc<dyn MediaProvider> = Arc::new(Gemini::new(&config.image));
        let video_provider: Arc<dyn MediaProvider> = Arc::new(Veo::new(&config.video));

        Ok(Self::with_providers(config, image_provider, video_provider))
    }

    /// Create a controller with explicit providers
    pub fn with_providers(
        config: Config,
        image_provider: Arc<dyn MediaProvider>,
        video_provider: Arc<dyn MediaProvider>,
    ) -> Self {
        Self {
            storage: FileStorage::new(config.output_dir.clone()),
            normalizer: Normalizer::new(),
            config,
            image_provider,
            video_provider,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Load a project document from disk, normalize it and resolve its prompts.
    pub fn load_project(&self, path: &Path) -> Result<ProcessedProject, AppError> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(DocumentError::UnsupportedFormat(path.display().to_string()).into());
        }

        let size = std::fs::metadata(path)?.len();
        if size > self.config.max_file_size {
            return Err(DocumentError::TooLarge {
                size,
                limit: self.config.max_file_size,
            }
            .into());
        }

        let bytes = std::fs::read(path)?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| DocumentError::InvalidJson(format!("document is not valid UTF-8: {}", e)))?;
        let processed = self.parse_project(text)?;

        info!(
            "Processed {:?}: '{}' with {} scene(s), {} shot(s)",
            path,
            processed.document.project_name,
            processed.document.scenes.len(),
            processed.document.shot_count()
        );
        Ok(processed)
    }

    /// Normalize a JSON document and resolve its prompts.
    pub fn parse_project(&self, text: &str) -> Result<ProcessedProject, AppError> {
        let mut document = self.normalizer.parse_str(text)?;
        let summary = process_all_prompts(&mut document);

        if summary.has_unresolved() {
            debug!(
                "'{}' has {} unresolved style block(s) and {} unresolved reference(s)",
                document.project_name, summary.unresolved_style_blocks, summary.unresolved_references
            );
        }

        Ok(ProcessedProject { document, summary })
    }

    /// Load every `.json` document below a directory, skipping ones that fail.
    ///
    /// Resolved documents (see [`Controller::resolved_output_path`]) are not
    /// sources and are left out.
    pub fn load_folder(&self, dir: &Path) -> Result<Vec<(PathBuf, ProcessedProject)>, AppError> {
        let files: Vec<PathBuf> = FileManager::find_files(dir, "json")
            .map_err(|e| AppError::File(format!("{:#}", e)))?
            .into_iter()
            .filter(|file| {
                let resolved = is_resolved_document(file);
                if resolved {
                    debug!("Skipping resolved document {:?}", file);
                }
                !resolved
            })
            .collect();
        info!("Found {} project document(s) in {:?}", files.len(), dir);

        let mut loaded = Vec::new();
        for file in files {
            match self.load_project(&file) {
                Ok(processed) => loaded.push((file, processed)),
                Err(e) => error!("Skipping {:?}: {}", file, e),
            }
        }

        Ok(loaded)
    }

    /// Where the resolved form of `source` goes inside `output_dir`:
    /// `<stem>.resolved.json`.
    pub fn resolved_output_path(source: &Path, output_dir: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        output_dir.join(format!("{}{}", stem, RESOLVED_SUFFIX))
    }

    /// Generate and store one key frame image.
    pub async fn generate_image(&self, job: &ImageJob) -> Result<GeneratedFile, AppError> {
        let mut request = GenerationRequest::new(job.prompt.clone());
        request.reference_image = job.reference_image.clone();

        let content = self.image_provider.generate(&request).await?;
        self.store(
            MediaKind::Image,
            &content,
            &job.project_name,
            &job.scene_id,
            &job.shot_id,
            &job.file_name(),
        )
    }

    /// Generate and store one shot video.
    pub async fn generate_video(&self, job: &VideoJob) -> Result<GeneratedFile, AppError> {
        let mut request = GenerationRequest::new(job.prompt.clone());
        request.reference_image = job.start_image.clone();

        let content = self.video_provider.generate(&request).await?;
        self.store(
            MediaKind::Video,
            &content,
            &job.project_name,
            &job.scene_id,
            &job.shot_id,
            &job.file_name(),
        )
    }

    /// Generate everything the plan selects, one job at a time.
    ///
    /// Failed jobs are recorded in the report and do not stop the run.
    pub async fn generate_project(&self, project: &ProjectDocument, plan: &GenerationPlan) -> GenerationReport {
        let start_time = Instant::now();
        let mut report = GenerationReport::default();

        let progress_bar = ProgressBar::new(plan.job_count(project) as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} jobs {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style);

        for scene in project.scenes.iter().filter(|scene| plan.includes_scene(scene)) {
            for shot in scene.shots.iter().filter(|shot| plan.includes_shot(shot)) {
                // Start frame produced by this run, if any
                let start_frame = if plan.images {
                    self.generate_shot_images(project, shot, &progress_bar, &mut report).await
                } else {
                    None
                };

                if plan.videos {
                    if let Some(mut job) = VideoJob::for_shot(project, shot) {
                        // A stale frame from an earlier run is only used when this run skips images
                        job.start_image = if plan.images {
                            start_frame
                        } else {
                            self.existing_start_frame(project, shot)
                        };
                        progress_bar.set_message(format!("{} / {} video", shot.scene_id, shot.shot_id));

                        match self.generate_video(&job).await {
                            Ok(file) => report.files.push(file),
                            Err(e) => record_failure(&mut report, shot, "video", e),
                        }
                        progress_bar.inc(1);
                    }
                }
            }
        }

        progress_bar.finish_and_clear();

        info!(
            "Generated {} file(s) with {} failure(s) in {}",
            report.files.len(),
            report.failures.len(),
            Self::format_duration(start_time.elapsed())
        );
        report
    }

    async fn generate_shot_images(
        &self,
        project: &ProjectDocument,
        shot: &Shot,
        progress_bar: &ProgressBar,
        report: &mut GenerationReport,
    ) -> Option<PathBuf> {
        let mut start_frame = None;

        for frame in FrameSlot::ALL {
            if shot.image_prompts.get(frame).trim().is_empty() {
                continue;
            }

            let job = ImageJob::for_shot(project, shot, frame);
            progress_bar.set_message(format!("{} / {} {}", shot.scene_id, shot.shot_id, frame));

            match self.generate_image(&job).await {
                Ok(file) => {
                    if frame == FrameSlot::Start {
                        start_frame = Some(file.file_path.clone());
                    }
                    report.files.push(file);
                }
                Err(e) => record_failure(report, shot, frame.as_str(), e),
            }
            progress_bar.inc(1);
        }

        start_frame
    }

    /// Start frame image of a shot, if one has been generated already
    fn existing_start_frame(&self, project: &ProjectDocument, shot: &Shot) -> Option<PathBuf> {
        let job = ImageJob::for_shot(project, shot, FrameSlot::Start);
        let path = self
            .storage
            .shot_dir(&job.project_name, &job.scene_id, &job.shot_id)
            .join(job.file_name());

        if !FileManager::file_exists(&path) {
            return None;
        }

        info!("Reusing start frame from an earlier run: {:?}", path);
        Some(path)
    }

    fn store(
        &self,
        kind: MediaKind,
        content: &[u8],
        project_name: &str,
        scene_id: &str,
        shot_id: &str,
        file_name: &str,
    ) -> Result<GeneratedFile, AppError> {
        if content.is_empty() {
            return Err(ProviderError::RequestFailed(format!("{} provider returned no content", kind)).into());
        }

        let file_path = self
            .storage
            .save_file(content, project_name, scene_id, shot_id, file_name)
            .map_err(|e| AppError::File(format!("{:#}", e)))?;

        let relative_path = self
            .storage
            .relative_path(&file_path)
            .unwrap_or_else(|| file_name.to_string());

        Ok(GeneratedFile {
            file_id: uuid::Uuid::new_v4().to_string(),
            shot_id: shot_id.to_string(),
            file_type: kind,
            file_path,
            relative_path,
            file_name: file_name.to_string(),
            file_size: content.len() as u64,
            created_at: Local::now().to_rfc3339(),
        })
    }

    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

fn is_resolved_document(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(RESOLVED_SUFFIX))
        .unwrap_or(false)
}

fn record_failure(report: &mut GenerationReport, shot: &Shot, target: &str, error: AppError) {
    warn!("Generation failed for {} / {} {}: {}", shot.scene_id, shot.shot_id, target, error);
    report.failures.push(GenerationFailure {
        scene_id: shot.scene_id.clone(),
        shot_id: shot.shot_id.clone(),
        target: target.to_string(),
        error: error.to_string(),
    });
}
