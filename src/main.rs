// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use scenegen::app_config::{Config, LogLevel};
use scenegen::file_utils::FileManager;
use scenegen::generation::{GenerationPlan, ImageJob, VideoJob};
use scenegen::{Controller, FrameSlot, ProcessedProject};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for FrameSlot to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFrame {
    Start,
    Middle,
    End,
}

impl From<CliFrame> for FrameSlot {
    fn from(frame: CliFrame) -> Self {
        match frame {
            CliFrame::Start => FrameSlot::Start,
            CliFrame::Middle => FrameSlot::Middle,
            CliFrame::End => FrameSlot::End,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize a project document and resolve its prompt placeholders
    Process {
        /// Project document (.json) or a directory of documents
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Output file (single document) or directory (folder input); stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate images and videos for every shot of a project document
    Generate {
        /// Project document (.json)
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Only generate key frame images
        #[arg(long, conflicts_with = "videos_only")]
        images_only: bool,

        /// Only generate shot videos
        #[arg(long)]
        videos_only: bool,

        /// Restrict generation to one scene
        #[arg(long)]
        scene: Option<String>,

        /// Restrict generation to one shot
        #[arg(long)]
        shot: Option<String>,
    },

    /// Generate a single key frame image from a resolved prompt
    Image {
        #[command(flatten)]
        target: ShotTarget,

        /// Frame slot the image is for
        #[arg(long, value_enum)]
        frame: CliFrame,

        /// Resolved prompt text
        #[arg(long)]
        prompt: String,

        /// Reference image to guide generation
        #[arg(long)]
        reference: Option<PathBuf>,
    },

    /// Generate a single shot video from a resolved prompt
    Video {
        #[command(flatten)]
        target: ShotTarget,

        /// Resolved prompt text
        #[arg(long)]
        prompt: String,

        /// Start frame image to animate from
        #[arg(long)]
        start_image: Option<PathBuf>,
    },

    /// Generate shell completions for scenegen
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Where a generated file belongs
#[derive(Args, Debug)]
struct ShotTarget {
    #[arg(long)]
    project_name: String,

    #[arg(long)]
    scene_id: String,

    #[arg(long)]
    shot_id: String,
}

/// scenegen - prompt resolution and media generation for video projects
#[derive(Parser, Debug)]
#[command(name = "scenegen")]
#[command(version)]
#[command(about = "Resolve project prompts and generate key frames and shot videos")]
#[command(long_about = "scenegen reads a project document (scenes, shots, per-shot prompts), resolves
[Style Block] and ([Ref: Character]) placeholders, and generates images and videos.

EXAMPLES:
    scenegen process project.json                    # Print the resolved project
    scenegen process project.json -o resolved.json   # Write it to a file
    scenegen generate project.json --images-only     # Generate all key frames
    scenegen generate project.json --scene S01       # Generate one scene
    scenegen completions bash > scenegen.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in scenegen.json by default. If the file doesn't exist,
    a default one is created. GEMINI_API_KEY and VEO_API_KEY enable the real
    providers; without them placeholder files are generated.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", global = true, default_value = "scenegen.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Root directory for generated files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "scenegen", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Process { input_path, output } => run_process(&controller, &input_path, output.as_deref()),
        Commands::Generate {
            input_path,
            images_only,
            videos_only,
            scene,
            shot,
        } => {
            let plan = GenerationPlan {
                images: !videos_only,
                videos: !images_only,
                scene_id: scene,
                shot_id: shot,
            };
            run_generate(&controller, &input_path, &plan).await
        }
        Commands::Image {
            target,
            frame,
            prompt,
            reference,
        } => {
            let job = ImageJob {
                project_name: target.project_name,
                scene_id: target.scene_id,
                shot_id: target.shot_id,
                frame: frame.into(),
                prompt,
                reference_image: reference,
            };
            let file = controller.generate_image(&job).await?;
            println!("{}", serde_json::to_string_pretty(&file)?);
            Ok(())
        }
        Commands::Video {
            target,
            prompt,
            start_image,
        } => {
            let job = VideoJob {
                project_name: target.project_name,
                scene_id: target.scene_id,
                shot_id: target.shot_id,
                prompt,
                start_image,
            };
            let file = controller.generate_video(&job).await?;
            println!("{}", serde_json::to_string_pretty(&file)?);
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?.with_process_env()?;

    // Command line wins over file and environment
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }

    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

fn run_process(controller: &Controller, input_path: &Path, output: Option<&Path>) -> Result<()> {
    if input_path.is_dir() {
        let output_dir = output.unwrap_or(input_path);
        let projects = controller.load_folder(input_path)?;

        for (source, processed) in &projects {
            let target = Controller::resolved_output_path(source, output_dir);
            write_resolved(processed, Some(&target))?;
        }

        info!("Finished processing {} document(s)", projects.len());
        return Ok(());
    }

    if !input_path.exists() {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    let processed = controller.load_project(input_path)?;
    write_resolved(&processed, output)
}

fn write_resolved(processed: &ProcessedProject, output: Option<&Path>) -> Result<()> {
    let summary = &processed.summary;
    if summary.has_unresolved() {
        warn!(
            "'{}': {} style block placeholder(s) and {} reference(s) left unresolved",
            processed.document.project_name, summary.unresolved_style_blocks, summary.unresolved_references
        );
    }

    let json = serde_json::to_string_pretty(&processed.document)
        .context("Failed to serialize resolved project")?;

    match output {
        Some(path) => {
            FileManager::write_to_file(path, &json)?;
            info!("Success: {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn run_generate(controller: &Controller, input_path: &Path, plan: &GenerationPlan) -> Result<()> {
    let processed = controller.load_project(input_path)?;
    let report = controller.generate_project(&processed.document, plan).await;

    for file in &report.files {
        info!("{} {}", file.file_type, file.relative_path);
    }

    if !report.is_success() {
        return Err(anyhow!(
            "{} generation job(s) failed, see the log above",
            report.failures.len()
        ));
    }

    Ok(())
}
