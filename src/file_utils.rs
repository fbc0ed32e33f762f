use anyhow::{anyhow, Context, Result};
use log::info;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

/// Component used when a name sanitizes to nothing usable
pub const UNNAMED_COMPONENT: &str = "unnamed";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let extension = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(extension) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}

/// Stores generated media under `base/<project>/<scene>/<shot>/<filename>`
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Make a name safe to use as a single directory component.
    ///
    /// Keeps alphanumerics plus space, `.`, `_` and `-`, trims, then turns
    /// spaces into underscores. Names that end up empty or made only of
    /// dots become [`UNNAMED_COMPONENT`].
    pub fn sanitize(name: &str) -> String {
        let kept: String = name
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-'))
            .collect();
        let sanitized = kept.trim().replace(' ', "_");

        if sanitized.chars().all(|c| c == '.') {
            UNNAMED_COMPONENT.to_string()
        } else {
            sanitized
        }
    }

    /// Directory holding the files of one shot, without creating it
    pub fn shot_dir(&self, project_name: &str, scene_id: &str, shot_id: &str) -> PathBuf {
        self.base_dir
            .join(Self::sanitize(project_name))
            .join(Self::sanitize(scene_id))
            .join(Self::sanitize(shot_id))
    }

    /// Build the output path for a file and create its directories.
    pub fn output_path(
        &self,
        project_name: &str,
        scene_id: &str,
        shot_id: &str,
        filename: &str,
    ) -> Result<PathBuf> {
        check_filename(filename)?;

        let dir = self.shot_dir(project_name, scene_id, shot_id);
        FileManager::ensure_dir(&dir)?;

        Ok(dir.join(filename))
    }

    /// Save binary content and return the path it was written to.
    ///
    /// Content goes to a temporary file in the target directory first and is
    /// renamed into place, so readers never see a partial file.
    pub fn save_file(
        &self,
        content: &[u8],
        project_name: &str,
        scene_id: &str,
        shot_id: &str,
        filename: &str,
    ) -> Result<PathBuf> {
        let path = self.output_path(project_name, scene_id, shot_id, filename)?;
        let dir = path
            .parent()
            .ok_or_else(|| anyhow!("Output path has no parent directory: {:?}", path))?;

        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
        temp.write_all(content)
            .with_context(|| format!("Failed to write file: {:?}", path))?;
        temp.persist(&path)
            .with_context(|| format!("Failed to save file: {:?}", path))?;

        info!("File saved: {:?}", path);
        Ok(path)
    }

    /// Path of a stored file relative to the base directory, `/`-separated
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.base_dir).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

fn check_filename(filename: &str) -> Result<()> {
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(anyhow!("Invalid file name: {:?}", filename)),
    }
}
