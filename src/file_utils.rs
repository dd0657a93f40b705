use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use uuid::Uuid;

// @module: File and directory utilities

/// Video container extensions handled by the pipeline
const VIDEO_EXTENSIONS: [&str; 9] = [
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg",
];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Check whether a path has a recognized video container extension
    pub fn is_video_file<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        if !path.is_file() {
            return false;
        }

        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                VIDEO_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// Find all video files under a directory (recursive)
    pub fn find_video_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if Self::is_video_file(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// File stem of a path, or "output" when the path has none
    pub fn stem<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("output"))
    }

    // @generates: Subtitle output path for an input video
    // @params: input_file, output_dir, language tag
    pub fn subtitle_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        language: &str,
    ) -> PathBuf {
        let mut filename = Self::stem(input_file);
        filename.push('.');
        filename.push_str(language);
        filename.push_str(".srt");

        output_dir.as_ref().join(filename)
    }

    // @generates: Muxed video output path for an input video
    pub fn video_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
    ) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("{}.mp4", Self::stem(input_file)))
    }

    /// Transient artifact path in the scratch directory
    ///
    /// Names are derived from the input video's stem plus a per-job unique
    /// suffix, so two jobs over videos sharing a base name never collide in
    /// the shared scratch directory.
    pub fn transient_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        scratch_dir: P1,
        input_file: P2,
        extension: &str,
    ) -> PathBuf {
        let suffix = Uuid::new_v4().simple().to_string();
        scratch_dir.as_ref().join(format!(
            "{}.{}.{}",
            Self::stem(input_file),
            &suffix[..8],
            extension
        ))
    }

    /// Remove a file if it exists, ignoring failure
    pub fn remove_quietly<P: AsRef<Path>>(path: P) {
        let path = path.as_ref();
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }
}
