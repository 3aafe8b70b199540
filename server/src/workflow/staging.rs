use anyhow::Context;
use antcore::LogFile;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use tempfile::TempDir;

const STAGING_PREFIX: &str = "adif-analysis-";

/// Basename of an uploaded file name, restricted to `[A-Za-z0-9._-]`.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(|c| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload.adi".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Per-request scratch directory. Removed with everything in it on drop.
pub struct StagingArea {
    dir: TempDir,
    logs: Vec<LogFile>,
}

impl StagingArea {
    pub fn new(root: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);
        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root)
                    .with_context(|| format!("creating staging root {}", root.display()))?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .context("creating request staging directory")?;
        Ok(Self {
            dir,
            logs: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Opens a new staged file; the upload index keeps identical names apart.
    pub fn create(&mut self, filename: &str) -> io::Result<File> {
        let staged_name = format!("{:02}-{}", self.logs.len(), sanitize_filename(filename));
        let path = self.dir.path().join(staged_name);
        let file = File::create(&path)?;
        self.logs.push(LogFile {
            name: filename.to_string(),
            path,
        });
        Ok(file)
    }

    pub fn stage(&mut self, filename: &str, content: &[u8]) -> io::Result<&LogFile> {
        let mut file = self.create(filename)?;
        file.write_all(content)?;
        file.flush()?;
        self.logs
            .last()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "staged file vanished"))
    }

    pub fn logs(&self) -> &[LogFile] {
        &self.logs
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}
