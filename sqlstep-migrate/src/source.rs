//! Migration source discovery and parsing.
//!
//! A source is a single `.sql` file whose name starts with its version:
//!
//! ```text
//! migrations/
//! ├── 0001_create_users.sql
//! ├── 0002_add_posts.sql
//! └── 20240105093000_backfill.sql
//! ```
//!
//! Inside the file, comment lines carrying an annotation token switch between
//! the forward and backward bodies:
//!
//! ```sql
//! -- @migrate.up
//! CREATE TABLE users (id BIGINT PRIMARY KEY);
//!
//! -- @migrate.down
//! DROP TABLE users;
//! ```

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{MigrateResult, MigrationError};

/// Default token marking the start of the forward body.
pub const DEFAULT_UP_ANNOTATION: &str = "@migrate.up";

/// Default token marking the start of the backward body.
pub const DEFAULT_DOWN_ANNOTATION: &str = "@migrate.down";

/// SQL line comment marker checked for annotations.
const COMMENT_MARKER: &str = "--";

/// A parsed migration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Version derived from the file name.
    pub version: u64,
    /// Path of the file.
    pub path: PathBuf,
    /// Forward SQL body.
    pub up_sql: String,
    /// Backward SQL body.
    pub down_sql: String,
    /// Set once the source has been committed during the current run.
    pub applied: bool,
    /// Another source with the same version was seen first.
    pub duplicate: bool,
}

impl Source {
    /// Create a source with empty bodies.
    pub fn new(version: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            version,
            path: path.into(),
            up_sql: String::new(),
            down_sql: String::new(),
            applied: false,
            duplicate: false,
        }
    }

    /// Set the forward body.
    pub fn with_up(mut self, sql: impl Into<String>) -> Self {
        self.up_sql = sql.into();
        self
    }

    /// Set the backward body.
    pub fn with_down(mut self, sql: impl Into<String>) -> Self {
        self.down_sql = sql.into();
        self
    }

    /// Base name of the file, for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Annotation tokens separating up and down bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotations {
    /// Token that starts the up body.
    pub up: String,
    /// Token that starts the down body.
    pub down: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            up: DEFAULT_UP_ANNOTATION.to_string(),
            down: DEFAULT_DOWN_ANNOTATION.to_string(),
        }
    }
}

impl Annotations {
    /// Create annotation tokens.
    pub fn new(up: impl Into<String>, down: impl Into<String>) -> Self {
        Self {
            up: up.into(),
            down: down.into(),
        }
    }

    /// Template used when scaffolding a new source file.
    pub fn template(&self) -> String {
        format!("-- {}\n\n\n-- {}\n\n", self.up, self.down)
    }
}

/// Which body subsequent lines are appended to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureMode {
    /// Before the first annotation; lines are dropped.
    #[default]
    Neutral,
    /// Appending to the up body.
    Up,
    /// Appending to the down body.
    Down,
}

impl CaptureMode {
    /// Mode selected by an annotation line, if the line is one.
    fn from_line(line: &str, annotations: &Annotations) -> Option<Self> {
        if !line.starts_with(COMMENT_MARKER) {
            return None;
        }
        if line.contains(&annotations.down) {
            Some(Self::Down)
        } else if line.contains(&annotations.up) {
            Some(Self::Up)
        } else {
            None
        }
    }
}

/// Derive the version from a file name: its maximal leading run of decimal digits.
///
/// `"0000001.sql"` is 1, `"200_aaa.sql"` is 200 and `"111aaa.sql"` is 111.
/// A name without leading digits, or whose digits are zero, is rejected.
pub fn version_from_filename(name: &str) -> MigrateResult<u64> {
    let digits = name
        .find(|c: char| !c.is_ascii_digit())
        .map_or(name, |end| &name[..end]);

    if digits.is_empty() {
        return Err(MigrationError::parse(name, "file name has no leading version"));
    }

    match digits.parse::<u64>() {
        Ok(0) => Err(MigrationError::parse(name, "version must be greater than zero")),
        Ok(version) => Ok(version),
        Err(e) => Err(MigrationError::parse(name, format!("invalid version: {}", e))),
    }
}

/// Split file content into (up, down) bodies.
pub fn split_bodies(content: &str, annotations: &Annotations) -> (String, String) {
    let mut up = String::new();
    let mut down = String::new();
    let mut mode = CaptureMode::Neutral;

    for line in content.split_inclusive('\n') {
        if let Some(next) = CaptureMode::from_line(line, annotations) {
            mode = next;
            continue;
        }
        match mode {
            CaptureMode::Neutral => {}
            CaptureMode::Up => up.push_str(line),
            CaptureMode::Down => down.push_str(line),
        }
    }

    (up, down)
}

/// Reads sources out of one or more directories.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    dirs: Vec<PathBuf>,
    annotations: Annotations,
}

impl SourceLoader {
    /// Create a loader over the given directories.
    pub fn new(dirs: Vec<PathBuf>, annotations: Annotations) -> Self {
        Self { dirs, annotations }
    }

    /// Directories scanned by this loader.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Read a single source file.
    pub async fn read_source(&self, path: &Path) -> MigrateResult<Source> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MigrationError::parse(path, "invalid file name"))?;

        let version = version_from_filename(name).map_err(|e| match e {
            MigrationError::Parse { message, .. } => MigrationError::parse(path, message),
            other => other,
        })?;

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MigrationError::parse(path, e.to_string()))?;

        let (up_sql, down_sql) = split_bodies(&content, &self.annotations);
        debug!(
            path = %path.display(),
            version,
            up_bytes = up_sql.len(),
            down_bytes = down_sql.len(),
            "Parsed migration source"
        );

        Ok(Source::new(version, path)
            .with_up(up_sql)
            .with_down(down_sql))
    }

    /// Glob every `*.sql` file in every directory and return them sorted by version.
    ///
    /// Sources sharing a version are all kept; duplicates are flagged during reconciliation.
    pub async fn load(&self) -> MigrateResult<Vec<Source>> {
        let mut sources = Vec::new();

        for dir in &self.dirs {
            let pattern = dir.join("*.sql");
            let pattern = pattern.to_string_lossy();
            let paths = glob::glob(&pattern)
                .map_err(|e| MigrationError::parse(dir, format!("invalid source directory: {}", e)))?;

            for entry in paths {
                let path = entry.map_err(|e| MigrationError::parse(e.path(), e.to_string()))?;
                sources.push(self.read_source(&path).await?);
            }
        }

        // Stable, so same-version files keep their discovery order.
        sources.sort_by_key(|s| s.version);
        Ok(sources)
    }
}

/// Write an empty, annotated source file named `<timestamp>_<name>.sql` into `dir`.
pub async fn write_template(
    dir: impl AsRef<Path>,
    name: &str,
    annotations: &Annotations,
) -> MigrateResult<PathBuf> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;

    let file_name = format!("{}_{}.sql", Utc::now().format("%Y%m%d%H%M%S"), name);
    let path = dir.join(file_name);

    create_new_file(&path, &annotations.template()).await?;
    Ok(path)
}

/// Create `path` with `content`, failing if it already exists.
async fn create_new_file(path: &Path, content: &str) -> MigrateResult<()> {
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(MigrationError::config(format!(
                "source already exists: {}",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
