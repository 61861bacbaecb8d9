//! CLI configuration handling.
//!
//! A configuration file holds one TOML table per section:
//!
//! ```toml
//! [main]
//! driver = "postgres"
//! dsn = "postgres://${PGUSER}@localhost/app"
//! source_dir = ["migrations/main"]
//! ```

use serde::Deserialize;
use sqlstep_migrate::{Annotations, DEFAULT_VERSION_TABLE, MigrationConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::env::{EnvExpander, EnvSource};
use crate::error::{CliError, CliResult};

/// Default config file name (lives in project root)
pub const CONFIG_FILE_NAME: &str = "sqlstep.toml";

/// All sections of a configuration file, by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Config {
    /// Sections keyed by table name.
    pub sections: BTreeMap<String, SectionConfig>,
}

/// One or many source directories.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SourceDirs {
    /// `source_dir = "migrations"`
    One(String),
    /// `source_dir = ["a", "b"]`
    Many(Vec<String>),
}

impl Default for SourceDirs {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl SourceDirs {
    /// Directories in configured order.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(dir) => vec![dir.clone()],
            Self::Many(dirs) => dirs.clone(),
        }
    }
}

/// Raw settings of one section, before environment expansion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionConfig {
    /// Database driver (postgres, mysql, sqlite)
    pub driver: String,
    /// Connection string
    pub dsn: String,
    /// Directories holding `*.sql` sources
    pub source_dir: SourceDirs,
    /// Bookkeeping table name
    pub version_table: Option<String>,
    /// Token marking the start of the up body
    pub up_annotation: Option<String>,
    /// Token marking the start of the down body
    pub down_annotation: Option<String>,
    /// Versions at or below this number are ignored
    #[serde(alias = "start_version")]
    pub version_floor: u64,
    /// Structured output for this section
    pub json: bool,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        content.parse()
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> CliResult<&SectionConfig> {
        self.sections
            .get(name)
            .ok_or_else(|| CliError::Config(format!("section does not exist: {}", name)))
    }

    /// Build the engine configuration for a section, expanding environment references.
    pub fn migration_config<S: EnvSource>(
        &self,
        name: &str,
        expander: &EnvExpander<S>,
    ) -> CliResult<MigrationConfig> {
        self.section(name)?.resolve(name, expander)
    }
}

impl std::str::FromStr for Config {
    type Err = CliError;

    fn from_str(content: &str) -> CliResult<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl SectionConfig {
    /// Expand and validate into an engine configuration.
    pub fn resolve<S: EnvSource>(
        &self,
        name: &str,
        expander: &EnvExpander<S>,
    ) -> CliResult<MigrationConfig> {
        if self.driver.trim().is_empty() {
            return Err(CliError::Config(format!("driver is not set in section {}", name)));
        }

        let defaults = Annotations::default();
        let annotations = Annotations::new(
            self.up_annotation.clone().unwrap_or(defaults.up),
            self.down_annotation.clone().unwrap_or(defaults.down),
        );
        if annotations.up.is_empty() || annotations.down.is_empty() || annotations.up == annotations.down {
            return Err(CliError::Config(format!(
                "up and down annotations must be distinct and non-empty in section {}",
                name
            )));
        }

        let version_table = match &self.version_table {
            Some(table) => expander.expand(table)?,
            None => DEFAULT_VERSION_TABLE.to_string(),
        };

        let mut config = MigrationConfig::new(name)
            .driver(self.driver.trim())
            .dsn(expander.expand(&self.dsn)?)
            .version_table(version_table)
            .annotations(annotations)
            .version_floor(self.version_floor)
            .json(self.json);
        for dir in self.source_dir.to_vec() {
            config = config.source_dir(PathBuf::from(expander.expand(&dir)?));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::env::MapEnvSource;

    const SAMPLE: &str = r#"
[main]
driver = "postgres"
dsn = "postgres://${DB_USER}@localhost/app"
source_dir = ["migrations/main", "migrations/shared"]

[audit]
driver = "sqlite"
dsn = "${AUDIT_DB:-audit.db}"
source_dir = "migrations/audit"
version_table = "audit_versions"
up_annotation = "+up"
down_annotation = "+down"
start_version = 20240101000000
json = true
"#;

    fn expander() -> EnvExpander<MapEnvSource> {
        EnvExpander::with_source(MapEnvSource::new().set("DB_USER", "deploy"))
    }

    #[test]
    fn test_parse_sections() {
        let config: Config = SAMPLE.parse().unwrap();
        assert_eq!(config.sections.len(), 2);
        assert_eq!(
            config.section("main").unwrap().source_dir.to_vec(),
            vec!["migrations/main", "migrations/shared"]
        );
        assert_eq!(
            config.section("audit").unwrap().source_dir,
            SourceDirs::One("migrations/audit".into())
        );
    }

    #[test]
    fn test_resolve_defaults_and_expansion() {
        let config: Config = SAMPLE.parse().unwrap();
        let main = config.migration_config("main", &expander()).unwrap();

        assert_eq!(main.section, "main");
        assert_eq!(main.driver, "postgres");
        assert_eq!(main.dsn, "postgres://deploy@localhost/app");
        assert_eq!(main.version_table, DEFAULT_VERSION_TABLE);
        assert_eq!(main.annotations, Annotations::default());
        assert_eq!(main.version_floor, 0);
        assert_eq!(
            main.source_dirs,
            vec![PathBuf::from("migrations/main"), PathBuf::from("migrations/shared")]
        );
    }

    #[test]
    fn test_resolve_overrides() {
        let config: Config = SAMPLE.parse().unwrap();
        let audit = config.migration_config("audit", &expander()).unwrap();

        assert_eq!(audit.dsn, "audit.db");
        assert_eq!(audit.version_table, "audit_versions");
        assert_eq!(audit.annotations, Annotations::new("+up", "+down"));
        assert_eq!(audit.version_floor, 20240101000000);
        assert!(audit.json);
    }

    #[test]
    fn test_unknown_section() {
        let config: Config = SAMPLE.parse().unwrap();
        let err = config.migration_config("reports", &expander()).unwrap_err();
        assert!(err.to_string().contains("section does not exist: reports"));
    }

    #[test]
    fn test_unset_variable_is_config_error() {
        let config: Config = SAMPLE.parse().unwrap();
        let bare = EnvExpander::with_source(MapEnvSource::new());
        assert!(matches!(
            config.migration_config("main", &bare),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_missing_driver() {
        let config: Config = "[main]\ndsn = \"x\"\n".parse().unwrap();
        assert!(config.migration_config("main", &expander()).is_err());
    }

    #[test]
    fn test_identical_annotations_rejected() {
        let config: Config =
            "[main]\ndriver = \"sqlite\"\nup_annotation = \"x\"\ndown_annotation = \"x\"\n"
                .parse()
                .unwrap();
        assert!(config.migration_config("main", &expander()).is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: CliResult<Config> = "[main]\ndriver = \"sqlite\"\ndatabase = \"x\"\n".parse();
        assert!(result.is_err());
    }
}
