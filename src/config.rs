//! Configuration - `config.yaml` plus `.env` / process environment

use crate::db::DbConfig;
use crate::error::{LandingError, Result};
use crate::ingestion::LoadOptions;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.yaml";
pub const ENV_FILE: &str = ".env";
pub const DEFAULT_URL_TEMPLATE: &str = "https://{bucket}.s3.{region}.amazonaws.com/{key}";

/// One source (endpoint URL, object key or local path) and its destination table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapping {
    pub source: String,
    pub table: String,
}

impl SourceMapping {
    pub fn new(source: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            table: table.into(),
        }
    }
}

/// YAML mapping `source: table`, kept in file order. An empty section is an empty list.
fn ordered_mapping<'de, D>(deserializer: D) -> std::result::Result<Vec<SourceMapping>, D::Error>
where
    D: Deserializer<'de>,
{
    struct MappingVisitor;

    impl<'de> Visitor<'de> for MappingVisitor {
        type Value = Vec<SourceMapping>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a mapping of source to table name")
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((source, table)) = map.next_entry::<String, String>()? {
                entries.push(SourceMapping { source, table });
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_any(MappingVisitor)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(deserialize_with = "ordered_mapping")]
    pub endpoints: Vec<SourceMapping>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ObjectStorageConfig {
    #[serde(deserialize_with = "ordered_mapping")]
    pub files: Vec<SourceMapping>,

    /// `{bucket}`, `{region}` and `{key}` are substituted
    pub url_template: Option<String>,
    pub bucket_name: Option<String>,
    pub region: Option<String>,
}

impl ObjectStorageConfig {
    pub fn url_template(&self) -> &str {
        self.url_template.as_deref().unwrap_or(DEFAULT_URL_TEMPLATE)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    #[serde(deserialize_with = "ordered_mapping")]
    pub files: Vec<SourceMapping>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DatabaseSection {
    database: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    database: DatabaseSection,
    api: ApiConfig,
    s3: ObjectStorageConfig,
    local: LocalConfig,
    load: LoadOptions,
}

#[derive(Debug, Clone)]
pub struct LandingConfig {
    pub database: DbConfig,
    pub api: ApiConfig,
    pub s3: ObjectStorageConfig,
    pub local: LocalConfig,
    pub load: LoadOptions,
}

impl LandingConfig {
    /// Read `path` and resolve it against the process environment
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LandingError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text, |key| std::env::var(key).ok())
    }

    /// Parse YAML text; `env` resolves environment variables
    pub fn from_yaml_str(text: &str, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw: RawConfig = if text.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };

        let database = env("DB_NAME")
            .or(raw.database.database)
            .ok_or_else(|| LandingError::Config("database.database is not set (or DB_NAME)".to_string()))?;

        let port = match env("DB_PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| LandingError::Config(format!("DB_PORT is not a valid port: {}", port)))?,
            None => 5432,
        };

        let db = DbConfig {
            host: env("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            port,
            database,
            user: env("DB_USER").unwrap_or_else(|| "postgres".to_string()),
            password: env("DB_PASSWORD").unwrap_or_default(),
        };

        let mut s3 = raw.s3;
        if let Some(bucket) = env("S3_BUCKET_NAME") {
            s3.bucket_name = Some(bucket);
        }
        if let Some(region) = env("AWS_REGION") {
            s3.region = Some(region);
        }

        Ok(Self {
            database: db,
            api: raw.api,
            s3,
            local: raw.local,
            load: raw.load,
        })
    }
}

/// Directories searched for `config.yaml` and `.env`: current, parent, executable's, its parent
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("."), PathBuf::from("..")];
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        let parent = exe_dir.parent().map(Path::to_path_buf);
        dirs.push(exe_dir);
        dirs.extend(parent);
    }
    dirs
}

/// `explicit` when given, otherwise the first `config.yaml` in [`search_dirs`]
pub fn locate_config(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(LandingError::Config(format!("config file not found: {}", path.display())))
        };
    }

    search_dirs()
        .into_iter()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| LandingError::Config(format!("{} not found in any search location", CONFIG_FILE)))
}

/// Load `.env` into the process environment. Returns the file used, if any.
/// Variables already set are left untouched.
pub fn load_env_file(explicit: Option<&Path>) -> Option<PathBuf> {
    let candidates = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => search_dirs().into_iter().map(|dir| dir.join(ENV_FILE)).collect(),
    };

    candidates
        .into_iter()
        .filter(|candidate| candidate.is_file())
        .find(|candidate| dotenv::from_path(candidate).is_ok())
}
