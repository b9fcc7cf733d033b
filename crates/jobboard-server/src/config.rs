use jobboard::DatabaseConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "jobboard.toml";
const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Config file the settings came from; `None` when read from the environment.
    pub source: Option<PathBuf>,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: ServerConfig,
    database: DatabaseConfig,
}

impl AppConfig {
    /// Load `.env`, then `JOBBOARD_CONFIG` (or `./jobboard.toml` if present), falling
    /// back to `DB_*` / `DATABASE_URL` and `JOBBOARD_LISTEN` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => anyhow::bail!("failed to load .env: {e}"),
        }

        if let Ok(path) = std::env::var("JOBBOARD_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            return Self::from_file(default.to_path_buf());
        }
        Self::from_env()
    }

    pub fn from_file(path: PathBuf) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        let mut config = Self::from_toml_str(&raw, |key| std::env::var(key).ok())
            .map_err(|e| anyhow::anyhow!("{}: {e:#}", path.display()))?;
        config.source = Some(path);
        Ok(config)
    }

    /// Parse TOML and expand `${VAR}` references in string settings through `lookup`.
    pub fn from_toml_str(
        raw: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let file: ConfigFile =
            toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        let mut config = Self {
            source: None,
            server: file.server,
            database: file.database,
        };
        config.expand_env(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let database = DatabaseConfig::from_env()?;
        let listen = std::env::var("JOBBOARD_LISTEN").unwrap_or_else(|_| default_listen());
        let config = Self {
            source: None,
            server: ServerConfig { listen },
            database,
        };
        config.validate()?;
        Ok(config)
    }

    fn expand_env(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        self.server.listen = expand_env_vars(&self.server.listen, lookup)?;
        let db = &mut self.database;
        for field in [
            &mut db.host,
            &mut db.dbname,
            &mut db.username,
            &mut db.password,
        ] {
            *field = expand_env_vars(field, lookup)?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.listen.trim().is_empty() {
            anyhow::bail!("server.listen must not be empty");
        }
        if self.database.host.trim().is_empty() {
            anyhow::bail!("database.host must not be empty");
        }
        if self.database.dbname.trim().is_empty() {
            anyhow::bail!("database.dbname must not be empty");
        }
        Ok(())
    }
}

fn expand_env_vars(
    input: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            anyhow::bail!("unterminated env var reference: ${{{after}");
        };
        let key = &after[..end];
        if key.is_empty() {
            anyhow::bail!("invalid env var reference: ${{}}");
        }
        let value =
            lookup(key).ok_or_else(|| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}
