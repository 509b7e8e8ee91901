use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::plan::BuildPlan;

/// Dockerfile.yml recipe document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeDocument {
    #[serde(rename = "Maintainers", default)]
    pub maintainers: Vec<String>,
    /// Base image (defaults to ubuntu)
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "User")]
    pub user: Option<String>,
    /// Environment variables, one single-entry map per variable; a null value is empty
    #[serde(rename = "Env", default)]
    pub env: Vec<BTreeMap<String, Option<EnvValue>>>,
    /// Init service started when the container boots
    #[serde(rename = "Service")]
    pub service: Option<String>,
    /// Files added before the RUN block
    #[serde(rename = "Add_Before", default)]
    pub add_before: Vec<FileEntry>,
    #[serde(rename = "Repositories", default)]
    pub repositories: Vec<Repository>,
    /// Packages installed with apt-get
    #[serde(rename = "Packages", default)]
    pub packages: Vec<String>,
    /// Multi-line shell text, one command per line
    #[serde(rename = "Run")]
    pub run: Option<String>,
    /// Files added after the RUN block
    #[serde(rename = "Add_After", default)]
    pub add_after: Vec<FileEntry>,
    #[serde(rename = "Expose", default)]
    pub expose: Vec<u16>,
    #[serde(rename = "Command")]
    pub command: Option<StartupCommand>,
    #[serde(rename = "Work_Dir")]
    pub work_dir: Option<String>,
}

/// An apt repository: either a `deb ...` source line or a `ppa:...` spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "URL")]
    pub url: String,
    /// Signing key imported with apt-key
    #[serde(rename = "Key", default)]
    pub key: Option<String>,
}

/// A staged file, given as a bare source path or a `source: destination` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    Source(String),
    Mapped(BTreeMap<String, String>),
}

/// Startup command, given as a whitespace-separated string or a list of tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartupCommand {
    Line(String),
    Tokens(Vec<String>),
}

/// Right-hand side of an `Env` entry, kept as written.
///
/// YAML scalars are read as their source text, so `2.0` stays `2.0`.
/// Typed TOML values (integers, floats, booleans) are formatted back to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EnvValue(String);

impl EnvValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EnvValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_string(EnvValueVisitor)
    }
}

struct EnvValueVisitor;

impl Visitor<'_> for EnvValueVisitor {
    type Value = EnvValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<EnvValue, E> {
        Ok(EnvValue(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<EnvValue, E> {
        Ok(EnvValue(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<EnvValue, E> {
        Ok(EnvValue(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<EnvValue, E> {
        Ok(EnvValue(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<EnvValue, E> {
        Ok(EnvValue(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<EnvValue, E> {
        Ok(EnvValue(v.to_string()))
    }
}

/// Input syntax of a recipe document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// `.toml` files are TOML; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

impl FileEntry {
    /// Resolve to `(source, destination)`, defaulting the destination to `/`.
    pub fn resolve(&self, section: &'static str) -> crate::Result<(String, String)> {
        match self {
            Self::Source(source) => Ok((source.clone(), crate::plan::DEFAULT_DESTINATION.to_owned())),
            Self::Mapped(map) => {
                let (source, destination) = single_entry(map, section)?;
                Ok((source.clone(), destination.clone()))
            }
        }
    }
}

impl StartupCommand {
    pub fn tokens(&self) -> Vec<String> {
        match self {
            Self::Line(line) => line.split_whitespace().map(str::to_owned).collect(),
            Self::Tokens(tokens) => tokens.clone(),
        }
    }
}

impl RecipeDocument {
    /// Load a recipe document from `path`, picking the parser by extension.
    pub fn load(path: &Path) -> crate::Result<Self> {
        tracing::debug!(path = %path.display(), "loading recipe document");
        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

        match DocumentFormat::from_path(path) {
            DocumentFormat::Yaml => {
                Self::from_yaml_str(&content).map_err(|e| crate::Error::YamlParse {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
            DocumentFormat::Toml => {
                Self::from_toml_str(&content).map_err(|e| crate::Error::TomlParse {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        }
    }

    /// Parse YAML text. A document holding only comments is empty.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        let has_content = content.lines().any(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#') && line != "---"
        });
        if !has_content {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Replay the document into a fresh [`BuildPlan`], section by section.
    pub fn to_plan(&self) -> crate::Result<BuildPlan> {
        let mut plan = BuildPlan::new();

        for maintainer in &self.maintainers {
            plan.add_maintainer(maintainer.as_str());
        }
        if let Some(from) = &self.from {
            plan.set_base_image(from.as_str());
        }
        if let Some(user) = &self.user {
            plan.set_user(user.as_str());
        }
        for entry in &self.env {
            let (key, value) = single_entry(entry, "Env")?;
            let value = value.as_ref().map_or("", EnvValue::as_str);
            plan.add_env_var(key.as_str(), value);
        }
        if let Some(service) = &self.service {
            plan.set_service(service.as_str());
        }
        for entry in &self.add_before {
            let (source, destination) = entry.resolve("Add_Before")?;
            plan.add_file_before(source, destination);
        }
        for repo in &self.repositories {
            if repo.url.starts_with("deb ") {
                plan.add_repository(&repo.name, &repo.url, repo.key.as_deref());
            } else if repo.url.starts_with("ppa:") {
                if repo.key.is_some() {
                    tracing::warn!(repository = %repo.name, "ignoring Key for PPA repository");
                }
                plan.add_ppa(&repo.name, &repo.url);
            } else {
                return Err(crate::Error::UnsupportedRepository {
                    name: repo.name.clone(),
                    url: repo.url.clone(),
                });
            }
        }
        for package in &self.packages {
            plan.install_package(package.as_str());
        }
        if let Some(run) = &self.run {
            for line in run.trim_end().lines() {
                plan.add_run_line(line);
            }
        }
        for entry in &self.add_after {
            let (source, destination) = entry.resolve("Add_After")?;
            plan.add_file_after(source, destination);
        }
        for port in &self.expose {
            plan.expose(*port);
        }
        if let Some(command) = &self.command {
            let tokens = command.tokens();
            if tokens.is_empty() {
                tracing::warn!("ignoring empty Command");
            } else {
                plan.set_startup_command(tokens);
            }
        }
        if let Some(dir) = &self.work_dir {
            plan.set_working_directory(dir.as_str());
        }

        tracing::debug!(
            maintainers = plan.maintainers().len(),
            repositories = self.repositories.len(),
            packages = plan.requested_packages().len(),
            "replayed recipe document"
        );
        Ok(plan)
    }
}

fn single_entry<'a, V>(
    map: &'a BTreeMap<String, V>,
    section: &'static str,
) -> crate::Result<(&'a String, &'a V)> {
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some(entry), None) => Ok(entry),
        _ => Err(crate::Error::InvalidEntry {
            section,
            reason: format!("expected exactly one key, found {}", map.len()),
        }),
    }
}
