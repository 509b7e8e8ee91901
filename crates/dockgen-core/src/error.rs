use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load recipe document from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse YAML recipe document at {path}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("failed to parse TOML recipe document at {path}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Document replay ──
    #[error("invalid {section} entry: {reason}")]
    InvalidEntry {
        section: &'static str,
        reason: String,
    },

    #[error(
        "repository '{name}' has unsupported URL {url:?}; expected a `deb ...` source line or a `ppa:...` spec"
    )]
    UnsupportedRepository { name: String, url: String },
}
