mod generate;
mod init;

/// Recipe document read when no input is given.
pub(crate) const DEFAULT_INPUT: &str = "Dockerfile.yml";
/// Dockerfile written when no output is given.
pub(crate) const DEFAULT_OUTPUT: &str = "Dockerfile";

pub use generate::{Target, generate};
pub use init::init;
