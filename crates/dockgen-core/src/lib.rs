//! Core types for dockgen.
//!
//! This crate defines the `Dockerfile.yml` schema ([`RecipeDocument`]), the
//! in-memory accumulator of build actions ([`BuildPlan`]), and shared error
//! types.

pub mod config;
pub mod error;
pub mod plan;

pub use config::{
    DocumentFormat, EnvValue, FileEntry, RecipeDocument, Repository, StartupCommand,
};
pub use error::{Error, Result};
pub use plan::{Bucket, BuildPlan, EnvVar, Fragment, StagedFile};
