//! Dockerfile rendering and output for dockgen.
//!
//! # Pipeline
//!
//! ```text
//! dockgen generate
//!   1. Load     ── Dockerfile.yml → RecipeDocument
//!   2. Replay   ── RecipeDocument::to_plan() → BuildPlan
//!   3. Render   ── RecipeRenderer::finalize()
//!   4. Write    ── output::write_recipe() → Dockerfile
//! ```
//!
//! # The RUN block
//!
//! Every shell step of the plan is merged into a single `RUN` instruction so
//! the image gets one layer. Steps run in phase order:
//! - `apt-get update` and the packages repository registration needs
//! - repository and PPA registration
//! - requested packages
//! - post-install steps, then user `Run` commands
//! - apt cache purge, then service enablement
//!
//! Lines are padded to a common column so the `&& \` continuations line up.

pub mod command_block;
pub mod output;
pub mod recipe;

pub use output::OutputError;
pub use recipe::RecipeRenderer;
