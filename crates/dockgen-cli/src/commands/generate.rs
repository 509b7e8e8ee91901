use std::path::Path;

use dockgen_build::RecipeRenderer;
use dockgen_build::output::{self, Overwrite};
use dockgen_core::RecipeDocument;

/// Where the rendered recipe goes.
pub enum Target {
    File { no_clobber: bool },
    Stdout,
    Check,
}

pub fn generate(input: &Path, output: &Path, target: Target) -> anyhow::Result<()> {
    let document = RecipeDocument::load(input)?;
    let plan = document.to_plan()?;
    let recipe = RecipeRenderer::new(&plan).finalize();
    tracing::debug!(input = %input.display(), bytes = recipe.len(), "rendered recipe");

    match target {
        Target::Stdout => print!("{recipe}"),
        Target::Check => {
            if !output::is_up_to_date(output, &recipe)? {
                anyhow::bail!(
                    "{} is out of date with {}; run `dockgen generate` to regenerate it",
                    output.display(),
                    input.display()
                );
            }
            println!("{} is up to date", output.display());
        }
        Target::File { no_clobber } => {
            let overwrite = if no_clobber {
                Overwrite::Refuse
            } else {
                Overwrite::Allow
            };
            output::write_recipe(output, &recipe, overwrite)?;
            println!("Generated {} from {}", output.display(), input.display());
        }
    }

    Ok(())
}
