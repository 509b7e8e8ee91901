use dockgen_core::{BuildPlan, StagedFile};

use crate::command_block;

/// Renders a [`BuildPlan`] as Dockerfile text.
pub struct RecipeRenderer<'a> {
    plan: &'a BuildPlan,
}

impl<'a> RecipeRenderer<'a> {
    pub fn new(plan: &'a BuildPlan) -> Self {
        Self { plan }
    }

    /// Produce the full recipe.
    ///
    /// Directives appear in a fixed order. Each populated section is followed
    /// by one blank line, except `CMD`, which always comes last.
    pub fn finalize(&self) -> String {
        let plan = self.plan;
        let mut lines = Vec::new();

        push_section(&mut lines, [format!("FROM {}", plan.base_image())]);
        push_section(
            &mut lines,
            plan.maintainers().iter().map(|m| format!("MAINTAINER {m}")),
        );
        push_section(&mut lines, plan.user().map(|u| format!("USER {u}")));
        push_section(
            &mut lines,
            plan.env_vars()
                .iter()
                .map(|e| format!("ENV {} {}", e.key, e.value)),
        );
        push_section(&mut lines, plan.files_before().iter().map(add_directive));
        push_section(
            &mut lines,
            command_block::render(&command_block::assemble(plan)),
        );
        push_section(&mut lines, plan.files_after().iter().map(add_directive));
        push_section(&mut lines, expose_directive(plan.exposed_ports()));
        push_section(
            &mut lines,
            plan.working_directory().map(|d| format!("WORKDIR {d}")),
        );
        if let Some(tokens) = plan.startup_command().filter(|t| !t.is_empty()) {
            lines.push(format!("CMD {}", exec_form(tokens)));
        }

        tracing::debug!(lines = lines.len(), "finalized recipe");
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

/// Append a section's lines followed by a blank separator, if it has any.
fn push_section(lines: &mut Vec<String>, section: impl IntoIterator<Item = String>) {
    let before = lines.len();
    lines.extend(section);
    if lines.len() > before {
        lines.push(String::new());
    }
}

fn add_directive(file: &StagedFile) -> String {
    format!("ADD {} {}", file.source, file.destination)
}

fn expose_directive(ports: &[u16]) -> Option<String> {
    if ports.is_empty() {
        return None;
    }
    let ports: Vec<String> = ports.iter().map(u16::to_string).collect();
    Some(format!("EXPOSE {}", ports.join(" ")))
}

/// `['nginx','-g','daemon','off;']`
fn exec_form(tokens: &[String]) -> String {
    format!("['{}']", tokens.join("','"))
}
