use std::borrow::Cow;
use std::collections::BTreeSet;

use dockgen_core::{Bucket, BuildPlan, Fragment};

const APT_UPDATE: &str = "apt-get update";
const APT_INSTALL: &str = "apt-get install -y --no-install-recommends";
const APT_CLEANUP: &str = "apt-get clean && rm -rf /var/lib/apt/lists/* /tmp/* /var/tmp/*";

/// Suffix chaining a line to the next command.
pub const AND_CONTINUE: &str = " && \\";
/// Suffix continuing a line without starting a new command.
pub const CONTINUE: &str = " \\";

const INDENT: usize = 5;
const COMMENT_INDENT: usize = 4;
const RUN_KEYWORD: &str = "RUN";

/// Collect the plan's fragments in build order.
///
/// Returns an empty list when the plan contributes no shell work at all, in
/// which case no `RUN` instruction is emitted.
pub fn assemble(plan: &BuildPlan) -> Vec<Fragment> {
    let required = plan.required_packages();
    let requested: BTreeSet<&String> = plan.requested_packages().difference(required).collect();

    let has_work = !required.is_empty()
        || !requested.is_empty()
        || plan.service().is_some()
        || Bucket::ALL.iter().any(|b| !plan.bucket(*b).is_empty());
    if !has_work {
        return Vec::new();
    }

    let mut fragments = Vec::new();
    fragments.extend_from_slice(plan.bucket(Bucket::Begin));

    if !required.is_empty() {
        fragments.push(Fragment::comment("Updating Package List"));
        fragments.push(Fragment::command(APT_UPDATE));
        fragments.push(Fragment::Blank);
        fragments.extend(install_list(required.iter().map(String::as_str)));
    }

    fragments.extend_from_slice(plan.bucket(Bucket::PreInstall));

    if !requested.is_empty() {
        fragments.extend(install_list(requested.into_iter().map(String::as_str)));
    }

    fragments.extend_from_slice(plan.bucket(Bucket::Install));

    let post_install = plan.bucket(Bucket::PostInstall);
    if !post_install.is_empty() {
        fragments.push(Fragment::comment("Removing temporary files"));
        fragments.extend_from_slice(post_install);
        fragments.push(Fragment::Blank);
    }

    let run = plan.bucket(Bucket::Run);
    fragments.extend_from_slice(run);
    if !run.is_empty() {
        fragments.push(Fragment::Blank);
    }

    fragments.push(Fragment::comment("Cleaning up after installation"));
    fragments.push(Fragment::command(APT_CLEANUP));
    fragments.push(Fragment::Blank);

    if let Some(service) = plan.service() {
        fragments.push(Fragment::comment("Enable service on startup"));
        fragments.push(Fragment::command(format!(
            "sed -i \"s@exit 0@service {service} start@g\" /etc/rc.local"
        )));
        fragments.push(Fragment::Blank);
    }

    fragments.extend_from_slice(plan.bucket(Bucket::End));
    fragments
}

/// One `apt-get install` spanning a line per package.
///
/// Package names after the first are indented to the first one's column.
/// The caller guarantees `packages` is non-empty.
fn install_list<'a>(packages: impl Iterator<Item = &'a str>) -> Vec<Fragment> {
    let packages: Vec<&str> = packages.collect();
    let padding = " ".repeat(APT_INSTALL.len());
    let last = packages.len().saturating_sub(1);

    let mut fragments = Vec::with_capacity(packages.len() + 2);
    fragments.push(Fragment::comment("Installing packages"));
    for (i, package) in packages.iter().enumerate() {
        let lead = if i == 0 { APT_INSTALL } else { padding.as_str() };
        let line = format!("{lead} {package}");
        fragments.push(if i == last {
            Fragment::Command(line)
        } else {
            Fragment::Continued(line)
        });
    }
    fragments.push(Fragment::Blank);
    fragments
}

/// Format fragments as one continuation-joined `RUN` instruction.
///
/// Returns `None` for an empty fragment list.
pub fn render(fragments: &[Fragment]) -> Option<String> {
    let width = fragments.iter().map(|f| body(f).chars().count()).max()?;

    let mut lines: Vec<String> = fragments.iter().map(|f| align(f, width)).collect();

    if let Some(first) = lines.first_mut() {
        first.replace_range(..RUN_KEYWORD.len(), RUN_KEYWORD);
    }

    if let Some(last) = lines.last_mut() {
        strip_continuation(last);
    }
    if lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
        if let Some(last) = lines.last_mut() {
            strip_continuation(last);
        }
    }

    tracing::debug!(lines = lines.len(), width, "rendered RUN block");
    Some(lines.join("\n"))
}

/// Text a fragment contributes before indentation and padding.
fn body(fragment: &Fragment) -> Cow<'_, str> {
    match fragment {
        Fragment::Comment(text) => Cow::Owned(format!("`# {text}`")),
        Fragment::Blank => Cow::Borrowed(""),
        Fragment::Command(text) | Fragment::Continued(text) => Cow::Borrowed(text),
    }
}

fn suffix(fragment: &Fragment) -> &'static str {
    match fragment {
        Fragment::Comment(_) | Fragment::Command(_) => AND_CONTINUE,
        Fragment::Blank | Fragment::Continued(_) => CONTINUE,
    }
}

/// Indent, pad to `width + INDENT` columns, then append the suffix.
fn align(fragment: &Fragment, width: usize) -> String {
    let indent = match fragment {
        Fragment::Comment(_) => COMMENT_INDENT,
        _ => INDENT,
    };
    let column = width + INDENT - indent;
    format!(
        "{:indent$}{:<column$}{}",
        "",
        body(fragment),
        suffix(fragment)
    )
}

fn strip_continuation(line: &mut String) {
    for marker in [AND_CONTINUE, CONTINUE] {
        if line.ends_with(marker) {
            line.truncate(line.len() - marker.len());
            return;
        }
    }
}
