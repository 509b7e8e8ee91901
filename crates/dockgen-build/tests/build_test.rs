use dockgen_build::RecipeRenderer;
use dockgen_build::command_block::{AND_CONTINUE, CONTINUE};
use dockgen_build::output::{Overwrite, is_up_to_date, write_recipe};
use dockgen_core::{BuildPlan, RecipeDocument};
use tempfile::TempDir;

fn render(plan: &BuildPlan) -> String {
    RecipeRenderer::new(plan).finalize()
}

/// Lines of the `RUN` instruction, from `RUN` up to the first line without a
/// continuation.
fn run_block(output: &str) -> Vec<&str> {
    let mut block = Vec::new();
    for line in output.lines().skip_while(|l| !l.starts_with("RUN ")) {
        block.push(line);
        if !line.ends_with(AND_CONTINUE) && !line.ends_with(CONTINUE) {
            break;
        }
    }
    block
}

fn position(block: &[&str], needle: &str) -> usize {
    block
        .iter()
        .position(|l| l.contains(needle))
        .unwrap_or_else(|| panic!("{needle:?} not found in block:\n{}", block.join("\n")))
}

// ── Directive Tests ──

#[test]
fn empty_plan_renders_only_from() {
    let output = render(&BuildPlan::new());
    assert_eq!(output, "FROM ubuntu\n\n");
    assert!(!output.contains("RUN"));
}

#[test]
fn directives_appear_in_fixed_order() {
    let mut plan = BuildPlan::new();
    plan.set_startup_command(["app"]);
    plan.set_working_directory("/srv");
    plan.expose(8080);
    plan.add_file_after("site/", "/srv");
    plan.add_run_line("make");
    plan.add_file_before_to_root("setup.sh");
    plan.add_env_var("LANG", "C.UTF-8");
    plan.set_user("app");
    plan.add_maintainer("Jane <jane@example.com>");
    plan.set_base_image("debian:bookworm");

    let output = render(&plan);
    let order = [
        "FROM debian:bookworm",
        "MAINTAINER Jane <jane@example.com>",
        "USER app",
        "ENV LANG C.UTF-8",
        "ADD setup.sh /",
        "RUN ",
        "ADD site/ /srv",
        "EXPOSE 8080",
        "WORKDIR /srv",
        "CMD ['app']",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|d| output.find(d).unwrap_or_else(|| panic!("missing {d}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{output}");
}

#[test]
fn sections_are_separated_by_one_blank_line() {
    let mut plan = BuildPlan::new();
    plan.add_maintainer("a");
    plan.add_maintainer("b");
    plan.set_user("app");
    plan.expose(80);
    plan.set_working_directory("/app");
    plan.set_startup_command(["run"]);

    let output = render(&plan);
    assert_eq!(
        output,
        "FROM ubuntu\n\nMAINTAINER a\nMAINTAINER b\n\nUSER app\n\nEXPOSE 80\n\nWORKDIR /app\n\nCMD ['run']\n"
    );
}

#[test]
fn expose_lists_ports_in_order() {
    let mut plan = BuildPlan::new();
    plan.expose(80);
    plan.expose(443);

    let output = render(&plan);
    assert!(output.lines().any(|l| l == "EXPOSE 80 443"));
}

#[test]
fn cmd_renders_exec_form() {
    let mut plan = BuildPlan::new();
    plan.set_startup_command("nginx -g daemon off;".split_whitespace());

    let output = render(&plan);
    assert!(output.ends_with("CMD ['nginx','-g','daemon','off;']\n"));
}

#[test]
fn env_vars_keep_declaration_order() {
    let mut plan = BuildPlan::new();
    plan.add_env_var("B", "2");
    plan.add_env_var("A", "1");

    let output = render(&plan);
    assert!(output.contains("ENV B 2\nENV A 1\n"));
}

// ── RUN Block Tests ──

#[test]
fn repository_and_package_scenario() {
    let mut plan = BuildPlan::new();
    plan.add_repository("docker", "deb https://example/ stable main", None);
    plan.install_package("curl");

    let output = render(&plan);
    let block = run_block(&output);

    assert!(block[0].starts_with("RUN `# Updating Package List`"));
    let update = position(&block, "apt-get update");
    let ssl_cert = position(&block, "--no-install-recommends ssl-cert");
    let wget = position(&block, " wget");
    let repo_comment = position(&block, "`# Adding docker repository`");
    let source_list = position(
        &block,
        "echo 'deb https://example/ stable main' >> /etc/apt/sources.list.d/docker.list",
    );
    let curl = position(&block, "--no-install-recommends curl");
    let cleanup = position(&block, "apt-get clean");

    assert!(update < ssl_cert);
    assert_eq!(wget, ssl_cert + 1);
    assert!(wget < repo_comment);
    assert!(repo_comment < source_list);
    assert!(source_list < curl);
    assert!(curl < cleanup);
    assert_eq!(cleanup, block.len() - 1);

    // ssl-cert continues into wget within one apt-get invocation.
    assert!(block[ssl_cert].ends_with(CONTINUE) && !block[ssl_cert].ends_with(AND_CONTINUE));
    assert!(block[wget].ends_with(AND_CONTINUE));
}

#[test]
fn requested_packages_drop_required_ones() {
    let mut plan = BuildPlan::new();
    plan.install_package("wget");
    plan.install_package("curl");
    plan.add_repository("docker", "deb https://example/ stable main", None);

    let output = render(&plan);
    let block = run_block(&output);

    let wget_lines = block
        .iter()
        .filter(|l| l.split_whitespace().any(|word| word == "wget"))
        .count();
    assert_eq!(wget_lines, 1);
    assert!(block.iter().any(|l| l.contains("--no-install-recommends curl")));
}

#[test]
fn package_names_align_under_the_first() {
    let mut plan = BuildPlan::new();
    plan.install_package("a");
    plan.install_package("libverylongpackagename-dev");

    let output = render(&plan);
    let block = run_block(&output);
    let first = position(&block, "--no-install-recommends a");
    let col_first = block[first].find(" a ").unwrap();
    let col_second = block[first + 1].find(" libverylongpackagename-dev").unwrap();
    assert_eq!(col_first, col_second);
}

#[test]
fn every_block_line_has_the_same_width() {
    let doc = RecipeDocument::from_yaml_str(
        r#"
Service: nginx
Repositories:
  - Name: Nginx
    URL: ppa:nginx/stable
  - Name: Docker
    URL: deb https://download.example/linux/ubuntu jammy stable
    Key: https://download.example/gpg
Packages: [nginx, x]
Run: |
  # Write a greeting
  echo hello > /var/www/index.html

  true
"#,
    )
    .unwrap();
    let plan = doc.to_plan().unwrap();
    let output = render(&plan);
    let block = run_block(&output);

    let widths: Vec<usize> = block
        .iter()
        .map(|&l| {
            l.strip_suffix(AND_CONTINUE)
                .or_else(|| l.strip_suffix(CONTINUE))
                .unwrap_or(l)
                .len()
        })
        .collect();
    assert!(widths.windows(2).all(|w| w[0] == w[1]), "{}", block.join("\n"));
    assert!(block.last().unwrap().contains("service nginx start"));
}

#[test]
fn rendering_is_deterministic() {
    let mut plan = BuildPlan::new();
    for pkg in ["zlib1g", "curl", "make", "git"] {
        plan.install_package(pkg);
    }
    plan.add_maintainer("z");
    plan.add_maintainer("a");
    plan.add_ppa("Git", "ppa:git-core/ppa");

    assert_eq!(render(&plan), render(&plan));
    assert_eq!(render(&plan), render(&plan.clone()));
}

// ── Output Tests ──

#[test]
fn write_recipe_creates_parent_dirs() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("docker/app/Dockerfile");

    write_recipe(&path, "FROM ubuntu\n\n", Overwrite::Refuse).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "FROM ubuntu\n\n");
}

#[test]
fn write_recipe_refuses_to_clobber() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Dockerfile");
    std::fs::write(&path, "FROM old\n").unwrap();

    let err = write_recipe(&path, "FROM new\n", Overwrite::Refuse).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "FROM old\n");

    write_recipe(&path, "FROM new\n", Overwrite::Allow).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "FROM new\n");
}

#[test]
fn up_to_date_compares_content() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Dockerfile");

    assert!(!is_up_to_date(&path, "FROM ubuntu\n").unwrap());

    std::fs::write(&path, "FROM ubuntu\n").unwrap();
    assert!(is_up_to_date(&path, "FROM ubuntu\n").unwrap());
    assert!(!is_up_to_date(&path, "FROM debian\n").unwrap());
}
