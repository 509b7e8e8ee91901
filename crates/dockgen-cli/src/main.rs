mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dockgen", about = "Generate Dockerfiles from a declarative Dockerfile.yml")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the recipe document into a Dockerfile (default)
    Generate(GenerateArgs),
    /// Write a starter Dockerfile.yml
    Init {
        /// Overwrite an existing Dockerfile.yml
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Recipe document (YAML, or TOML with a .toml extension)
    #[arg(long, short = 'i', default_value = commands::DEFAULT_INPUT)]
    input: PathBuf,
    /// Dockerfile to write
    #[arg(long, short = 'o', default_value = commands::DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Print the Dockerfile instead of writing it
    #[arg(long, conflicts_with_all = ["check", "no_clobber"])]
    stdout: bool,
    /// Leave an existing output file untouched and fail instead
    #[arg(long)]
    no_clobber: bool,
    /// Fail if the output file is missing or differs from the rendered recipe
    #[arg(long, conflicts_with = "no_clobber")]
    check: bool,
}

impl Default for GenerateArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from(commands::DEFAULT_INPUT),
            output: PathBuf::from(commands::DEFAULT_OUTPUT),
            stdout: false,
            no_clobber: false,
            check: false,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="fall back to the default filter"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Generate(args)) => generate(args)?,
        None => generate(GenerateArgs::default())?,
        Some(Commands::Init { force }) => commands::init(force)?,
    }

    Ok(())
}

fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let target = if args.stdout {
        commands::Target::Stdout
    } else if args.check {
        commands::Target::Check
    } else {
        commands::Target::File {
            no_clobber: args.no_clobber,
        }
    };
    commands::generate(&args.input, &args.output, target)
}
