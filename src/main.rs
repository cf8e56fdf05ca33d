//! py2cs CLI - generate host member bodies from bound Python sources

use clap::{Parser, Subcommand};
use py2cs::bindings::BindingWalker;
use py2cs::config::{self, Py2csConfig};
use py2cs::generator::{write_documents, Generator};
use py2cs::host::HostProject;
use py2cs::report::Dump;
use py2cs::ui;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "py2cs")]
#[command(version)]
#[command(about = "Borrow Python function bodies into C#-style host declarations")]
#[command(long_about = r#"
py2cs reads a host project manifest whose declarations carry Python
bindings, translates the bound Python function bodies and splices them
into the declarations that ask for generation.

Example usage:
  py2cs generate --project host/project.json --output generated
  py2cs dump --project host/project.json --json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to py2cs.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate bound bodies and write the rendered host documents
    Generate {
        /// Host project manifest
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Fallback directory for Python sources
        #[arg(long)]
        python_dir: Option<PathBuf>,

        /// Output directory for rendered documents
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Also write the rewritten manifest next to the documents
        #[arg(long)]
        manifest: bool,
    },

    /// Print resolved bindings and the bound graph
    Dump {
        /// Host project manifest
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Fallback directory for Python sources
        #[arg(long)]
        python_dir: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter py2cs.toml
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let file_config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Generate {
            project,
            python_dir,
            output,
            json,
            manifest,
        } => {
            let project_path = project_path(project, &file_config)?;
            let python_dir = python_dir.or(file_config.python_dir.clone());
            let output_dir = output
                .or(file_config.output_dir.clone())
                .unwrap_or_else(config::default_output_dir);

            if !json {
                ui::header(&format!("Generating from {}", project_path.display()));
            }
            let project = HostProject::load(&project_path)?;
            let (generated, report) = Generator::with_python_dir(python_dir)?.run(&project)?;
            let mut written = write_documents(&generated, &output_dir)?;
            if manifest {
                let path = output_dir.join("project.json");
                std::fs::write(&path, generated.to_json()?)?;
                written.push(path);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            ui::phase("Documents");
            for path in &written {
                ui::file_written(&path.display().to_string());
            }
            ui::phase("Summary");
            ui::summary_row("Bindings:", &report.bindings.to_string());
            ui::summary_row("Python files:", &report.parsed_files.to_string());
            ui::summary_row("Rewritten:", &report.members_rewritten.to_string());
            ui::summary_row("Generated:", &report.members_generated.to_string());
            ui::summary_row("Diagnostics:", &report.diagnostics.to_string());
            println!();
            if report.diagnostics > 0 {
                ui::warn(&format!(
                    "{} constructs left untranslated, see the py2cs: comments",
                    report.diagnostics
                ));
            } else {
                ui::success("All bound members translated");
            }
        }

        Commands::Dump {
            project,
            python_dir,
            json,
        } => {
            let project_path = project_path(project, &file_config)?;
            let python_dir = python_dir.or(file_config.python_dir.clone());

            let project = HostProject::load(&project_path)?;
            let bindings = BindingWalker::walk(&project);
            let bound = Generator::with_python_dir(python_dir)?.bind(&project)?;
            let dump = Dump::new(&bindings, &bound);

            if json {
                println!("{}", dump.to_json()?);
            } else {
                ui::info("Project", &project_path.display().to_string());
                ui::info("Host types", &project.types().len().to_string());
                println!("{}", dump);
            }
        }

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            let starter = Py2csConfig {
                python_dir: Some(PathBuf::from("python")),
                project: Some(PathBuf::from("project.json")),
                output_dir: Some(config::default_output_dir()),
            };
            config::write_config(&path, &starter, force)?;
            ui::success(&format!("Wrote {}", path.display()));
            println!("{}", ui::dim("Edit the paths, then run `py2cs generate`."));
        }
    }

    Ok(())
}

/// Manifest from the flag, else from the config file
fn project_path(flag: Option<PathBuf>, config: &Py2csConfig) -> anyhow::Result<PathBuf> {
    match flag.or_else(|| config.project.clone()) {
        Some(path) => Ok(path),
        None => {
            ui::error("No host project given");
            anyhow::bail!(
                "pass --project or set `project` in {}",
                config::default_config_path().display()
            )
        }
    }
}
