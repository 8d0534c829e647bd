//! Code related to the example graphs and the CLI commands for interacting with them.
use crate::example::{EXAMPLES, find_example};
use crate::log;
use crate::output::{create_output_directory, get_output_dir, write_graph};
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

/// The available subcommands for managing example graphs.
#[derive(Subcommand)]
pub enum ExampleSubcommands {
    /// List available examples.
    List,
    /// Provide information about the specified example.
    Info {
        /// The name of the example.
        name: String,
    },
    /// Calculate an example and write its results.
    Run {
        /// The name of the example to run.
        name: String,
        /// Directory for output files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Whether to overwrite the output directory if it already exists
        #[arg(long)]
        overwrite: bool,
    },
}

impl ExampleSubcommands {
    /// Execute the supplied example subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_example_list_command(),
            Self::Info { name } => handle_example_info_command(&name)?,
            Self::Run {
                name,
                output_dir,
                overwrite,
            } => handle_example_run_command(&name, output_dir.as_deref(), overwrite, None)?,
        }

        Ok(())
    }
}

/// Handle the `example list` command.
fn handle_example_list_command() {
    for example in EXAMPLES {
        println!("{}", example.name);
    }
}

/// Handle the `example info` command.
fn handle_example_info_command(name: &str) -> Result<()> {
    let example = find_example(name).context("Example not found.")?;
    println!("{}", example.description);

    Ok(())
}

/// Handle the `example run` command.
pub fn handle_example_run_command(
    name: &str,
    output_path: Option<&Path>,
    overwrite: bool,
    settings: Option<Settings>,
) -> Result<()> {
    let example = find_example(name).context("Example not found.")?;

    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = output_path {
        p
    } else {
        pathbuf = get_output_dir(name);
        &pathbuf
    };

    let overwritten = create_output_directory(output_path, overwrite).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_path.display()
        )
    })?;

    // Initialise program logger
    if !log::is_logger_initialised() {
        log::init(Some(&settings.log_level), Some(output_path))
            .context("Failed to initialise logging.")?;
    }
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwritten {
        warn!("Output folder was overwritten");
    }

    let mut graph = example
        .build(&settings)
        .with_context(|| format!("Failed to build example {name}."))?;
    info!(
        "Built example {name} with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    graph.calculate().context("Calculation failed.")?;

    write_graph(output_path, &graph).context("Failed to write results.")?;
    info!("Results written to {}", output_path.display());

    Ok(())
}
