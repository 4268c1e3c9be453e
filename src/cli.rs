//! The command line interface for the model.
use crate::analysis;
use crate::log;
use crate::output::{create_output_directory, get_output_dir};
use crate::scenario::{DEFAULT_SCENARIO_FILE_NAME, Scenario};
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result, ensure};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the model.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Whether to skip rendering the PNG figures
    #[arg(long)]
    pub skip_figures: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the analysis for a scenario.
    Run {
        /// Path to a scenario TOML file (baseline scenario if omitted).
        scenario: Option<PathBuf>,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Load and validate a scenario file without running the analysis.
    Validate {
        /// The path to the scenario TOML file.
        scenario: PathBuf,
    },
    /// Write a template scenario file with the baseline parameters.
    Init {
        /// Where to write the file.
        #[arg(default_value = DEFAULT_SCENARIO_FILE_NAME)]
        path: PathBuf,
    },
    /// Manage the program settings file.
    Settings {
        /// The available subcommands for managing settings.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { scenario, opts } => handle_run_command(scenario.as_deref(), &opts, None),
            Self::Validate { scenario } => handle_validate_command(&scenario, None),
            Self::Init { path } => handle_init_command(&path),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ h2fleet --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Handle the `run` command.
pub fn handle_run_command(
    scenario_path: Option<&Path>,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(scenario_path)?;
        &pathbuf
    };

    let overwrite = create_output_directory(output_path, opts.overwrite).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_path.display()
        )
    })?;

    // Initialise program logger
    log::init(Some(&settings.log_level), Some(output_path))
        .context("Failed to initialise logging.")?;

    // Load the scenario to analyse
    let scenario = if let Some(scenario_path) = scenario_path {
        let scenario = Scenario::from_path(scenario_path).context("Failed to load scenario.")?;
        info!("Loaded scenario from {}", scenario_path.display());
        scenario
    } else {
        info!("Using the baseline scenario");
        Scenario::default()
    };
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    // Run the analysis
    analysis::run(&scenario, output_path, opts.skip_figures, &settings)?;
    info!("Analysis complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(scenario_path: &Path, settings: Option<Settings>) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(Some(&settings.log_level), None).context("Failed to initialise logging.")?;

    // Load/validate the scenario
    Scenario::from_path(scenario_path).context("Failed to validate scenario.")?;
    info!("Scenario validation successful!");

    Ok(())
}

/// Handle the `init` command.
pub fn handle_init_command(file_path: &Path) -> Result<()> {
    ensure!(
        !file_path.exists(),
        "File already exists: {}",
        file_path.display()
    );

    fs::write(file_path, Scenario::default_file_contents()?)
        .with_context(|| format!("Failed to write {}", file_path.display()))?;
    println!("Template scenario written to {}", file_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use tempfile::tempdir;

    #[test]
    fn test_cli_arguments() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_handle_init_command() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("my_depot.toml");
        handle_init_command(&file_path).unwrap();

        // The template must parse back to the baseline scenario
        let scenario = Scenario::from_path(&file_path).unwrap();
        assert_eq!(scenario, Scenario::default());

        // Refuse to clobber an existing file
        assert_error!(
            handle_init_command(&file_path),
            format!("File already exists: {}", file_path.display())
        );
    }
}
