use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dsbconvert_core::{TranslateConfig, Translator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "dsbconvert")]
#[command(about = "Translate building energy models to DesignBuilder dsbXML.")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Translate a model JSON file to dsbXML.
    ModelToDsbxml {
        model_file: PathBuf,
        /// Simulation parameter JSON; missing values use the built-in defaults.
        #[arg(short = 's', long)]
        sim_par_json: Option<PathBuf>,
        /// Written into the document's leading comment.
        #[arg(short = 'p', long)]
        program_name: Option<String>,
        /// Defaults to stdout.
        #[arg(short = 'o', long)]
        output_file: Option<PathBuf>,
        /// Write a JSON summary of the translation here.
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long, default_value_t = 0.01)]
        tolerance: f64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dsbconvert=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::ModelToDsbxml {
            model_file,
            sim_par_json,
            program_name,
            output_file,
            report,
            tolerance,
        } => {
            let result = model_to_dsbxml(
                &model_file,
                sim_par_json.as_deref(),
                program_name.as_deref(),
                output_file.as_deref(),
                report.as_deref(),
                tolerance,
            );
            match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error!(
                        model = ?model_file,
                        sim_par = ?sim_par_json,
                        "translation failed: {err:#}"
                    );
                    ExitCode::from(1)
                }
            }
        }
    }
}

fn model_to_dsbxml(
    model_file: &Path,
    sim_par_json: Option<&Path>,
    program_name: Option<&str>,
    output_file: Option<&Path>,
    report: Option<&Path>,
    tolerance: f64,
) -> Result<()> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        bail!("tolerance must be a positive number, got {tolerance}");
    }
    ensure_input_file(model_file)?;
    let model = dsbconvert_import_json::import_model(model_file)?;

    let params = match sim_par_json {
        Some(path) => {
            ensure_input_file(path)?;
            Some(dsbconvert_import_json::import_simulation_parameter(path)?)
        }
        None => None,
    };

    let cfg = TranslateConfig {
        tolerance,
        ..TranslateConfig::default()
    };

    let translation = Translator::new(cfg)
        .translate_with_summary(&model, params.as_ref(), program_name)
        .with_context(|| format!("translate model: {model_file:?}"))?;

    match output_file {
        Some(path) => {
            write_file(path, &translation.document)
                .with_context(|| format!("write dsbXML: {path:?}"))?;
            info!(output = ?path, "wrote dsbXML");
        }
        None => print!("{}", translation.document),
    }

    if let Some(path) = report {
        let json =
            serde_json::to_string_pretty(&translation.summary).context("serialize report")?;
        write_file(path, &json).with_context(|| format!("write report: {path:?}"))?;
    }

    let stats = &translation.summary.stats;
    info!(
        zones = stats.zones,
        surfaces = stats.surfaces,
        openings = stats.openings,
        shades = stats.shades,
        warnings = translation.summary.warnings.len(),
        "translated {}",
        model.display_name()
    );
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory: {parent:?}"))?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => bail!("input is not a file: {input:?}"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?})");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
