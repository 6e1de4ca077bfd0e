mod cli;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, error::ErrorKind};
use cli::{Cli, Output};
use pagelinker_config::Config;
use pagelinker_engine::Annotator;
use std::{
    collections::HashMap,
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process,
};

/// One thing to linkify.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Stdin,
    File(PathBuf),
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let output = cli.output();

    let config = load_config(&cli)?;
    let annotator = config.annotator().context("Invalid rule configuration")?;
    if annotator.rules().is_empty() {
        eprintln!("Error: no rules configured");
        eprintln!("Pass --preset or create a config file at {}", Config::config_path().display());
        process::exit(1);
    }
    log::debug!("{} rule(s) loaded", annotator.rules().len());

    let inputs = expand_inputs(&cli.inputs)?;
    if inputs.len() > 1 && output == Output::Stdout {
        Cli::command()
            .error(
                ErrorKind::ArgumentConflict,
                "several inputs need --in-place or --out-dir",
            )
            .exit();
    }
    if let Output::Dir(dir) = &output {
        check_out_paths(dir, &inputs)?;
    }

    for input in &inputs {
        process_input(&annotator, input, &output)?;
    }
    Ok(())
}

/// The explicit `--config` file must exist; the default one is optional.
/// `--preset` names are added after the configured presets.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file {} not found", path.display()))?,
        None => Config::load()?.unwrap_or_default(),
    };
    for preset in &cli.preset {
        if !config.presets.iter().any(|p| p.eq_ignore_ascii_case(preset)) {
            config.presets.push(preset.clone());
        }
    }
    Ok(config)
}

fn expand_inputs(patterns: &[String]) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        if pattern == "-" {
            inputs.push(Input::Stdin);
            continue;
        }
        let literal = Path::new(pattern);
        if literal.is_file() {
            inputs.push(Input::File(literal.to_path_buf()));
            continue;
        }

        let mut matched = false;
        for entry in glob::glob(pattern).with_context(|| format!("Bad pattern `{pattern}`"))? {
            let path = entry.with_context(|| format!("Failed to expand `{pattern}`"))?;
            if path.is_file() {
                matched = true;
                inputs.push(Input::File(path));
            }
        }
        if !matched {
            bail!("No files match `{pattern}`");
        }
    }
    Ok(inputs)
}

fn process_input(annotator: &Annotator, input: &Input, output: &Output) -> Result<()> {
    let (name, html) = match input {
        Input::Stdin => {
            let mut html = String::new();
            io::stdin()
                .read_to_string(&mut html)
                .context("Failed to read standard input")?;
            ("<stdin>".to_string(), html)
        }
        Input::File(path) => {
            let html = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            (path.display().to_string(), html)
        }
    };

    let (linked, report) = annotator.linkify_html(&html);
    log::info!(
        "{name}: {} link(s) created in {} text node(s)",
        report.links_created,
        report.nodes_rewritten
    );

    match (output, input) {
        (Output::Stdout, _) => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(linked.as_bytes())?;
            stdout.flush()?;
        }
        (Output::InPlace, Input::File(path)) => {
            if report.is_noop() {
                log::debug!("{name}: unchanged, not rewriting");
            } else {
                fs::write(path, linked)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }
        (Output::Dir(dir), Input::File(path)) => {
            let target = out_path(dir, path)?;
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            fs::write(&target, linked)
                .with_context(|| format!("Failed to write {}", target.display()))?;
        }
        (_, Input::Stdin) => bail!("Standard input can only be written to standard output"),
    }
    Ok(())
}

fn out_path(dir: &Path, input: &Path) -> Result<PathBuf> {
    let name = input
        .file_name()
        .with_context(|| format!("{} has no file name", input.display()))?;
    Ok(dir.join(name))
}

/// Fails before anything is written if two inputs would land on the same
/// file in `dir`.
fn check_out_paths(dir: &Path, inputs: &[Input]) -> Result<()> {
    let mut targets: HashMap<PathBuf, &Path> = HashMap::new();
    for input in inputs {
        let Input::File(path) = input else {
            continue;
        };
        let target = out_path(dir, path)?;
        if let Some(first) = targets.insert(target.clone(), path.as_path()) {
            bail!(
                "{} and {} would both be written to {}",
                first.display(),
                path.display(),
                target.display()
            );
        }
    }
    Ok(())
}
