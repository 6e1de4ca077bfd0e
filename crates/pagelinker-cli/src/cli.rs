//! Command-line definitions for pagelinker.

use std::path::PathBuf;

use clap::Parser;

/// Turns invoice, order and tracking numbers in HTML files into links.
#[derive(Debug, Parser)]
#[command(name = "pagelinker")]
#[command(version)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.config/pagelinker/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Built-in rules to add: ups, usps, fedex or tracking
    #[arg(short, long)]
    pub preset: Vec<String>,

    /// Rewrite each input file in place
    #[arg(short, long, conflicts_with = "out_dir")]
    pub in_place: bool,

    /// Write results into this directory instead of standard output
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Files or glob patterns; `-` reads standard input
    #[arg(required = true)]
    pub inputs: Vec<String>,
}

/// Where linkified HTML goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Output {
    Stdout,
    InPlace,
    Dir(PathBuf),
}

impl Cli {
    pub fn output(&self) -> Output {
        match (&self.out_dir, self.in_place) {
            (Some(dir), _) => Output::Dir(dir.clone()),
            (None, true) => Output::InPlace,
            (None, false) => Output::Stdout,
        }
    }
}
