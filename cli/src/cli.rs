use std::path::PathBuf;

/// Watershed-tree district carving CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "districtor", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Carve districts for one or more region directories
    Carve(CarveArgs),

    /// Print statistics about a region directory
    Inspect(InspectArgs),
}

#[derive(clap::Args, Debug)]
pub struct CarveArgs {
    /// Region directories (region.json, watersheds.csv, blocks.csv, adjacency.csv)
    #[arg(required = true, value_hint = clap::ValueHint::DirPath)]
    pub regions: Vec<PathBuf>,

    /// Output directory for plans
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,

    /// Carving options as JSON
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Overwrite existing plan files
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Region directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub region: PathBuf,
}
