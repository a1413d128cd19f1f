use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Inspect choropleth map configurations and their query plans", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a map configuration file and print a summary
    Validate(ValidateArgs),
    /// Print the queries the engine would run for a filter selection
    Plan(PlanArgs),
    /// Compute classification bins for a configuration and a list of values
    Bins(BinsArgs),
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Map configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Map configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,
    /// Filter selection entries such as `year=1918` (repeatable); entries
    /// override the configuration's initial filtering
    #[arg(short, long = "select", action = clap::ArgAction::Append)]
    pub select: Vec<String>,
}

#[derive(Debug, Args)]
pub struct BinsArgs {
    /// Map configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,
    /// Region values to classify, comma separated; feeds dynamic range
    /// inference when the configuration enables it
    #[arg(long, value_delimiter = ',')]
    pub values: Vec<f64>,
}
