use clap::Subcommand;

use super::compare::CompareArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run a journey for one or more personas
    Run(RunArgs),

    /// Compare step latency between two personas
    Compare(CompareArgs),

    /// List the built-in personas
    Personas,
}
