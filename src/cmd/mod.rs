//! Command line subcommands besides `run`.

pub mod dry_run;

pub use dry_run::DryRunArgs;
