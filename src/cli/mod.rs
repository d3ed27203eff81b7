pub mod app;
pub mod commands;
pub mod compare;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod output;
pub mod personas;
pub mod run;
pub mod runtime;

pub use compare::{cmd_compare, CompareArgs};
pub use personas::cmd_personas;
pub use run::{cmd_run, RunArgs};
