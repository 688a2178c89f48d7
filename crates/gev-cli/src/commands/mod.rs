//! Command handler modules for gev-cli.

pub mod db;
pub mod run;
