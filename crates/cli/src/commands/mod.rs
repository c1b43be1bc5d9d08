//! CLI subcommands

pub mod call;
pub mod list;
