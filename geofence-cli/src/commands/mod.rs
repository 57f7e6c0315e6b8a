//! CLI subcommands.

pub mod check;
pub mod common;
pub mod demo;
pub mod replay;
pub mod zones;
