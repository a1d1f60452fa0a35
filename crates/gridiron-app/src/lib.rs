// Command-line front end for the gridiron pipeline: argument parsing, tracing
// setup, dataset loading and the JSON/CSV writers.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;
