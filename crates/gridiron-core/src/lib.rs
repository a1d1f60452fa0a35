// Library root: the statistics validation-and-ranking pipeline plus the
// record types, team directory, configuration and matchup providers it uses.

pub mod config;
pub mod pipeline;
pub mod provider;
pub mod records;
pub mod teams;
