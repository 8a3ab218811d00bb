//! Command-line front end for the sitecarbon engine.

pub mod advisor;
pub mod cli;
