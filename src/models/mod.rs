//! Runtime configuration of the console.

pub mod config;
