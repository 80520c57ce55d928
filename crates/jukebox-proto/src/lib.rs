//! Shared wire types, records and configuration for the jukebox client.

pub mod config;
pub mod platform;
pub mod protocol;
pub mod records;
