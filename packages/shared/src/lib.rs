//! Utilities shared by the Rakugaki server and client binaries.

pub mod logger;
pub mod time;
