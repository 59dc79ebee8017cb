//! Utility functions for file system and HTTP operations.

pub mod fs;
pub mod http;
