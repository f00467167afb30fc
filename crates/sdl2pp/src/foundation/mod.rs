//! Foundation module - Core utilities and types
//!
//! This module provides the small utilities shared by the wrappers and the
//! demo driver:
//! - Value types for drawing calls
//! - Frame timing
//! - Logging setup

pub mod logging;
pub mod math;
pub mod time;
