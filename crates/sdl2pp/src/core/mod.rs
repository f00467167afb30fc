//! # Core Module
//!
//! Shared configuration types used by the wrappers and the demo driver.
//!
//! ## Organization
//!
//! - **Config**: application, engine, window and renderer settings

pub mod config;

pub use crate::foundation;

pub use config::{
    ApplicationConfig, Config, ConfigError, EngineConfig, RendererConfig, WindowConfig,
};
