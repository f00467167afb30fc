//! # sdl2pp
//!
//! Owning wrappers over the SDL2 2D rendering API.
//!
//! Every wrapper forwards one-to-one to a host library call. The only logic
//! added on top is the translation of failed status codes into [`Error`] and
//! the tie-off of native lifetimes: dropping (or explicitly destroying) a
//! wrapper releases its native handle exactly once.
//!
//! ## Features
//!
//! - **Shared renderer ownership**: a [`Renderer`] keeps its window alive, a
//!   [`Texture`] keeps its renderer alive, so destruction order follows the
//!   reference counts instead of scope order
//! - **Idempotent teardown**: `destroy()` on every wrapper may be called any
//!   number of times
//! - **Pluggable host**: the native library sits behind [`backend::HostLibrary`];
//!   the `sdl` feature links SDL2, otherwise the in-process
//!   [`backend::HeadlessHost`] is used
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sdl2pp::prelude::*;
//! use std::result::Result;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = Application::init(default_host(), InitFlags::VIDEO)?;
//!     let (_window, renderer) =
//!         Window::create_window_and_renderer(&app, 320, 240, WindowFlags::empty())?;
//!
//!     renderer.set_draw_color((0, 0, 0, 255))?;
//!     renderer.clear()?;
//!     renderer.present()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod backend;
pub mod config;
pub mod events;
pub mod foundation;
pub mod render;

mod application;
mod error;

#[cfg(test)]
mod tests;

pub use application::{Application, PollIter};
pub use backend::{default_host, Host};
pub use error::{Error, Result};
pub use render::{Renderer, Texture, Window};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        backend::{default_host, HeadlessHost, Host, HostLibrary},
        core::config::{ApplicationConfig, EngineConfig, RendererConfig, WindowConfig},
        config::{Config, ConfigError},
        events::{Event, Keycode, MouseButton},
        foundation::math::{Color, Point, Rect},
        render::types::{
            BlendMode, DriverIndex, Flip, InitFlags, PixelFormat, RendererFlags, RendererInfo,
            TextureAccess, TextureQuery, WindowFlags, WindowPos,
        },
        Application, Error, Renderer, Result, Texture, Window,
    };
}
