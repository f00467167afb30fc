//! Window, renderer and texture wrappers
//!
//! # Ownership
//!
//! ```text
//! Texture ──keeps alive──▶ Renderer ──keeps alive──▶ native window
//!                              ▲
//! Window ─────holds one────────┘
//! ```
//!
//! A native resource is released when the last wrapper that needs it goes
//! away, so textures never outlive their renderer and a renderer never
//! outlives its window, whatever order the wrappers are dropped in.
//!
//! # Module Organization
//!
//! - **`types`**: flags, enums and info structs with native values
//! - **`window`**: [`Window`]
//! - **`renderer`**: [`Renderer`] and its drawing calls
//! - **`texture`**: [`Texture`]

pub mod types;

mod renderer;
mod texture;
mod window;

pub use renderer::Renderer;
pub use texture::Texture;
pub use window::Window;
