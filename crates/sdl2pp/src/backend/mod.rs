//! Host library seam
//!
//! The native 2D rendering library is an external collaborator. Everything the
//! wrappers need from it goes through [`HostLibrary`], one method per native
//! call. Methods report failure with [`HostFailure`]; the text explaining the
//! failure is fetched separately with [`HostLibrary::get_error`], exactly like
//! the native "last error" slot.
//!
//! # Handles
//!
//! Native resources are referred to by slotmap keys. A host invalidates a key
//! when its resource dies, including the cascades the native library performs
//! on its own (destroying a window takes its renderer, destroying a renderer
//! takes its textures, quitting takes everything). A stale key is rejected
//! with an "Invalid ..." error and never dereferenced.
//!
//! # Implementations
//!
//! - [`HeadlessHost`]: in-process bookkeeping host with the native validation
//!   rules, used for tests and display-less runs
//! - `SdlHost` (feature `sdl`): forwards to the SDL2 C library. SDL is
//!   process-global, so there is one host per thread and only one of them
//!   may have SDL initialized at a time.

use std::rc::Rc;

use slotmap::new_key_type;

use crate::events::Event;
use crate::foundation::math::{Color, Point, Rect};
use crate::render::types::{
    BlendMode, DriverIndex, Flip, InitFlags, PixelFormat, RendererFlags, RendererInfo,
    TextureAccess, TextureQuery, WindowFlags, WindowPos,
};

#[cfg(any(feature = "sdl", test))]
mod claim;
mod headless;
#[cfg(feature = "sdl")]
mod sdl;

pub use headless::{FrameStats, HeadlessHost};
#[cfg(feature = "sdl")]
pub use sdl::SdlHost;

new_key_type! {
    /// Opaque handle to a native window
    pub struct WindowKey;
    /// Opaque handle to a native renderer
    pub struct RendererKey;
    /// Opaque handle to a native texture
    pub struct TextureKey;
}

/// Marker for a failed host call; the reason is in [`HostLibrary::get_error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostFailure;

/// Outcome of a host call
pub type HostResult<T = ()> = Result<T, HostFailure>;

/// Shared handle to the host library used by every wrapper
pub type Host = Rc<dyn HostLibrary>;

/// The native rendering library's procedural API.
///
/// Implementations are single-threaded and use interior mutability; every
/// method takes `&self`.
pub trait HostLibrary {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    // --- lifecycle -------------------------------------------------------

    /// Initialize the library with the given subsystems
    fn init(&self, flags: InitFlags) -> HostResult;

    /// Shut down every subsystem, releasing all live resources
    fn quit(&self);

    /// Initialize additional subsystems
    fn init_subsystem(&self, flags: InitFlags) -> HostResult;

    /// Shut down specific subsystems
    fn quit_subsystem(&self, flags: InitFlags);

    /// Which of `flags` are initialized; all initialized subsystems when
    /// `flags` is empty
    fn was_init(&self, flags: InitFlags) -> InitFlags;

    // --- error slot ------------------------------------------------------

    /// Text describing the most recent failure
    fn get_error(&self) -> String;

    /// Reset the error text
    fn clear_error(&self);

    // --- windows ---------------------------------------------------------

    /// Create a window
    fn create_window(
        &self,
        title: &str,
        x: WindowPos,
        y: WindowPos,
        width: u32,
        height: u32,
        flags: WindowFlags,
    ) -> HostResult<WindowKey>;

    /// Destroy a window and the renderer attached to it
    fn destroy_window(&self, window: WindowKey) -> HostResult;

    /// Create a window and a default renderer for it in one call
    fn create_window_and_renderer(
        &self,
        width: u32,
        height: u32,
        flags: WindowFlags,
    ) -> HostResult<(WindowKey, RendererKey)>;

    /// Client area size
    fn window_size(&self, window: WindowKey) -> HostResult<(u32, u32)>;

    /// Window title
    fn window_title(&self, window: WindowKey) -> HostResult<String>;

    /// Change the window title
    fn set_window_title(&self, window: WindowKey, title: &str) -> HostResult;

    // --- renderers -------------------------------------------------------

    /// Create a renderer for a window
    fn create_renderer(
        &self,
        window: WindowKey,
        driver: DriverIndex,
        flags: RendererFlags,
    ) -> HostResult<RendererKey>;

    /// Destroy a renderer and every texture it created
    fn destroy_renderer(&self, renderer: RendererKey) -> HostResult;

    /// Number of render drivers compiled into the library; may be zero or
    /// negative on failure
    fn num_render_drivers(&self) -> i32;

    /// Description of a render driver
    fn render_driver_info(&self, index: u32) -> HostResult<RendererInfo>;

    /// Description of a live renderer
    fn renderer_info(&self, renderer: RendererKey) -> HostResult<RendererInfo>;

    /// Output size in pixels
    fn renderer_output_size(&self, renderer: RendererKey) -> HostResult<(u32, u32)>;

    /// Whether the renderer can draw into textures
    fn render_target_supported(&self, renderer: RendererKey) -> bool;

    /// Redirect drawing to a target texture, or back to the window with `None`
    fn set_render_target(&self, renderer: RendererKey, texture: Option<TextureKey>)
        -> HostResult;

    /// Texture drawing currently goes to, `None` for the window
    fn render_target(&self, renderer: RendererKey) -> HostResult<Option<TextureKey>>;

    /// Fill the current target with the draw colour
    fn render_clear(&self, renderer: RendererKey) -> HostResult;

    /// Show everything drawn since the last present
    fn render_present(&self, renderer: RendererKey) -> HostResult;

    /// Colour used by clear and the draw primitives
    fn set_render_draw_color(&self, renderer: RendererKey, color: Color) -> HostResult;

    /// Current draw colour
    fn render_draw_color(&self, renderer: RendererKey) -> HostResult<Color>;

    /// Blending used by the draw primitives
    fn set_render_draw_blend_mode(&self, renderer: RendererKey, mode: BlendMode) -> HostResult;

    /// Current draw blend mode
    fn render_draw_blend_mode(&self, renderer: RendererKey) -> HostResult<BlendMode>;

    /// Draw one point
    fn render_draw_point(&self, renderer: RendererKey, x: i32, y: i32) -> HostResult;

    /// Draw several points
    fn render_draw_points(&self, renderer: RendererKey, points: &[Point]) -> HostResult;

    /// Draw one line
    fn render_draw_line(&self, renderer: RendererKey, x1: i32, y1: i32, x2: i32, y2: i32)
        -> HostResult;

    /// Draw a connected polyline
    fn render_draw_lines(&self, renderer: RendererKey, points: &[Point]) -> HostResult;

    /// Outline one rectangle
    fn render_draw_rect(&self, renderer: RendererKey, rect: &Rect) -> HostResult;

    /// Outline several rectangles
    fn render_draw_rects(&self, renderer: RendererKey, rects: &[Rect]) -> HostResult;

    /// Fill one rectangle
    fn render_fill_rect(&self, renderer: RendererKey, rect: &Rect) -> HostResult;

    /// Fill several rectangles
    fn render_fill_rects(&self, renderer: RendererKey, rects: &[Rect]) -> HostResult;

    /// Restrict drawing to an area of the target; `None` resets to the full target
    fn render_set_viewport(&self, renderer: RendererKey, rect: Option<&Rect>) -> HostResult;

    /// Current viewport
    fn render_viewport(&self, renderer: RendererKey) -> HostResult<Rect>;

    /// Scale applied to drawing coordinates
    fn render_set_scale(&self, renderer: RendererKey, scale_x: f32, scale_y: f32) -> HostResult;

    /// Current drawing scale
    fn render_scale(&self, renderer: RendererKey) -> HostResult<(f32, f32)>;

    /// Device-independent resolution; `(0, 0)` disables it
    fn render_set_logical_size(&self, renderer: RendererKey, width: u32, height: u32)
        -> HostResult;

    /// Current logical size, `(0, 0)` when unset
    fn render_logical_size(&self, renderer: RendererKey) -> HostResult<(u32, u32)>;

    /// Discard drawing outside `rect`; `None` turns clipping off
    fn render_set_clip_rect(&self, renderer: RendererKey, rect: Option<&Rect>) -> HostResult;

    /// Current clip rectangle, `None` while clipping is off
    fn render_clip_rect(&self, renderer: RendererKey) -> HostResult<Option<Rect>>;

    /// Read back pixels of the current target. `rect` is relative to the
    /// viewport and defaults to all of it; the area inside the viewport is
    /// written to `pixels` with `pitch` bytes per row.
    fn render_read_pixels(
        &self,
        renderer: RendererKey,
        rect: Option<&Rect>,
        format: PixelFormat,
        pixels: &mut [u8],
        pitch: usize,
    ) -> HostResult;

    /// Copy part of a texture to the current target
    fn render_copy(
        &self,
        renderer: RendererKey,
        texture: TextureKey,
        src: Option<&Rect>,
        dst: Option<&Rect>,
    ) -> HostResult;

    /// Copy part of a texture, rotated by `angle` degrees clockwise around
    /// `center` (the middle of `dst` for `None`) and mirrored by `flip`
    #[allow(clippy::too_many_arguments)]
    fn render_copy_ex(
        &self,
        renderer: RendererKey,
        texture: TextureKey,
        src: Option<&Rect>,
        dst: Option<&Rect>,
        angle: f64,
        center: Option<&Point>,
        flip: Flip,
    ) -> HostResult;

    // --- textures --------------------------------------------------------

    /// Create a texture owned by a renderer
    fn create_texture(
        &self,
        renderer: RendererKey,
        format: PixelFormat,
        access: TextureAccess,
        width: u32,
        height: u32,
    ) -> HostResult<TextureKey>;

    /// Destroy a texture
    fn destroy_texture(&self, texture: TextureKey) -> HostResult;

    /// Format, access and size of a texture
    fn query_texture(&self, texture: TextureKey) -> HostResult<TextureQuery>;

    /// Colour multiplied into copies of the texture
    fn set_texture_color_mod(&self, texture: TextureKey, r: u8, g: u8, b: u8) -> HostResult;

    /// Current colour modulation
    fn texture_color_mod(&self, texture: TextureKey) -> HostResult<(u8, u8, u8)>;

    /// Alpha multiplied into copies of the texture
    fn set_texture_alpha_mod(&self, texture: TextureKey, alpha: u8) -> HostResult;

    /// Current alpha modulation
    fn texture_alpha_mod(&self, texture: TextureKey) -> HostResult<u8>;

    /// Blending used when copying the texture
    fn set_texture_blend_mode(&self, texture: TextureKey, mode: BlendMode) -> HostResult;

    /// Current texture blend mode
    fn texture_blend_mode(&self, texture: TextureKey) -> HostResult<BlendMode>;

    /// Replace texture pixels. `pixels` holds at least `pitch` bytes per row
    /// of the updated area; callers validate the length.
    fn update_texture(
        &self,
        texture: TextureKey,
        rect: Option<&Rect>,
        pixels: &[u8],
        pitch: usize,
    ) -> HostResult;

    // --- events ----------------------------------------------------------

    /// Next pending event, without blocking
    fn poll_event(&self) -> Option<Event>;
}

/// The host the crate was built for: SDL2 with the `sdl` feature, otherwise
/// the headless host.
pub fn default_host() -> Host {
    #[cfg(feature = "sdl")]
    {
        SdlHost::shared()
    }
    #[cfg(not(feature = "sdl"))]
    {
        Rc::new(HeadlessHost::new())
    }
}
