//! 2D renderer wrapper and drawing calls

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::texture::Texture;
use super::types::{BlendMode, Flip, PixelFormat, RendererInfo, TextureAccess};
use super::window::WindowCore;
use crate::application::Application;
use crate::backend::{Host, HostLibrary, HostResult, RendererKey, TextureKey};
use crate::error::{Error, HostResultExt, Result};
use crate::foundation::math::{Color, Point, Rect};

/// Shared owner of a native renderer handle
pub(crate) struct RendererCore {
    host: Host,
    key: Cell<Option<RendererKey>>,
    window: Rc<WindowCore>,
}

impl RendererCore {
    /// Handle, `None` once the renderer or its window was destroyed
    pub(crate) fn key(&self) -> Option<RendererKey> {
        self.key.get().filter(|_| self.window.key().is_some())
    }

    pub(crate) fn host(&self) -> &Host {
        &self.host
    }

    fn destroy(&self) {
        let Some(key) = self.key.take() else {
            return;
        };
        if self.window.key().is_none() {
            log::debug!("Renderer {key:?} went down with its window");
            return;
        }
        log::debug!("Destroying renderer {key:?}");
        if self.host.destroy_renderer(key).is_err() {
            log::debug!("Renderer {key:?} was released by the host: {}", self.host.get_error());
        }
    }
}

impl Drop for RendererCore {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// A 2D renderer bound to a window.
///
/// Cloning is cheap and shares the native renderer. The native renderer is
/// destroyed when the last clone and the last texture created from it are
/// gone, or on an explicit [`Renderer::destroy`].
///
/// Every drawing call forwards to the host and fails if the host reports a
/// failure or the renderer is no longer active.
#[derive(Clone)]
pub struct Renderer {
    core: Rc<RendererCore>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("handle", &self.core.key())
            .finish()
    }
}

impl Renderer {
    pub(crate) fn from_parts(host: Host, key: RendererKey, window: Rc<WindowCore>) -> Self {
        match host.renderer_info(key) {
            Ok(info) => log::info!("Created renderer {key:?} on driver '{}'", info.name),
            Err(_) => log::debug!("Created renderer {key:?}"),
        }
        Self {
            core: Rc::new(RendererCore {
                host,
                key: Cell::new(Some(key)),
                window,
            }),
        }
    }

    /// Number of render drivers available
    pub fn num_drivers(app: &Application) -> Result<u32> {
        let host = app.host().as_ref();
        let count = host.num_render_drivers();
        match u32::try_from(count) {
            Ok(count) if count > 0 => Ok(count),
            _ => Err(Error::from_host_or(host, "no render drivers available")),
        }
    }

    /// Description of a render driver
    pub fn driver_info(app: &Application, index: u32) -> Result<RendererInfo> {
        let host = app.host().as_ref();
        host.render_driver_info(index).or_host_error(host)
    }

    /// Description of this renderer
    pub fn info(&self) -> Result<RendererInfo> {
        self.forward(|host, key| host.renderer_info(key))
    }

    /// Size of the current target in pixels
    pub fn output_size(&self) -> Result<(u32, u32)> {
        self.forward(|host, key| host.renderer_output_size(key))
    }

    /// Create a texture owned by this renderer.
    ///
    /// [`PixelFormat::Unknown`] picks the renderer's preferred format.
    pub fn create_texture(
        &self,
        format: PixelFormat,
        access: TextureAccess,
        width: u32,
        height: u32,
    ) -> Result<Texture> {
        let key =
            self.forward(|host, key| host.create_texture(key, format, access, width, height))?;
        Ok(Texture::from_parts(key, Rc::clone(&self.core)))
    }

    /// Whether textures created with [`TextureAccess::Target`] can be drawn into
    pub fn render_target_supported(&self) -> bool {
        self.core
            .key()
            .is_some_and(|key| self.core.host.render_target_supported(key))
    }

    /// Draw into `texture` instead of the window
    pub fn set_target(&self, texture: &Texture) -> Result<()> {
        let target = texture
            .handle()
            .ok_or_else(|| Error::invalid_handle("texture"))?;
        self.forward(|host, key| host.set_render_target(key, Some(target)))
    }

    /// Draw into the window again
    pub fn reset_target(&self) -> Result<()> {
        self.forward(|host, key| host.set_render_target(key, None))
    }

    /// Handle of the texture drawing goes to, `None` while drawing to the window
    pub fn target(&self) -> Result<Option<TextureKey>> {
        self.forward(|host, key| host.render_target(key))
    }

    /// Whether drawing currently goes to `texture`
    pub fn is_target(&self, texture: &Texture) -> Result<bool> {
        Ok(texture.handle().is_some() && self.target()? == texture.handle())
    }

    /// Fill the current target with the draw colour
    pub fn clear(&self) -> Result<()> {
        self.forward(|host, key| host.render_clear(key))
    }

    /// Show what was drawn since the last present.
    ///
    /// The native call has no status; this only fails when the renderer is
    /// no longer valid.
    pub fn present(&self) -> Result<()> {
        self.forward(|host, key| host.render_present(key))
    }

    /// Set the colour used by clear and the draw calls
    pub fn set_draw_color(&self, color: impl Into<Color>) -> Result<()> {
        let color = color.into();
        self.forward(|host, key| host.set_render_draw_color(key, color))
    }

    /// Current draw colour
    pub fn draw_color(&self) -> Result<Color> {
        self.forward(|host, key| host.render_draw_color(key))
    }

    /// Set the blend mode of the draw calls
    pub fn set_draw_blend_mode(&self, mode: BlendMode) -> Result<()> {
        self.forward(|host, key| host.set_render_draw_blend_mode(key, mode))
    }

    /// Current draw blend mode
    pub fn draw_blend_mode(&self) -> Result<BlendMode> {
        self.forward(|host, key| host.render_draw_blend_mode(key))
    }

    /// Draw a single point
    pub fn draw_point(&self, point: impl Into<Point>) -> Result<()> {
        let point = point.into();
        self.forward(|host, key| host.render_draw_point(key, point.x, point.y))
    }

    /// Draw several points
    pub fn draw_points(&self, points: &[Point]) -> Result<()> {
        self.forward(|host, key| host.render_draw_points(key, points))
    }

    /// Draw a line between two points
    pub fn draw_line(&self, from: impl Into<Point>, to: impl Into<Point>) -> Result<()> {
        let (from, to) = (from.into(), to.into());
        self.forward(|host, key| host.render_draw_line(key, from.x, from.y, to.x, to.y))
    }

    /// Draw a polyline through `points`
    pub fn draw_lines(&self, points: &[Point]) -> Result<()> {
        self.forward(|host, key| host.render_draw_lines(key, points))
    }

    /// Outline a rectangle
    pub fn draw_rect(&self, rect: impl Into<Rect>) -> Result<()> {
        let rect = rect.into();
        self.forward(|host, key| host.render_draw_rect(key, &rect))
    }

    /// Outline several rectangles
    pub fn draw_rects(&self, rects: &[Rect]) -> Result<()> {
        self.forward(|host, key| host.render_draw_rects(key, rects))
    }

    /// Fill a rectangle
    pub fn fill_rect(&self, rect: impl Into<Rect>) -> Result<()> {
        let rect = rect.into();
        self.forward(|host, key| host.render_fill_rect(key, &rect))
    }

    /// Fill several rectangles
    pub fn fill_rects(&self, rects: &[Rect]) -> Result<()> {
        self.forward(|host, key| host.render_fill_rects(key, rects))
    }

    /// Restrict drawing to `viewport`; `None` uses the whole target
    pub fn set_viewport(&self, viewport: Option<Rect>) -> Result<()> {
        self.forward(|host, key| host.render_set_viewport(key, viewport.as_ref()))
    }

    /// Current drawing area
    pub fn viewport(&self) -> Result<Rect> {
        self.forward(|host, key| host.render_viewport(key))
    }

    /// Scale drawing coordinates
    pub fn set_scale(&self, scale_x: f32, scale_y: f32) -> Result<()> {
        self.forward(|host, key| host.render_set_scale(key, scale_x, scale_y))
    }

    /// Current drawing scale
    pub fn scale(&self) -> Result<(f32, f32)> {
        self.forward(|host, key| host.render_scale(key))
    }

    /// Render at a device-independent resolution; `(0, 0)` turns it off
    pub fn set_logical_size(&self, width: u32, height: u32) -> Result<()> {
        self.forward(|host, key| host.render_set_logical_size(key, width, height))
    }

    /// Current logical size, `(0, 0)` when unset
    pub fn logical_size(&self) -> Result<(u32, u32)> {
        self.forward(|host, key| host.render_logical_size(key))
    }

    /// Discard drawing outside `clip`; `None` turns clipping off.
    ///
    /// Switching the target turns clipping off again.
    pub fn set_clip_rect(&self, clip: Option<Rect>) -> Result<()> {
        self.forward(|host, key| host.render_set_clip_rect(key, clip.as_ref()))
    }

    /// Current clip rectangle, `None` while clipping is off
    pub fn clip_rect(&self) -> Result<Option<Rect>> {
        self.forward(|host, key| host.render_clip_rect(key))
    }

    /// Read back pixels of the current target.
    ///
    /// `rect` is relative to the viewport and is clipped to it; `None` reads
    /// the whole viewport. Rows are packed tightly in `format`, with
    /// [`PixelFormat::Unknown`] meaning ARGB8888. An area entirely outside
    /// the viewport reads as an empty buffer.
    pub fn read_pixels(&self, rect: Option<Rect>, format: PixelFormat) -> Result<Vec<u8>> {
        let format = match format {
            PixelFormat::Unknown => PixelFormat::Argb8888,
            format => format,
        };
        let viewport = self.viewport()?;
        let bounds = Rect::with_size(viewport.w, viewport.h);
        let area = match rect {
            Some(rect) => rect.intersection(&bounds),
            None => Some(bounds).filter(|bounds| !bounds.is_empty()),
        };
        let Some(area) = area else {
            return Ok(Vec::new());
        };
        let pitch = usize::try_from(area.w).unwrap_or(0) * format.bytes_per_pixel();
        let mut pixels = vec![0; pitch * usize::try_from(area.h).unwrap_or(0)];
        self.forward(|host, key| {
            host.render_read_pixels(key, Some(&area), format, &mut pixels, pitch)
        })?;
        Ok(pixels)
    }

    /// Copy `src` of `texture` (all of it for `None`) to `dst` of the target
    /// (all of it for `None`)
    pub fn copy(&self, texture: &Texture, src: Option<Rect>, dst: Option<Rect>) -> Result<()> {
        let texture = texture
            .handle()
            .ok_or_else(|| Error::invalid_handle("texture"))?;
        self.forward(|host, key| host.render_copy(key, texture, src.as_ref(), dst.as_ref()))
    }

    /// Like [`Renderer::copy`], rotated by `angle` degrees clockwise around
    /// `center` (the middle of `dst` for `None`) and mirrored by `flip`
    pub fn copy_ex(
        &self,
        texture: &Texture,
        src: Option<Rect>,
        dst: Option<Rect>,
        angle: f64,
        center: Option<Point>,
        flip: Flip,
    ) -> Result<()> {
        let texture = texture
            .handle()
            .ok_or_else(|| Error::invalid_handle("texture"))?;
        self.forward(|host, key| {
            host.render_copy_ex(
                key,
                texture,
                src.as_ref(),
                dst.as_ref(),
                angle,
                center.as_ref(),
                flip,
            )
        })
    }

    /// Native handle, `None` once destroyed
    pub fn handle(&self) -> Option<RendererKey> {
        self.core.key()
    }

    /// Whether the native renderer is still alive
    pub fn is_active(&self) -> bool {
        self.core.key().is_some()
    }

    /// Destroy the native renderer now, for every clone.
    ///
    /// Textures created from it become inactive. Calling this again is a
    /// no-op.
    pub fn destroy(&self) {
        self.core.destroy();
    }

    fn forward<T>(
        &self,
        call: impl FnOnce(&dyn HostLibrary, RendererKey) -> HostResult<T>,
    ) -> Result<T> {
        let key = self
            .core
            .key()
            .ok_or_else(|| Error::invalid_handle("renderer"))?;
        let host = self.core.host.as_ref();
        call(host, key).or_host_error(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessHost;
    use crate::render::types::{DriverIndex, InitFlags, RendererFlags, WindowFlags, WindowPos};

    fn colors(pixels: &[u8], format: PixelFormat) -> Vec<Color> {
        pixels
            .chunks_exact(4)
            .map(|bytes| {
                let raw = u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                format.unpack(raw).unwrap()
            })
            .collect()
    }
    use crate::render::Window;
    use approx::assert_relative_eq;

    fn setup() -> (Rc<HeadlessHost>, Application, Window, Renderer) {
        let host = Rc::new(HeadlessHost::new());
        let app = Application::init(host.clone(), InitFlags::VIDEO).unwrap();
        let (window, renderer) =
            Window::create_window_and_renderer(&app, 320, 240, WindowFlags::empty()).unwrap();
        (host, app, window, renderer)
    }

    #[test]
    fn test_driver_queries() {
        let (_host, app, _window, _renderer) = setup();
        assert_eq!(Renderer::num_drivers(&app).unwrap(), 2);
        assert_eq!(Renderer::driver_info(&app, 1).unwrap().name, "software");
    }

    #[test]
    fn test_no_drivers_is_an_error() {
        let host = Rc::new(HeadlessHost::with_drivers(Vec::new()));
        let app = Application::init(host, InitFlags::VIDEO).unwrap();
        let error = Renderer::num_drivers(&app).unwrap_err();
        assert!(!error.message().is_empty());
    }

    #[test]
    fn test_info_of_default_renderer() {
        let (_host, _app, _window, renderer) = setup();
        let info = renderer.info().unwrap();
        assert_eq!(info.name, "headless");
        assert!(info.supports(RendererFlags::ACCELERATED));
        assert!(renderer.render_target_supported());
        assert_eq!(renderer.output_size().unwrap(), (320, 240));
    }

    #[test]
    fn test_draw_calls_reach_host() {
        let (host, _app, _window, renderer) = setup();
        renderer.draw_point((1, 1)).unwrap();
        renderer.draw_line([0, 0], Point::new(10, 10)).unwrap();
        renderer.draw_rect((0, 0, 5, 5)).unwrap();
        renderer
            .fill_rects(&[Rect::new(0, 0, 2, 2), Rect::new(4, 4, 2, 2)])
            .unwrap();
        renderer.present().unwrap();

        let stats = host.frame_stats(renderer.handle().unwrap()).unwrap();
        assert_eq!(stats.points, 1);
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.rects, 1);
        assert_eq!(stats.filled_rects, 2);
        assert_eq!(stats.presents, 1);
    }

    #[test]
    fn test_blend_and_viewport_state() {
        let (_host, _app, _window, renderer) = setup();
        assert_eq!(renderer.draw_blend_mode().unwrap(), BlendMode::None);
        renderer.set_draw_blend_mode(BlendMode::Add).unwrap();
        assert_eq!(renderer.draw_blend_mode().unwrap(), BlendMode::Add);

        assert_eq!(renderer.viewport().unwrap(), Rect::with_size(320, 240));
        renderer.set_viewport(Some(Rect::new(10, 10, 50, 50))).unwrap();
        assert_eq!(renderer.viewport().unwrap(), Rect::new(10, 10, 50, 50));
        renderer.set_viewport(None).unwrap();
        assert_eq!(renderer.viewport().unwrap(), Rect::with_size(320, 240));
    }

    #[test]
    fn test_scale_and_logical_size() {
        let (_host, _app, _window, renderer) = setup();
        renderer.set_scale(2.0, 0.5).unwrap();
        let (sx, sy) = renderer.scale().unwrap();
        assert_relative_eq!(sx, 2.0);
        assert_relative_eq!(sy, 0.5);

        assert_eq!(renderer.logical_size().unwrap(), (0, 0));
        renderer.set_logical_size(160, 120).unwrap();
        assert_eq!(renderer.logical_size().unwrap(), (160, 120));
    }

    #[test]
    fn test_destroyed_renderer_fails_without_host_call() {
        let (host, _app, _window, renderer) = setup();
        let key = renderer.handle().unwrap();
        renderer.destroy();
        renderer.destroy();
        host.clear_error();

        let error = renderer.present().unwrap_err();
        assert_eq!(error.message(), "Invalid renderer");
        assert!(host.get_error().is_empty());
        assert!(host.frame_stats(key).is_none());
        assert_eq!(host.stale_destroys(), 0);
    }

    #[test]
    fn test_render_target_switching() {
        let (_host, _app, _window, renderer) = setup();
        let target = renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Target, 64, 32)
            .unwrap();
        renderer.set_target(&target).unwrap();
        assert_eq!(renderer.output_size().unwrap(), (64, 32));
        renderer.reset_target().unwrap();
        assert_eq!(renderer.output_size().unwrap(), (320, 240));
    }

    #[test]
    fn test_copy_from_other_renderer_fails() {
        let (_host, app, _window, renderer) = setup();
        let mut other_window = Window::new(
            &app,
            "",
            WindowPos::Undefined,
            WindowPos::Undefined,
            8,
            8,
            WindowFlags::empty(),
        )
        .unwrap();
        let other = other_window
            .create_renderer(DriverIndex::Index(1), RendererFlags::empty())
            .unwrap();
        let texture = other
            .create_texture(PixelFormat::Unknown, TextureAccess::Static, 4, 4)
            .unwrap();
        let error = renderer.copy(&texture, None, None).unwrap_err();
        assert_eq!(error.message(), "Texture was not created with this renderer");
        other.copy(&texture, None, Some(Rect::new(0, 0, 4, 4))).unwrap();
    }

    #[test]
    fn test_clip_rect_round_trip() {
        let (_host, _app, _window, renderer) = setup();
        assert_eq!(renderer.clip_rect().unwrap(), None);
        renderer.set_clip_rect(Some(Rect::new(5, 5, 20, 10))).unwrap();
        assert_eq!(renderer.clip_rect().unwrap(), Some(Rect::new(5, 5, 20, 10)));
        renderer.set_clip_rect(None).unwrap();
        assert_eq!(renderer.clip_rect().unwrap(), None);
    }

    #[test]
    fn test_target_switch_resets_clip_and_reports_target() {
        let (_host, _app, _window, renderer) = setup();
        let canvas = renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Target, 8, 8)
            .unwrap();
        assert_eq!(renderer.target().unwrap(), None);

        renderer.set_clip_rect(Some(Rect::new(0, 0, 4, 4))).unwrap();
        renderer.set_target(&canvas).unwrap();
        assert_eq!(renderer.target().unwrap(), canvas.handle());
        assert!(renderer.is_target(&canvas).unwrap());
        assert_eq!(renderer.clip_rect().unwrap(), None);

        renderer.reset_target().unwrap();
        assert!(!renderer.is_target(&canvas).unwrap());
    }

    #[test]
    fn test_destroyed_target_falls_back_to_window() {
        let (_host, _app, _window, renderer) = setup();
        let mut canvas = renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Target, 8, 8)
            .unwrap();
        renderer.set_target(&canvas).unwrap();
        canvas.destroy();
        assert_eq!(renderer.target().unwrap(), None);
        assert_eq!(renderer.output_size().unwrap(), (320, 240));
    }

    #[test]
    fn test_copy_ex_counts_transformed_copies() {
        let (host, _app, _window, renderer) = setup();
        let sprite = renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Static, 4, 4)
            .unwrap();
        renderer
            .copy_ex(&sprite, None, None, 0.0, None, Flip::empty())
            .unwrap();
        let dst = Rect::new(0, 0, 8, 8);
        renderer
            .copy_ex(&sprite, None, Some(dst), 90.0, Some(Point::new(4, 4)), Flip::empty())
            .unwrap();
        renderer
            .copy_ex(&sprite, None, None, 0.0, None, Flip::HORIZONTAL | Flip::VERTICAL)
            .unwrap();

        let stats = host.frame_stats(renderer.handle().unwrap()).unwrap();
        assert_eq!(stats.copies, 3);
        assert_eq!(stats.transformed_copies, 2);
    }

    #[test]
    fn test_read_pixels_of_window_after_clear() {
        let (_host, _app, _window, renderer) = setup();
        assert_eq!(
            renderer.read_pixels(Some(Rect::with_size(1, 1)), PixelFormat::Argb8888).unwrap(),
            vec![0; 4]
        );

        let color = Color::rgb(10, 20, 30);
        renderer.set_draw_color(color).unwrap();
        renderer.clear().unwrap();
        let pixels = renderer
            .read_pixels(Some(Rect::new(318, 238, 10, 10)), PixelFormat::Rgba8888)
            .unwrap();
        assert_eq!(pixels.len(), 2 * 2 * 4);
        assert!(colors(&pixels, PixelFormat::Rgba8888).iter().all(|&c| c == color));

        let outside = renderer
            .read_pixels(Some(Rect::new(400, 0, 5, 5)), PixelFormat::Rgba8888)
            .unwrap();
        assert!(outside.is_empty());
    }

    #[test]
    fn test_read_pixels_of_render_target() {
        let (_host, _app, _window, renderer) = setup();
        let canvas = renderer
            .create_texture(PixelFormat::Abgr8888, TextureAccess::Target, 4, 4)
            .unwrap();
        renderer.set_target(&canvas).unwrap();
        renderer.set_draw_color(Color::GREEN).unwrap();
        renderer.clear().unwrap();

        let pixels = renderer.read_pixels(None, PixelFormat::Unknown).unwrap();
        assert_eq!(pixels.len(), 4 * 4 * 4);
        assert!(colors(&pixels, PixelFormat::Argb8888).iter().all(|&c| c == Color::GREEN));

        renderer.reset_target().unwrap();
        let window = renderer
            .read_pixels(Some(Rect::with_size(1, 1)), PixelFormat::Argb8888)
            .unwrap();
        assert_eq!(window, vec![0; 4]);
    }

    #[test]
    fn test_read_pixels_sees_texture_uploads() {
        let (_host, _app, _window, renderer) = setup();
        let canvas = renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Target, 2, 1)
            .unwrap();
        let red = PixelFormat::Argb8888.pack(Color::RED).unwrap();
        let blue = PixelFormat::Argb8888.pack(Color::BLUE).unwrap();
        canvas.update(None, &[red, blue], 8).unwrap();

        renderer.set_target(&canvas).unwrap();
        let pixels = renderer.read_pixels(None, PixelFormat::Rgba8888).unwrap();
        assert_eq!(colors(&pixels, PixelFormat::Rgba8888), vec![Color::RED, Color::BLUE]);
    }

    #[test]
    fn test_read_pixels_rejects_palettized_format() {
        let (_host, _app, _window, renderer) = setup();
        let error = renderer
            .read_pixels(Some(Rect::with_size(2, 2)), PixelFormat::Index8)
            .unwrap_err();
        assert_eq!(error.message(), "Unsupported pixel format");
    }
}
