//! Native window wrapper

use std::cell::Cell;
use std::rc::Rc;

use super::renderer::Renderer;
use super::types::{DriverIndex, RendererFlags, WindowFlags, WindowPos};
use crate::application::Application;
use crate::backend::{Host, WindowKey};
use crate::core::config::{RendererConfig, WindowConfig};
use crate::error::{Error, HostResultExt, Result};

/// Shared owner of a native window handle.
///
/// Held by the [`Window`] and by its renderer; the native window is destroyed
/// when the last holder lets go or on explicit [`Window::destroy`].
pub(crate) struct WindowCore {
    host: Host,
    key: Cell<Option<WindowKey>>,
}

impl WindowCore {
    fn new(host: Host, key: WindowKey) -> Rc<Self> {
        log::debug!("Created window {key:?}");
        Rc::new(Self {
            host,
            key: Cell::new(Some(key)),
        })
    }

    /// Handle, `None` once destroyed
    pub(crate) fn key(&self) -> Option<WindowKey> {
        self.key.get()
    }

    fn destroy(&self) {
        let Some(key) = self.key.take() else {
            return;
        };
        log::debug!("Destroying window {key:?}");
        if self.host.destroy_window(key).is_err() {
            // quit() already released it
            log::debug!("Window {key:?} was released by the host: {}", self.host.get_error());
        }
    }
}

impl Drop for WindowCore {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// A top-level window.
///
/// Owns at most one [`Renderer`]. Dropping the window while a clone of its
/// renderer is still held keeps the native window alive until that clone is
/// dropped too.
pub struct Window {
    core: Rc<WindowCore>,
    renderer: Option<Renderer>,
}

impl Window {
    /// Create a window.
    ///
    /// Width and height below 1 are raised to 1 by the host; larger than the
    /// host limit fails.
    pub fn new(
        app: &Application,
        title: &str,
        x: impl Into<WindowPos>,
        y: impl Into<WindowPos>,
        width: u32,
        height: u32,
        flags: WindowFlags,
    ) -> Result<Self> {
        let host = app.host().clone();
        let key = host
            .create_window(title, x.into(), y.into(), width, height, flags)
            .or_host_error(host.as_ref())?;
        Ok(Self {
            core: WindowCore::new(host, key),
            renderer: None,
        })
    }

    /// Create a window from configuration
    pub fn from_config(app: &Application, config: &WindowConfig) -> Result<Self> {
        Self::new(
            app,
            &config.title,
            config.x,
            config.y,
            config.width,
            config.height,
            config.flags(),
        )
    }

    /// Create a window together with a renderer on the first matching driver
    pub fn create_window_and_renderer(
        app: &Application,
        width: u32,
        height: u32,
        flags: WindowFlags,
    ) -> Result<(Self, Renderer)> {
        let host = app.host().clone();
        let (window_key, renderer_key) = host
            .create_window_and_renderer(width, height, flags)
            .or_host_error(host.as_ref())?;
        let core = WindowCore::new(host.clone(), window_key);
        let renderer = Renderer::from_parts(host, renderer_key, Rc::clone(&core));
        let window = Self {
            core,
            renderer: Some(renderer.clone()),
        };
        Ok((window, renderer))
    }

    /// Create the window's renderer.
    ///
    /// Fails if the window already has one. The window keeps a reference to
    /// the result, retrievable with [`Window::renderer`].
    pub fn create_renderer(
        &mut self,
        driver: impl Into<DriverIndex>,
        flags: RendererFlags,
    ) -> Result<Renderer> {
        let key = self.key()?;
        let host = &self.core.host;
        let driver = driver.into();
        let renderer_key = host
            .create_renderer(key, driver, flags)
            .or_host_error(host.as_ref())?;
        let renderer = Renderer::from_parts(host.clone(), renderer_key, Rc::clone(&self.core));
        self.renderer = Some(renderer.clone());
        Ok(renderer)
    }

    /// Create the window's renderer from configuration
    pub fn create_renderer_from_config(&mut self, config: &RendererConfig) -> Result<Renderer> {
        self.create_renderer(config.driver_index(), config.flags())
    }

    /// The renderer created for this window, if any
    pub fn renderer(&self) -> Option<Renderer> {
        self.renderer.clone()
    }

    /// Client area size in pixels
    pub fn size(&self) -> Result<(u32, u32)> {
        let key = self.key()?;
        self.core.host.window_size(key).or_host_error(self.core.host.as_ref())
    }

    /// Window title
    pub fn title(&self) -> Result<String> {
        let key = self.key()?;
        self.core.host.window_title(key).or_host_error(self.core.host.as_ref())
    }

    /// Change the window title
    pub fn set_title(&self, title: &str) -> Result<()> {
        let key = self.key()?;
        self.core
            .host
            .set_window_title(key, title)
            .or_host_error(self.core.host.as_ref())
    }

    /// Native handle, `None` once destroyed
    pub fn handle(&self) -> Option<WindowKey> {
        self.core.key()
    }

    /// Whether the native window is still alive
    pub fn is_active(&self) -> bool {
        self.core.key().is_some()
    }

    /// Destroy the native window now, along with its renderer.
    ///
    /// Renderer clones held elsewhere become inactive. Calling this again is
    /// a no-op.
    pub fn destroy(&mut self) {
        self.renderer = None;
        self.core.destroy();
    }

    fn key(&self) -> Result<WindowKey> {
        self.core.key().ok_or_else(|| Error::invalid_handle("window"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessHost;
    use crate::render::types::InitFlags;

    fn headless_app() -> (Rc<HeadlessHost>, Application) {
        let host = Rc::new(HeadlessHost::new());
        let app = Application::init(host.clone(), InitFlags::VIDEO).unwrap();
        (host, app)
    }

    #[test]
    fn test_new_window_reports_size_and_title() {
        let (_host, app) = headless_app();
        let window = Window::new(
            &app,
            "hello",
            WindowPos::Centered,
            10,
            320,
            240,
            WindowFlags::empty(),
        )
        .unwrap();
        assert_eq!(window.size().unwrap(), (320, 240));
        assert_eq!(window.title().unwrap(), "hello");

        window.set_title("renamed").unwrap();
        assert_eq!(window.title().unwrap(), "renamed");
    }

    #[test]
    fn test_zero_size_is_raised_to_one() {
        let (_host, app) = headless_app();
        let window = Window::new(
            &app,
            "",
            WindowPos::Undefined,
            WindowPos::Undefined,
            0,
            0,
            WindowFlags::empty(),
        )
        .unwrap();
        assert_eq!(window.size().unwrap(), (1, 1));
    }

    #[test]
    fn test_oversized_window_fails_without_handle() {
        let (host, app) = headless_app();
        let error = Window::new(
            &app,
            "",
            WindowPos::Undefined,
            WindowPos::Undefined,
            100_000,
            10,
            WindowFlags::empty(),
        )
        .err()
        .unwrap();
        assert_eq!(error.message(), "Window is too large.");
        assert_eq!(host.live_windows(), 0);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (host, app) = headless_app();
        let mut window = Window::new(
            &app,
            "",
            WindowPos::Undefined,
            WindowPos::Undefined,
            8,
            8,
            WindowFlags::empty(),
        )
        .unwrap();
        window.destroy();
        window.destroy();
        assert!(!window.is_active());
        assert_eq!(host.live_windows(), 0);
        assert_eq!(host.stale_destroys(), 0);
        assert_eq!(window.size().unwrap_err().message(), "Invalid window");
    }

    #[test]
    fn test_second_renderer_is_rejected() {
        let (_host, app) = headless_app();
        let mut window = Window::new(
            &app,
            "",
            WindowPos::Undefined,
            WindowPos::Undefined,
            8,
            8,
            WindowFlags::empty(),
        )
        .unwrap();
        window.create_renderer(DriverIndex::First, RendererFlags::empty()).unwrap();
        let error = window
            .create_renderer(DriverIndex::First, RendererFlags::empty())
            .unwrap_err();
        assert_eq!(error.message(), "Renderer already associated with window");
        assert!(window.renderer().is_some());
    }

    #[test]
    fn test_destroy_takes_renderer_clones_down() {
        let (host, app) = headless_app();
        let (mut window, renderer) =
            Window::create_window_and_renderer(&app, 64, 64, WindowFlags::empty()).unwrap();
        window.destroy();
        assert!(!renderer.is_active());
        assert_eq!(renderer.clear().unwrap_err().message(), "Invalid renderer");
        drop(renderer);
        assert_eq!(host.live_renderers(), 0);
        assert_eq!(host.stale_destroys(), 0);
    }
}
