//! Ownership and teardown across windows, renderers and textures
//!
//! Every test checks the host's live handle counts, and that no destroy call
//! ever reached the host for a handle that was already gone.

use super::video_app;
use crate::backend::HostLibrary;
use crate::render::types::{
    DriverIndex, PixelFormat, RendererFlags, TextureAccess, WindowFlags, WindowPos,
};
use crate::{Renderer, Window};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameters_leave_nothing_behind() {
        let (host, app) = video_app();

        let oversized = Window::new(
            &app,
            "",
            WindowPos::Undefined,
            WindowPos::Undefined,
            20_000,
            10,
            WindowFlags::empty(),
        );
        assert!(oversized.is_err());
        assert_eq!(host.live_windows(), 0);

        let mut window = Window::new(
            &app,
            "",
            WindowPos::Undefined,
            WindowPos::Undefined,
            10,
            10,
            WindowFlags::empty(),
        )
        .unwrap();
        assert!(window
            .create_renderer(DriverIndex::Index(9), RendererFlags::empty())
            .is_err());
        assert_eq!(host.live_renderers(), 0);

        let renderer = window
            .create_renderer(DriverIndex::First, RendererFlags::empty())
            .unwrap();
        assert!(renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Static, 9000, 9000)
            .is_err());
        assert_eq!(host.live_textures(), 0);
    }

    #[test]
    fn test_double_destroy_never_reaches_host_twice() {
        let (host, app) = video_app();
        let (mut window, renderer) =
            Window::create_window_and_renderer(&app, 32, 32, WindowFlags::empty()).unwrap();
        let mut texture = renderer
            .create_texture(PixelFormat::Unknown, TextureAccess::Streaming, 8, 8)
            .unwrap();

        texture.destroy();
        texture.destroy();
        renderer.destroy();
        renderer.destroy();
        window.destroy();
        window.destroy();
        drop((texture, renderer, window));

        assert_eq!(host.live_windows(), 0);
        assert_eq!(host.live_renderers(), 0);
        assert_eq!(host.live_textures(), 0);
        assert_eq!(host.stale_destroys(), 0);
    }

    #[test]
    fn test_renderer_outlives_dropped_window() {
        let (host, app) = video_app();
        let mut window = Window::new(
            &app,
            "owner",
            WindowPos::Centered,
            WindowPos::Centered,
            64,
            48,
            WindowFlags::empty(),
        )
        .unwrap();
        let renderer = window
            .create_renderer(DriverIndex::First, RendererFlags::empty())
            .unwrap();
        drop(window);

        assert_eq!(host.live_windows(), 1);
        assert!(renderer.is_active());
        renderer.set_draw_color((10, 20, 30, 255)).unwrap();
        renderer.clear().unwrap();
        renderer.present().unwrap();
        assert_eq!(renderer.output_size().unwrap(), (64, 48));

        drop(renderer);
        assert_eq!(host.live_windows(), 0);
        assert_eq!(host.live_renderers(), 0);
        assert_eq!(host.stale_destroys(), 0);
    }

    #[test]
    fn test_textures_keep_renderer_alive() {
        let (host, app) = video_app();
        let (window, renderer) =
            Window::create_window_and_renderer(&app, 32, 32, WindowFlags::empty()).unwrap();
        let texture = renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Static, 4, 4)
            .unwrap();

        drop(renderer);
        drop(window);
        assert_eq!(host.live_renderers(), 1);
        assert_eq!(host.live_windows(), 1);
        assert!(texture.is_active());
        texture.set_alpha_mod(7).unwrap();

        drop(texture);
        assert_eq!(host.live_textures(), 0);
        assert_eq!(host.live_renderers(), 0);
        assert_eq!(host.live_windows(), 0);
        assert_eq!(host.stale_destroys(), 0);
    }

    #[test]
    fn test_renderer_clones_share_one_handle() {
        let (host, app) = video_app();
        let (_window, renderer) =
            Window::create_window_and_renderer(&app, 32, 32, WindowFlags::empty()).unwrap();
        let clone = renderer.clone();
        assert_eq!(clone.handle(), renderer.handle());

        clone.destroy();
        assert!(!renderer.is_active());
        assert_eq!(host.live_renderers(), 0);
        assert_eq!(renderer.clear().unwrap_err().message(), "Invalid renderer");
    }

    #[test]
    fn test_quit_invalidates_every_wrapper() {
        let (host, mut app) = video_app();
        let (window, renderer) =
            Window::create_window_and_renderer(&app, 32, 32, WindowFlags::empty()).unwrap();
        let texture = renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Static, 4, 4)
            .unwrap();

        app.quit();
        assert_eq!(host.live_windows(), 0);
        assert!(renderer.clear().is_err());
        assert!(texture.query().is_err());
        assert!(window.size().is_err());
        assert!(Renderer::num_drivers(&app).is_ok());

        // teardown after quit is rejected by the host, never performed
        drop((texture, renderer, window));
        assert!(host.stale_destroys() > 0);
        assert!(host.was_init(crate::render::types::InitFlags::empty()).is_empty());
    }
}
