//! End-to-end scenarios of a small frame loop

use super::video_app;
use crate::backend::HostLibrary;
use crate::events::{Event, Keycode, MouseButton};
use crate::foundation::math::{Color, Point, Rect};
use crate::render::types::{BlendMode, PixelFormat, TextureAccess, WindowFlags};
use crate::{Renderer, Window};
use approx::assert_relative_eq;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_and_present_a_black_frame() {
        let (host, app) = video_app();
        let (_window, renderer) =
            Window::create_window_and_renderer(&app, 320, 240, WindowFlags::empty()).unwrap();

        renderer.set_draw_color((0, 0, 0, 255)).unwrap();
        renderer.clear().unwrap();
        renderer.present().unwrap();

        let stats = host.frame_stats(renderer.handle().unwrap()).unwrap();
        assert_eq!(stats.clears, 1);
        assert_eq!(stats.presents, 1);
        assert_eq!(stats.last_clear, Some(Color::BLACK));
        assert_eq!(renderer.output_size().unwrap(), (320, 240));
    }

    #[test]
    fn test_out_of_range_driver_info() {
        let (_host, app) = video_app();
        let count = Renderer::num_drivers(&app).unwrap();
        let error = Renderer::driver_info(&app, count + 5).unwrap_err();
        assert!(!error.message().is_empty());
        assert_eq!(error.to_string(), error.message());
    }

    #[test]
    fn test_draw_color_round_trip() {
        let (_host, app) = video_app();
        let (_window, renderer) =
            Window::create_window_and_renderer(&app, 16, 16, WindowFlags::empty()).unwrap();
        for color in [Color::rgba(12, 34, 56, 78), Color::WHITE, Color::TRANSPARENT] {
            renderer.set_draw_color(color).unwrap();
            assert_eq!(renderer.draw_color().unwrap(), color);
        }
    }

    #[test]
    fn test_scale_round_trip() {
        let (_host, app) = video_app();
        let (_window, renderer) =
            Window::create_window_and_renderer(&app, 16, 16, WindowFlags::empty()).unwrap();
        renderer.set_scale(1.5, 3.25).unwrap();
        let (x, y) = renderer.scale().unwrap();
        assert_relative_eq!(x, 1.5);
        assert_relative_eq!(y, 3.25);
    }

    #[test]
    fn test_frame_loop_until_quit() {
        let (host, app) = video_app();
        let (_window, renderer) =
            Window::create_window_and_renderer(&app, 200, 100, WindowFlags::RESIZABLE).unwrap();
        let sprite = renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Static, 8, 8)
            .unwrap();
        sprite.update(None, &[0xFF00_FF00_u32; 64], 32).unwrap();
        sprite.set_blend_mode(BlendMode::Add).unwrap();

        host.push_event(Event::MouseButtonDown { button: MouseButton::Left, x: 3, y: 4 });
        host.push_event(Event::KeyDown { keycode: Keycode::SPACE, repeat: false });

        let mut frames = 0;
        let mut running = true;
        while running {
            for event in app.poll_iter() {
                if event.is_quit_request() {
                    running = false;
                }
            }
            renderer.set_draw_color(Color::BLACK).unwrap();
            renderer.clear().unwrap();
            renderer.set_draw_color(Color::RED).unwrap();
            renderer
                .draw_lines(&[Point::new(0, 0), Point::new(50, 50), Point::new(100, 0)])
                .unwrap();
            renderer.fill_rect(Rect::new(10, 10, 20, 20)).unwrap();
            renderer.copy(&sprite, None, Some(Rect::new(60, 60, 8, 8))).unwrap();
            renderer.present().unwrap();

            frames += 1;
            if frames == 3 {
                host.push_event(Event::KeyDown { keycode: Keycode::ESCAPE, repeat: false });
            }
        }

        let stats = host.frame_stats(renderer.handle().unwrap()).unwrap();
        assert_eq!(frames, 4);
        assert_eq!(stats.presents, 4);
        assert_eq!(stats.lines, 8);
        assert_eq!(stats.copies, 4);
        assert_eq!(stats.last_clear, Some(Color::BLACK));
    }

    #[test]
    fn test_resize_event_reaches_loop() {
        let (host, app) = video_app();
        let (window, renderer) =
            Window::create_window_and_renderer(&app, 200, 100, WindowFlags::RESIZABLE).unwrap();
        host.resize_window(window.handle().unwrap(), 400, 300);

        let events: Vec<Event> = app.poll_iter().collect();
        assert_eq!(events, vec![Event::WindowResized { width: 400, height: 300 }]);
        assert_eq!(renderer.output_size().unwrap(), (400, 300));
        assert_eq!(host.window_flags(window.handle().unwrap()), Some(WindowFlags::RESIZABLE));
    }

    #[test]
    fn test_render_to_texture_then_copy() {
        let (host, app) = video_app();
        let (_window, renderer) =
            Window::create_window_and_renderer(&app, 64, 64, WindowFlags::empty()).unwrap();
        let canvas = renderer
            .create_texture(PixelFormat::Unknown, TextureAccess::Target, 32, 32)
            .unwrap();

        renderer.set_target(&canvas).unwrap();
        renderer.set_draw_color(Color::BLUE).unwrap();
        renderer.clear().unwrap();
        renderer.reset_target().unwrap();
        renderer.copy(&canvas, Some(Rect::with_size(16, 16)), None).unwrap();
        renderer.present().unwrap();

        let stats = host.frame_stats(renderer.handle().unwrap()).unwrap();
        assert_eq!(stats.last_clear, Some(Color::BLUE));
        assert_eq!(stats.copies, 1);
        host.clear_error();
        assert!(host.get_error().is_empty());
    }
}
