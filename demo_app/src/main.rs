//! sdl2pp demo application
//!
//! Opens a window, then runs a poll/draw/present loop until the window is
//! closed or Escape is pressed. Pass a `.toml` or `.ron` file to override the
//! default configuration. Without a display (headless host) the loop stops
//! after a fixed number of frames.

use sdl2pp::foundation::{logging, time::Timer};
use sdl2pp::prelude::*;
use std::result::Result;

/// Frames to run when the host has no display and no limit is configured
const HEADLESS_FRAMES: u64 = 120;

/// Edge length of the spinning sprite
const SPRITE_SIZE: u32 = 16;

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error("{0}")]
    Host(#[from] sdl2pp::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

struct DemoApp {
    sprite: Texture,
    renderer: Renderer,
    // Holds the native window open for the renderer
    _window: Window,
    config: ApplicationConfig,
    timer: Timer,
    cursor: Point,
    paused: bool,
    tick: i32,
    // Dropped last so the wrappers above release their handles first
    app: Application,
}

impl DemoApp {
    fn new(config: ApplicationConfig) -> Result<Self, AppError> {
        config.validate()?;

        let app = Application::from_config(default_host(), &config.engine)?;
        let count = Renderer::num_drivers(&app)?;
        for index in 0..count {
            let info = Renderer::driver_info(&app, index)?;
            log::info!(
                "Render driver {index}: {} ({:?}, max texture {}x{})",
                info.name,
                info.flags,
                info.max_texture_width,
                info.max_texture_height
            );
        }

        let mut window = Window::from_config(&app, &config.window)?;
        let renderer = window.create_renderer_from_config(&config.renderer)?;
        renderer.set_draw_blend_mode(BlendMode::Blend)?;
        let (width, height) = renderer.output_size()?;
        log::info!("Output size {width}x{height}");
        let sprite = create_sprite(&renderer)?;

        Ok(Self {
            app,
            _window: window,
            renderer,
            sprite,
            config,
            timer: Timer::new(),
            cursor: Point::new(0, 0),
            paused: false,
            tick: 0,
        })
    }

    fn frame_limit(&self) -> Option<u64> {
        self.config.engine.max_frames.or_else(|| {
            (self.app.host().name() == "headless").then_some(HEADLESS_FRAMES)
        })
    }

    fn run(&mut self) -> Result<(), AppError> {
        let limit = self.frame_limit();
        log::info!("Entering frame loop (limit: {limit:?})");

        'running: loop {
            let events: Vec<Event> = self.app.poll_iter().collect();
            for event in events {
                if event.is_quit_request() {
                    log::info!("Quit requested");
                    break 'running;
                }
                self.handle_event(&event);
            }

            self.draw_frame()?;

            if let Some(wait) = self
                .config
                .engine
                .target_fps
                .and_then(|fps| self.timer.remaining_budget(fps))
            {
                std::thread::sleep(wait);
            }
            self.timer.update();

            if limit.is_some_and(|limit| self.timer.frame_count() >= limit) {
                break;
            }
        }

        log::info!(
            "Rendered {} frames in {:.2}s",
            self.timer.frame_count(),
            self.timer.total_time()
        );
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::MouseMotion { x, y, .. } => self.cursor = Point::new(*x, *y),
            Event::KeyDown {
                keycode: Keycode::SPACE,
                repeat: false,
            } => self.paused = !self.paused,
            Event::WindowResized { width, height } => {
                log::info!("Window resized to {width}x{height}");
            }
            _ => {}
        }
    }

    fn draw_frame(&mut self) -> Result<(), AppError> {
        if !self.paused {
            self.tick = self.tick.wrapping_add(1);
        }
        let renderer = &self.renderer;
        let (width, height) = renderer.output_size()?;
        let (width, height) = (
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        );

        renderer.set_draw_color(self.config.renderer.clear_color)?;
        renderer.clear()?;

        renderer.set_draw_color(Color::rgba(60, 60, 60, 255))?;
        let grid: Vec<Rect> = (0..=width / 40)
            .flat_map(|col| {
                (0..=height / 40).map(move |row| Rect::new(col * 40, row * 40, 40, 40))
            })
            .collect();
        renderer.draw_rects(&grid)?;

        let span = (width - 40).max(1);
        let offset = self.tick.wrapping_mul(2).rem_euclid(2 * span);
        let x = if offset < span { offset } else { 2 * span - offset };
        renderer.set_draw_color(Color::rgba(220, 80, 40, 200))?;
        renderer.fill_rect(Rect::new(x, height / 2 - 20, 40, 40))?;

        let center = Rect::new(width / 2 - 16, height / 4 - 16, 32, 32);
        let angle = f64::from(self.tick.rem_euclid(120)) * 3.0;
        renderer.copy_ex(&self.sprite, None, Some(center), angle, None, Flip::empty())?;

        renderer.set_draw_color(Color::WHITE)?;
        renderer.draw_lines(&[
            Point::new(0, height - 1),
            Point::new(width / 2, height / 2),
            Point::new(width - 1, height - 1),
        ])?;
        renderer.draw_line(self.cursor.offset(-5, 0), self.cursor.offset(5, 0))?;
        renderer.draw_line(self.cursor.offset(0, -5), self.cursor.offset(0, 5))?;

        renderer.present()?;
        Ok(())
    }
}

/// Checkerboard texture with a highlighted top row
fn create_sprite(renderer: &Renderer) -> Result<Texture, AppError> {
    let format = PixelFormat::Argb8888;
    let sprite =
        renderer.create_texture(format, TextureAccess::Static, SPRITE_SIZE, SPRITE_SIZE)?;
    let light = format.pack(Color::rgb(240, 200, 60)).unwrap_or(u32::MAX);
    let dark = format.pack(Color::rgb(60, 40, 120)).unwrap_or(0);
    let pixels: Vec<u32> = (0..SPRITE_SIZE * SPRITE_SIZE)
        .map(|i| {
            let (x, y) = (i % SPRITE_SIZE, i / SPRITE_SIZE);
            if y == 0 || (x / 4 + y / 4) % 2 == 0 {
                light
            } else {
                dark
            }
        })
        .collect();
    sprite.update(None, &pixels, SPRITE_SIZE as usize * 4)?;
    sprite.set_blend_mode(BlendMode::Blend)?;
    Ok(sprite)
}

fn run() -> Result<(), AppError> {
    let config = match std::env::args().nth(1) {
        Some(path) => ApplicationConfig::load_from_file(path)?,
        None => ApplicationConfig::new("sdl2pp demo"),
    };
    logging::init_with_level(&config.engine.log_level);

    let mut demo = DemoApp::new(config)?;
    demo.run()
}

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
