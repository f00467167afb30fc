//! # Configuration
//!
//! Settings for the library lifetime, the main window and its renderer,
//! loadable from TOML or RON files.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging, subsystems, frame limits
//! - **Window Config**: title, position, size, window flags
//! - **Renderer Config**: driver selection, renderer flags, clear colour

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::foundation::math::Color;
use crate::render::types::{DriverIndex, InitFlags, RendererFlags, WindowFlags, WindowPos};

/// Largest window extent the host accepts
const MAX_WINDOW_EXTENT: u32 = 16_384;

/// # Engine Configuration
///
/// Logging and the subsystems initialized at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Initialize video (implies events)
    pub video: bool,
    /// Initialize audio
    pub audio: bool,
    /// Initialize timers
    pub timer: bool,
    /// Initialize the event queue on its own
    pub events: bool,
    /// Stop the frame loop after this many frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_frames: Option<u64>,
    /// Frame rate cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_fps: Option<u32>,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            video: true,
            audio: false,
            timer: false,
            events: true,
            max_frames: None,
            target_fps: Some(60),
        }
    }

    /// Set log level
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable or disable audio
    #[must_use]
    pub const fn with_audio(mut self, enabled: bool) -> Self {
        self.audio = enabled;
        self
    }

    /// Bound the frame loop
    #[must_use]
    pub const fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Set target FPS
    #[must_use]
    pub const fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = Some(fps);
        self
    }

    /// Subsystems to pass to the host at startup
    pub fn init_flags(&self) -> InitFlags {
        [
            (self.video, InitFlags::VIDEO),
            (self.audio, InitFlags::AUDIO),
            (self.timer, InitFlags::TIMER),
            (self.events, InitFlags::EVENTS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(InitFlags::empty(), |flags, (_, flag)| flags | flag)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Validation(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }
        if self.target_fps == Some(0) {
            return Err(ConfigError::Validation(
                "target fps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Window Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Horizontal position
    pub x: WindowPos,
    /// Vertical position
    pub y: WindowPos,
    /// Client width in pixels
    pub width: u32,
    /// Client height in pixels
    pub height: u32,
    /// User-resizable
    pub resizable: bool,
    /// Fullscreen at desktop resolution
    pub fullscreen: bool,
    /// Without decoration
    pub borderless: bool,
    /// Created hidden
    pub hidden: bool,
    /// High-DPI backbuffer where supported
    pub allow_highdpi: bool,
}

impl WindowConfig {
    /// Centred window of the given title and size
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            x: WindowPos::Centered,
            y: WindowPos::Centered,
            width,
            height,
            resizable: false,
            fullscreen: false,
            borderless: false,
            hidden: false,
            allow_highdpi: false,
        }
    }

    /// Set position
    #[must_use]
    pub const fn with_position(mut self, x: WindowPos, y: WindowPos) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Make the window resizable
    #[must_use]
    pub const fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Native window flags
    pub fn flags(&self) -> WindowFlags {
        let mut flags = WindowFlags::empty();
        flags.set(WindowFlags::RESIZABLE, self.resizable);
        flags.set(WindowFlags::FULLSCREEN_DESKTOP, self.fullscreen);
        flags.set(WindowFlags::BORDERLESS, self.borderless);
        flags.set(WindowFlags::ALLOW_HIGHDPI, self.allow_highdpi);
        if self.hidden {
            flags |= WindowFlags::HIDDEN;
        } else {
            flags |= WindowFlags::SHOWN;
        }
        flags
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Validation(
                "window size must be non-zero".to_string(),
            ));
        }
        if self.width > MAX_WINDOW_EXTENT || self.height > MAX_WINDOW_EXTENT {
            return Err(ConfigError::Validation(format!(
                "window size {}x{} exceeds {MAX_WINDOW_EXTENT}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("sdl2pp", 640, 480)
    }
}

/// # Renderer Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Driver index; first matching driver when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<u32>,
    /// Require the software renderer
    pub software: bool,
    /// Require hardware acceleration
    pub accelerated: bool,
    /// Synchronize present with refresh
    pub present_vsync: bool,
    /// Require render-to-texture
    pub target_texture: bool,
    /// Colour the demo clears each frame with
    pub clear_color: Color,
}

impl RendererConfig {
    /// Create a new renderer configuration
    pub const fn new() -> Self {
        Self {
            driver: None,
            software: false,
            accelerated: false,
            present_vsync: false,
            target_texture: false,
            clear_color: Color::BLACK,
        }
    }

    /// Pick a specific driver
    #[must_use]
    pub const fn with_driver(mut self, index: u32) -> Self {
        self.driver = Some(index);
        self
    }

    /// Enable vsync
    #[must_use]
    pub const fn with_vsync(mut self, enabled: bool) -> Self {
        self.present_vsync = enabled;
        self
    }

    /// Set the clear colour
    #[must_use]
    pub const fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Driver selection for renderer creation
    pub fn driver_index(&self) -> DriverIndex {
        self.driver.into()
    }

    /// Native renderer flags
    pub fn flags(&self) -> RendererFlags {
        let mut flags = RendererFlags::empty();
        flags.set(RendererFlags::SOFTWARE, self.software);
        flags.set(RendererFlags::ACCELERATED, self.accelerated);
        flags.set(RendererFlags::PRESENTVSYNC, self.present_vsync);
        flags.set(RendererFlags::TARGETTEXTURE, self.target_texture);
        flags
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.software && self.accelerated {
            return Err(ConfigError::Validation(
                "software and accelerated renderers are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration applications load at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine configuration
    pub engine: EngineConfig,
    /// Main window configuration
    pub window: WindowConfig,
    /// Renderer configuration
    pub renderer: RendererConfig,
}

impl ApplicationConfig {
    /// Defaults with the given window title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            window: WindowConfig {
                title: title.into(),
                ..WindowConfig::default()
            },
            ..Self::default()
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.window.validate()?;
        self.renderer.validate()
    }
}

impl Config for ApplicationConfig {}
