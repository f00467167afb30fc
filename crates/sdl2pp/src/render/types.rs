//! Flags, enums and info structs shared by the wrappers and the host seam
//!
//! Numeric values match the native library so the SDL host can pass them
//! through unchanged.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::foundation::math::Color;

bitflags! {
    /// Subsystems to initialize
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InitFlags: u32 {
        /// Timer subsystem
        const TIMER = 0x0000_0001;
        /// Audio subsystem
        const AUDIO = 0x0000_0010;
        /// Video subsystem; implies events
        const VIDEO = 0x0000_0020;
        /// Joystick subsystem; implies events
        const JOYSTICK = 0x0000_0200;
        /// Haptic (force feedback) subsystem
        const HAPTIC = 0x0000_1000;
        /// Controller subsystem; implies joystick
        const GAMECONTROLLER = 0x0000_2000;
        /// Event queue
        const EVENTS = 0x0000_4000;
        /// Sensor subsystem
        const SENSOR = 0x0000_8000;
    }
}

impl InitFlags {
    /// Add the subsystems the requested ones depend on.
    #[must_use]
    pub fn with_dependencies(self) -> Self {
        let mut flags = self;
        if flags.contains(Self::GAMECONTROLLER) {
            flags |= Self::JOYSTICK;
        }
        if flags.intersects(Self::VIDEO | Self::JOYSTICK) {
            flags |= Self::EVENTS;
        }
        flags
    }
}

bitflags! {
    /// Window creation flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u32 {
        /// Fullscreen window
        const FULLSCREEN = 0x0000_0001;
        /// Usable with an OpenGL context
        const OPENGL = 0x0000_0002;
        /// Window is visible
        const SHOWN = 0x0000_0004;
        /// Window is not visible
        const HIDDEN = 0x0000_0008;
        /// No window decoration
        const BORDERLESS = 0x0000_0010;
        /// Window can be resized
        const RESIZABLE = 0x0000_0020;
        /// Window is minimized
        const MINIMIZED = 0x0000_0040;
        /// Window is maximized
        const MAXIMIZED = 0x0000_0080;
        /// Window has grabbed input focus
        const INPUT_GRABBED = 0x0000_0100;
        /// Fullscreen at the current desktop resolution
        const FULLSCREEN_DESKTOP = Self::FULLSCREEN.bits() | 0x0000_1000;
        /// High-DPI mode if supported
        const ALLOW_HIGHDPI = 0x0000_2000;
        /// Window stays above all others
        const ALWAYS_ON_TOP = 0x0000_8000;
        /// Usable with a Vulkan instance
        const VULKAN = 0x1000_0000;
        /// Usable with a Metal view
        const METAL = 0x2000_0000;
    }
}

bitflags! {
    /// Renderer creation flags, also reported in [`RendererInfo::flags`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RendererFlags: u32 {
        /// Software fallback
        const SOFTWARE = 0x0000_0001;
        /// Hardware acceleration
        const ACCELERATED = 0x0000_0002;
        /// Present synchronized with the refresh rate
        const PRESENTVSYNC = 0x0000_0004;
        /// Rendering to texture supported
        const TARGETTEXTURE = 0x0000_0008;
    }
}

/// Window position along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowPos {
    /// Let the window manager decide
    #[default]
    Undefined,
    /// Centre on the display
    Centered,
    /// Explicit screen coordinate
    At(i32),
}

impl WindowPos {
    const UNDEFINED_MASK: i32 = 0x1FFF_0000;
    const CENTERED_MASK: i32 = 0x2FFF_0000;

    /// Native encoding of the position
    pub const fn to_raw(self) -> i32 {
        match self {
            Self::Undefined => Self::UNDEFINED_MASK,
            Self::Centered => Self::CENTERED_MASK,
            Self::At(pos) => pos,
        }
    }

    /// Decode a native position value
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            Self::UNDEFINED_MASK => Self::Undefined,
            Self::CENTERED_MASK => Self::Centered,
            pos => Self::At(pos),
        }
    }
}

impl From<i32> for WindowPos {
    fn from(pos: i32) -> Self {
        Self::At(pos)
    }
}

/// Which render driver to create a renderer with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverIndex {
    /// First driver supporting the requested flags
    #[default]
    First,
    /// A specific entry of the driver list
    Index(u32),
}

impl DriverIndex {
    /// Native encoding, `-1` for [`DriverIndex::First`]
    pub fn to_raw(self) -> i32 {
        match self {
            Self::First => -1,
            Self::Index(index) => i32::try_from(index).unwrap_or(i32::MAX),
        }
    }
}

impl From<Option<u32>> for DriverIndex {
    fn from(index: Option<u32>) -> Self {
        index.map_or(Self::First, Self::Index)
    }
}

impl From<u32> for DriverIndex {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

/// Pixel formats understood by the wrappers
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Let the renderer pick its preferred format
    Unknown = 0,
    /// 8-bit palettized
    Index8 = 0x1300_0801,
    /// 16-bit 5-6-5
    Rgb565 = 0x1515_1002,
    /// 32-bit XRGB, alpha ignored
    Rgb888 = 0x1616_1804,
    /// 32-bit ARGB
    Argb8888 = 0x1636_2004,
    /// 32-bit RGBA
    Rgba8888 = 0x1646_2004,
    /// 32-bit ABGR
    Abgr8888 = 0x1676_2004,
    /// 32-bit BGRA
    Bgra8888 = 0x1686_2004,
}

impl PixelFormat {
    /// Native format value
    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    /// Bytes per pixel, zero for [`PixelFormat::Unknown`]
    pub const fn bytes_per_pixel(self) -> usize {
        (self as u32 & 0xFF) as usize
    }

    /// Whether the format indexes into a palette
    pub const fn is_indexed(self) -> bool {
        matches!(self, Self::Index8)
    }

    /// Whether the format carries an alpha channel
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::Argb8888 | Self::Rgba8888 | Self::Abgr8888 | Self::Bgra8888
        )
    }

    /// Human-readable name as the native library prints it
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "SDL_PIXELFORMAT_UNKNOWN",
            Self::Index8 => "SDL_PIXELFORMAT_INDEX8",
            Self::Rgb565 => "SDL_PIXELFORMAT_RGB565",
            Self::Rgb888 => "SDL_PIXELFORMAT_RGB888",
            Self::Argb8888 => "SDL_PIXELFORMAT_ARGB8888",
            Self::Rgba8888 => "SDL_PIXELFORMAT_RGBA8888",
            Self::Abgr8888 => "SDL_PIXELFORMAT_ABGR8888",
            Self::Bgra8888 => "SDL_PIXELFORMAT_BGRA8888",
        }
    }

    /// Pack a colour into one pixel value of this format.
    ///
    /// `None` for formats without a direct colour layout (unknown and
    /// palettized).
    pub const fn pack(self, color: Color) -> Option<u32> {
        let Color { r, g, b, a } = color;
        let (r, g, b, a) = (r as u32, g as u32, b as u32, a as u32);
        match self {
            Self::Unknown | Self::Index8 => None,
            Self::Rgb565 => Some(((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)),
            Self::Rgb888 => Some((0xFF << 24) | (r << 16) | (g << 8) | b),
            Self::Argb8888 => Some((a << 24) | (r << 16) | (g << 8) | b),
            Self::Rgba8888 => Some((r << 24) | (g << 16) | (b << 8) | a),
            Self::Abgr8888 => Some((a << 24) | (b << 16) | (g << 8) | r),
            Self::Bgra8888 => Some((b << 24) | (g << 16) | (r << 8) | a),
        }
    }

    /// Colour of one pixel value of this format
    pub fn unpack(self, pixel: u32) -> Option<Color> {
        let channel = |shift: u32| ((pixel >> shift) & 0xFF) as u8;
        match self {
            Self::Unknown | Self::Index8 => None,
            Self::Rgb565 => {
                let r = ((pixel >> 11) & 0x1F) as u8;
                let g = ((pixel >> 5) & 0x3F) as u8;
                let b = (pixel & 0x1F) as u8;
                Some(Color::rgb((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)))
            }
            Self::Rgb888 => Some(Color::rgb(channel(16), channel(8), channel(0))),
            Self::Argb8888 => Some(Color::rgba(channel(16), channel(8), channel(0), channel(24))),
            Self::Rgba8888 => Some(Color::rgba(channel(24), channel(16), channel(8), channel(0))),
            Self::Abgr8888 => Some(Color::rgba(channel(0), channel(8), channel(16), channel(24))),
            Self::Bgra8888 => Some(Color::rgba(channel(8), channel(16), channel(24), channel(0))),
        }
    }
}

impl TryFrom<u32> for PixelFormat {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        [
            Self::Unknown,
            Self::Index8,
            Self::Rgb565,
            Self::Rgb888,
            Self::Argb8888,
            Self::Rgba8888,
            Self::Abgr8888,
            Self::Bgra8888,
        ]
        .into_iter()
        .find(|format| format.to_raw() == raw)
        .ok_or_else(|| Error::new(format!("Unknown pixel format 0x{raw:08X}")))
    }
}

bitflags! {
    /// Mirroring applied by [`Renderer::copy_ex`](crate::Renderer::copy_ex)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flip: u32 {
        /// Mirror left to right
        const HORIZONTAL = 0x1;
        /// Mirror top to bottom
        const VERTICAL = 0x2;
    }
}

/// How a texture's pixels may be changed
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureAccess {
    /// Rarely changed, not lockable
    #[default]
    Static = 0,
    /// Frequently changed
    Streaming = 1,
    /// Usable as a render target
    Target = 2,
}

impl TextureAccess {
    /// Native access value
    pub const fn to_raw(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for TextureAccess {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Static),
            1 => Ok(Self::Streaming),
            2 => Ok(Self::Target),
            other => Err(Error::new(format!("Unknown texture access {other}"))),
        }
    }
}

/// Blending applied when drawing or copying
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// dst = src
    #[default]
    None = 0,
    /// Alpha blending
    Blend = 1,
    /// Additive blending
    Add = 2,
    /// Colour modulate
    Mod = 4,
    /// Colour multiply
    Mul = 8,
}

impl BlendMode {
    /// Native blend mode value
    pub const fn to_raw(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for BlendMode {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::None),
            1 => Ok(Self::Blend),
            2 => Ok(Self::Add),
            4 => Ok(Self::Mod),
            8 => Ok(Self::Mul),
            other => Err(Error::new(format!("Parameter 'blendMode' is invalid ({other})"))),
        }
    }
}

/// Description of a render driver or of a live renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererInfo {
    /// Driver name
    pub name: String,
    /// Supported capabilities
    pub flags: RendererFlags,
    /// Texture formats the driver handles natively, in preference order
    pub texture_formats: Vec<PixelFormat>,
    /// Largest texture width, zero when unlimited
    pub max_texture_width: u32,
    /// Largest texture height, zero when unlimited
    pub max_texture_height: u32,
}

impl RendererInfo {
    /// Whether every flag in `flags` is supported
    pub const fn supports(&self, flags: RendererFlags) -> bool {
        self.flags.contains(flags)
    }

    /// Format used when a texture is requested as [`PixelFormat::Unknown`]
    pub fn preferred_format(&self) -> PixelFormat {
        self.texture_formats
            .first()
            .copied()
            .unwrap_or(PixelFormat::Argb8888)
    }
}

/// Attributes of a live texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureQuery {
    /// Pixel format
    pub format: PixelFormat,
    /// Access pattern
    pub access: TextureAccess,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_channel_order() {
        let color = Color::rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(PixelFormat::Argb8888.pack(color), Some(0x4411_2233));
        assert_eq!(PixelFormat::Rgba8888.pack(color), Some(0x1122_3344));
        assert_eq!(PixelFormat::Abgr8888.pack(color), Some(0x4433_2211));
        assert_eq!(PixelFormat::Bgra8888.pack(color), Some(0x3322_1144));
        assert_eq!(PixelFormat::Rgb888.pack(color), Some(0xFF11_2233));
        assert_eq!(PixelFormat::Rgb565.pack(Color::WHITE), Some(0xFFFF));
        assert_eq!(PixelFormat::Index8.pack(color), None);
    }

    #[test]
    fn test_unpack_reverses_pack() {
        let color = Color::rgba(0x11, 0x22, 0x33, 0x44);
        for format in [
            PixelFormat::Argb8888,
            PixelFormat::Rgba8888,
            PixelFormat::Abgr8888,
            PixelFormat::Bgra8888,
        ] {
            let pixel = format.pack(color).unwrap();
            assert_eq!(format.unpack(pixel), Some(color));
        }
        assert_eq!(PixelFormat::Rgb888.unpack(0x0011_2233), Some(Color::rgb(0x11, 0x22, 0x33)));
        assert_eq!(PixelFormat::Rgb565.unpack(0xF800), Some(Color::RED));
        assert_eq!(PixelFormat::Unknown.unpack(0), None);
    }

    #[test]
    fn test_video_implies_events() {
        let flags = InitFlags::VIDEO.with_dependencies();
        assert!(flags.contains(InitFlags::VIDEO | InitFlags::EVENTS));
        assert!(!flags.contains(InitFlags::AUDIO));
    }

    #[test]
    fn test_controller_implies_joystick_and_events() {
        let flags = InitFlags::GAMECONTROLLER.with_dependencies();
        assert!(flags.contains(InitFlags::JOYSTICK | InitFlags::EVENTS));
    }

    #[test]
    fn test_fullscreen_desktop_includes_fullscreen() {
        assert!(WindowFlags::FULLSCREEN_DESKTOP.contains(WindowFlags::FULLSCREEN));
        assert_eq!(WindowFlags::FULLSCREEN_DESKTOP.bits(), 0x1001);
    }

    #[test]
    fn test_window_pos_encoding() {
        assert_eq!(WindowPos::Centered.to_raw(), 0x2FFF_0000);
        assert_eq!(WindowPos::from_raw(0x1FFF_0000), WindowPos::Undefined);
        assert_eq!(WindowPos::from_raw(42), WindowPos::At(42));
    }

    #[test]
    fn test_driver_index_encoding() {
        assert_eq!(DriverIndex::First.to_raw(), -1);
        assert_eq!(DriverIndex::from(Some(2)).to_raw(), 2);
        assert_eq!(DriverIndex::from(None), DriverIndex::First);
    }

    #[test]
    fn test_pixel_format_properties() {
        assert_eq!(PixelFormat::Rgba8888.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Rgb565.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::Index8.bytes_per_pixel(), 1);
        assert_eq!(PixelFormat::Unknown.bytes_per_pixel(), 0);
        assert!(PixelFormat::Index8.is_indexed());
        assert!(PixelFormat::Argb8888.has_alpha());
        assert!(!PixelFormat::Rgb888.has_alpha());
    }

    #[test]
    fn test_pixel_format_from_raw() {
        assert_eq!(PixelFormat::try_from(0x1646_2004).unwrap(), PixelFormat::Rgba8888);
        let err = PixelFormat::try_from(0xDEAD_BEEF).unwrap_err();
        assert!(err.message().contains("DEADBEEF"));
    }

    #[test]
    fn test_enum_raw_values() {
        assert_eq!(TextureAccess::try_from(2).unwrap(), TextureAccess::Target);
        assert!(TextureAccess::try_from(7).is_err());
        assert_eq!(BlendMode::try_from(8).unwrap(), BlendMode::Mul);
        assert!(BlendMode::try_from(3).is_err());
    }

    #[test]
    fn test_preferred_format_falls_back() {
        let info = RendererInfo {
            name: "empty".into(),
            flags: RendererFlags::SOFTWARE,
            texture_formats: Vec::new(),
            max_texture_width: 0,
            max_texture_height: 0,
        };
        assert_eq!(info.preferred_format(), PixelFormat::Argb8888);
        assert!(info.supports(RendererFlags::SOFTWARE));
        assert!(!info.supports(RendererFlags::ACCELERATED));
    }
}
