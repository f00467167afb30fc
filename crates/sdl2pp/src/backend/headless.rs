//! In-process host with the native library's bookkeeping and validation
//!
//! `HeadlessHost` keeps the state the native library would keep (initialized
//! subsystems, live windows, renderers and textures, per-renderer draw state)
//! and fails with the same messages under the same conditions. It does not
//! rasterize; draw calls are counted in [`FrameStats`] instead.

use std::cell::RefCell;
use std::collections::VecDeque;

use slotmap::SlotMap;

use super::{HostFailure, HostLibrary, HostResult, RendererKey, TextureKey, WindowKey};
use crate::events::Event;
use crate::foundation::math::{Color, Point, Rect};
use crate::render::types::{
    BlendMode, DriverIndex, Flip, InitFlags, PixelFormat, RendererFlags, RendererInfo,
    TextureAccess, TextureQuery, WindowFlags, WindowPos,
};

/// Largest window extent the native library accepts
const MAX_WINDOW_EXTENT: u32 = 16_384;

/// Counters of the draw calls a renderer has executed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Clear calls
    pub clears: u64,
    /// Points drawn
    pub points: u64,
    /// Line segments drawn
    pub lines: u64,
    /// Rectangle outlines drawn
    pub rects: u64,
    /// Filled rectangles drawn
    pub filled_rects: u64,
    /// Texture copies, rotated or mirrored ones included
    pub copies: u64,
    /// Copies with a rotation or mirroring
    pub transformed_copies: u64,
    /// Presents
    pub presents: u64,
    /// Draw colour at the most recent clear
    pub last_clear: Option<Color>,
}

struct WindowState {
    title: String,
    width: u32,
    height: u32,
    flags: WindowFlags,
    renderer: Option<RendererKey>,
}

struct RendererState {
    window: WindowKey,
    driver: usize,
    draw_color: Color,
    draw_blend: BlendMode,
    viewport: Option<Rect>,
    clip: Option<Rect>,
    scale: (f32, f32),
    logical_size: (u32, u32),
    target: Option<TextureKey>,
    /// Colour of the window target after its last clear
    backbuffer: Color,
    stats: FrameStats,
}

struct TextureState {
    renderer: RendererKey,
    format: PixelFormat,
    access: TextureAccess,
    width: u32,
    height: u32,
    color_mod: (u8, u8, u8),
    alpha_mod: u8,
    blend: BlendMode,
    /// Allocated on first upload
    pixels: Vec<u8>,
}

struct HeadlessState {
    drivers: Vec<RendererInfo>,
    initialized: InitFlags,
    unavailable: InitFlags,
    error: String,
    windows: SlotMap<WindowKey, WindowState>,
    renderers: SlotMap<RendererKey, RendererState>,
    textures: SlotMap<TextureKey, TextureState>,
    events: VecDeque<Event>,
    stale_destroys: usize,
}

/// Host that runs entirely in process.
///
/// Used by the test suite and by display-less runs of the demo. Inspection
/// helpers expose what a native library would hide: live handle counts, draw
/// statistics and uploaded texture pixels.
pub struct HeadlessHost {
    state: RefCell<HeadlessState>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Host with the default driver list
    pub fn new() -> Self {
        Self::with_drivers(Self::default_drivers())
    }

    /// Host with a custom driver list
    pub fn with_drivers(drivers: Vec<RendererInfo>) -> Self {
        Self {
            state: RefCell::new(HeadlessState {
                drivers,
                initialized: InitFlags::empty(),
                unavailable: InitFlags::empty(),
                error: String::new(),
                windows: SlotMap::with_key(),
                renderers: SlotMap::with_key(),
                textures: SlotMap::with_key(),
                events: VecDeque::new(),
                stale_destroys: 0,
            }),
        }
    }

    /// Make the given subsystems fail to initialize, as on a machine without
    /// the corresponding device
    #[must_use]
    pub fn without_subsystems(self, flags: InitFlags) -> Self {
        self.state.borrow_mut().unavailable |= flags;
        self
    }

    /// Drivers reported by [`HeadlessHost::new`]: an accelerated driver with a
    /// texture size limit, then an unlimited software driver
    pub fn default_drivers() -> Vec<RendererInfo> {
        vec![
            RendererInfo {
                name: "headless".to_string(),
                flags: RendererFlags::ACCELERATED
                    | RendererFlags::PRESENTVSYNC
                    | RendererFlags::TARGETTEXTURE,
                texture_formats: vec![
                    PixelFormat::Argb8888,
                    PixelFormat::Abgr8888,
                    PixelFormat::Rgb888,
                ],
                max_texture_width: 4096,
                max_texture_height: 4096,
            },
            RendererInfo {
                name: "software".to_string(),
                flags: RendererFlags::SOFTWARE | RendererFlags::TARGETTEXTURE,
                texture_formats: vec![
                    PixelFormat::Argb8888,
                    PixelFormat::Abgr8888,
                    PixelFormat::Rgba8888,
                    PixelFormat::Bgra8888,
                    PixelFormat::Rgb888,
                    PixelFormat::Rgb565,
                ],
                max_texture_width: 0,
                max_texture_height: 0,
            },
        ]
    }

    /// Queue an event for [`HostLibrary::poll_event`]
    pub fn push_event(&self, event: Event) {
        self.state.borrow_mut().events.push_back(event);
    }

    /// Resize a window as the window manager would, queueing the resize event
    pub fn resize_window(&self, window: WindowKey, width: u32, height: u32) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if let Some(record) = state.windows.get_mut(window) {
            record.width = width.max(1);
            record.height = height.max(1);
            let event = Event::WindowResized {
                width: i32::try_from(record.width).unwrap_or(i32::MAX),
                height: i32::try_from(record.height).unwrap_or(i32::MAX),
            };
            state.events.push_back(event);
        }
    }

    /// Creation flags of a live window
    pub fn window_flags(&self, window: WindowKey) -> Option<WindowFlags> {
        self.state.borrow().windows.get(window).map(|w| w.flags)
    }

    /// Number of live windows
    pub fn live_windows(&self) -> usize {
        self.state.borrow().windows.len()
    }

    /// Number of live renderers
    pub fn live_renderers(&self) -> usize {
        self.state.borrow().renderers.len()
    }

    /// Number of live textures
    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    /// Destroy calls that named a handle which was already gone
    pub fn stale_destroys(&self) -> usize {
        self.state.borrow().stale_destroys
    }

    /// Draw statistics of a live renderer
    pub fn frame_stats(&self, renderer: RendererKey) -> Option<FrameStats> {
        self.state.borrow().renderers.get(renderer).map(|r| r.stats)
    }

    /// Pixels uploaded to a live texture, zero-filled where nothing was uploaded
    pub fn texture_pixels(&self, texture: TextureKey) -> Option<Vec<u8>> {
        self.state.borrow().textures.get(texture).map(|t| {
            if t.pixels.is_empty() {
                vec![0; texture_bytes(t)]
            } else {
                t.pixels.clone()
            }
        })
    }
}

impl TextureState {
    fn color_at(&self, x: usize, y: usize) -> Color {
        let bpp = self.format.bytes_per_pixel();
        let start = (y * self.width as usize + x) * bpp;
        let raw = self.pixels.get(start..start + bpp).map_or(0, read_pixel);
        self.format.unpack(raw).unwrap_or(Color::TRANSPARENT)
    }
}

/// Store one packed pixel in native byte order
fn write_pixel(dst: &mut [u8], value: u32) {
    match dst.len() {
        2 => dst.copy_from_slice(&((value & 0xFFFF) as u16).to_ne_bytes()),
        4 => dst.copy_from_slice(&value.to_ne_bytes()),
        _ => {}
    }
}

fn read_pixel(src: &[u8]) -> u32 {
    match *src {
        [a, b] => u32::from(u16::from_ne_bytes([a, b])),
        [a, b, c, d] => u32::from_ne_bytes([a, b, c, d]),
        _ => 0,
    }
}

fn texture_bytes(texture: &TextureState) -> usize {
    texture.width as usize * texture.height as usize * texture.format.bytes_per_pixel()
}

fn unavailable_message(flags: InitFlags) -> &'static str {
    if flags.contains(InitFlags::VIDEO) {
        "No available video device"
    } else if flags.contains(InitFlags::AUDIO) {
        "No available audio device"
    } else {
        "Subsystem not available on this host"
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl HeadlessState {
    fn fail<T>(&mut self, message: impl Into<String>) -> HostResult<T> {
        self.error = message.into();
        Err(HostFailure)
    }

    fn check_window(&mut self, window: WindowKey) -> HostResult {
        if self.windows.contains_key(window) {
            Ok(())
        } else {
            self.fail("Invalid window")
        }
    }

    fn check_renderer(&mut self, renderer: RendererKey) -> HostResult {
        if self.renderers.contains_key(renderer) {
            Ok(())
        } else {
            self.fail("Invalid renderer")
        }
    }

    fn check_texture(&mut self, texture: TextureKey) -> HostResult {
        if self.textures.contains_key(texture) {
            Ok(())
        } else {
            self.fail("Invalid texture")
        }
    }

    fn renderer_mut(&mut self, renderer: RendererKey) -> HostResult<&mut RendererState> {
        self.check_renderer(renderer)?;
        Ok(&mut self.renderers[renderer])
    }

    fn texture_mut(&mut self, texture: TextureKey) -> HostResult<&mut TextureState> {
        self.check_texture(texture)?;
        Ok(&mut self.textures[texture])
    }

    fn init(&mut self, flags: InitFlags) -> HostResult {
        let wanted = flags.with_dependencies();
        let missing = wanted & self.unavailable;
        if !missing.is_empty() {
            return self.fail(unavailable_message(missing));
        }
        self.initialized |= wanted;
        Ok(())
    }

    fn quit_subsystem(&mut self, flags: InitFlags) {
        if flags.contains(InitFlags::VIDEO) {
            self.release_all();
        }
        self.initialized.remove(flags);
        if flags.intersects(InitFlags::VIDEO | InitFlags::JOYSTICK)
            && !self.initialized.intersects(InitFlags::VIDEO | InitFlags::JOYSTICK)
        {
            self.initialized.remove(InitFlags::EVENTS);
        }
        if !self.initialized.contains(InitFlags::EVENTS) {
            self.events.clear();
        }
    }

    fn release_all(&mut self) {
        self.textures.clear();
        self.renderers.clear();
        self.windows.clear();
    }

    fn create_window(
        &mut self,
        title: &str,
        width: u32,
        height: u32,
        flags: WindowFlags,
    ) -> HostResult<WindowKey> {
        if !self.initialized.contains(InitFlags::VIDEO) {
            return self.fail("Video subsystem has not been initialized");
        }
        if width > MAX_WINDOW_EXTENT || height > MAX_WINDOW_EXTENT {
            return self.fail("Window is too large.");
        }
        Ok(self.windows.insert(WindowState {
            title: title.to_string(),
            width: width.max(1),
            height: height.max(1),
            flags,
            renderer: None,
        }))
    }

    fn destroy_window(&mut self, window: WindowKey) -> HostResult {
        if !self.windows.contains_key(window) {
            self.stale_destroys += 1;
            return self.fail("Invalid window");
        }
        if let Some(renderer) = self.windows[window].renderer {
            self.release_renderer(renderer);
        }
        self.windows.remove(window);
        Ok(())
    }

    fn create_renderer(
        &mut self,
        window: WindowKey,
        driver: DriverIndex,
        flags: RendererFlags,
    ) -> HostResult<RendererKey> {
        self.check_window(window)?;
        if self.windows[window].renderer.is_some() {
            return self.fail("Renderer already associated with window");
        }
        let count = self.drivers.len();
        let driver = match driver {
            DriverIndex::Index(index) if index as usize >= count => {
                let last = count as i64 - 1;
                return self.fail(format!("index must be -1 or in the range of 0 - {last}"));
            }
            DriverIndex::Index(index) => index as usize,
            DriverIndex::First => {
                match self.drivers.iter().position(|info| info.supports(flags)) {
                    Some(index) => index,
                    None => return self.fail("Couldn't find matching render driver"),
                }
            }
        };
        let renderer = self.renderers.insert(RendererState {
            window,
            driver,
            draw_color: Color::TRANSPARENT,
            draw_blend: BlendMode::None,
            viewport: None,
            clip: None,
            scale: (1.0, 1.0),
            logical_size: (0, 0),
            target: None,
            backbuffer: Color::TRANSPARENT,
            stats: FrameStats::default(),
        });
        self.windows[window].renderer = Some(renderer);
        Ok(renderer)
    }

    fn release_renderer(&mut self, renderer: RendererKey) {
        self.textures.retain(|_, texture| texture.renderer != renderer);
        if let Some(record) = self.renderers.remove(renderer) {
            if let Some(window) = self.windows.get_mut(record.window) {
                window.renderer = None;
            }
        }
    }

    fn driver_of(&self, renderer: RendererKey) -> &RendererInfo {
        &self.drivers[self.renderers[renderer].driver]
    }

    fn output_size(&mut self, renderer: RendererKey) -> HostResult<(u32, u32)> {
        self.check_renderer(renderer)?;
        let record = &self.renderers[renderer];
        if let Some(target) = record.target.and_then(|t| self.textures.get(t)) {
            return Ok((target.width, target.height));
        }
        let window = &self.windows[record.window];
        Ok((window.width, window.height))
    }

    fn create_texture(
        &mut self,
        renderer: RendererKey,
        format: PixelFormat,
        access: TextureAccess,
        width: u32,
        height: u32,
    ) -> HostResult<TextureKey> {
        self.check_renderer(renderer)?;
        let driver = self.driver_of(renderer).clone();
        let format = if format == PixelFormat::Unknown {
            driver.preferred_format()
        } else {
            format
        };
        if format.is_indexed() && !driver.texture_formats.contains(&format) {
            return self.fail("Palettized textures are not supported");
        }
        if width == 0 || height == 0 {
            return self.fail("Texture dimensions can't be 0");
        }
        if (driver.max_texture_width > 0 && width > driver.max_texture_width)
            || (driver.max_texture_height > 0 && height > driver.max_texture_height)
        {
            return self.fail(format!(
                "Texture dimensions are limited to {}x{}",
                driver.max_texture_width, driver.max_texture_height
            ));
        }
        if access == TextureAccess::Target && !driver.supports(RendererFlags::TARGETTEXTURE) {
            return self.fail("That operation is not supported");
        }
        Ok(self.textures.insert(TextureState {
            renderer,
            format,
            access,
            width,
            height,
            color_mod: (255, 255, 255),
            alpha_mod: 255,
            blend: if format.has_alpha() {
                BlendMode::Blend
            } else {
                BlendMode::None
            },
            pixels: Vec::new(),
        }))
    }

    fn set_render_target(
        &mut self,
        renderer: RendererKey,
        texture: Option<TextureKey>,
    ) -> HostResult {
        self.check_renderer(renderer)?;
        if !self.driver_of(renderer).supports(RendererFlags::TARGETTEXTURE) {
            return self.fail("That operation is not supported");
        }
        if let Some(texture) = texture {
            self.check_texture(texture)?;
            let record = &self.textures[texture];
            if record.renderer != renderer {
                return self.fail("Texture was not created with this renderer");
            }
            if record.access != TextureAccess::Target {
                return self.fail("Texture not created with SDL_TEXTUREACCESS_TARGET");
            }
        }
        let record = &mut self.renderers[renderer];
        record.target = texture;
        record.viewport = None;
        record.clip = None;
        Ok(())
    }

    fn check_copy(&mut self, renderer: RendererKey, texture: TextureKey) -> HostResult {
        self.check_renderer(renderer)?;
        self.check_texture(texture)?;
        if self.textures[texture].renderer != renderer {
            return self.fail("Texture was not created with this renderer");
        }
        Ok(())
    }

    /// Fill the current target with the draw colour
    fn clear(&mut self, renderer: RendererKey) -> HostResult {
        let record = self.renderer_mut(renderer)?;
        let color = record.draw_color;
        record.stats.clears += 1;
        record.stats.last_clear = Some(color);
        let Some(target) = record.target else {
            record.backbuffer = color;
            return Ok(());
        };
        let Some(texture) = self.textures.get_mut(target) else {
            return Ok(());
        };
        let Some(value) = texture.format.pack(color) else {
            return Ok(());
        };
        if texture.pixels.is_empty() {
            let size = texture_bytes(texture);
            texture.pixels = vec![0; size];
        }
        for pixel in texture.pixels.chunks_exact_mut(texture.format.bytes_per_pixel()) {
            write_pixel(pixel, value);
        }
        Ok(())
    }

    fn read_pixels(
        &mut self,
        renderer: RendererKey,
        rect: Option<&Rect>,
        format: PixelFormat,
        pixels: &mut [u8],
        pitch: usize,
    ) -> HostResult {
        let (width, height) = self.output_size(renderer)?;
        if format.pack(Color::BLACK).is_none() {
            return self.fail("Unsupported pixel format");
        }
        let record = &self.renderers[renderer];
        let bounds = Rect::with_size(to_i32(width), to_i32(height));
        let viewport = match record.viewport {
            Some(viewport) => viewport.intersection(&bounds),
            None => Some(bounds).filter(|bounds| !bounds.is_empty()),
        };
        let Some(viewport) = viewport else {
            return Ok(());
        };
        let area = match rect {
            None => Some(viewport),
            Some(rect) => Rect::new(
                viewport.x.saturating_add(rect.x),
                viewport.y.saturating_add(rect.y),
                rect.w,
                rect.h,
            )
            .intersection(&viewport),
        };
        let Some(area) = area else {
            return Ok(());
        };
        if pitch == 0 {
            return self.fail("Parameter 'pitch' is invalid");
        }
        let bpp = format.bytes_per_pixel();
        let columns = area.w as usize;
        let rows = area.h as usize;
        let Some(span) = pitch
            .checked_mul(rows - 1)
            .and_then(|bytes| bytes.checked_add(columns * bpp))
        else {
            return self.fail("Parameter 'pitch' is invalid");
        };
        if pixels.len() < span {
            return self.fail("Parameter 'pixels' is invalid");
        }

        let record = &self.renderers[renderer];
        let source = record.target.and_then(|key| self.textures.get(key));
        for row in 0..rows {
            for column in 0..columns {
                let x = area.x as usize + column;
                let y = area.y as usize + row;
                let color = source.map_or(record.backbuffer, |texture| texture.color_at(x, y));
                let start = row * pitch + column * bpp;
                write_pixel(&mut pixels[start..start + bpp], format.pack(color).unwrap_or(0));
            }
        }
        Ok(())
    }

    fn update_texture(
        &mut self,
        texture: TextureKey,
        rect: Option<&Rect>,
        pixels: &[u8],
        pitch: usize,
    ) -> HostResult {
        self.check_texture(texture)?;
        let record = &self.textures[texture];
        let full = Rect::with_size(to_i32(record.width), to_i32(record.height));
        let area = match rect {
            None => full,
            Some(rect) => match rect.intersection(&full) {
                Some(area) => area,
                None => return Ok(()),
            },
        };
        if pitch == 0 {
            return self.fail("Parameter 'pitch' is invalid");
        }
        let bpp = record.format.bytes_per_pixel();
        let row_bytes = area.w as usize * bpp;
        let rows = area.h as usize;
        let Some(span) = pitch
            .checked_mul(rows - 1)
            .and_then(|bytes| bytes.checked_add(row_bytes))
        else {
            return self.fail("Parameter 'pitch' is invalid");
        };
        if pixels.len() < span {
            return self.fail("Parameter 'pixels' is invalid");
        }

        let record = &mut self.textures[texture];
        if record.pixels.is_empty() {
            let size = texture_bytes(record);
            record.pixels = vec![0; size];
        }
        let stride = record.width as usize * bpp;
        for row in 0..rows {
            let src = &pixels[row * pitch..row * pitch + row_bytes];
            let dst_start = (area.y as usize + row) * stride + area.x as usize * bpp;
            record.pixels[dst_start..dst_start + row_bytes].copy_from_slice(src);
        }
        Ok(())
    }
}

impl HostLibrary for HeadlessHost {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn init(&self, flags: InitFlags) -> HostResult {
        self.state.borrow_mut().init(flags)
    }

    fn quit(&self) {
        let mut state = self.state.borrow_mut();
        state.release_all();
        state.initialized = InitFlags::empty();
        state.events.clear();
    }

    fn init_subsystem(&self, flags: InitFlags) -> HostResult {
        self.state.borrow_mut().init(flags)
    }

    fn quit_subsystem(&self, flags: InitFlags) {
        self.state.borrow_mut().quit_subsystem(flags);
    }

    fn was_init(&self, flags: InitFlags) -> InitFlags {
        let initialized = self.state.borrow().initialized;
        if flags.is_empty() {
            initialized
        } else {
            initialized & flags
        }
    }

    fn get_error(&self) -> String {
        self.state.borrow().error.clone()
    }

    fn clear_error(&self) {
        self.state.borrow_mut().error.clear();
    }

    fn create_window(
        &self,
        title: &str,
        _x: WindowPos,
        _y: WindowPos,
        width: u32,
        height: u32,
        flags: WindowFlags,
    ) -> HostResult<WindowKey> {
        self.state
            .borrow_mut()
            .create_window(title, width, height, flags)
    }

    fn destroy_window(&self, window: WindowKey) -> HostResult {
        self.state.borrow_mut().destroy_window(window)
    }

    fn create_window_and_renderer(
        &self,
        width: u32,
        height: u32,
        flags: WindowFlags,
    ) -> HostResult<(WindowKey, RendererKey)> {
        let mut state = self.state.borrow_mut();
        let window = state.create_window("", width, height, flags)?;
        match state.create_renderer(window, DriverIndex::First, RendererFlags::empty()) {
            Ok(renderer) => Ok((window, renderer)),
            Err(failure) => {
                state.windows.remove(window);
                Err(failure)
            }
        }
    }

    fn window_size(&self, window: WindowKey) -> HostResult<(u32, u32)> {
        let mut state = self.state.borrow_mut();
        state.check_window(window)?;
        let record = &state.windows[window];
        Ok((record.width, record.height))
    }

    fn window_title(&self, window: WindowKey) -> HostResult<String> {
        let mut state = self.state.borrow_mut();
        state.check_window(window)?;
        Ok(state.windows[window].title.clone())
    }

    fn set_window_title(&self, window: WindowKey, title: &str) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.check_window(window)?;
        state.windows[window].title = title.to_string();
        Ok(())
    }

    fn create_renderer(
        &self,
        window: WindowKey,
        driver: DriverIndex,
        flags: RendererFlags,
    ) -> HostResult<RendererKey> {
        self.state.borrow_mut().create_renderer(window, driver, flags)
    }

    fn destroy_renderer(&self, renderer: RendererKey) -> HostResult {
        let mut state = self.state.borrow_mut();
        if !state.renderers.contains_key(renderer) {
            state.stale_destroys += 1;
            return state.fail("Invalid renderer");
        }
        state.release_renderer(renderer);
        Ok(())
    }

    fn num_render_drivers(&self) -> i32 {
        i32::try_from(self.state.borrow().drivers.len()).unwrap_or(i32::MAX)
    }

    fn render_driver_info(&self, index: u32) -> HostResult<RendererInfo> {
        let mut state = self.state.borrow_mut();
        let info = state.drivers.get(index as usize).cloned();
        match info {
            Some(info) => Ok(info),
            None => {
                let last = state.drivers.len() as i64 - 1;
                state.fail(format!("index must be in the range of 0 - {last}"))
            }
        }
    }

    fn renderer_info(&self, renderer: RendererKey) -> HostResult<RendererInfo> {
        let mut state = self.state.borrow_mut();
        state.check_renderer(renderer)?;
        Ok(state.driver_of(renderer).clone())
    }

    fn renderer_output_size(&self, renderer: RendererKey) -> HostResult<(u32, u32)> {
        self.state.borrow_mut().output_size(renderer)
    }

    fn render_target_supported(&self, renderer: RendererKey) -> bool {
        let state = self.state.borrow();
        state.renderers.contains_key(renderer)
            && state.driver_of(renderer).supports(RendererFlags::TARGETTEXTURE)
    }

    fn set_render_target(
        &self,
        renderer: RendererKey,
        texture: Option<TextureKey>,
    ) -> HostResult {
        self.state.borrow_mut().set_render_target(renderer, texture)
    }

    fn render_target(&self, renderer: RendererKey) -> HostResult<Option<TextureKey>> {
        let mut state = self.state.borrow_mut();
        Ok(state.renderer_mut(renderer)?.target)
    }

    fn render_clear(&self, renderer: RendererKey) -> HostResult {
        self.state.borrow_mut().clear(renderer)
    }

    fn render_present(&self, renderer: RendererKey) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.stats.presents += 1;
        Ok(())
    }

    fn set_render_draw_color(&self, renderer: RendererKey, color: Color) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.draw_color = color;
        Ok(())
    }

    fn render_draw_color(&self, renderer: RendererKey) -> HostResult<Color> {
        let mut state = self.state.borrow_mut();
        Ok(state.renderer_mut(renderer)?.draw_color)
    }

    fn set_render_draw_blend_mode(&self, renderer: RendererKey, mode: BlendMode) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.draw_blend = mode;
        Ok(())
    }

    fn render_draw_blend_mode(&self, renderer: RendererKey) -> HostResult<BlendMode> {
        let mut state = self.state.borrow_mut();
        Ok(state.renderer_mut(renderer)?.draw_blend)
    }

    fn render_draw_point(&self, renderer: RendererKey, _x: i32, _y: i32) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.stats.points += 1;
        Ok(())
    }

    fn render_draw_points(&self, renderer: RendererKey, points: &[Point]) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.stats.points += points.len() as u64;
        Ok(())
    }

    fn render_draw_line(
        &self,
        renderer: RendererKey,
        _x1: i32,
        _y1: i32,
        _x2: i32,
        _y2: i32,
    ) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.stats.lines += 1;
        Ok(())
    }

    fn render_draw_lines(&self, renderer: RendererKey, points: &[Point]) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.stats.lines += points.len().saturating_sub(1) as u64;
        Ok(())
    }

    fn render_draw_rect(&self, renderer: RendererKey, _rect: &Rect) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.stats.rects += 1;
        Ok(())
    }

    fn render_draw_rects(&self, renderer: RendererKey, rects: &[Rect]) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.stats.rects += rects.len() as u64;
        Ok(())
    }

    fn render_fill_rect(&self, renderer: RendererKey, _rect: &Rect) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.stats.filled_rects += 1;
        Ok(())
    }

    fn render_fill_rects(&self, renderer: RendererKey, rects: &[Rect]) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.stats.filled_rects += rects.len() as u64;
        Ok(())
    }

    fn render_set_viewport(&self, renderer: RendererKey, rect: Option<&Rect>) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.viewport = rect.copied();
        Ok(())
    }

    fn render_viewport(&self, renderer: RendererKey) -> HostResult<Rect> {
        let mut state = self.state.borrow_mut();
        let (width, height) = state.output_size(renderer)?;
        Ok(state.renderers[renderer]
            .viewport
            .unwrap_or_else(|| Rect::with_size(to_i32(width), to_i32(height))))
    }

    fn render_set_scale(&self, renderer: RendererKey, scale_x: f32, scale_y: f32) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.scale = (scale_x, scale_y);
        Ok(())
    }

    fn render_scale(&self, renderer: RendererKey) -> HostResult<(f32, f32)> {
        let mut state = self.state.borrow_mut();
        Ok(state.renderer_mut(renderer)?.scale)
    }

    fn render_set_logical_size(
        &self,
        renderer: RendererKey,
        width: u32,
        height: u32,
    ) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.logical_size = (width, height);
        Ok(())
    }

    fn render_logical_size(&self, renderer: RendererKey) -> HostResult<(u32, u32)> {
        let mut state = self.state.borrow_mut();
        Ok(state.renderer_mut(renderer)?.logical_size)
    }

    fn render_set_clip_rect(&self, renderer: RendererKey, rect: Option<&Rect>) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.renderer_mut(renderer)?.clip = rect.copied();
        Ok(())
    }

    fn render_clip_rect(&self, renderer: RendererKey) -> HostResult<Option<Rect>> {
        let mut state = self.state.borrow_mut();
        Ok(state.renderer_mut(renderer)?.clip)
    }

    fn render_read_pixels(
        &self,
        renderer: RendererKey,
        rect: Option<&Rect>,
        format: PixelFormat,
        pixels: &mut [u8],
        pitch: usize,
    ) -> HostResult {
        self.state
            .borrow_mut()
            .read_pixels(renderer, rect, format, pixels, pitch)
    }

    fn render_copy(
        &self,
        renderer: RendererKey,
        texture: TextureKey,
        _src: Option<&Rect>,
        _dst: Option<&Rect>,
    ) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.check_copy(renderer, texture)?;
        state.renderers[renderer].stats.copies += 1;
        Ok(())
    }

    fn render_copy_ex(
        &self,
        renderer: RendererKey,
        texture: TextureKey,
        _src: Option<&Rect>,
        _dst: Option<&Rect>,
        angle: f64,
        _center: Option<&Point>,
        flip: Flip,
    ) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.check_copy(renderer, texture)?;
        let stats = &mut state.renderers[renderer].stats;
        stats.copies += 1;
        if angle.abs() > 0.0 || !flip.is_empty() {
            stats.transformed_copies += 1;
        }
        Ok(())
    }

    fn create_texture(
        &self,
        renderer: RendererKey,
        format: PixelFormat,
        access: TextureAccess,
        width: u32,
        height: u32,
    ) -> HostResult<TextureKey> {
        self.state
            .borrow_mut()
            .create_texture(renderer, format, access, width, height)
    }

    fn destroy_texture(&self, texture: TextureKey) -> HostResult {
        let mut state = self.state.borrow_mut();
        let Some(record) = state.textures.remove(texture) else {
            state.stale_destroys += 1;
            return state.fail("Invalid texture");
        };
        if let Some(owner) = state.renderers.get_mut(record.renderer) {
            if owner.target == Some(texture) {
                owner.target = None;
                owner.viewport = None;
                owner.clip = None;
            }
        }
        Ok(())
    }

    fn query_texture(&self, texture: TextureKey) -> HostResult<TextureQuery> {
        let mut state = self.state.borrow_mut();
        let record = state.texture_mut(texture)?;
        Ok(TextureQuery {
            format: record.format,
            access: record.access,
            width: record.width,
            height: record.height,
        })
    }

    fn set_texture_color_mod(&self, texture: TextureKey, r: u8, g: u8, b: u8) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.texture_mut(texture)?.color_mod = (r, g, b);
        Ok(())
    }

    fn texture_color_mod(&self, texture: TextureKey) -> HostResult<(u8, u8, u8)> {
        let mut state = self.state.borrow_mut();
        Ok(state.texture_mut(texture)?.color_mod)
    }

    fn set_texture_alpha_mod(&self, texture: TextureKey, alpha: u8) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.texture_mut(texture)?.alpha_mod = alpha;
        Ok(())
    }

    fn texture_alpha_mod(&self, texture: TextureKey) -> HostResult<u8> {
        let mut state = self.state.borrow_mut();
        Ok(state.texture_mut(texture)?.alpha_mod)
    }

    fn set_texture_blend_mode(&self, texture: TextureKey, mode: BlendMode) -> HostResult {
        let mut state = self.state.borrow_mut();
        state.texture_mut(texture)?.blend = mode;
        Ok(())
    }

    fn texture_blend_mode(&self, texture: TextureKey) -> HostResult<BlendMode> {
        let mut state = self.state.borrow_mut();
        Ok(state.texture_mut(texture)?.blend)
    }

    fn update_texture(
        &self,
        texture: TextureKey,
        rect: Option<&Rect>,
        pixels: &[u8],
        pitch: usize,
    ) -> HostResult {
        self.state
            .borrow_mut()
            .update_texture(texture, rect, pixels, pitch)
    }

    fn poll_event(&self) -> Option<Event> {
        let mut state = self.state.borrow_mut();
        if state.initialized.contains(InitFlags::EVENTS) {
            state.events.pop_front()
        } else {
            None
        }
    }
}
