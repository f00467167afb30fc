//! Host backed by the SDL2 C library
//!
//! Native pointers never leave this module. Each live object is recorded in a
//! slotmap and handed out as a key; a key whose object is gone is rejected
//! before any pointer is touched. Cascading destruction (window to renderer to
//! textures) is performed here explicitly so the tables never hold a pointer
//! SDL has already freed.

#![allow(unsafe_code)]

use std::cell::RefCell;
use std::ffi::{c_int, CStr, CString};
use std::mem::MaybeUninit;
use std::ptr::{self, NonNull};
use std::rc::Rc;
use std::sync::atomic::AtomicBool;

use sdl2_sys as sys;
use slotmap::SlotMap;

use super::claim::ProcessClaim;
use super::{HostFailure, HostLibrary, HostResult, RendererKey, TextureKey, WindowKey};
use crate::events::{Event, Keycode, MouseButton};
use crate::foundation::math::{Color, Point, Rect};
use crate::render::types::{
    BlendMode, DriverIndex, Flip, InitFlags, PixelFormat, RendererFlags, RendererInfo,
    TextureAccess, TextureQuery, WindowFlags, WindowPos,
};

struct WindowEntry {
    ptr: NonNull<sys::SDL_Window>,
    renderer: Option<RendererKey>,
}

struct RendererEntry {
    ptr: NonNull<sys::SDL_Renderer>,
    window: Option<WindowKey>,
}

struct TextureEntry {
    ptr: NonNull<sys::SDL_Texture>,
    renderer: RendererKey,
}

#[derive(Default)]
struct Tables {
    windows: SlotMap<WindowKey, WindowEntry>,
    renderers: SlotMap<RendererKey, RendererEntry>,
    textures: SlotMap<TextureKey, TextureEntry>,
}

impl Tables {
    /// Destroy a renderer's textures and then the renderer itself
    fn release_renderer(&mut self, renderer: RendererKey) {
        let owned: Vec<TextureKey> = self
            .textures
            .iter()
            .filter(|(_, entry)| entry.renderer == renderer)
            .map(|(key, _)| key)
            .collect();
        for key in owned {
            if let Some(entry) = self.textures.remove(key) {
                unsafe { sys::SDL_DestroyTexture(entry.ptr.as_ptr()) };
            }
        }
        if let Some(entry) = self.renderers.remove(renderer) {
            if let Some(window) = entry.window.and_then(|w| self.windows.get_mut(w)) {
                window.renderer = None;
            }
            unsafe { sys::SDL_DestroyRenderer(entry.ptr.as_ptr()) };
        }
    }

    fn release_window(&mut self, window: WindowKey) {
        if let Some(renderer) = self.windows.get(window).and_then(|w| w.renderer) {
            self.release_renderer(renderer);
        }
        if let Some(entry) = self.windows.remove(window) {
            unsafe { sys::SDL_DestroyWindow(entry.ptr.as_ptr()) };
        }
    }

    fn release_all(&mut self) {
        let renderers: Vec<RendererKey> = self.renderers.keys().collect();
        for renderer in renderers {
            self.release_renderer(renderer);
        }
        let windows: Vec<WindowKey> = self.windows.keys().collect();
        for window in windows {
            self.release_window(window);
        }
    }
}

/// Set while some host has SDL initialized
static SDL_OWNED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static SHARED: Rc<SdlHost> = Rc::new(SdlHost::new());
}

/// Host that forwards every call to SDL2.
///
/// SDL's state is global, so every pointer it hands out must be tracked by a
/// single table. [`SdlHost::shared`] returns the same host for every caller on
/// a thread, and a host on another thread cannot initialize SDL while this one
/// holds it.
pub struct SdlHost {
    tables: RefCell<Tables>,
    owner: ProcessClaim,
}

impl SdlHost {
    /// The host of the current thread. SDL itself is initialized by
    /// [`HostLibrary::init`].
    pub fn shared() -> Rc<Self> {
        SHARED.with(Rc::clone)
    }

    fn new() -> Self {
        Self {
            tables: RefCell::new(Tables::default()),
            owner: ProcessClaim::new(&SDL_OWNED),
        }
    }

    fn claim(&self) -> HostResult {
        if self.owner.acquire() {
            Ok(())
        } else {
            Err(set_error("SDL is already initialized on another thread"))
        }
    }

    /// Give up ownership if SDL ended up with nothing initialized
    fn release_if_idle(&self) {
        if unsafe { sys::SDL_WasInit(0) } == 0 {
            self.owner.release();
        }
    }

    fn window_ptr(&self, window: WindowKey) -> HostResult<*mut sys::SDL_Window> {
        self.tables
            .borrow()
            .windows
            .get(window)
            .map(|entry| entry.ptr.as_ptr())
            .ok_or_else(|| set_error("Invalid window"))
    }

    fn renderer_ptr(&self, renderer: RendererKey) -> HostResult<*mut sys::SDL_Renderer> {
        self.tables
            .borrow()
            .renderers
            .get(renderer)
            .map(|entry| entry.ptr.as_ptr())
            .ok_or_else(|| set_error("Invalid renderer"))
    }

    fn texture_ptr(&self, texture: TextureKey) -> HostResult<*mut sys::SDL_Texture> {
        self.tables
            .borrow()
            .textures
            .get(texture)
            .map(|entry| entry.ptr.as_ptr())
            .ok_or_else(|| set_error("Invalid texture"))
    }

    fn register_renderer(
        &self,
        ptr: NonNull<sys::SDL_Renderer>,
        window: Option<WindowKey>,
    ) -> RendererKey {
        let mut tables = self.tables.borrow_mut();
        let key = tables.renderers.insert(RendererEntry { ptr, window });
        if let Some(entry) = window.and_then(|w| tables.windows.get_mut(w)) {
            entry.renderer = Some(key);
        }
        key
    }
}

/// Put `message` in SDL's error slot
fn set_error(message: &str) -> HostFailure {
    let text = CString::new(message.replace('\0', "")).unwrap_or_default();
    unsafe { sys::SDL_SetError(b"%s\0".as_ptr().cast(), text.as_ptr()) };
    HostFailure
}

fn status(code: c_int) -> HostResult {
    if code < 0 {
        Err(HostFailure)
    } else {
        Ok(())
    }
}

fn to_c_int(value: u32) -> c_int {
    c_int::try_from(value).unwrap_or(c_int::MAX)
}

fn from_c_int(value: c_int) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn c_string(text: &str) -> CString {
    CString::new(text.replace('\0', "")).unwrap_or_default()
}

fn rect_ptr(rect: Option<&Rect>) -> *const sys::SDL_Rect {
    rect.map_or(ptr::null(), |r| ptr::from_ref(r).cast())
}

fn slice_len<T>(items: &[T]) -> c_int {
    c_int::try_from(items.len()).unwrap_or(c_int::MAX)
}

fn to_sys_blend(mode: BlendMode) -> sys::SDL_BlendMode {
    match mode {
        BlendMode::None => sys::SDL_BlendMode::SDL_BLENDMODE_NONE,
        BlendMode::Blend => sys::SDL_BlendMode::SDL_BLENDMODE_BLEND,
        BlendMode::Add => sys::SDL_BlendMode::SDL_BLENDMODE_ADD,
        BlendMode::Mod => sys::SDL_BlendMode::SDL_BLENDMODE_MOD,
        BlendMode::Mul => sys::SDL_BlendMode::SDL_BLENDMODE_MUL,
    }
}

/// Both mirrors together equal a half turn, which the native flip enum
/// cannot express as one value
fn to_sys_flip(angle: f64, flip: Flip) -> (f64, sys::SDL_RendererFlip) {
    use sys::SDL_RendererFlip::{SDL_FLIP_HORIZONTAL, SDL_FLIP_NONE, SDL_FLIP_VERTICAL};
    if flip.contains(Flip::HORIZONTAL | Flip::VERTICAL) {
        (angle + 180.0, SDL_FLIP_NONE)
    } else if flip.contains(Flip::HORIZONTAL) {
        (angle, SDL_FLIP_HORIZONTAL)
    } else if flip.contains(Flip::VERTICAL) {
        (angle, SDL_FLIP_VERTICAL)
    } else {
        (angle, SDL_FLIP_NONE)
    }
}

fn from_sys_blend(mode: sys::SDL_BlendMode) -> HostResult<BlendMode> {
    BlendMode::try_from(mode as u32).map_err(|e| set_error(e.message()))
}

fn convert_info(raw: &sys::SDL_RendererInfo) -> RendererInfo {
    let name = if raw.name.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(raw.name) }
            .to_string_lossy()
            .into_owned()
    };
    let count = (raw.num_texture_formats as usize).min(raw.texture_formats.len());
    RendererInfo {
        name,
        flags: RendererFlags::from_bits_truncate(raw.flags),
        texture_formats: raw.texture_formats[..count]
            .iter()
            .filter_map(|&format| PixelFormat::try_from(format).ok())
            .collect(),
        max_texture_width: from_c_int(raw.max_texture_width),
        max_texture_height: from_c_int(raw.max_texture_height),
    }
}

/// # Safety
///
/// `raw` must have been filled in by `SDL_PollEvent`.
unsafe fn convert_event(raw: &sys::SDL_Event) -> Event {
    use sys::SDL_EventType as Kind;

    let kind = raw.type_;
    if kind == Kind::SDL_QUIT as u32 {
        Event::Quit
    } else if kind == Kind::SDL_KEYDOWN as u32 {
        Event::KeyDown {
            keycode: Keycode(raw.key.keysym.sym),
            repeat: raw.key.repeat != 0,
        }
    } else if kind == Kind::SDL_KEYUP as u32 {
        Event::KeyUp {
            keycode: Keycode(raw.key.keysym.sym),
        }
    } else if kind == Kind::SDL_MOUSEMOTION as u32 {
        Event::MouseMotion {
            x: raw.motion.x,
            y: raw.motion.y,
            xrel: raw.motion.xrel,
            yrel: raw.motion.yrel,
        }
    } else if kind == Kind::SDL_MOUSEBUTTONDOWN as u32 {
        Event::MouseButtonDown {
            button: MouseButton::from(raw.button.button),
            x: raw.button.x,
            y: raw.button.y,
        }
    } else if kind == Kind::SDL_MOUSEBUTTONUP as u32 {
        Event::MouseButtonUp {
            button: MouseButton::from(raw.button.button),
            x: raw.button.x,
            y: raw.button.y,
        }
    } else if kind == Kind::SDL_WINDOWEVENT as u32
        && raw.window.event == sys::SDL_WindowEventID::SDL_WINDOWEVENT_RESIZED as u8
    {
        Event::WindowResized {
            width: raw.window.data1,
            height: raw.window.data2,
        }
    } else {
        Event::Other(kind)
    }
}

impl Drop for SdlHost {
    fn drop(&mut self) {
        self.quit();
    }
}

impl HostLibrary for SdlHost {
    fn name(&self) -> &'static str {
        "SDL2"
    }

    fn init(&self, flags: InitFlags) -> HostResult {
        self.claim()?;
        let result = status(unsafe { sys::SDL_Init(flags.bits()) });
        if result.is_err() {
            self.release_if_idle();
        }
        result
    }

    fn quit(&self) {
        if !self.owner.is_held() {
            return;
        }
        self.tables.borrow_mut().release_all();
        unsafe { sys::SDL_Quit() };
        self.owner.release();
    }

    fn init_subsystem(&self, flags: InitFlags) -> HostResult {
        self.claim()?;
        let result = status(unsafe { sys::SDL_InitSubSystem(flags.bits()) });
        if result.is_err() {
            self.release_if_idle();
        }
        result
    }

    fn quit_subsystem(&self, flags: InitFlags) {
        if !self.owner.is_held() {
            return;
        }
        if flags.contains(InitFlags::VIDEO) {
            self.tables.borrow_mut().release_all();
        }
        unsafe { sys::SDL_QuitSubSystem(flags.bits()) };
    }

    fn was_init(&self, flags: InitFlags) -> InitFlags {
        InitFlags::from_bits_truncate(unsafe { sys::SDL_WasInit(flags.bits()) })
    }

    fn get_error(&self) -> String {
        let text = unsafe { sys::SDL_GetError() };
        if text.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
        }
    }

    fn clear_error(&self) {
        unsafe { sys::SDL_ClearError() };
    }

    fn create_window(
        &self,
        title: &str,
        x: WindowPos,
        y: WindowPos,
        width: u32,
        height: u32,
        flags: WindowFlags,
    ) -> HostResult<WindowKey> {
        let title = c_string(title);
        let raw = unsafe {
            sys::SDL_CreateWindow(
                title.as_ptr(),
                x.to_raw(),
                y.to_raw(),
                to_c_int(width),
                to_c_int(height),
                flags.bits(),
            )
        };
        let ptr = NonNull::new(raw).ok_or(HostFailure)?;
        Ok(self
            .tables
            .borrow_mut()
            .windows
            .insert(WindowEntry { ptr, renderer: None }))
    }

    fn destroy_window(&self, window: WindowKey) -> HostResult {
        let mut tables = self.tables.borrow_mut();
        if !tables.windows.contains_key(window) {
            return Err(set_error("Invalid window"));
        }
        tables.release_window(window);
        Ok(())
    }

    fn create_window_and_renderer(
        &self,
        width: u32,
        height: u32,
        flags: WindowFlags,
    ) -> HostResult<(WindowKey, RendererKey)> {
        let mut window = ptr::null_mut();
        let mut renderer = ptr::null_mut();
        status(unsafe {
            sys::SDL_CreateWindowAndRenderer(
                to_c_int(width),
                to_c_int(height),
                flags.bits(),
                &mut window,
                &mut renderer,
            )
        })?;
        let (Some(window), Some(renderer)) = (NonNull::new(window), NonNull::new(renderer)) else {
            return Err(set_error("Couldn't create window and renderer"));
        };
        let window = self.tables.borrow_mut().windows.insert(WindowEntry {
            ptr: window,
            renderer: None,
        });
        let renderer = self.register_renderer(renderer, Some(window));
        Ok((window, renderer))
    }

    fn window_size(&self, window: WindowKey) -> HostResult<(u32, u32)> {
        let ptr = self.window_ptr(window)?;
        let (mut w, mut h) = (0, 0);
        unsafe { sys::SDL_GetWindowSize(ptr, &mut w, &mut h) };
        Ok((from_c_int(w), from_c_int(h)))
    }

    fn window_title(&self, window: WindowKey) -> HostResult<String> {
        let ptr = self.window_ptr(window)?;
        let title = unsafe { sys::SDL_GetWindowTitle(ptr) };
        if title.is_null() {
            return Ok(String::new());
        }
        Ok(unsafe { CStr::from_ptr(title) }.to_string_lossy().into_owned())
    }

    fn set_window_title(&self, window: WindowKey, title: &str) -> HostResult {
        let ptr = self.window_ptr(window)?;
        let title = c_string(title);
        unsafe { sys::SDL_SetWindowTitle(ptr, title.as_ptr()) };
        Ok(())
    }

    fn create_renderer(
        &self,
        window: WindowKey,
        driver: DriverIndex,
        flags: RendererFlags,
    ) -> HostResult<RendererKey> {
        let window_ptr = self.window_ptr(window)?;
        let raw = unsafe { sys::SDL_CreateRenderer(window_ptr, driver.to_raw(), flags.bits()) };
        let ptr = NonNull::new(raw).ok_or(HostFailure)?;
        Ok(self.register_renderer(ptr, Some(window)))
    }

    fn destroy_renderer(&self, renderer: RendererKey) -> HostResult {
        let mut tables = self.tables.borrow_mut();
        if !tables.renderers.contains_key(renderer) {
            return Err(set_error("Invalid renderer"));
        }
        tables.release_renderer(renderer);
        Ok(())
    }

    fn num_render_drivers(&self) -> i32 {
        unsafe { sys::SDL_GetNumRenderDrivers() }
    }

    fn render_driver_info(&self, index: u32) -> HostResult<RendererInfo> {
        let mut raw = MaybeUninit::<sys::SDL_RendererInfo>::uninit();
        status(unsafe { sys::SDL_GetRenderDriverInfo(to_c_int(index), raw.as_mut_ptr()) })?;
        Ok(convert_info(unsafe { raw.assume_init_ref() }))
    }

    fn renderer_info(&self, renderer: RendererKey) -> HostResult<RendererInfo> {
        let ptr = self.renderer_ptr(renderer)?;
        let mut raw = MaybeUninit::<sys::SDL_RendererInfo>::uninit();
        status(unsafe { sys::SDL_GetRendererInfo(ptr, raw.as_mut_ptr()) })?;
        Ok(convert_info(unsafe { raw.assume_init_ref() }))
    }

    fn renderer_output_size(&self, renderer: RendererKey) -> HostResult<(u32, u32)> {
        let ptr = self.renderer_ptr(renderer)?;
        let (mut w, mut h) = (0, 0);
        status(unsafe { sys::SDL_GetRendererOutputSize(ptr, &mut w, &mut h) })?;
        Ok((from_c_int(w), from_c_int(h)))
    }

    fn render_target_supported(&self, renderer: RendererKey) -> bool {
        self.renderer_ptr(renderer).is_ok_and(|ptr| {
            unsafe { sys::SDL_RenderTargetSupported(ptr) } == sys::SDL_bool::SDL_TRUE
        })
    }

    fn set_render_target(
        &self,
        renderer: RendererKey,
        texture: Option<TextureKey>,
    ) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        let target = match texture {
            Some(texture) => self.texture_ptr(texture)?,
            None => ptr::null_mut(),
        };
        status(unsafe { sys::SDL_SetRenderTarget(ptr, target) })
    }

    fn render_target(&self, renderer: RendererKey) -> HostResult<Option<TextureKey>> {
        let ptr = self.renderer_ptr(renderer)?;
        let target = unsafe { sys::SDL_GetRenderTarget(ptr) };
        if target.is_null() {
            return Ok(None);
        }
        Ok(self
            .tables
            .borrow()
            .textures
            .iter()
            .find(|(_, entry)| entry.ptr.as_ptr() == target)
            .map(|(key, _)| key))
    }

    fn render_clear(&self, renderer: RendererKey) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        status(unsafe { sys::SDL_RenderClear(ptr) })
    }

    fn render_present(&self, renderer: RendererKey) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        unsafe { sys::SDL_RenderPresent(ptr) };
        Ok(())
    }

    fn set_render_draw_color(&self, renderer: RendererKey, color: Color) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        status(unsafe { sys::SDL_SetRenderDrawColor(ptr, color.r, color.g, color.b, color.a) })
    }

    fn render_draw_color(&self, renderer: RendererKey) -> HostResult<Color> {
        let ptr = self.renderer_ptr(renderer)?;
        let mut color = Color::TRANSPARENT;
        status(unsafe {
            sys::SDL_GetRenderDrawColor(ptr, &mut color.r, &mut color.g, &mut color.b, &mut color.a)
        })?;
        Ok(color)
    }

    fn set_render_draw_blend_mode(&self, renderer: RendererKey, mode: BlendMode) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        status(unsafe { sys::SDL_SetRenderDrawBlendMode(ptr, to_sys_blend(mode)) })
    }

    fn render_draw_blend_mode(&self, renderer: RendererKey) -> HostResult<BlendMode> {
        let ptr = self.renderer_ptr(renderer)?;
        let mut mode = sys::SDL_BlendMode::SDL_BLENDMODE_NONE;
        status(unsafe { sys::SDL_GetRenderDrawBlendMode(ptr, &mut mode) })?;
        from_sys_blend(mode)
    }

    fn render_draw_point(&self, renderer: RendererKey, x: i32, y: i32) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        status(unsafe { sys::SDL_RenderDrawPoint(ptr, x, y) })
    }

    fn render_draw_points(&self, renderer: RendererKey, points: &[Point]) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        let count = slice_len(points);
        status(unsafe { sys::SDL_RenderDrawPoints(ptr, points.as_ptr().cast(), count) })
    }

    fn render_draw_line(
        &self,
        renderer: RendererKey,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        status(unsafe { sys::SDL_RenderDrawLine(ptr, x1, y1, x2, y2) })
    }

    fn render_draw_lines(&self, renderer: RendererKey, points: &[Point]) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        let count = slice_len(points);
        status(unsafe { sys::SDL_RenderDrawLines(ptr, points.as_ptr().cast(), count) })
    }

    fn render_draw_rect(&self, renderer: RendererKey, rect: &Rect) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        status(unsafe { sys::SDL_RenderDrawRect(ptr, rect_ptr(Some(rect))) })
    }

    fn render_draw_rects(&self, renderer: RendererKey, rects: &[Rect]) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        let count = slice_len(rects);
        status(unsafe { sys::SDL_RenderDrawRects(ptr, rects.as_ptr().cast(), count) })
    }

    fn render_fill_rect(&self, renderer: RendererKey, rect: &Rect) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        status(unsafe { sys::SDL_RenderFillRect(ptr, rect_ptr(Some(rect))) })
    }

    fn render_fill_rects(&self, renderer: RendererKey, rects: &[Rect]) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        let count = slice_len(rects);
        status(unsafe { sys::SDL_RenderFillRects(ptr, rects.as_ptr().cast(), count) })
    }

    fn render_set_viewport(&self, renderer: RendererKey, rect: Option<&Rect>) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        status(unsafe { sys::SDL_RenderSetViewport(ptr, rect_ptr(rect)) })
    }

    fn render_viewport(&self, renderer: RendererKey) -> HostResult<Rect> {
        let ptr = self.renderer_ptr(renderer)?;
        let mut rect = Rect::default();
        unsafe { sys::SDL_RenderGetViewport(ptr, ptr::from_mut(&mut rect).cast()) };
        Ok(rect)
    }

    fn render_set_scale(&self, renderer: RendererKey, scale_x: f32, scale_y: f32) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        status(unsafe { sys::SDL_RenderSetScale(ptr, scale_x, scale_y) })
    }

    fn render_scale(&self, renderer: RendererKey) -> HostResult<(f32, f32)> {
        let ptr = self.renderer_ptr(renderer)?;
        let (mut x, mut y) = (1.0, 1.0);
        unsafe { sys::SDL_RenderGetScale(ptr, &mut x, &mut y) };
        Ok((x, y))
    }

    fn render_set_logical_size(
        &self,
        renderer: RendererKey,
        width: u32,
        height: u32,
    ) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        status(unsafe { sys::SDL_RenderSetLogicalSize(ptr, to_c_int(width), to_c_int(height)) })
    }

    fn render_logical_size(&self, renderer: RendererKey) -> HostResult<(u32, u32)> {
        let ptr = self.renderer_ptr(renderer)?;
        let (mut w, mut h) = (0, 0);
        unsafe { sys::SDL_RenderGetLogicalSize(ptr, &mut w, &mut h) };
        Ok((from_c_int(w), from_c_int(h)))
    }

    fn render_copy(
        &self,
        renderer: RendererKey,
        texture: TextureKey,
        src: Option<&Rect>,
        dst: Option<&Rect>,
    ) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        let texture = self.texture_ptr(texture)?;
        status(unsafe { sys::SDL_RenderCopy(ptr, texture, rect_ptr(src), rect_ptr(dst)) })
    }

    fn render_copy_ex(
        &self,
        renderer: RendererKey,
        texture: TextureKey,
        src: Option<&Rect>,
        dst: Option<&Rect>,
        angle: f64,
        center: Option<&Point>,
        flip: Flip,
    ) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        let texture = self.texture_ptr(texture)?;
        let center = center.map_or(ptr::null(), |c| ptr::from_ref(c).cast());
        let (angle, flip) = to_sys_flip(angle, flip);
        status(unsafe {
            sys::SDL_RenderCopyEx(
                ptr,
                texture,
                rect_ptr(src),
                rect_ptr(dst),
                angle,
                center,
                flip,
            )
        })
    }

    fn render_set_clip_rect(&self, renderer: RendererKey, rect: Option<&Rect>) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        status(unsafe { sys::SDL_RenderSetClipRect(ptr, rect_ptr(rect)) })
    }

    fn render_clip_rect(&self, renderer: RendererKey) -> HostResult<Option<Rect>> {
        let ptr = self.renderer_ptr(renderer)?;
        if unsafe { sys::SDL_RenderIsClipEnabled(ptr) } == sys::SDL_bool::SDL_FALSE {
            return Ok(None);
        }
        let mut rect = Rect::default();
        unsafe { sys::SDL_RenderGetClipRect(ptr, ptr::from_mut(&mut rect).cast()) };
        Ok(Some(rect))
    }

    fn render_read_pixels(
        &self,
        renderer: RendererKey,
        rect: Option<&Rect>,
        format: PixelFormat,
        pixels: &mut [u8],
        pitch: usize,
    ) -> HostResult {
        let ptr = self.renderer_ptr(renderer)?;
        let (width, height) = match rect {
            Some(rect) => (rect.w, rect.h),
            None => self.render_viewport(renderer)?.size(),
        };
        // the native call writes without bounds checks
        let bpp = format.bytes_per_pixel().max(4);
        let rows = usize::try_from(height).unwrap_or(0);
        let row_bytes = usize::try_from(width).unwrap_or(0).saturating_mul(bpp);
        let span = pitch
            .checked_mul(rows.saturating_sub(1))
            .and_then(|bytes| bytes.checked_add(row_bytes))
            .ok_or_else(|| set_error("Parameter 'pitch' is invalid"))?;
        if rows > 0 && pixels.len() < span {
            return Err(set_error("Parameter 'pixels' is invalid"));
        }
        let pitch = c_int::try_from(pitch).map_err(|_| set_error("Parameter 'pitch' is invalid"))?;
        status(unsafe {
            sys::SDL_RenderReadPixels(
                ptr,
                rect_ptr(rect),
                format.to_raw(),
                pixels.as_mut_ptr().cast(),
                pitch,
            )
        })
    }

    fn create_texture(
        &self,
        renderer: RendererKey,
        format: PixelFormat,
        access: TextureAccess,
        width: u32,
        height: u32,
    ) -> HostResult<TextureKey> {
        let ptr = self.renderer_ptr(renderer)?;
        let raw = unsafe {
            sys::SDL_CreateTexture(
                ptr,
                format.to_raw(),
                access.to_raw(),
                to_c_int(width),
                to_c_int(height),
            )
        };
        let ptr = NonNull::new(raw).ok_or(HostFailure)?;
        Ok(self
            .tables
            .borrow_mut()
            .textures
            .insert(TextureEntry { ptr, renderer }))
    }

    fn destroy_texture(&self, texture: TextureKey) -> HostResult {
        let entry = self
            .tables
            .borrow_mut()
            .textures
            .remove(texture)
            .ok_or_else(|| set_error("Invalid texture"))?;
        unsafe { sys::SDL_DestroyTexture(entry.ptr.as_ptr()) };
        Ok(())
    }

    fn query_texture(&self, texture: TextureKey) -> HostResult<TextureQuery> {
        let ptr = self.texture_ptr(texture)?;
        let (mut format, mut access, mut w, mut h) = (0_u32, 0, 0, 0);
        status(unsafe { sys::SDL_QueryTexture(ptr, &mut format, &mut access, &mut w, &mut h) })?;
        Ok(TextureQuery {
            format: PixelFormat::try_from(format).map_err(|e| set_error(e.message()))?,
            access: TextureAccess::try_from(access).map_err(|e| set_error(e.message()))?,
            width: from_c_int(w),
            height: from_c_int(h),
        })
    }

    fn set_texture_color_mod(&self, texture: TextureKey, r: u8, g: u8, b: u8) -> HostResult {
        let ptr = self.texture_ptr(texture)?;
        status(unsafe { sys::SDL_SetTextureColorMod(ptr, r, g, b) })
    }

    fn texture_color_mod(&self, texture: TextureKey) -> HostResult<(u8, u8, u8)> {
        let ptr = self.texture_ptr(texture)?;
        let (mut r, mut g, mut b) = (0, 0, 0);
        status(unsafe { sys::SDL_GetTextureColorMod(ptr, &mut r, &mut g, &mut b) })?;
        Ok((r, g, b))
    }

    fn set_texture_alpha_mod(&self, texture: TextureKey, alpha: u8) -> HostResult {
        let ptr = self.texture_ptr(texture)?;
        status(unsafe { sys::SDL_SetTextureAlphaMod(ptr, alpha) })
    }

    fn texture_alpha_mod(&self, texture: TextureKey) -> HostResult<u8> {
        let ptr = self.texture_ptr(texture)?;
        let mut alpha = 0;
        status(unsafe { sys::SDL_GetTextureAlphaMod(ptr, &mut alpha) })?;
        Ok(alpha)
    }

    fn set_texture_blend_mode(&self, texture: TextureKey, mode: BlendMode) -> HostResult {
        let ptr = self.texture_ptr(texture)?;
        status(unsafe { sys::SDL_SetTextureBlendMode(ptr, to_sys_blend(mode)) })
    }

    fn texture_blend_mode(&self, texture: TextureKey) -> HostResult<BlendMode> {
        let ptr = self.texture_ptr(texture)?;
        let mut mode = sys::SDL_BlendMode::SDL_BLENDMODE_NONE;
        status(unsafe { sys::SDL_GetTextureBlendMode(ptr, &mut mode) })?;
        from_sys_blend(mode)
    }

    fn update_texture(
        &self,
        texture: TextureKey,
        rect: Option<&Rect>,
        pixels: &[u8],
        pitch: usize,
    ) -> HostResult {
        let ptr = self.texture_ptr(texture)?;
        let pitch = c_int::try_from(pitch).map_err(|_| set_error("Parameter 'pitch' is invalid"))?;
        status(unsafe {
            sys::SDL_UpdateTexture(ptr, rect_ptr(rect), pixels.as_ptr().cast(), pitch)
        })
    }

    fn poll_event(&self) -> Option<Event> {
        let mut raw = MaybeUninit::<sys::SDL_Event>::uninit();
        if unsafe { sys::SDL_PollEvent(raw.as_mut_ptr()) } == 0 {
            return None;
        }
        Some(unsafe { convert_event(raw.assume_init_ref()) })
    }
}
