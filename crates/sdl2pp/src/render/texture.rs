//! Texture wrapper

use std::fmt;
use std::rc::Rc;

use bytemuck::Pod;

use super::renderer::RendererCore;
use super::types::{BlendMode, TextureQuery};
use crate::backend::{HostLibrary, HostResult, TextureKey};
use crate::error::{Error, HostResultExt, Result};
use crate::foundation::math::Rect;

/// A texture created by a [`Renderer`](super::Renderer).
///
/// Keeps its renderer alive. Destroyed on drop or explicit
/// [`Texture::destroy`]; destroying the renderer (or its window) first makes
/// the texture inactive instead.
pub struct Texture {
    key: Option<TextureKey>,
    renderer: Rc<RendererCore>,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture").field("handle", &self.handle()).finish()
    }
}

impl Texture {
    pub(crate) fn from_parts(key: TextureKey, renderer: Rc<RendererCore>) -> Self {
        log::debug!("Created texture {key:?}");
        Self {
            key: Some(key),
            renderer,
        }
    }

    /// Format, access and size
    pub fn query(&self) -> Result<TextureQuery> {
        self.forward(|host, key| host.query_texture(key))
    }

    /// Colour multiplied into copies of this texture
    pub fn set_color_mod(&self, r: u8, g: u8, b: u8) -> Result<()> {
        self.forward(|host, key| host.set_texture_color_mod(key, r, g, b))
    }

    /// Current colour modulation
    pub fn color_mod(&self) -> Result<(u8, u8, u8)> {
        self.forward(|host, key| host.texture_color_mod(key))
    }

    /// Alpha multiplied into copies of this texture
    pub fn set_alpha_mod(&self, alpha: u8) -> Result<()> {
        self.forward(|host, key| host.set_texture_alpha_mod(key, alpha))
    }

    /// Current alpha modulation
    pub fn alpha_mod(&self) -> Result<u8> {
        self.forward(|host, key| host.texture_alpha_mod(key))
    }

    /// Blending used when copying this texture
    pub fn set_blend_mode(&self, mode: BlendMode) -> Result<()> {
        self.forward(|host, key| host.set_texture_blend_mode(key, mode))
    }

    /// Current blend mode
    pub fn blend_mode(&self) -> Result<BlendMode> {
        self.forward(|host, key| host.texture_blend_mode(key))
    }

    /// Upload pixels to `rect` (the whole texture for `None`).
    ///
    /// `pixels` is any plain-data slice; `pitch` is the length of one source
    /// row in bytes. The part of `rect` outside the texture is ignored. The
    /// slice must cover `pitch` bytes for every row but the last, and a full
    /// row of the clipped area for the last.
    pub fn update<T: Pod>(&self, rect: Option<Rect>, pixels: &[T], pitch: usize) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(pixels);
        let query = self.query()?;
        let full = Rect::with_size(
            i32::try_from(query.width).unwrap_or(i32::MAX),
            i32::try_from(query.height).unwrap_or(i32::MAX),
        );
        let area = match rect {
            None => full,
            Some(rect) => match rect.intersection(&full) {
                Some(area) => area,
                None => return Ok(()),
            },
        };
        if pitch == 0 {
            return Err(Error::new("Parameter 'pitch' is invalid"));
        }
        let row_bytes = usize::try_from(area.w).unwrap_or(0) * query.format.bytes_per_pixel();
        let rows = usize::try_from(area.h).unwrap_or(0);
        let span = pitch
            .checked_mul(rows.saturating_sub(1))
            .and_then(|bytes| bytes.checked_add(row_bytes))
            .ok_or_else(|| Error::new("Parameter 'pitch' is invalid"))?;
        if bytes.len() < span {
            return Err(Error::new("Parameter 'pixels' is invalid"));
        }
        self.forward(|host, key| host.update_texture(key, rect.as_ref(), bytes, pitch))
    }

    /// Native handle, `None` once this texture or its renderer was destroyed
    pub fn handle(&self) -> Option<TextureKey> {
        self.key.filter(|_| self.renderer.key().is_some())
    }

    /// Whether the native texture is still alive
    pub fn is_active(&self) -> bool {
        self.handle().is_some()
    }

    /// Destroy the native texture now. Calling this again is a no-op.
    pub fn destroy(&mut self) {
        let Some(key) = self.key.take() else {
            return;
        };
        if self.renderer.key().is_none() {
            log::debug!("Texture {key:?} went down with its renderer");
            return;
        }
        log::debug!("Destroying texture {key:?}");
        let host = self.renderer.host();
        if host.destroy_texture(key).is_err() {
            log::debug!("Texture {key:?} was released by the host: {}", host.get_error());
        }
    }

    fn forward<T>(
        &self,
        call: impl FnOnce(&dyn HostLibrary, TextureKey) -> HostResult<T>,
    ) -> Result<T> {
        let key = self.handle().ok_or_else(|| Error::invalid_handle("texture"))?;
        let host = self.renderer.host().as_ref();
        call(host, key).or_host_error(host)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Application;
    use crate::backend::HeadlessHost;
    use crate::render::types::{InitFlags, PixelFormat, TextureAccess, WindowFlags};
    use crate::render::{Renderer, Window};

    fn setup() -> (Rc<HeadlessHost>, Application, Window, Renderer) {
        let host = Rc::new(HeadlessHost::new());
        let app = Application::init(host.clone(), InitFlags::VIDEO).unwrap();
        let (window, renderer) =
            Window::create_window_and_renderer(&app, 100, 100, WindowFlags::empty()).unwrap();
        (host, app, window, renderer)
    }

    #[test]
    fn test_query_reports_creation_parameters() {
        let (_host, _app, _window, renderer) = setup();
        let texture = renderer
            .create_texture(PixelFormat::Abgr8888, TextureAccess::Streaming, 16, 8)
            .unwrap();
        let query = texture.query().unwrap();
        assert_eq!(query.format, PixelFormat::Abgr8888);
        assert_eq!(query.access, TextureAccess::Streaming);
        assert_eq!((query.width, query.height), (16, 8));
    }

    #[test]
    fn test_invalid_parameters_leave_no_texture() {
        let (host, _app, _window, renderer) = setup();
        let error = renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Static, 0, 8)
            .unwrap_err();
        assert_eq!(error.message(), "Texture dimensions can't be 0");

        let error = renderer
            .create_texture(PixelFormat::Index8, TextureAccess::Static, 8, 8)
            .unwrap_err();
        assert_eq!(error.message(), "Palettized textures are not supported");
        assert_eq!(host.live_textures(), 0);
    }

    #[test]
    fn test_modulation_round_trip() {
        let (_host, _app, _window, renderer) = setup();
        let texture = renderer
            .create_texture(PixelFormat::Rgb888, TextureAccess::Static, 4, 4)
            .unwrap();
        assert_eq!(texture.color_mod().unwrap(), (255, 255, 255));
        assert_eq!(texture.blend_mode().unwrap(), BlendMode::None);

        texture.set_color_mod(10, 20, 30).unwrap();
        texture.set_alpha_mod(128).unwrap();
        texture.set_blend_mode(BlendMode::Blend).unwrap();
        assert_eq!(texture.color_mod().unwrap(), (10, 20, 30));
        assert_eq!(texture.alpha_mod().unwrap(), 128);
        assert_eq!(texture.blend_mode().unwrap(), BlendMode::Blend);
    }

    #[test]
    fn test_update_with_u32_pixels() {
        let (host, _app, _window, renderer) = setup();
        let texture = renderer
            .create_texture(PixelFormat::Rgba8888, TextureAccess::Streaming, 2, 2)
            .unwrap();
        let pixels: [u32; 4] = [0x1111_1111, 0x2222_2222, 0x3333_3333, 0x4444_4444];
        texture.update(None, &pixels, 8).unwrap();

        let stored = host.texture_pixels(texture.handle().unwrap()).unwrap();
        assert_eq!(stored, bytemuck::cast_slice::<u32, u8>(&pixels));
    }

    #[test]
    fn test_update_rejects_short_slice() {
        let (_host, _app, _window, renderer) = setup();
        let texture = renderer
            .create_texture(PixelFormat::Rgba8888, TextureAccess::Streaming, 4, 4)
            .unwrap();
        let error = texture.update(None, &[0_u8; 32], 16).unwrap_err();
        assert_eq!(error.message(), "Parameter 'pixels' is invalid");

        let error = texture.update(None, &[0_u8; 64], 0).unwrap_err();
        assert_eq!(error.message(), "Parameter 'pitch' is invalid");
    }

    #[test]
    fn test_update_outside_texture_is_ignored() {
        let (_host, _app, _window, renderer) = setup();
        let texture = renderer
            .create_texture(PixelFormat::Rgba8888, TextureAccess::Streaming, 4, 4)
            .unwrap();
        texture
            .update(Some(Rect::new(10, 10, 2, 2)), &[0_u8; 0], 8)
            .unwrap();
    }

    #[test]
    fn test_update_with_huge_pitch_is_an_error() {
        let (host, _app, _window, renderer) = setup();
        let texture = renderer
            .create_texture(PixelFormat::Rgba8888, TextureAccess::Streaming, 4, 4)
            .unwrap();
        let error = texture.update(None, &[0_u8; 64], usize::MAX).unwrap_err();
        assert_eq!(error.message(), "Parameter 'pitch' is invalid");
        let stored = host.texture_pixels(texture.handle().unwrap()).unwrap();
        assert!(stored.iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_update_rect_at_coordinate_limit_is_clipped_away() {
        let (_host, _app, _window, renderer) = setup();
        let texture = renderer
            .create_texture(PixelFormat::Rgba8888, TextureAccess::Streaming, 4, 4)
            .unwrap();
        texture
            .update(Some(Rect::new(i32::MAX - 1, 0, 10, 10)), &[0_u8; 64], 16)
            .unwrap();
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (host, _app, _window, renderer) = setup();
        let mut texture = renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Static, 4, 4)
            .unwrap();
        texture.destroy();
        texture.destroy();
        drop(texture);
        assert_eq!(host.live_textures(), 0);
        assert_eq!(host.stale_destroys(), 0);
    }

    #[test]
    fn test_texture_goes_inactive_with_renderer() {
        let (host, _app, _window, renderer) = setup();
        let texture = renderer
            .create_texture(PixelFormat::Argb8888, TextureAccess::Static, 4, 4)
            .unwrap();
        renderer.destroy();
        assert!(!texture.is_active());
        assert_eq!(texture.query().unwrap_err().message(), "Invalid texture");
        drop(texture);
        assert_eq!(host.live_textures(), 0);
        assert_eq!(host.stale_destroys(), 0);
    }
}
