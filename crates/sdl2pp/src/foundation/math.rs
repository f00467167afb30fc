//! Value types passed to drawing calls
//!
//! Each drawing operation takes one canonical argument type. Tuples, arrays and
//! `nalgebra` vectors convert into it through `From`, so callers never need a
//! separate overload per shape of input.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

pub use nalgebra::{Vector2, Vector4};

/// Integer 2D vector type
pub type IVec2 = Vector2<i32>;

/// Byte 4D vector type, used for RGBA colours
pub type U8Vec4 = Vector4<u8>;

/// A pixel coordinate.
///
/// Layout-compatible with the native point struct so slices can be handed to
/// the host without copying.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

impl Point {
    /// Create a point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by an offset, clamping at the coordinate range
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<IVec2> for Point {
    fn from(v: IVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Point> for IVec2 {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

/// An axis-aligned rectangle in pixels.
///
/// Width and height are signed to match the native rectangle layout; a
/// rectangle with a non-positive extent is empty.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Create a rectangle
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle anchored at the origin
    pub const fn with_size(w: i32, h: i32) -> Self {
        Self::new(0, 0, w, h)
    }

    /// Top-left corner
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Extent as `(w, h)`
    pub const fn size(&self) -> (i32, i32) {
        (self.w, self.h)
    }

    /// Whether the rectangle covers no pixels
    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Exclusive right edge, widened so it never overflows
    pub const fn right(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    /// Exclusive bottom edge, widened so it never overflows
    pub const fn bottom(&self) -> i64 {
        self.y as i64 + self.h as i64
    }

    /// Whether `point` lies inside the rectangle (right and bottom edges exclusive)
    pub const fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && (point.x as i64) < self.right()
            && (point.y as i64) < self.bottom()
    }

    /// Overlapping area of two rectangles, if any
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let w = self.right().min(other.right()) - i64::from(x0);
        let h = self.bottom().min(other.bottom()) - i64::from(y0);
        if w <= 0 || h <= 0 {
            return None;
        }
        // the overlap is never wider than either input
        let rect = Self::new(x0, y0, i32::try_from(w).ok()?, i32::try_from(h).ok()?);
        Some(rect)
    }
}

impl From<(i32, i32, i32, i32)> for Rect {
    fn from((x, y, w, h): (i32, i32, i32, i32)) -> Self {
        Self::new(x, y, w, h)
    }
}

impl From<[i32; 4]> for Rect {
    fn from([x, y, w, h]: [i32; 4]) -> Self {
        Self::new(x, y, w, h)
    }
}

impl From<(Point, IVec2)> for Rect {
    fn from((origin, size): (Point, IVec2)) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }
}

/// An RGBA colour with 8 bits per channel
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque white
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    /// Opaque red
    pub const RED: Self = Self::rgba(255, 0, 0, 255);
    /// Opaque green
    pub const GREEN: Self = Self::rgba(0, 255, 0, 255);
    /// Opaque blue
    pub const BLUE: Self = Self::rgba(0, 0, 255, 255);
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Create a colour from all four channels
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque colour
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Channels as a vector in `(r, g, b, a)` order
    pub fn as_vector(&self) -> U8Vec4 {
        U8Vec4::new(self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Self::rgba(r, g, b, a)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }
}

impl From<U8Vec4> for Color {
    fn from(v: U8Vec4) -> Self {
        Self::rgba(v.x, v.y, v.z, v.w)
    }
}
