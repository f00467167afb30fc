//! Events returned by [`crate::Application::poll_event`]
//!
//! Only the event kinds the sample driver reacts to get their own variant;
//! everything else is reported as [`Event::Other`] with its raw type id.

/// Virtual key code as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keycode(pub i32);

impl Keycode {
    /// Return key
    pub const RETURN: Self = Self(0x0D);
    /// Escape key
    pub const ESCAPE: Self = Self(0x1B);
    /// Space bar
    pub const SPACE: Self = Self(0x20);
    /// Letter Q
    pub const Q: Self = Self(b'q' as i32);
    /// Letter W
    pub const W: Self = Self(b'w' as i32);
    /// Letter A
    pub const A: Self = Self(b'a' as i32);
    /// Letter S
    pub const S: Self = Self(b's' as i32);
    /// Letter D
    pub const D: Self = Self(b'd' as i32);
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button
    Left,
    /// Middle button
    Middle,
    /// Right button
    Right,
    /// First extra button
    X1,
    /// Second extra button
    X2,
    /// Any other button index
    Unknown(u8),
}

impl From<u8> for MouseButton {
    fn from(raw: u8) -> Self {
        match raw {
            1 => Self::Left,
            2 => Self::Middle,
            3 => Self::Right,
            4 => Self::X1,
            5 => Self::X2,
            other => Self::Unknown(other),
        }
    }
}

/// A polled event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user asked to quit
    Quit,
    /// A key was pressed
    KeyDown {
        /// Key code
        keycode: Keycode,
        /// Whether this is a key-repeat event
        repeat: bool,
    },
    /// A key was released
    KeyUp {
        /// Key code
        keycode: Keycode,
    },
    /// The mouse moved
    MouseMotion {
        /// X coordinate relative to the window
        x: i32,
        /// Y coordinate relative to the window
        y: i32,
        /// Relative motion along X
        xrel: i32,
        /// Relative motion along Y
        yrel: i32,
    },
    /// A mouse button was pressed
    MouseButtonDown {
        /// Button
        button: MouseButton,
        /// X coordinate relative to the window
        x: i32,
        /// Y coordinate relative to the window
        y: i32,
    },
    /// A mouse button was released
    MouseButtonUp {
        /// Button
        button: MouseButton,
        /// X coordinate relative to the window
        x: i32,
        /// Y coordinate relative to the window
        y: i32,
    },
    /// A window changed size
    WindowResized {
        /// New width
        width: i32,
        /// New height
        height: i32,
    },
    /// Any other event, by raw type id
    Other(u32),
}

impl Event {
    /// Whether the event asks the driver loop to stop
    pub const fn is_quit_request(&self) -> bool {
        matches!(
            self,
            Self::Quit
                | Self::KeyDown {
                    keycode: Keycode::ESCAPE,
                    ..
                }
        )
    }
}
