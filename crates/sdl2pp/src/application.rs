//! Library lifetime and event polling

use crate::backend::Host;
use crate::core::config::EngineConfig;
use crate::error::{Error, HostResultExt, Result};
use crate::events::Event;
use crate::render::types::InitFlags;

/// The host library's initialized state.
///
/// Created once per process. Quitting (explicitly or on drop) releases every
/// native object the host still tracks; wrappers created earlier become
/// inactive and their own teardown is then rejected by the host, never
/// repeated.
pub struct Application {
    host: Host,
    active: bool,
}

impl Application {
    /// Initialize the host with the given subsystems
    pub fn init(host: Host, flags: InitFlags) -> Result<Self> {
        host.init(flags).or_host_error(host.as_ref())?;
        log::info!("{} initialized ({flags:?})", host.name());
        Ok(Self { host, active: true })
    }

    /// Initialize the subsystems named by the engine configuration
    pub fn from_config(host: Host, config: &EngineConfig) -> Result<Self> {
        Self::init(host, config.init_flags())
    }

    /// The host every wrapper created from this application talks to
    pub const fn host(&self) -> &Host {
        &self.host
    }

    /// Whether [`Application::quit`] has not run yet
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Initialize additional subsystems
    pub fn init_subsystem(&self, flags: InitFlags) -> Result<()> {
        if !self.active {
            return Err(Error::invalid_handle("application"));
        }
        self.host
            .init_subsystem(flags)
            .or_host_error(self.host.as_ref())
    }

    /// Shut down specific subsystems. Quitting video releases every window.
    pub fn quit_subsystem(&self, flags: InitFlags) {
        if self.active {
            log::debug!("Shutting down subsystems {flags:?}");
            self.host.quit_subsystem(flags);
        }
    }

    /// Which of `flags` are initialized; every initialized subsystem for
    /// empty `flags`
    pub fn was_init(&self, flags: InitFlags) -> InitFlags {
        if self.active {
            self.host.was_init(flags)
        } else {
            InitFlags::empty()
        }
    }

    /// Next pending event, if any. Never blocks.
    pub fn poll_event(&self) -> Option<Event> {
        if self.active {
            self.host.poll_event()
        } else {
            None
        }
    }

    /// Iterator draining the pending events
    pub const fn poll_iter(&self) -> PollIter<'_> {
        PollIter { app: self }
    }

    /// Shut the host down. Calling this again is a no-op.
    pub fn quit(&mut self) {
        if std::mem::take(&mut self.active) {
            log::info!("{} shutting down", self.host.name());
            self.host.quit();
        }
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.quit();
    }
}

/// Iterator returned by [`Application::poll_iter`]; ends when the queue is empty
pub struct PollIter<'a> {
    app: &'a Application,
}

impl Iterator for PollIter<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.app.poll_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessHost, HostLibrary};
    use crate::events::Keycode;
    use std::rc::Rc;

    #[test]
    fn test_init_reports_subsystems() {
        let host = Rc::new(HeadlessHost::new());
        let app = Application::init(host, InitFlags::VIDEO | InitFlags::TIMER).unwrap();
        assert!(app.was_init(InitFlags::VIDEO).contains(InitFlags::VIDEO));
        assert!(app.was_init(InitFlags::empty()).contains(InitFlags::EVENTS));
        assert!(app.was_init(InitFlags::AUDIO).is_empty());
    }

    #[test]
    fn test_init_failure_carries_host_message() {
        let host = Rc::new(HeadlessHost::new().without_subsystems(InitFlags::AUDIO));
        let error = Application::init(host, InitFlags::AUDIO).err().unwrap();
        assert_eq!(error.message(), "No available audio device");
    }

    #[test]
    fn test_subsystems_come_and_go() {
        let host = Rc::new(HeadlessHost::new());
        let app = Application::init(host, InitFlags::TIMER).unwrap();
        app.init_subsystem(InitFlags::VIDEO).unwrap();
        assert!(!app.was_init(InitFlags::VIDEO).is_empty());
        app.quit_subsystem(InitFlags::VIDEO);
        assert!(app.was_init(InitFlags::VIDEO).is_empty());
        assert!(!app.was_init(InitFlags::TIMER).is_empty());
    }

    #[test]
    fn test_poll_iter_drains_queue() {
        let host = Rc::new(HeadlessHost::new());
        let app = Application::init(host.clone(), InitFlags::VIDEO).unwrap();
        host.push_event(Event::KeyDown { keycode: Keycode::SPACE, repeat: false });
        host.push_event(Event::Quit);

        let events: Vec<Event> = app.poll_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(events[1].is_quit_request());
        assert_eq!(app.poll_event(), None);
    }

    #[test]
    fn test_quit_is_idempotent() {
        let host = Rc::new(HeadlessHost::new());
        let mut app = Application::init(host.clone(), InitFlags::VIDEO).unwrap();
        app.quit();
        app.quit();
        assert!(!app.is_active());
        assert!(host.was_init(InitFlags::empty()).is_empty());
        assert_eq!(
            app.init_subsystem(InitFlags::VIDEO).unwrap_err().message(),
            "Invalid application"
        );
    }
}
