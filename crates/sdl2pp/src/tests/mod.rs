//! Cross-module tests run against the headless host

mod lifecycle;
mod scenarios;

use std::rc::Rc;

use crate::backend::HeadlessHost;
use crate::render::types::InitFlags;
use crate::Application;

/// Headless host plus an application with video initialized
fn video_app() -> (Rc<HeadlessHost>, Application) {
    let host = Rc::new(HeadlessHost::new());
    let app = Application::init(host.clone(), InitFlags::VIDEO).unwrap();
    (host, app)
}
