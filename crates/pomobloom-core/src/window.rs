//! Bridge to the host window.
//!
//! Both calls are requests: the host may ignore them and nothing is
//! reported back to the caller.

pub trait WindowShell {
    fn set_always_on_top(&self, flag: bool);

    fn minimize(&self);
}

/// Shell for hosts without a window, e.g. when output is piped.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessShell;

impl WindowShell for HeadlessShell {
    fn set_always_on_top(&self, flag: bool) {
        tracing::debug!(flag, "always-on-top ignored: no window");
    }

    fn minimize(&self) {
        tracing::debug!("minimize ignored: no window");
    }
}

impl<T: WindowShell + ?Sized> WindowShell for Box<T> {
    fn set_always_on_top(&self, flag: bool) {
        (**self).set_always_on_top(flag);
    }

    fn minimize(&self) {
        (**self).minimize();
    }
}
