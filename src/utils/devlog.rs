//! Level-6 developer log.
//!
//! Query and audit telemetry is mirrored into a per-thread capture buffer, tagged with
//! the channel it came from, so tests can read it back without installing a logger.

use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static CAPTURE: RefCell<Option<Vec<DevLine>>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevLine {
    /// `metrics`, `audit`, or `dev` for free-form traces.
    pub channel: &'static str,
    pub text: String,
}

/// Active capture on the current thread. Dropping it stops capturing and discards
/// anything not taken.
pub struct Capture {
    // capture is per-thread; keep the guard on the thread that created it
    _thread_bound: PhantomData<*const ()>,
}

impl Capture {
    /// Takes every captured line so far.
    #[must_use]
    pub fn take(&self) -> Vec<DevLine> {
        CAPTURE.with(|c| c.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
    }

    /// Takes the text of captured lines on `channel`; other channels are dropped.
    #[must_use]
    pub fn take_channel(&self, channel: &str) -> Vec<String> {
        self.take().into_iter().filter(|l| l.channel == channel).map(|l| l.text).collect()
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        CAPTURE.with(|c| *c.borrow_mut() = None);
    }
}

/// Starts capturing on the current thread, replacing any earlier buffer.
#[must_use]
pub fn capture() -> Capture {
    CAPTURE.with(|c| *c.borrow_mut() = Some(Vec::new()));
    Capture { _thread_bound: PhantomData }
}

/// Appends a line when a capture is active on this thread.
pub fn record(channel: &'static str, text: &str) {
    CAPTURE.with(|c| {
        if let Some(buf) = c.borrow_mut().as_mut() {
            buf.push(DevLine { channel, text: text.to_owned() });
        }
    });
}

/// Emit a developer log (level 6) on `bookstore::dev6` and record it for capture.
/// `dev6!(channel = "metrics", "...")` tags the line; the default channel is `dev`.
#[macro_export]
macro_rules! dev6 {
    (channel = $ch:literal, $($arg:tt)*) => {{
        let __s = format!($($arg)*);
        $crate::utils::devlog::record($ch, &__s);
        log::log!(target: "bookstore::dev6", log::Level::Trace, "[{}] {}", $ch, __s);
    }};
    ($($arg:tt)*) => {
        $crate::dev6!(channel = "dev", $($arg)*)
    };
}
