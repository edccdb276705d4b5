//! Autosave settings and the background timer.

use crate::error::{Error, Result};
use crate::storage::{Document, Storage};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Interval used by [`Autosave::Default`] unless the registry overrides it.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_millis(60_000);

/// Whether a freshly opened storage saves itself on a timer.
///
/// Converts from `bool` (`true` = default interval), from a number of
/// milliseconds, and from a [`Duration`]. A zero interval means no autosave.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Autosave {
    /// Only save when `save()` is called.
    #[default]
    Off,
    /// Save every [`DEFAULT_AUTOSAVE_INTERVAL`] (or the registry's override).
    Default,
    /// Save at a custom interval.
    Every(Duration),
}

impl Autosave {
    /// The timer period this setting asks for, if any. Zero periods count
    /// as no autosave.
    pub fn interval(self, default: Duration) -> Option<Duration> {
        let period = match self {
            Autosave::Off => return None,
            Autosave::Default => default,
            Autosave::Every(d) => d,
        };
        (!period.is_zero()).then_some(period)
    }
}

impl From<bool> for Autosave {
    fn from(on: bool) -> Self {
        if on {
            Autosave::Default
        } else {
            Autosave::Off
        }
    }
}

impl From<u64> for Autosave {
    fn from(millis: u64) -> Self {
        Duration::from_millis(millis).into()
    }
}

impl From<Duration> for Autosave {
    fn from(interval: Duration) -> Self {
        if interval.is_zero() {
            Autosave::Off
        } else {
            Autosave::Every(interval)
        }
    }
}

impl<T: Into<Autosave>> From<Option<T>> for Autosave {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Autosave::Off, Into::into)
    }
}

/// Start a timer on the current Tokio runtime that calls `save()` every
/// `period`, first firing one period from now. It runs for the rest of the
/// process and keeps `storage` alive. Failures are logged and otherwise
/// dropped.
pub(crate) fn spawn<D: Document>(storage: Arc<Storage<D>>, period: Duration) -> Result<()> {
    let runtime = current_runtime(storage.path())?;

    tracing::debug!(
        path = %storage.path().display(),
        interval_ms = period.as_millis() as u64,
        "autosave enabled"
    );

    let worker = runtime.clone();
    runtime.spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            // Called here, not inside the spawned task, so a tick that lands
            // during an in-flight save is dropped right away.
            let save = storage.save();
            let path = storage.path().to_path_buf();
            worker.spawn(async move {
                if let Err(err) = save.await {
                    tracing::warn!(path = %path.display(), error = %err, "autosave failed");
                }
            });
        }
    });
    Ok(())
}

/// The Tokio runtime the timer for `path` would run on.
pub(crate) fn current_runtime(path: &Path) -> Result<tokio::runtime::Handle> {
    tokio::runtime::Handle::try_current().map_err(|_| {
        Error::Config(format!(
            "autosave for {} needs a running Tokio runtime",
            path.display()
        ))
    })
}
