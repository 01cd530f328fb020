use anyhow::Result;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing_subscriber::fmt::time::OffsetTime;

pub static LAST_LOG: LazyLock<Mutex<HashMap<String, Instant>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Returns true if nothing was logged from `location` within the last `interval`, and records
/// the current time for `location` if so.
pub fn should_log(location: String, interval: Duration) -> bool {
    let mut last_log = LAST_LOG.lock().unwrap_or_else(PoisonError::into_inner);
    let due = last_log
        .get(&location)
        .map_or(true, |then| then.elapsed() >= interval);
    if due {
        last_log.insert(location, Instant::now());
    }
    due
}

#[macro_export]
macro_rules! warn_every_seconds {
    ($seconds:expr, $($args:expr),+) => {
        if $crate::util::log::should_log(
            $crate::util::assert::current_location!(),
            std::time::Duration::from_secs($seconds),
        ) {
            $crate::core::prelude::warn!($($args),+);
        }
    }
}

/// Installs the global subscriber: UTC wall-clock timestamps with microseconds, source locations,
/// and no target prefix. Fails if a global subscriber is already set.
pub fn setup_log() -> Result<()> {
    let timer = OffsetTime::new(
        time::UtcOffset::UTC,
        time::macros::format_description!("[hour]:[minute]:[second].[subsecond digits:6]"),
    );
    tracing_subscriber::fmt()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_target(false)
                .with_source_location(true)
                .with_timer(timer),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}
