//! Failed login attempts throttling.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use common::DateTime;
use derive_more::{AsRef, Display, From};
use smart_default::SmartDefault;

/// Configuration of a throttle [`Registry`].
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Number of failed attempts within a window after which a [`Key`] is
    /// rejected.
    #[default = 5]
    pub max_attempts: u32,

    /// Span during which failed attempts accumulate.
    ///
    /// An [`Entry`] older than this is discarded before any comparison.
    #[default(Duration::from_secs(10 * 60))]
    pub window: Duration,
}

/// Registry of failed login attempts, keyed by client address.
///
/// Process-local: horizontally scaled deployments enforce independent
/// windows, with a shared store holding atomic increment-with-expiry as the
/// upgrade path.
#[derive(Clone, Debug, Default)]
pub struct Registry(Arc<Mutex<HashMap<Key, Entry>>>);

impl Registry {
    /// Checks whether a login attempt under the given [`Key`] is allowed
    /// now, dropping the [`Key`]'s [`Entry`] if its window has passed.
    #[must_use]
    pub fn check(&self, key: &Key, config: Config) -> bool {
        self.check_at(key, config, DateTime::now())
    }

    /// Records a failed login attempt under the given [`Key`] now.
    ///
    /// Called on every failed verification step. Successful logins never
    /// touch the [`Registry`]: only window expiry clears an [`Entry`].
    pub fn record_failure(&self, key: Key, config: Config) {
        self.record_failure_at(key, config, DateTime::now());
    }

    /// Evicts all [`Entry`]s whose window has passed.
    ///
    /// Cache hygiene only: a stale [`Entry`] is dropped by [`check`] on its
    /// next touch anyway.
    ///
    /// [`check`]: Registry::check
    pub fn sweep(&self, config: Config) {
        self.sweep_at(config, DateTime::now());
    }

    /// Number of [`Entry`]s currently held, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Indicates whether no [`Entry`]s are currently held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// [`check`] with an explicit current time.
    ///
    /// [`check`]: Registry::check
    fn check_at(&self, key: &Key, config: Config, now: DateTime) -> bool {
        let mut entries = self.lock();
        let Some(entry) = entries.get(key) else {
            return true;
        };
        if entry.is_stale(config, now) {
            let _ = entries.remove(key);
            return true;
        }
        entry.count < config.max_attempts
    }

    /// [`record_failure`] with an explicit current time.
    ///
    /// [`record_failure`]: Registry::record_failure
    fn record_failure_at(&self, key: Key, config: Config, now: DateTime) {
        let mut entries = self.lock();
        let entry = entries
            .entry(key)
            .and_modify(|e| {
                if e.is_stale(config, now) {
                    e.count = 0;
                }
            })
            .or_insert(Entry {
                count: 0,
                last_failure: now,
            });
        entry.count += 1;
        entry.last_failure = now;
    }

    /// [`sweep`] with an explicit current time.
    ///
    /// [`sweep`]: Registry::sweep
    fn sweep_at(&self, config: Config, now: DateTime) {
        self.lock().retain(|_, e| !e.is_stale(config, now));
    }

    /// Acquires the [`Entry`]s lock, disregarding its poisoning.
    fn lock(&self) -> MutexGuard<'_, HashMap<Key, Entry>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Client address failed login attempts are keyed by.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct Key(String);

impl Key {
    /// [`Key`] shared by all clients whose address cannot be determined.
    ///
    /// A single bucket for all of them is a known weakness: such clients
    /// throttle each other.
    #[must_use]
    pub fn unknown() -> Self {
        Self("unknown".into())
    }
}

/// Failed login attempts of a single [`Key`].
#[derive(Clone, Copy, Debug)]
struct Entry {
    /// Number of failed attempts within the current window.
    count: u32,

    /// [`DateTime`] of the most recent failed attempt.
    last_failure: DateTime,
}

impl Entry {
    /// Indicates whether this [`Entry`]'s window has passed at the given
    /// time.
    fn is_stale(&self, config: Config, now: DateTime) -> bool {
        now > self.last_failure && now - self.last_failure > config.window
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use super::{Config, Key, Registry};

    #[test]
    fn allows_unknown_keys() {
        let registry = Registry::default();

        assert!(registry.check(&Key::from("10.0.0.1"), Config::default()));
    }

    #[test]
    fn rejects_after_max_attempts() {
        let registry = Registry::default();
        let config = Config::default();
        let key = Key::from("10.0.0.1");

        for n in 0..config.max_attempts {
            assert!(registry.check(&key, config), "rejected attempt {n}");
            registry.record_failure(key.clone(), config);
        }

        assert!(!registry.check(&key, config));
    }

    #[test]
    fn keys_throttle_independently() {
        let registry = Registry::default();
        let config = Config::default();

        for _ in 0..config.max_attempts {
            registry.record_failure(Key::from("10.0.0.1"), config);
        }

        assert!(!registry.check(&Key::from("10.0.0.1"), config));
        assert!(registry.check(&Key::from("10.0.0.2"), config));
    }

    #[test]
    fn window_expiry_unblocks() {
        let registry = Registry::default();
        let config = Config::default();
        let key = Key::from("10.0.0.1");
        let t0 = DateTime::now();

        for _ in 0..config.max_attempts {
            registry.record_failure_at(key.clone(), config, t0);
        }
        assert!(!registry.check_at(&key, config, t0));

        let later = t0 + config.window + Duration::from_secs(1);
        assert!(registry.check_at(&key, config, later));
        assert!(registry.is_empty(), "stale entry not dropped");
    }

    #[test]
    fn failure_after_expiry_restarts_the_count() {
        let registry = Registry::default();
        let config = Config::default();
        let key = Key::from("10.0.0.1");
        let t0 = DateTime::now();

        for _ in 0..config.max_attempts {
            registry.record_failure_at(key.clone(), config, t0);
        }

        let later = t0 + config.window + Duration::from_secs(1);
        registry.record_failure_at(key.clone(), config, later);
        assert!(registry.check_at(&key, config, later));
    }

    #[test]
    fn last_failure_refreshes_the_window() {
        let registry = Registry::default();
        let config = Config::default();
        let key = Key::from("10.0.0.1");
        let t0 = DateTime::now();

        for _ in 0..config.max_attempts {
            registry.record_failure_at(key.clone(), config, t0);
        }
        let half = t0 + config.window / 2;
        registry.record_failure_at(key.clone(), config, half);

        // Still within the refreshed window.
        let after_first = t0 + config.window + Duration::from_secs(1);
        assert!(!registry.check_at(&key, config, after_first));
    }

    #[test]
    fn sweep_drops_only_stale_entries() {
        let registry = Registry::default();
        let config = Config::default();
        let t0 = DateTime::now();
        let later = t0 + config.window + Duration::from_secs(1);

        registry.record_failure_at(Key::from("10.0.0.1"), config, t0);
        registry.record_failure_at(Key::from("10.0.0.2"), config, later);

        registry.sweep_at(config, later);
        assert_eq!(registry.len(), 1);
    }
}
