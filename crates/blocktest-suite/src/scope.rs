//! Scoped activation of a case's protocol configuration.
//!
//! Validators read the protocol configuration from shared state, so every
//! case must run with its own configuration active and must leave the
//! default behind, whatever way execution ends. [`ConfigScope`] is the
//! guard that enforces this.

use crate::error::ConfigError;
use crate::network::ProtocolConfig;
use parking_lot::RwLock;

/// Mutators for the configuration a validator consults.
pub trait ConfigStore {
    /// Make `config` the active configuration.
    fn activate(&self, config: &ProtocolConfig) -> Result<(), ConfigError>;

    /// Put the default (mainnet) configuration back.
    fn restore_default(&self) -> Result<(), ConfigError>;

    /// The configuration currently in effect.
    fn active(&self) -> ProtocolConfig;
}

/// `None` stands for the mainnet default.
static ACTIVE: RwLock<Option<ProtocolConfig>> = parking_lot::const_rwlock(None);

/// The process-wide configuration store.
///
/// Only one case may hold it at a time; runs that use it must stay
/// sequential.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalConfig;

impl GlobalConfig {
    /// The configuration currently in effect process-wide.
    pub fn current() -> ProtocolConfig {
        ACTIVE.read().clone().unwrap_or_default()
    }
}

impl ConfigStore for GlobalConfig {
    fn activate(&self, config: &ProtocolConfig) -> Result<(), ConfigError> {
        *ACTIVE.write() = Some(config.clone());
        Ok(())
    }

    fn restore_default(&self) -> Result<(), ConfigError> {
        *ACTIVE.write() = None;
        Ok(())
    }

    fn active(&self) -> ProtocolConfig {
        Self::current()
    }
}

/// A store owned by one runner rather than the whole process.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    active: RwLock<Option<ProtocolConfig>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn activate(&self, config: &ProtocolConfig) -> Result<(), ConfigError> {
        *self.active.write() = Some(config.clone());
        Ok(())
    }

    fn restore_default(&self) -> Result<(), ConfigError> {
        *self.active.write() = None;
        Ok(())
    }

    fn active(&self) -> ProtocolConfig {
        self.active.read().clone().unwrap_or_default()
    }
}

/// Guard holding a case configuration active.
///
/// [`release`](Self::release) restores the default and reports a restore
/// fault to the caller. If the guard is dropped without being released
/// (an early return or a panic) the default is restored in `Drop` and a
/// restore fault is logged.
pub struct ConfigScope<'a> {
    store: &'a dyn ConfigStore,
    released: bool,
}

impl<'a> ConfigScope<'a> {
    /// Activate `config` on `store` until the guard is released or dropped.
    pub fn enter(store: &'a dyn ConfigStore, config: &ProtocolConfig) -> Result<Self, ConfigError> {
        if let Err(err) = store.activate(config) {
            if let Err(restore) = store.restore_default() {
                tracing::warn!(error = %restore, "restore after failed activation also failed");
            }
            return Err(err);
        }
        Ok(Self {
            store,
            released: false,
        })
    }

    /// Restore the default configuration now.
    pub fn release(mut self) -> Result<(), ConfigError> {
        self.released = true;
        self.store.restore_default()
    }
}

impl Drop for ConfigScope<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.store.restore_default() {
            tracing::warn!(error = %err, "failed to restore default configuration");
        }
    }
}
