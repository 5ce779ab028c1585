// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Named advisory locks
//!
//! Backs `GET_LOCK` and friends. Locks are keyed by name, owned by at most
//! one session, and live outside any transaction.
//!
//! ## Concurrency
//!
//! Both indexes (name -> entry, session -> names) sit behind one mutex, so
//! every check-and-set is atomic. A waiting `lock` parks on a condvar that
//! every release notifies, waking at least once per wait slice to observe
//! its deadline and its session's cancellation flag.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::core::config::engine_config::LockConfig;
use crate::core::error::{EmberError, EmberResult};
use crate::core::util::cancellation::CancellationHandle;

/// Connection identifier; `0` is never handed out and means "no owner".
pub type SessionId = u32;

pub const NO_SESSION: SessionId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Free,
    InUse,
}

/// How long `lock` may wait for a lock held by another session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTimeout {
    /// Single attempt.
    Immediate,
    Within(Duration),
    Infinite,
}

impl LockTimeout {
    /// SQL convention: `0` tries once, negative waits forever, positive is
    /// a number of seconds.
    pub fn from_secs(secs: i64) -> Self {
        match secs {
            0 => LockTimeout::Immediate,
            s if s < 0 => LockTimeout::Infinite,
            s => LockTimeout::Within(Duration::from_secs(s.unsigned_abs())),
        }
    }

    fn deadline(self, start: Instant, cap: Option<Duration>) -> Deadline {
        match (self, cap) {
            (LockTimeout::Immediate, _) => Deadline::Now,
            (LockTimeout::Within(wait), cap) => {
                let wait = cap.map_or(wait, |cap| wait.min(cap));
                start.checked_add(wait).map_or(Deadline::Never, Deadline::At)
            }
            (LockTimeout::Infinite, _) => Deadline::Never,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Deadline {
    Now,
    At(Instant),
    Never,
}

#[derive(Debug, Default)]
struct NamedLock {
    owner: Option<SessionId>,
}

#[derive(Debug, Default)]
struct Registry {
    locks: HashMap<String, NamedLock>,
    sessions: HashMap<SessionId, BTreeSet<String>>,
}

impl Registry {
    fn forget(&mut self, session: SessionId, name: &str) {
        if let Some(names) = self.sessions.get_mut(&session) {
            names.remove(name);
            if names.is_empty() {
                self.sessions.remove(&session);
            }
        }
    }
}

/// Process-wide registry of named locks, shared by `Arc` between the engine,
/// its sessions and the lock function executors.
#[derive(Debug)]
pub struct LockSubsystem {
    registry: Mutex<Registry>,
    released: Condvar,
    config: LockConfig,
}

impl Default for LockSubsystem {
    fn default() -> Self {
        Self::new(LockConfig::default())
    }
}

impl LockSubsystem {
    pub fn new(config: LockConfig) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            released: Condvar::new(),
            config,
        }
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    // Critical sections never panic midway, so the registry is consistent
    // even if a panicking thread poisoned the mutex.
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires `name` for `session`, waiting up to `timeout` while another
    /// session holds it. Re-acquiring a lock the session already owns
    /// succeeds without nesting.
    pub fn lock(
        &self,
        session: SessionId,
        name: &str,
        timeout: LockTimeout,
        cancellation: &CancellationHandle,
    ) -> EmberResult<()> {
        let deadline = timeout.deadline(Instant::now(), self.config.max_timeout());
        let slice = self.config.wait_slice();
        let mut guard = self.registry();
        let mut waited = false;

        loop {
            let registry = &mut *guard;
            let entry = registry.locks.entry(name.to_string()).or_default();
            match entry.owner {
                None => {
                    entry.owner = Some(session);
                    registry
                        .sessions
                        .entry(session)
                        .or_default()
                        .insert(name.to_string());
                    log::debug!(
                        "[LockSubsystem] session {} acquired '{}'{}",
                        session,
                        name,
                        if waited { " after waiting" } else { "" }
                    );
                    return Ok(());
                }
                Some(owner) if owner == session => return Ok(()),
                Some(owner) => {
                    if !waited {
                        log::debug!(
                            "[LockSubsystem] session {} waiting for '{}' held by session {}",
                            session,
                            name,
                            owner
                        );
                    }
                }
            }

            if cancellation.is_cancelled() {
                log::debug!(
                    "[LockSubsystem] session {} cancelled while waiting for '{}'",
                    session,
                    name
                );
                return Err(EmberError::Cancelled { session });
            }

            let wait = match deadline {
                Deadline::Now => None,
                Deadline::At(at) => at
                    .checked_duration_since(Instant::now())
                    .filter(|left| !left.is_zero())
                    .map(|left| left.min(slice)),
                Deadline::Never => Some(slice),
            };
            let Some(wait) = wait else {
                log::debug!(
                    "[LockSubsystem] session {} timed out waiting for '{}'",
                    session,
                    name
                );
                return Err(EmberError::LockTimeout {
                    name: name.to_string(),
                });
            };

            waited = true;
            guard = self
                .released
                .wait_timeout(guard, wait)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Releases `name` if `session` owns it.
    pub fn unlock(&self, session: SessionId, name: &str) -> EmberResult<()> {
        let mut guard = self.registry();
        let registry = &mut *guard;
        let Some(entry) = registry.locks.get_mut(name) else {
            return Err(EmberError::LockDoesNotExist {
                name: name.to_string(),
            });
        };
        if entry.owner != Some(session) {
            return Err(EmberError::LockNotOwned {
                name: name.to_string(),
                operation: "unlock".to_string(),
                session,
            });
        }
        entry.owner = None;
        registry.forget(session, name);
        drop(guard);

        self.released.notify_all();
        log::debug!("[LockSubsystem] session {} released '{}'", session, name);
        Ok(())
    }

    /// Current state and owner of `name`; `(Free, NO_SESSION)` for unknown
    /// or released locks.
    pub fn get_lock_state(&self, name: &str) -> (LockState, SessionId) {
        match self.registry().locks.get(name).and_then(|l| l.owner) {
            Some(owner) => (LockState::InUse, owner),
            None => (LockState::Free, NO_SESSION),
        }
    }

    /// Releases every lock `session` holds, returning how many were released.
    pub fn release_all(&self, session: SessionId) -> EmberResult<usize> {
        let mut guard = self.registry();
        let registry = &mut *guard;
        let Some(names) = registry.sessions.remove(&session) else {
            return Ok(0);
        };
        let mut released = 0;
        for name in &names {
            if let Some(entry) = registry.locks.get_mut(name) {
                if entry.owner == Some(session) {
                    entry.owner = None;
                    released += 1;
                }
            }
        }
        drop(guard);

        if released > 0 {
            self.released.notify_all();
            log::debug!(
                "[LockSubsystem] session {} released {} lock(s)",
                session,
                released
            );
        }
        Ok(released)
    }

    /// Calls `visit` with every lock name `session` holds, in name order,
    /// stopping at the first error. The visitor runs without the registry
    /// mutex held, so it may call back into the subsystem.
    pub fn iter_locks<F>(&self, session: SessionId, mut visit: F) -> EmberResult<()>
    where
        F: FnMut(&str) -> EmberResult<()>,
    {
        let names: Vec<String> = self
            .registry()
            .sessions
            .get(&session)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default();
        names.iter().try_for_each(|name| visit(name))
    }
}
