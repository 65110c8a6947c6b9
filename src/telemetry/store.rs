//! # State Store
//!
//! Single-slot holder of the latest telemetry snapshot, shared between the
//! ingestion channel (writer) and the dashboard (reader).
//!
//! Each write replaces the held snapshot wholesale; nothing is queued or
//! merged. Until the first write, reads return the all-defaults snapshot.

use std::sync::{Arc, Mutex, MutexGuard};

use super::snapshot::TelemetrySnapshot;

/// Whether the dashboard has seen any telemetry yet.
///
/// There is no transition back to `Idle`; a dropped connection keeps the
/// last snapshot on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No snapshot received, showing defaults
    Idle,
    /// At least one snapshot received
    Live,
}

#[derive(Debug, Default)]
struct Slot {
    snapshot: Option<TelemetrySnapshot>,
    updates: u64,
}

/// Cloneable handle to the shared slot.
///
/// # Examples
///
/// ```
/// use terradrive_dash::telemetry::{Phase, StateStore, TelemetrySnapshot};
///
/// let store = StateStore::new();
/// assert_eq!(store.phase(), Phase::Idle);
///
/// let writer = store.clone();
/// writer.write(TelemetrySnapshot { speed: 10.0, ..Default::default() });
///
/// assert_eq!(store.read().speed, 10.0);
/// assert_eq!(store.phase(), Phase::Live);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    slot: Arc<Mutex<Slot>>,
}

impl StateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held snapshot.
    pub fn write(&self, snapshot: TelemetrySnapshot) {
        let mut slot = self.lock();
        slot.snapshot = Some(snapshot);
        slot.updates += 1;
    }

    /// Latest snapshot, or the defaults if nothing has been written yet.
    pub fn read(&self) -> TelemetrySnapshot {
        self.lock().snapshot.unwrap_or_default()
    }

    pub fn phase(&self) -> Phase {
        self.read_with_phase().1
    }

    /// Snapshot and phase taken under one lock, so a frame never pairs the
    /// defaults with `Live`.
    pub fn read_with_phase(&self) -> (TelemetrySnapshot, Phase) {
        match self.lock().snapshot {
            Some(snapshot) => (snapshot, Phase::Live),
            None => (TelemetrySnapshot::default(), Phase::Idle),
        }
    }

    /// Number of snapshots written so far
    #[cfg(test)]
    pub(crate) fn update_count(&self) -> u64 {
        self.lock().updates
    }

    // The slot only ever holds a complete `Copy` value, so a poisoned lock
    // still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::snapshot::GeoPoint;
    use std::thread;

    #[test]
    fn test_read_before_write_returns_defaults() {
        let store = StateStore::new();
        assert_eq!(store.read(), TelemetrySnapshot::default());
        assert_eq!(store.phase(), Phase::Idle);
        assert_eq!(store.update_count(), 0);
    }

    #[test]
    fn test_write_replaces_wholesale() {
        let store = StateStore::new();
        store.write(TelemetrySnapshot {
            speed: 20.0,
            navigation_point: Some(GeoPoint { lat: 1.0, lon: 2.0 }),
            ..Default::default()
        });
        store.write(TelemetrySnapshot {
            rpm: 4000.0,
            ..Default::default()
        });

        let snapshot = store.read();
        assert_eq!(snapshot.rpm, 4000.0);
        // Not merged with the previous snapshot
        assert_eq!(snapshot.speed, 0.0);
        assert_eq!(snapshot.navigation_point, None);
        assert_eq!(store.update_count(), 2);
    }

    #[test]
    fn test_phase_stays_live() {
        let store = StateStore::new();
        store.write(TelemetrySnapshot::default());
        assert_eq!(store.phase(), Phase::Live);
        store.write(TelemetrySnapshot::default());
        assert_eq!(store.phase(), Phase::Live);
    }

    #[test]
    fn test_read_with_phase_is_consistent() {
        let store = StateStore::new();
        assert_eq!(store.read_with_phase(), (TelemetrySnapshot::default(), Phase::Idle));

        let writer = store.clone();
        let handle = thread::spawn(move || {
            // Gear 1 would equal the defaults
            for i in 2..=1001 {
                writer.write(TelemetrySnapshot { gear: i, ..Default::default() });
            }
        });

        for _ in 0..1000 {
            let (snapshot, phase) = store.read_with_phase();
            // Defaults (gear 1) only ever come with Idle
            assert_eq!(phase == Phase::Idle, snapshot == TelemetrySnapshot::default());
        }

        handle.join().unwrap();
        assert_eq!(store.read_with_phase().1, Phase::Live);
    }

    #[test]
    fn test_read_is_repeatable() {
        let store = StateStore::new();
        store.write(TelemetrySnapshot { gear: 5, ..Default::default() });
        assert_eq!(store.read(), store.read());
    }

    #[test]
    fn test_concurrent_writer_and_reader() {
        let store = StateStore::new();
        let writer = store.clone();

        let handle = thread::spawn(move || {
            for i in 0..1000 {
                let value = i as f64;
                writer.write(TelemetrySnapshot {
                    speed: value,
                    rpm: value,
                    ..Default::default()
                });
            }
        });

        for _ in 0..1000 {
            let snapshot = store.read();
            // Never a torn mix of two writes
            assert_eq!(snapshot.speed, snapshot.rpm);
        }

        handle.join().unwrap();
        assert_eq!(store.read().speed, 999.0);
        assert_eq!(store.update_count(), 1000);
    }

    #[test]
    fn test_poisoned_lock_still_readable() {
        let store = StateStore::new();
        store.write(TelemetrySnapshot { gear: 3, ..Default::default() });

        let poisoner = store.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.slot.lock().unwrap();
            panic!("poison the slot");
        })
        .join();

        assert_eq!(store.read().gear, 3);
        store.write(TelemetrySnapshot { gear: 4, ..Default::default() });
        assert_eq!(store.read().gear, 4);
    }
}
