//! # Barrier
//!
//! Group-wide rendezvous, reusable across rounds. The generation counter keeps
//! a caller of round R+1 from being released by the wake-up of round R.

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Default)]
struct BarrierState {
    count: u32,
    generation: u64,
}

/// Outcome of one [`Barrier::arrive`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BarrierArrival {
    /// Round this arrival took part in.
    pub generation: u64,
    /// True for the Nth arrival, the one that released the round.
    pub is_leader: bool,
}

/// Rendezvous counter shared by every member of a group.
#[derive(Debug)]
pub struct Barrier {
    target: u32,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl Barrier {
    /// Barrier releasing once `target` callers have arrived.
    pub fn new(target: u32) -> Self {
        Self {
            target,
            state: Mutex::new(BarrierState::default()),
            released: Condvar::new(),
        }
    }

    /// Number of arrivals needed to release a round.
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Number of completed rounds.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Arrive and block until `target` callers have arrived in this round.
    pub fn arrive(&self) -> BarrierArrival {
        let mut state = self.state.lock();
        let generation = state.generation;
        state.count += 1;

        if state.count >= self.target {
            state.count = 0;
            state.generation += 1;
            self.released.notify_all();
            debug!(generation, target = self.target, "Barrier released");
            return BarrierArrival {
                generation,
                is_leader: true,
            };
        }

        debug!(generation, arrived = state.count, target = self.target, "Waiting at barrier");
        while state.generation == generation {
            self.released.wait(&mut state);
        }
        BarrierArrival {
            generation,
            is_leader: false,
        }
    }
}
