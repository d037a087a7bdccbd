//! Event System
//!
//! Events allow decoupled communication between game systems.
//! Instead of systems directly calling each other, they send events
//! that other systems can listen to.
//!
//! Example flow:
//! 1. Update loop detects a coin overlap → sends CoinCollectedEvent
//! 2. Score bookkeeping reads it → increments the score
//! 3. Audio system reads it → plays the pickup sound
//!
//! Each system handles its own concern without knowing about the others.

use macroquad::prelude::Vec2;

/// A queue for events of a single type.
/// Events are collected during the frame and drained at specific points.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Send an event (add to queue)
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate over events without clearing
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Drain all events (returns iterator and clears queue)
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    /// Check if there are any events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events without processing
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of events in queue
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all game events.
/// Add new event types as fields here.
pub struct Events {
    /// A coin was collected
    pub coin_collected: EventQueue<CoinCollectedEvent>,

    /// The player jumped
    pub jumped: EventQueue<JumpEvent>,

    /// The player was sent back to the spawn point
    pub respawn: EventQueue<RespawnEvent>,

    /// Enough coins collected, move to the next level
    pub level_complete: EventQueue<LevelCompleteEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self {
            coin_collected: EventQueue::new(),
            jumped: EventQueue::new(),
            respawn: EventQueue::new(),
            level_complete: EventQueue::new(),
        }
    }

    /// Clear all event queues. Call at end of frame.
    pub fn clear_all(&mut self) {
        self.coin_collected.clear();
        self.jumped.clear();
        self.respawn.clear();
        self.level_complete.clear();
    }
}

impl Default for Events {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Event Types
// =============================================================================

/// A coin was collected
#[derive(Debug, Clone, Copy)]
pub struct CoinCollectedEvent {
    /// Where the coin was (for VFX, if any)
    pub position: Vec2,
    /// Score after collecting
    pub score: u32,
}

/// The player jumped
#[derive(Debug, Clone, Copy)]
pub struct JumpEvent {
    pub position: Vec2,
}

/// Why the player respawned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnReason {
    FellOffMap,
    TouchedDanger,
}

/// The player was sent back to the spawn point
#[derive(Debug, Clone, Copy)]
pub struct RespawnEvent {
    pub reason: RespawnReason,
}

/// Enough coins collected, move to the next level
#[derive(Debug, Clone, Copy)]
pub struct LevelCompleteEvent {
    pub finished_level: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::prelude::vec2;

    #[test]
    fn test_event_queue() {
        let mut queue: EventQueue<i32> = EventQueue::new();

        queue.send(1);
        queue.send(2);
        queue.send(3);

        assert_eq!(queue.len(), 3);

        let collected: Vec<_> = queue.drain().collect();
        assert_eq!(collected, vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_events_container() {
        let mut events = Events::new();

        events.coin_collected.send(CoinCollectedEvent {
            position: vec2(64.0, 64.0),
            score: 1,
        });

        assert_eq!(events.coin_collected.len(), 1);

        events.clear_all();
        assert!(events.coin_collected.is_empty());
    }
}
