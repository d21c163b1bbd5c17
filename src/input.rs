use std::collections::HashSet;

use glam::Vec2;

use crate::camera::MovementInput;

/// Logical movement keys the frame loop tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Backward,
    Left,
    Right,
}

/// Input snapshot between frames: currently held movement keys plus cursor
/// and scroll deltas accumulated since the last drain.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<MoveKey>,
    look_delta: Vec2,
    scroll_delta: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&mut self, key: MoveKey) {
        self.held.insert(key);
    }

    pub fn set_key_up(&mut self, key: MoveKey) {
        self.held.remove(&key);
    }

    pub fn is_key_down(&self, key: MoveKey) -> bool {
        self.held.contains(&key)
    }

    pub fn movement(&self) -> MovementInput {
        MovementInput {
            forward: self.is_key_down(MoveKey::Forward),
            backward: self.is_key_down(MoveKey::Backward),
            left: self.is_key_down(MoveKey::Left),
            right: self.is_key_down(MoveKey::Right),
        }
    }

    pub fn push_look_delta(&mut self, delta: Vec2) {
        self.look_delta += delta;
    }

    pub fn push_scroll(&mut self, delta: f32) {
        self.scroll_delta += delta;
    }

    /// Returns and clears the accumulated cursor delta.
    pub fn take_look_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.look_delta)
    }

    /// Returns and clears the accumulated scroll delta.
    pub fn take_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_state_tracks_held_keys() {
        let mut state = InputState::new();
        state.set_key_down(MoveKey::Forward);
        state.set_key_down(MoveKey::Left);
        assert!(state.movement().forward);
        assert!(state.movement().left);
        assert!(!state.movement().backward);
        state.set_key_up(MoveKey::Forward);
        assert!(!state.movement().forward);
    }

    #[test]
    fn look_deltas_accumulate_until_drained() {
        let mut state = InputState::new();
        state.push_look_delta(Vec2::new(1.0, 2.0));
        state.push_look_delta(Vec2::new(0.5, -1.0));
        assert_eq!(state.take_look_delta(), Vec2::new(1.5, 1.0));
        assert_eq!(state.take_look_delta(), Vec2::ZERO);
    }

    #[test]
    fn scroll_deltas_accumulate_until_drained() {
        let mut state = InputState::new();
        state.push_scroll(1.0);
        state.push_scroll(-3.0);
        assert_eq!(state.take_scroll(), -2.0);
        assert_eq!(state.take_scroll(), 0.0);
    }
}
