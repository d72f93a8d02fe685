//! Input boundary
//!
//! The window's event pump (not part of this crate) forwards key presses
//! through an `InputHandler`. The update thread drains them once per tick
//! with an `InputQueue`, so intents only ever reach the simulation at a
//! tick boundary.

use crate::sim::{Heading, SimulationState, TickInput};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    A,
    D,
    W,
    S,
    R,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(Key),
    Released(Key),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
    Up,
    Down,
}

fn direction(key: Key) -> Option<Direction> {
    match key {
        Key::Left | Key::A => Some(Direction::Left),
        Key::Right | Key::D => Some(Direction::Right),
        Key::Up | Key::W => Some(Direction::Up),
        Key::Down | Key::S => Some(Direction::Down),
        Key::R | Key::Other => None,
    }
}

/// Create a connected producer/consumer pair
pub fn channel() -> (InputHandler, InputQueue) {
    let (tx, rx) = flume::unbounded();
    (
        InputHandler { tx },
        InputQueue {
            rx,
            held: Heading::default(),
            restart: false,
        },
    )
}

/// Producer side; cheap to clone, usable from any thread
#[derive(Debug, Clone)]
pub struct InputHandler {
    tx: flume::Sender<InputEvent>,
}

impl InputHandler {
    pub fn key_pressed(&self, key: Key) {
        self.send(InputEvent::Pressed(key));
    }

    pub fn key_released(&self, key: Key) {
        self.send(InputEvent::Released(key));
    }

    pub fn send(&self, event: InputEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("input dropped, game no longer listening: {event:?}");
        }
    }
}

/// Consumer side, owned by the update handler
#[derive(Debug)]
pub struct InputQueue {
    rx: flume::Receiver<InputEvent>,
    held: Heading,
    restart: bool,
}

impl InputQueue {
    /// Apply everything queued since the last tick and return this tick's input.
    /// The restart intent is one-shot; held directions persist.
    pub fn drain(&mut self) -> TickInput {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                InputEvent::Pressed(Key::R) => self.restart = true,
                InputEvent::Pressed(key) => self.set(key, true),
                InputEvent::Released(key) => self.set(key, false),
            }
        }

        TickInput {
            heading: self.held,
            restart: std::mem::take(&mut self.restart),
        }
    }

    fn set(&mut self, key: Key, down: bool) {
        match direction(key) {
            Some(Direction::Left) => self.held.left = down,
            Some(Direction::Right) => self.held.right = down,
            Some(Direction::Up) => self.held.up = down,
            Some(Direction::Down) => self.held.down = down,
            None => {}
        }
    }

    /// Forget held keys (new round)
    pub fn reset(&mut self) {
        self.held = Heading::default();
        self.restart = false;
    }
}

/// Simple dodging policy for unattended runs.
///
/// Looks at objects above the player that overlap its column (with a
/// margin) and steers horizontally away from the closest one. Requests a
/// restart once the round is over.
#[derive(Debug)]
pub struct Autopilot {
    input: InputHandler,
    held: Option<Key>,
    margin: f32,
}

impl Autopilot {
    pub fn new(input: InputHandler) -> Self {
        Self {
            input,
            held: None,
            margin: 24.0,
        }
    }

    /// Decide from the current world and send the resulting key events
    pub fn steer(&mut self, state: &SimulationState) {
        if state.is_game_over() {
            self.hold(None);
            self.input.key_pressed(Key::R);
            self.input.key_released(Key::R);
            return;
        }

        let wanted = self.choose(state);
        self.hold(wanted);
    }

    fn choose(&self, state: &SimulationState) -> Option<Key> {
        let player = &state.player;
        let p_min = player.pos();
        let p_max = p_min + player.size;
        let p_center = p_min + player.size / 2.0;

        let threat = state
            .objects
            .values()
            .filter(|o| {
                let o_min = o.pos();
                let o_max = o_min + o.size;
                o_max.y <= p_max.y
                    && o_min.x < p_max.x + self.margin
                    && o_max.x > p_min.x - self.margin
            })
            .max_by(|a, b| a.pos().y.total_cmp(&b.pos().y))?;

        let t_center = threat.pos() + threat.size / 2.0;
        let go_left = if p_min.x < player.size.x {
            false
        } else if p_max.x > state.arena.x - player.size.x {
            true
        } else {
            t_center.x >= p_center.x
        };

        Some(if go_left { Key::Left } else { Key::Right })
    }

    fn hold(&mut self, key: Option<Key>) {
        if self.held == key {
            return;
        }
        if let Some(old) = self.held.take() {
            self.input.key_released(old);
        }
        if let Some(new) = key {
            self.input.key_pressed(new);
        }
        self.held = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ColorTag, Entity};
    use glam::Vec2;

    #[test]
    fn test_held_keys_persist_across_ticks() {
        let (input, mut queue) = channel();
        input.key_pressed(Key::A);
        assert!(queue.drain().heading.left);
        assert!(queue.drain().heading.left);
        input.key_released(Key::Left);
        assert!(!queue.drain().heading.left);
    }

    #[test]
    fn test_press_and_release_in_one_tick() {
        let (input, mut queue) = channel();
        input.key_pressed(Key::Down);
        input.key_pressed(Key::Left);
        input.key_released(Key::Down);
        let tick = queue.drain();
        assert!(tick.heading.left);
        assert!(!tick.heading.down);
    }

    #[test]
    fn test_restart_is_one_shot() {
        let (input, mut queue) = channel();
        input.key_pressed(Key::R);
        assert!(queue.drain().restart);
        assert!(!queue.drain().restart);
    }

    #[test]
    fn test_wasd_and_arrows_map_alike() {
        let (input, mut queue) = channel();
        input.key_pressed(Key::W);
        input.key_pressed(Key::Right);
        input.key_pressed(Key::Other);
        let tick = queue.drain();
        assert!(tick.heading.up && tick.heading.right);
        assert!(!tick.heading.left && !tick.heading.down);
    }

    #[test]
    fn test_send_after_queue_dropped_is_harmless() {
        let (input, queue) = channel();
        drop(queue);
        input.key_pressed(Key::Left);
    }

    #[test]
    fn test_autopilot_steers_away() {
        let (input, mut queue) = channel();
        let mut pilot = Autopilot::new(input);
        let mut state = SimulationState::new(Vec2::new(800.0, 600.0), 1);

        // Object slightly right of the player's centre, above it
        let mut obj = Entity::falling_object(state.player.pos().x + 10.0, ColorTag::Red);
        obj.pose.current.y = 100.0;
        state.insert_object(obj);

        pilot.steer(&state);
        let tick = queue.drain();
        assert!(tick.heading.left);
        assert!(!tick.heading.right);
    }

    #[test]
    fn test_autopilot_restarts_when_over() {
        let (input, mut queue) = channel();
        let mut pilot = Autopilot::new(input);
        let mut state = SimulationState::new(Vec2::new(800.0, 600.0), 1);
        state.set_game_over();

        pilot.steer(&state);
        assert!(queue.drain().restart);
    }
}
