//! Fixed timestep simulation tick
//!
//! Advances the world by exactly one tick. Only the update thread calls
//! this, so ticks never overlap.

use super::collision::player_hit;
use super::entity::{Heading, fall, is_off_screen, keep_within_bounds, move_player};
use super::state::{GameEvent, SimulationState};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held movement keys
    pub heading: Heading,
    /// One-shot restart intent
    pub restart: bool,
}

/// Advance the world by one fixed timestep
pub fn tick(state: &mut SimulationState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.restart {
        state.request_restart();
    }
    if state.is_restart_requested() {
        state.reset_round();
        events.push(GameEvent::Restarted);
        return events;
    }

    // Frozen until restart
    if state.is_game_over() {
        return events;
    }

    state.time_ticks += 1;

    // Snapshot before anything moves
    state.settle_all();

    move_player(&mut state.player, input.heading, dt);
    keep_within_bounds(&mut state.player, state.arena);

    if let Some(obj) = state.spawner.update(dt, state.arena.x) {
        state.insert_object(obj);
    }

    for obj in state.objects.values_mut() {
        fall(obj, dt);
    }

    let height = state.arena.y;
    let before = state.objects.len();
    state.objects.retain(|_, obj| !is_off_screen(obj, height));
    let passed = (before - state.objects.len()) as u32;
    if passed > 0 {
        state.add_score(passed);
        events.push(GameEvent::Scored { score: state.score });
    }

    if let Some(object) = player_hit(&state.player, &state.objects) {
        state.set_game_over();
        events.push(GameEvent::Collision {
            object,
            final_score: state.score,
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::entity::{ColorTag, Entity, player_start};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn state(seed: u64) -> SimulationState {
        SimulationState::new(Vec2::new(800.0, 600.0), seed)
    }

    fn hold(left: bool, right: bool, up: bool, down: bool) -> TickInput {
        TickInput {
            heading: Heading {
                left,
                right,
                up,
                down,
            },
            restart: false,
        }
    }

    #[test]
    fn test_previous_is_start_of_tick() {
        let mut state = state(1);
        tick(&mut state, &hold(false, true, false, true), DT);
        assert_eq!(state.player.pose.previous, player_start());
        let moved = PLAYER_SPEED * DT;
        assert!((state.player.pos().x - (PLAYER_START_X + moved)).abs() < 1e-4);
        assert!((state.player.pos().y - (PLAYER_START_Y + moved)).abs() < 1e-4);

        // Standing still: previous catches up, no drift
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.player.pose.previous, state.player.pose.current);
    }

    #[test]
    fn test_objects_fall_and_score() {
        let mut state = state(1);
        let mut obj = Entity::falling_object(700.0, ColorTag::Red);
        obj.pose.current.y = 600.0 - 1.0;
        obj.pose.previous = obj.pose.current;
        state.insert_object(obj);

        let events = tick(&mut state, &TickInput::default(), DT);

        assert!(state.objects.is_empty());
        assert_eq!(state.score, 1);
        assert_eq!(events, vec![GameEvent::Scored { score: 1 }]);
    }

    #[test]
    fn test_collision_ends_round_and_freezes() {
        let mut state = state(1);
        let mut obj = Entity::falling_object(PLAYER_START_X, ColorTag::Red);
        obj.pose.current.y = PLAYER_START_Y - OBJECT_HEIGHT + 1.0;
        let id = state.insert_object(obj);

        let events = tick(&mut state, &TickInput::default(), DT);
        assert!(state.is_game_over());
        assert_eq!(
            events,
            vec![GameEvent::Collision {
                object: id,
                final_score: 0
            }]
        );

        // Nothing moves after game over
        let frozen = state.objects[&id].pos();
        let events = tick(&mut state, &hold(true, false, false, false), DT);
        assert!(events.is_empty());
        assert!(state.is_game_over());
        assert_eq!(state.objects[&id].pos(), frozen);
    }

    #[test]
    fn test_restart_ignored_mid_round() {
        let mut state = state(1);
        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        let events = tick(&mut state, &input, DT);
        assert!(!events.contains(&GameEvent::Restarted));
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut state = state(1);
        state.add_score(12);
        state.set_game_over();
        state.insert_object(Entity::falling_object(10.0, ColorTag::Cyan));

        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        let events = tick(&mut state, &input, DT);

        assert_eq!(events, vec![GameEvent::Restarted]);
        assert!(!state.is_game_over());
        assert_eq!(state.score, 0);
        assert!(state.objects.is_empty());
    }

    #[test]
    fn test_score_and_game_over_monotone() {
        let mut state = state(42);
        let mut last_score = 0;
        let mut was_over = false;
        for i in 0..(60 * 30) {
            let input = hold(i % 90 < 45, i % 90 >= 45, false, false);
            tick(&mut state, &input, DT);
            assert!(state.score >= last_score);
            if was_over {
                assert!(state.is_game_over());
            }
            last_score = state.score;
            was_over = state.is_game_over();
        }
    }

    #[test]
    fn test_determinism() {
        // Same seed and inputs produce identical worlds tick by tick
        let mut state1 = state(99999);
        let mut state2 = state(99999);

        let inputs = [
            hold(true, false, false, false),
            hold(false, true, true, false),
            TickInput::default(),
            hold(false, false, false, true),
        ];

        for i in 0..(60 * 20) {
            let input = inputs[(i / 30) % inputs.len()];
            let e1 = tick(&mut state1, &input, DT);
            let e2 = tick(&mut state2, &input, DT);
            assert_eq!(e1, e2);
            assert_eq!(state1.player, state2.player);
            assert_eq!(state1.objects, state2.objects);
            assert_eq!(state1.score, state2.score);
            assert_eq!(state1.is_game_over(), state2.is_game_over());
        }
    }
}
