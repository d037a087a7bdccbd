//! Player character
//!
//! Plain data plus two small systems: mapping held keys to desired
//! velocity (re-triggering jumps only after the key is released), and the
//! animation decision tree picking which texture frame to show from the
//! velocity sign and the ladder/climb flags.
//!
//! Textures face right; left-facing frames use the engine's horizontal
//! flip at draw time rather than mirrored texture copies.

use macroquad::prelude::{vec2, Vec2};
use crate::config::PlayerConfig;
use super::event::{Events, JumpEvent};
use super::physics::Body;

/// Unscaled sprite dimensions of the character art, px
pub const SPRITE_WIDTH: f32 = 96.0;
pub const SPRITE_HEIGHT: f32 = 128.0;

/// Frames in the walk (and climb counter) cycle
pub const WALK_FRAMES: usize = 8;

/// Flipbook rate for walk/climb cycles
const ANIMATION_FPS: f32 = 15.0;

/// Which way the character is facing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Right,
    Left,
}

/// Which texture the sprite should display this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationFrame {
    Idle,
    Jump,
    Fall,
    Walk(usize),
    Climb(usize),
}

/// The held-key state driving movement, sampled once per frame
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

pub struct PlayerCharacter {
    pub body: Body,
    pub facing: Facing,
    /// Is the sprite in the climbing animation?
    pub climbing: bool,
    /// Is the player on a ladder (and not standing on its top)?
    pub is_on_ladder: bool,
    /// Set when a jump fires; cleared when the jump key is released,
    /// so holding the key doesn't bounce
    pub jump_needs_reset: bool,
    cur_frame: usize,
    frame_timer: f32,
    animation: AnimationFrame,
}

impl PlayerCharacter {
    pub fn new(config: &PlayerConfig, spawn: Vec2) -> Self {
        Self {
            body: Body::new(
                spawn,
                vec2(SPRITE_WIDTH * config.scaling, SPRITE_HEIGHT * config.scaling),
            ),
            facing: Facing::Right,
            climbing: false,
            is_on_ladder: false,
            jump_needs_reset: false,
            cur_frame: 0,
            frame_timer: 0.0,
            animation: AnimationFrame::Idle,
        }
    }

    pub fn respawn(&mut self, spawn: Vec2) {
        self.body.position = spawn;
        self.body.velocity = Vec2::ZERO;
    }

    pub fn animation(&self) -> AnimationFrame {
        self.animation
    }

    pub fn flip_x(&self) -> bool {
        self.facing == Facing::Left
    }

    /// Map held keys to desired velocity. Called every frame; the physics
    /// step owns gravity, this owns intent.
    pub fn process_keychange(
        &mut self,
        intent: MoveIntent,
        on_ladder: bool,
        can_jump: bool,
        config: &PlayerConfig,
        events: &mut Events,
    ) {
        if !intent.up {
            self.jump_needs_reset = false;
        }

        // Up/down: climb on ladders, jump from the ground
        if intent.up && !intent.down {
            if on_ladder {
                self.body.velocity.y = -config.movement_speed;
            } else if can_jump && !self.jump_needs_reset {
                self.body.velocity.y = -config.jump_speed;
                self.jump_needs_reset = true;
                events.jumped.send(JumpEvent {
                    position: self.body.position,
                });
            }
        } else if intent.down && !intent.up {
            if on_ladder {
                self.body.velocity.y = config.movement_speed;
            }
        }

        // On a ladder with no (or contradictory) vertical input, hold still
        if on_ladder && (intent.up == intent.down) {
            self.body.velocity.y = 0.0;
        }

        // Left/right
        if intent.right && !intent.left {
            self.body.velocity.x = config.movement_speed;
        } else if intent.left && !intent.right {
            self.body.velocity.x = -config.movement_speed;
        } else {
            self.body.velocity.x = 0.0;
        }
    }

    /// Pick the texture frame from the current movement state
    pub fn update_animation(&mut self, dt: f32) {
        let velocity = self.body.velocity;

        // Figure out if we need to flip face left or right
        if velocity.x < 0.0 && self.facing == Facing::Right {
            self.facing = Facing::Left;
        } else if velocity.x > 0.0 && self.facing == Facing::Left {
            self.facing = Facing::Right;
        }

        // Climbing animation
        if self.is_on_ladder {
            self.climbing = true;
        }
        if !self.is_on_ladder && self.climbing {
            self.climbing = false;
        }
        if self.climbing {
            if velocity.y.abs() > 1.0 {
                self.advance_frame(dt);
            }
            self.animation = AnimationFrame::Climb(self.cur_frame / 4);
            return;
        }

        // Jumping animation (rising), falling otherwise
        if velocity.y < 0.0 {
            self.animation = AnimationFrame::Jump;
            return;
        } else if velocity.y > 0.0 {
            self.animation = AnimationFrame::Fall;
            return;
        }

        // Idle animation
        if velocity.x == 0.0 {
            self.animation = AnimationFrame::Idle;
            return;
        }

        // Walking animation
        self.advance_frame(dt);
        self.animation = AnimationFrame::Walk(self.cur_frame);
    }

    fn advance_frame(&mut self, dt: f32) {
        self.frame_timer += dt;
        let frame_time = 1.0 / ANIMATION_FPS;
        while self.frame_timer >= frame_time {
            self.frame_timer -= frame_time;
            self.cur_frame = (self.cur_frame + 1) % WALK_FRAMES;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerCharacter {
        PlayerCharacter::new(&PlayerConfig::default(), vec2(64.0, 128.0))
    }

    fn config() -> PlayerConfig {
        PlayerConfig::default()
    }

    #[test]
    fn test_horizontal_intent() {
        let mut player = player();
        let mut events = Events::new();

        let right = MoveIntent { right: true, ..Default::default() };
        player.process_keychange(right, false, false, &config(), &mut events);
        assert_eq!(player.body.velocity.x, 5.0);

        let left = MoveIntent { left: true, ..Default::default() };
        player.process_keychange(left, false, false, &config(), &mut events);
        assert_eq!(player.body.velocity.x, -5.0);

        // Both directions cancel out
        let both = MoveIntent { left: true, right: true, ..Default::default() };
        player.process_keychange(both, false, false, &config(), &mut events);
        assert_eq!(player.body.velocity.x, 0.0);
    }

    #[test]
    fn test_jump_fires_once_per_press() {
        let mut player = player();
        let mut events = Events::new();
        let up = MoveIntent { up: true, ..Default::default() };

        player.process_keychange(up, false, true, &config(), &mut events);
        assert_eq!(player.body.velocity.y, -20.0);
        assert!(player.jump_needs_reset);
        assert_eq!(events.jumped.len(), 1);

        // Landed, key still held: no second jump
        player.body.velocity.y = 0.0;
        player.process_keychange(up, false, true, &config(), &mut events);
        assert_eq!(player.body.velocity.y, 0.0);
        assert_eq!(events.jumped.len(), 1);

        // Release, press again
        player.process_keychange(MoveIntent::default(), false, true, &config(), &mut events);
        assert!(!player.jump_needs_reset);
        player.process_keychange(up, false, true, &config(), &mut events);
        assert_eq!(player.body.velocity.y, -20.0);
        assert_eq!(events.jumped.len(), 2);
    }

    #[test]
    fn test_no_jump_in_midair() {
        let mut player = player();
        let mut events = Events::new();
        let up = MoveIntent { up: true, ..Default::default() };

        player.process_keychange(up, false, false, &config(), &mut events);
        assert_eq!(player.body.velocity.y, 0.0);
        assert!(events.jumped.is_empty());
    }

    #[test]
    fn test_ladder_climbing() {
        let mut player = player();
        let mut events = Events::new();

        let up = MoveIntent { up: true, ..Default::default() };
        player.process_keychange(up, true, false, &config(), &mut events);
        assert_eq!(player.body.velocity.y, -5.0);

        let down = MoveIntent { down: true, ..Default::default() };
        player.process_keychange(down, true, false, &config(), &mut events);
        assert_eq!(player.body.velocity.y, 5.0);

        // No vertical input on a ladder holds still
        player.process_keychange(MoveIntent::default(), true, false, &config(), &mut events);
        assert_eq!(player.body.velocity.y, 0.0);

        // Contradictory input too
        let both = MoveIntent { up: true, down: true, ..Default::default() };
        player.process_keychange(both, true, false, &config(), &mut events);
        assert_eq!(player.body.velocity.y, 0.0);
        // And no jump event came out of any of that
        assert!(events.jumped.is_empty());
    }

    #[test]
    fn test_facing_follows_velocity() {
        let mut player = player();
        assert_eq!(player.facing, Facing::Right);

        player.body.velocity.x = -5.0;
        player.update_animation(1.0 / 60.0);
        assert_eq!(player.facing, Facing::Left);
        assert!(player.flip_x());

        player.body.velocity.x = 5.0;
        player.update_animation(1.0 / 60.0);
        assert_eq!(player.facing, Facing::Right);

        // Standing still keeps the last facing
        player.body.velocity.x = 0.0;
        player.update_animation(1.0 / 60.0);
        assert_eq!(player.facing, Facing::Right);
    }

    #[test]
    fn test_animation_decision_tree() {
        let mut player = player();

        // Rising
        player.body.velocity.y = -10.0;
        player.update_animation(1.0 / 60.0);
        assert_eq!(player.animation(), AnimationFrame::Jump);

        // Falling
        player.body.velocity.y = 10.0;
        player.update_animation(1.0 / 60.0);
        assert_eq!(player.animation(), AnimationFrame::Fall);

        // Standing
        player.body.velocity = vec2(0.0, 0.0);
        player.update_animation(1.0 / 60.0);
        assert_eq!(player.animation(), AnimationFrame::Idle);

        // Walking
        player.body.velocity.x = 5.0;
        player.update_animation(1.0 / 60.0);
        assert!(matches!(player.animation(), AnimationFrame::Walk(_)));
    }

    #[test]
    fn test_walk_cycle_advances_and_wraps() {
        let mut player = player();
        player.body.velocity.x = 5.0;

        let mut seen = std::collections::HashSet::new();
        // Two seconds of walking covers the whole cycle
        for _ in 0..120 {
            player.update_animation(1.0 / 60.0);
            if let AnimationFrame::Walk(frame) = player.animation() {
                assert!(frame < WALK_FRAMES);
                seen.insert(frame);
            }
        }
        assert_eq!(seen.len(), WALK_FRAMES);
    }

    #[test]
    fn test_climb_animation() {
        let mut player = player();
        player.is_on_ladder = true;

        // Hanging still on the ladder: climb pose, frame frozen
        player.body.velocity.y = 0.0;
        player.update_animation(1.0 / 60.0);
        assert_eq!(player.animation(), AnimationFrame::Climb(0));
        assert!(player.climbing);

        // Climbing up animates between the two climb textures
        player.body.velocity.y = -5.0;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..120 {
            player.update_animation(1.0 / 60.0);
            if let AnimationFrame::Climb(frame) = player.animation() {
                assert!(frame < 2);
                seen.insert(frame);
            }
        }
        assert_eq!(seen.len(), 2);

        // Climbing overrides the jump/fall choice while on the ladder
        player.body.velocity.y = -5.0;
        player.update_animation(1.0 / 60.0);
        assert!(matches!(player.animation(), AnimationFrame::Climb(_)));

        // Off the ladder the flag clears
        player.is_on_ladder = false;
        player.update_animation(1.0 / 60.0);
        assert!(!player.climbing);
        assert_eq!(player.animation(), AnimationFrame::Jump);
    }
}
