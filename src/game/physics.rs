//! Platformer physics
//!
//! Axis-separated AABB collision of a single body against the level's tile
//! grid and its moving platforms. Gravity accumulates into the body's
//! vertical velocity each step and resets on ground or ceiling contact;
//! a body overlapping a ladder is exempt from gravity and moves only as
//! directed by input.
//!
//! Velocities are in pixels per frame at a 60 Hz reference; the step scales
//! displacement by `dt * 60`, so tuning constants read the same at any
//! actual frame rate.

use macroquad::prelude::{vec2, Rect, Vec2};
use crate::config::PhysicsConfig;
use crate::map::{Level, MovingPlatform};

/// Frame rate the per-frame velocity units refer to
pub const REFERENCE_FPS: f32 = 60.0;

/// A rectangular physics body, positioned by its center
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub position: Vec2,
    /// px/frame
    pub velocity: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x - self.size.x / 2.0,
            self.position.y - self.size.y / 2.0,
            self.size.x,
            self.size.y,
        )
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y / 2.0
    }
}

/// Result of one physics step
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicsStep {
    /// Is the body resting on ground (tile or platform)?
    pub grounded: bool,
    /// Did horizontal movement hit a wall?
    pub hit_wall: bool,
    /// Did upward movement hit a ceiling?
    pub hit_ceiling: bool,
    /// Is the body overlapping a ladder?
    pub on_ladder: bool,
}

/// Strict AABB overlap: touching edges do not collide
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

fn offset(rect: Rect, by: Vec2) -> Rect {
    Rect::new(rect.x + by.x, rect.y + by.y, rect.w, rect.h)
}

/// Solid rects (tiles + platforms) strictly overlapping `rect`
fn obstacles_hit(level: &Level, rect: Rect) -> Vec<Rect> {
    let mut hits = level.solids.overlapping_tiles(rect);
    for platform in &level.moving_platforms {
        if overlaps(rect, platform.rect) {
            hits.push(platform.rect);
        }
    }
    hits
}

/// The platformer physics engine: owns tuning, not state. Body and level
/// are passed in each step so the rest of the game keeps ownership.
#[derive(Debug, Clone, Copy)]
pub struct PlatformerPhysics {
    pub config: PhysicsConfig,
}

impl PlatformerPhysics {
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    /// Is there ground within `jump_probe` pixels below the feet?
    pub fn can_jump(&self, body: &Body, level: &Level) -> bool {
        let probe = offset(body.rect(), vec2(0.0, self.config.jump_probe));
        !obstacles_hit(level, probe).is_empty()
    }

    pub fn is_on_ladder(&self, body: &Body, level: &Level) -> bool {
        level.ladders.overlaps(body.rect())
    }

    /// Advance moving platforms and the body by one step.
    pub fn update(&self, body: &mut Body, level: &mut Level, dt: f32) -> PhysicsStep {
        let frames = dt * REFERENCE_FPS;
        let mut step = PhysicsStep::default();

        let deltas = step_platforms(&mut level.moving_platforms, frames);

        // Ride along with a platform the body is standing on, before the
        // body's own movement
        if let Some(index) = self.standing_platform(body, level) {
            body.position += deltas[index];
        }

        step.on_ladder = self.is_on_ladder(body, level);
        if !step.on_ladder {
            body.velocity.y =
                (body.velocity.y + self.config.gravity * frames).min(self.config.terminal_velocity);
        }

        // Horizontal, then vertical
        let dx = body.velocity.x * frames;
        if dx != 0.0 {
            let proposed = offset(body.rect(), vec2(dx, 0.0));
            let hits = obstacles_hit(level, proposed);
            if hits.is_empty() {
                body.position.x += dx;
            } else {
                step.hit_wall = true;
                let half = body.size.x / 2.0;
                if dx > 0.0 {
                    let edge = hits.iter().map(|r| r.x).fold(f32::INFINITY, f32::min);
                    body.position.x = edge - half;
                } else {
                    let edge = hits
                        .iter()
                        .map(|r| r.x + r.w)
                        .fold(f32::NEG_INFINITY, f32::max);
                    body.position.x = edge + half;
                }
            }
        }

        let dy = body.velocity.y * frames;
        if dy != 0.0 {
            let proposed = offset(body.rect(), vec2(0.0, dy));
            let hits = obstacles_hit(level, proposed);
            if hits.is_empty() {
                body.position.y += dy;
            } else {
                let half = body.size.y / 2.0;
                if dy > 0.0 {
                    let edge = hits.iter().map(|r| r.y).fold(f32::INFINITY, f32::min);
                    body.position.y = edge - half;
                    step.grounded = true;
                } else {
                    let edge = hits
                        .iter()
                        .map(|r| r.y + r.h)
                        .fold(f32::NEG_INFINITY, f32::max);
                    body.position.y = edge + half;
                    step.hit_ceiling = true;
                }
                body.velocity.y = 0.0;
            }
        } else if !obstacles_hit(level, offset(body.rect(), vec2(0.0, 1.0))).is_empty() {
            // Not moving vertically but resting on something
            step.grounded = true;
        }

        // A platform that rose into the body lifts it
        for platform in &level.moving_platforms {
            if overlaps(body.rect(), platform.rect) && platform.velocity.y < 0.0 {
                body.position.y = platform.rect.y - body.size.y / 2.0;
                body.velocity.y = 0.0;
                step.grounded = true;
            }
        }

        step
    }

    /// Index of the moving platform the body is standing on, if any
    fn standing_platform(&self, body: &Body, level: &Level) -> Option<usize> {
        let probe = offset(body.rect(), vec2(0.0, 2.0));
        level.moving_platforms.iter().position(|platform| {
            overlaps(probe, platform.rect) && body.bottom() <= platform.rect.y + 2.0
        })
    }
}

/// Move platforms by their velocity, reversing at authored boundaries.
/// Returns each platform's displacement this step.
fn step_platforms(platforms: &mut [MovingPlatform], frames: f32) -> Vec<Vec2> {
    platforms
        .iter_mut()
        .map(|platform| {
            let delta = platform.velocity * frames;
            platform.rect.x += delta.x;
            platform.rect.y += delta.y;

            if let Some(left) = platform.boundary_left {
                if platform.rect.x <= left && platform.velocity.x < 0.0 {
                    platform.velocity.x = -platform.velocity.x;
                }
            }
            if let Some(right) = platform.boundary_right {
                if platform.rect.x + platform.rect.w >= right && platform.velocity.x > 0.0 {
                    platform.velocity.x = -platform.velocity.x;
                }
            }
            if let Some(top) = platform.boundary_top {
                if platform.rect.y <= top && platform.velocity.y < 0.0 {
                    platform.velocity.y = -platform.velocity.y;
                }
            }
            if let Some(bottom) = platform.boundary_bottom {
                if platform.rect.y + platform.rect.h >= bottom && platform.velocity.y > 0.0 {
                    platform.velocity.y = -platform.velocity.y;
                }
            }

            delta
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{builtin_level, CollisionGrid, Level, MovingPlatform};
    use crate::config::TileConfig;

    const DT: f32 = 1.0 / REFERENCE_FPS;

    /// An open 10x10 level of 64px tiles with a solid bottom row
    fn floor_level() -> Level {
        let mut level = builtin_level(&TileConfig::default());
        level.solids = CollisionGrid::empty(10, 10, 64.0);
        level.ladders = CollisionGrid::empty(10, 10, 64.0);
        level.dangers = CollisionGrid::empty(10, 10, 64.0);
        level.width = 10;
        level.height = 10;
        level.coins.clear();
        level.moving_platforms.clear();
        for x in 0..10 {
            level.solids.set(x, 9, true);
        }
        level
    }

    fn physics() -> PlatformerPhysics {
        PlatformerPhysics::new(PhysicsConfig::default())
    }

    #[test]
    fn test_gravity_accumulates_to_terminal() {
        // No floor: free fall all the way down
        let mut level = floor_level();
        level.solids = CollisionGrid::empty(10, 10, 64.0);
        let physics = physics();
        let mut body = Body::new(vec2(320.0, 100.0), vec2(32.0, 48.0));

        physics.update(&mut body, &mut level, DT);
        assert_eq!(body.velocity.y, 1.0);
        physics.update(&mut body, &mut level, DT);
        assert_eq!(body.velocity.y, 2.0);

        for _ in 0..100 {
            physics.update(&mut body, &mut level, DT);
        }
        assert_eq!(body.velocity.y, PhysicsConfig::default().terminal_velocity);
    }

    #[test]
    fn test_lands_flush_on_floor() {
        let mut level = floor_level();
        let physics = physics();
        // Floor top is at y = 9 * 64 = 576
        let mut body = Body::new(vec2(320.0, 500.0), vec2(32.0, 48.0));

        let mut grounded = false;
        for _ in 0..120 {
            let step = physics.update(&mut body, &mut level, DT);
            if step.grounded {
                grounded = true;
                break;
            }
        }
        assert!(grounded);
        assert_eq!(body.bottom(), 576.0);
        assert_eq!(body.velocity.y, 0.0);

        // Staying put keeps reporting grounded
        let step = physics.update(&mut body, &mut level, DT);
        assert!(step.grounded);
        assert_eq!(body.bottom(), 576.0);
    }

    #[test]
    fn test_wall_stops_horizontal_movement() {
        let mut level = floor_level();
        // Wall column at tile x=6, rising from the floor
        for y in 6..9 {
            level.solids.set(6, y, true);
        }
        let physics = physics();
        // Standing on the floor just left of the wall
        let mut body = Body::new(vec2(340.0, 576.0 - 24.0), vec2(32.0, 48.0));
        body.velocity.x = 5.0;

        let mut hit = false;
        for _ in 0..30 {
            let step = physics.update(&mut body, &mut level, DT);
            body.velocity.x = 5.0;
            if step.hit_wall {
                hit = true;
            }
        }
        assert!(hit);
        // Right edge flush against the wall at x = 6 * 64 = 384
        assert_eq!(body.position.x + 16.0, 384.0);
    }

    #[test]
    fn test_ceiling_stops_jump() {
        let mut level = floor_level();
        // Low ceiling directly above
        for x in 0..10 {
            level.solids.set(x, 7, true);
        }
        let physics = physics();
        let mut body = Body::new(vec2(320.0, 576.0 - 24.0), vec2(32.0, 48.0));
        body.velocity.y = -20.0;

        let mut hit = false;
        for _ in 0..10 {
            let step = physics.update(&mut body, &mut level, DT);
            if step.hit_ceiling {
                hit = true;
                break;
            }
        }
        assert!(hit);
        assert_eq!(body.velocity.y, 0.0);
        // Head flush against the ceiling bottom at y = 8 * 64 = 512
        assert_eq!(body.position.y - 24.0, 512.0);
    }

    #[test]
    fn test_ladder_suspends_gravity() {
        let mut level = floor_level();
        level.ladders.set(5, 5, true);
        let physics = physics();
        // Inside the ladder tile (320..384 x 320..384)
        let mut body = Body::new(vec2(352.0, 352.0), vec2(32.0, 48.0));

        let step = physics.update(&mut body, &mut level, DT);
        assert!(step.on_ladder);
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(body.position.y, 352.0);
    }

    #[test]
    fn test_can_jump_probe() {
        let level = floor_level();
        let physics = physics();

        let mut body = Body::new(vec2(320.0, 576.0 - 24.0), vec2(32.0, 48.0));
        assert!(physics.can_jump(&body, &level));

        body.position.y = 300.0; // mid-air
        assert!(!physics.can_jump(&body, &level));

        // Within the probe distance but not touching still counts
        body.position.y = 576.0 - 24.0 - 8.0;
        assert!(physics.can_jump(&body, &level));
    }

    #[test]
    fn test_platform_reverses_at_boundary() {
        let mut platforms = vec![MovingPlatform {
            rect: Rect::new(100.0, 200.0, 64.0, 16.0),
            gid: None,
            velocity: vec2(2.0, 0.0),
            boundary_left: Some(60.0),
            boundary_right: Some(170.0),
            boundary_top: None,
            boundary_bottom: None,
        }];

        for _ in 0..4 {
            step_platforms(&mut platforms, 1.0);
        }
        // 100 → 108, crossing right boundary (108 + 64 >= 170) flips direction
        assert_eq!(platforms[0].velocity.x, -2.0);

        for _ in 0..30 {
            step_platforms(&mut platforms, 1.0);
        }
        // Bounced off the left boundary and heading right again
        assert_eq!(platforms[0].velocity.x, 2.0);
        assert!(platforms[0].rect.x >= 60.0);
    }

    #[test]
    fn test_platform_carries_rider() {
        let mut level = floor_level();
        level.moving_platforms.push(MovingPlatform {
            rect: Rect::new(300.0, 400.0, 64.0, 16.0),
            gid: None,
            velocity: vec2(2.0, 0.0),
            boundary_left: Some(100.0),
            boundary_right: Some(600.0),
            boundary_top: None,
            boundary_bottom: None,
        });
        let physics = physics();
        // Standing on the platform
        let mut body = Body::new(vec2(332.0, 400.0 - 24.0), vec2(32.0, 48.0));

        let before_x = body.position.x;
        let step = physics.update(&mut body, &mut level, DT);
        assert!(step.grounded);
        // Carried along by the platform's 2 px/frame
        assert_eq!(body.position.x, before_x + 2.0);
        // Still standing flush on it
        assert_eq!(body.bottom(), level.moving_platforms[0].rect.y);
    }
}
