//! Follow camera
//!
//! Keeps the player centered, clamped so the view never shows area outside
//! the level bounds. The clamp works on the view's top-left corner, like
//! moving a window over the level.

use macroquad::prelude::{vec2, Camera2D, Rect, RenderTarget, Vec2};

pub struct GameCamera {
    /// World-space center of the view
    pub center: Vec2,
    /// World pixels visible (the window size; the game renders 1:1)
    pub viewport: Vec2,
}

impl GameCamera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            center: viewport / 2.0,
            viewport,
        }
    }

    /// Update every frame to relocate the camera to the player
    pub fn center_on_player(&mut self, target: Vec2, bounds: Rect) {
        let half = self.viewport / 2.0;
        let mut corner = target - half;

        // Don't let the camera travel past the level boundaries. A level
        // smaller than the viewport pins to its top-left corner.
        let max_corner = vec2(
            (bounds.w - self.viewport.x).max(0.0),
            (bounds.h - self.viewport.y).max(0.0),
        );
        corner.x = corner.x.clamp(0.0, max_corner.x);
        corner.y = corner.y.clamp(0.0, max_corner.y);

        self.center = corner + half;
    }

    /// Camera for rendering the world into a render target.
    ///
    /// Positive y zoom: render targets have a flipped row order relative to
    /// screen drawing, and rendering the y-down world "upside down" into the
    /// target cancels that out, so the target texture draws unflipped.
    pub fn to_target_camera(&self, target: &RenderTarget) -> Camera2D {
        let mut camera = Camera2D {
            target: self.center,
            zoom: vec2(2.0 / self.viewport.x, 2.0 / self.viewport.y),
            ..Default::default()
        };
        camera.render_target = Some(target.clone());
        camera
    }

    /// World-space rect currently visible
    pub fn view_rect(&self) -> Rect {
        Rect::new(
            self.center.x - self.viewport.x / 2.0,
            self.center.y - self.viewport.y / 2.0,
            self.viewport.x,
            self.viewport.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rect {
        // A 2560x960 level
        Rect::new(0.0, 0.0, 2560.0, 960.0)
    }

    #[test]
    fn test_follows_player_in_the_open() {
        let mut camera = GameCamera::new(vec2(640.0, 480.0));
        camera.center_on_player(vec2(1000.0, 500.0), bounds());
        assert_eq!(camera.center, vec2(1000.0, 500.0));
    }

    #[test]
    fn test_clamps_at_level_edges() {
        let mut camera = GameCamera::new(vec2(640.0, 480.0));

        // Near the left/top corner
        camera.center_on_player(vec2(50.0, 50.0), bounds());
        assert_eq!(camera.center, vec2(320.0, 240.0));
        assert_eq!(camera.view_rect().x, 0.0);
        assert_eq!(camera.view_rect().y, 0.0);

        // Near the right/bottom corner
        camera.center_on_player(vec2(2550.0, 950.0), bounds());
        let view = camera.view_rect();
        assert_eq!(view.x + view.w, 2560.0);
        assert_eq!(view.y + view.h, 960.0);
    }

    #[test]
    fn test_small_level_pins_to_corner() {
        let mut camera = GameCamera::new(vec2(640.0, 480.0));
        camera.center_on_player(vec2(100.0, 100.0), Rect::new(0.0, 0.0, 320.0, 240.0));
        assert_eq!(camera.view_rect().x, 0.0);
        assert_eq!(camera.view_rect().y, 0.0);
    }
}
