//! Horizontal follow camera
//!
//! Keeps the player centered, never scrolls back left, and stops at the
//! level's edges.

use serde::{Deserialize, Serialize};

use crate::consts::NATIVE_WIDTH;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Left edge of the viewport (world pixels)
    pub x: f32,
    /// Furthest left edge reached; the one-way ratchet
    pub max_x: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the player's x, ratcheting forward only
    pub fn follow(&mut self, player_x: f32, level_width: f32) {
        let max_scroll = (level_width - NATIVE_WIDTH).max(0.0);
        let ideal = (player_x - NATIVE_WIDTH / 2.0).clamp(0.0, max_scroll);
        if ideal > self.max_x {
            self.max_x = ideal;
        }
        self.x = self.max_x;
    }

    /// Place the viewport at `x`, resetting the ratchet (warps, restarts)
    pub fn jump_to(&mut self, x: f32, level_width: f32) {
        let max_scroll = (level_width - NATIVE_WIDTH).max(0.0);
        self.x = x.clamp(0.0, max_scroll);
        self.max_x = self.x;
    }

    /// World x to viewport x
    pub fn to_screen_x(&self, world_x: f32) -> f32 {
        world_x - self.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_centers_and_ratchets() {
        let mut camera = Camera::new();
        camera.follow(100.0, 1024.0);
        assert_eq!(camera.x, 0.0);

        camera.follow(300.0, 1024.0);
        assert_eq!(camera.x, 172.0);

        // Walking back never scrolls left
        camera.follow(200.0, 1024.0);
        assert_eq!(camera.x, 172.0);
        assert_eq!(camera.to_screen_x(200.0), 28.0);
    }

    #[test]
    fn test_follow_stops_at_level_end() {
        let mut camera = Camera::new();
        camera.follow(2000.0, 512.0);
        assert_eq!(camera.x, 256.0);

        let mut narrow = Camera::new();
        narrow.follow(100.0, 128.0);
        assert_eq!(narrow.x, 0.0);
    }

    #[test]
    fn test_jump_to_resets_ratchet() {
        let mut camera = Camera::new();
        camera.follow(500.0, 1024.0);
        camera.jump_to(0.0, 1024.0);
        assert_eq!(camera.max_x, 0.0);
        camera.follow(200.0, 1024.0);
        assert_eq!(camera.x, 72.0);
    }
}
