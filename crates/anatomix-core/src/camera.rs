//! Camera module for view projection and orbiting.

use crate::math::Ray;
use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Default vertical field of view in degrees.
pub const DEFAULT_FOV_Y_DEGREES: f32 = 60.0;

/// Camera holds the view transform used to turn screen points into world rays.
///
/// Screen coordinates have their origin at the top-left of the viewport with
/// y growing downwards. The camera looks down its local -Z axis; "depth" is
/// the distance from the camera measured along its forward vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// World-space eye position.
    pub position: Vec3,
    /// World-space orientation.
    pub rotation: Quat,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Viewport size in screen pixels.
    pub viewport: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            rotation: Quat::IDENTITY,
            fov_y_degrees: DEFAULT_FOV_Y_DEGREES,
            viewport: Vec2::new(1280.0, 800.0),
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera at `distance` on the +Z axis looking at the origin.
    pub fn looking_at_origin(distance: f32, fov_y_degrees: f32, viewport: Vec2) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            rotation: Quat::IDENTITY,
            fov_y_degrees,
            viewport,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y.max(1.0)
    }

    fn half_fov_tan(&self) -> f32 {
        (self.fov_y_degrees.to_radians() * 0.5).tan()
    }

    /// Screen point to normalized device coordinates in [-1, 1].
    fn screen_to_ndc(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            2.0 * screen.x / self.viewport.x - 1.0,
            1.0 - 2.0 * screen.y / self.viewport.y,
        )
    }

    /// View-space direction through a screen point, at unit depth.
    fn view_direction(&self, screen: Vec2) -> Vec3 {
        let ndc = self.screen_to_ndc(screen);
        let tan = self.half_fov_tan();
        Vec3::new(ndc.x * tan * self.aspect(), ndc.y * tan, -1.0)
    }

    /// World-space ray from the eye through a screen point.
    pub fn screen_ray(&self, screen: Vec2) -> Ray {
        Ray::new(self.position, self.rotation * self.view_direction(screen))
    }

    /// Distance of a world point in front of the camera along its forward axis.
    pub fn depth_of(&self, world: Vec3) -> f32 {
        (world - self.position).dot(self.forward())
    }

    /// World point under a screen point at the given view depth.
    pub fn screen_to_world(&self, screen: Vec2, depth: f32) -> Vec3 {
        self.position + self.rotation * (self.view_direction(screen) * depth)
    }

    /// Project a world point to screen space.
    ///
    /// The returned `z` is the view depth; points behind the camera have a
    /// negative depth and their x/y are not meaningful.
    pub fn world_to_screen(&self, world: Vec3) -> Vec3 {
        let local = self.rotation.inverse() * (world - self.position);
        let depth = -local.z;
        if depth.abs() < f32::EPSILON {
            return Vec3::new(self.viewport.x * 0.5, self.viewport.y * 0.5, depth);
        }
        let tan = self.half_fov_tan();
        let ndc_x = local.x / (depth * tan * self.aspect());
        let ndc_y = local.y / (depth * tan);
        Vec3::new(
            (ndc_x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc_y) * 0.5 * self.viewport.y,
            depth,
        )
    }

    /// Rotate the camera in place from a pointer delta.
    ///
    /// Vertical movement pitches about the camera's own right axis, horizontal
    /// movement yaws about the world up axis. `speed` is in degrees per unit
    /// of pointer delta per second.
    pub fn orbit(&mut self, delta: Vec2, speed: f32, dt: f32) {
        if delta == Vec2::ZERO {
            return;
        }
        let pitch = (delta.y * speed * dt).to_radians();
        let yaw = (delta.x * speed * dt).to_radians();
        self.rotation = self.rotation * Quat::from_rotation_x(pitch);
        self.rotation = (Quat::from_rotation_y(yaw) * self.rotation).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 10.0));
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = Camera::new();
        let ray = camera.screen_ray(camera.viewport * 0.5);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-6);
        assert_eq!(ray.origin, camera.position);
    }

    #[test]
    fn test_depth_of() {
        let camera = Camera::new();
        assert!((camera.depth_of(Vec3::new(3.0, -2.0, 4.0)) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let camera = Camera::new();
        let original = Vec2::new(123.0, 456.0);
        let world = camera.screen_to_world(original, 7.5);
        let back = camera.world_to_screen(world);

        assert!((back.x - original.x).abs() < 1e-3);
        assert!((back.y - original.y).abs() < 1e-3);
        assert!((back.z - 7.5).abs() < 1e-4);
    }

    #[test]
    fn test_screen_ray_passes_through_screen_to_world() {
        let camera = Camera::new();
        let screen = Vec2::new(200.0, 600.0);
        let ray = camera.screen_ray(screen);
        let world = camera.screen_to_world(screen, 4.0);
        let along = (world - ray.origin).normalize();
        assert!((along - ray.direction).length() < 1e-5);
    }

    #[test]
    fn test_screen_y_grows_downward() {
        let camera = Camera::new();
        let above = camera.world_to_screen(Vec3::new(0.0, 1.0, 0.0));
        assert!(above.y < camera.viewport.y * 0.5);
    }

    #[test]
    fn test_orbit_yaw_about_world_up() {
        let mut camera = Camera::new();
        // 90° of yaw: delta.x * speed * dt = 90.
        camera.orbit(Vec2::new(1.0, 0.0), 90.0, 1.0);
        assert!((camera.forward() - Vec3::NEG_X).length() < 1e-5);
        assert!((camera.up() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_orbit_zero_delta_is_noop() {
        let mut camera = Camera::new();
        camera.orbit(Vec2::ZERO, 500.0, 0.016);
        assert_eq!(camera.rotation, Quat::IDENTITY);
    }
}
