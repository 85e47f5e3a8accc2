use flyview_common::CameraConfig;
use flyview_input::MovementKeys;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

/// First-person fly camera.
///
/// Rotation order is YXZ: yaw about world Y, then pitch about the local X
/// axis. At zero yaw and pitch the camera looks down -Z.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Units per second.
    pub speed: f32,
    /// Radians per pixel of pointer movement.
    pub sensitivity: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}

impl FlyCamera {
    pub const PITCH_LIMIT: f32 = FRAC_PI_2;

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: config.start_position,
            yaw: 0.0,
            pitch: 0.0,
            fov: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
            speed: config.speed,
            sensitivity: config.sensitivity,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// World-space unit vector the camera looks along.
    pub fn look_direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    /// Look direction with its vertical component removed, normalized.
    ///
    /// Computed from yaw alone so it stays defined when looking straight up
    /// or down; moving never slows down with pitch.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(-sy, 0.0, -cy)
    }

    /// Unit vector to the camera's right: forward × up.
    pub fn sideways(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    /// Move along the ground plane for every held key.
    pub fn translate(&mut self, keys: &MovementKeys, dt: f32) {
        let axis = keys.axis();
        if axis == Vec2::ZERO {
            return;
        }
        let step = self.speed * dt;
        self.position += (self.forward() * axis.x + self.sideways() * axis.y) * step;
    }

    /// Apply pointer movement. Non-finite deltas are ignored.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// One controller step: look first, then move along the new heading.
    pub fn update(&mut self, keys: &MovementKeys, pointer_delta: Vec2, dt: f32) {
        self.rotate(pointer_delta.x, pointer_delta.y);
        self.translate(keys, dt);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn keys(forward: bool, left: bool, backward: bool, right: bool) -> MovementKeys {
        MovementKeys {
            forward,
            left,
            backward,
            right,
        }
    }

    #[test]
    fn default_camera() {
        let cam = FlyCamera::default();
        assert_eq!(cam.position, Vec3::ZERO);
        assert!((cam.fov - 50.0_f32.to_radians()).abs() < EPS);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn looks_down_negative_z_initially() {
        let cam = FlyCamera::default();
        assert!((cam.look_direction() - Vec3::NEG_Z).length() < EPS);
        assert!((cam.forward() - Vec3::NEG_Z).length() < EPS);
        assert!((cam.sideways() - Vec3::X).length() < EPS);
    }

    #[test]
    fn look_direction_matches_rotation() {
        let mut cam = FlyCamera::default();
        cam.yaw = 0.7;
        cam.pitch = -0.4;
        let from_quat = cam.rotation() * Vec3::NEG_Z;
        assert!((from_quat - cam.look_direction()).length() < EPS);
    }

    #[test]
    fn forward_is_flattened_look_direction() {
        let mut cam = FlyCamera::default();
        for yaw in [-3.0, -1.2, 0.0, 0.5, 2.9] {
            for pitch in [-1.5, -0.3, 0.0, 0.8, 1.5] {
                cam.yaw = yaw;
                cam.pitch = pitch;
                let look = cam.look_direction();
                let flat = Vec3::new(look.x, 0.0, look.z).normalize();
                assert!((cam.forward() - flat).length() < 1e-4, "yaw={yaw} pitch={pitch}");
                assert!((cam.sideways() - flat.cross(Vec3::Y).normalize()).length() < 1e-4);
            }
        }
    }

    #[test]
    fn pitch_stays_clamped_for_any_sequence() {
        let mut cam = FlyCamera::default();
        let deltas = [
            1e6, -3.0, 250.0, -1e7, 0.0, 42.0, -42.0, 9e5, -0.5, 1.0, f32::MAX, f32::MIN,
        ];
        for (i, dy) in deltas.iter().cycle().take(500).enumerate() {
            cam.rotate((i as f32).sin() * 10.0, *dy * ((i % 7) as f32 - 3.0));
            assert!(
                (-FRAC_PI_2..=FRAC_PI_2).contains(&cam.pitch),
                "pitch {} escaped after step {i}",
                cam.pitch
            );
        }
    }

    #[test]
    fn non_finite_pointer_delta_is_ignored() {
        let mut cam = FlyCamera::default();
        cam.rotate(f32::NAN, 1.0);
        cam.rotate(1.0, f32::INFINITY);
        assert_eq!(cam.yaw, 0.0);
        assert_eq!(cam.pitch, 0.0);
    }

    #[test]
    fn pointer_right_turns_right_and_up_looks_up() {
        let mut cam = FlyCamera::default();
        cam.rotate(100.0, -100.0);
        assert!((cam.yaw - -0.2).abs() < EPS);
        assert!((cam.pitch - 0.2).abs() < EPS);
        assert!(cam.look_direction().x > 0.0);
        assert!(cam.look_direction().y > 0.0);
    }

    #[test]
    fn no_keys_means_no_movement() {
        let mut cam = FlyCamera::default();
        cam.position = Vec3::new(1.0, 2.0, 3.0);
        for i in 0..1000 {
            cam.update(&MovementKeys::default(), Vec2::new(i as f32, -(i as f32)), 0.016);
        }
        assert_eq!(cam.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn forward_displacement_is_speed_times_time_for_any_orientation() {
        let dt = 0.016;
        for yaw in [-2.5, -0.9, 0.0, 0.3, 1.7, 3.1] {
            for pitch in [-FRAC_PI_2, -1.0, 0.0, 0.6, FRAC_PI_2] {
                let mut cam = FlyCamera::default();
                cam.yaw = yaw;
                cam.pitch = pitch;
                cam.translate(&keys(true, false, false, false), dt);
                let moved = cam.position.length();
                assert!(
                    (moved - cam.speed * dt).abs() < 1e-5,
                    "yaw={yaw} pitch={pitch} moved={moved}"
                );
                assert_eq!(cam.position.y, 0.0);
            }
        }
    }

    #[test]
    fn wasd_directions() {
        let dt = 0.5;
        let mut cam = FlyCamera::default();
        cam.translate(&keys(true, false, false, false), dt);
        assert!((cam.position - Vec3::new(0.0, 0.0, -10.0)).length() < EPS);

        let mut cam = FlyCamera::default();
        cam.translate(&keys(false, false, true, false), dt);
        assert!((cam.position - Vec3::new(0.0, 0.0, 10.0)).length() < EPS);

        let mut cam = FlyCamera::default();
        cam.translate(&keys(false, true, false, false), dt);
        assert!((cam.position - Vec3::new(-10.0, 0.0, 0.0)).length() < EPS);

        let mut cam = FlyCamera::default();
        cam.translate(&keys(false, false, false, true), dt);
        assert!((cam.position - Vec3::new(10.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut cam = FlyCamera::default();
        cam.translate(&keys(true, true, true, true), 1.0);
        assert_eq!(cam.position, Vec3::ZERO);
    }

    #[test]
    fn view_matrix_maps_look_target_onto_negative_z() {
        let mut cam = FlyCamera::default();
        cam.position = Vec3::new(3.0, 1.0, -2.0);
        cam.yaw = 1.1;
        cam.pitch = 0.3;
        let target = cam.position + cam.look_direction() * 4.0;
        let in_view = cam.view_matrix().transform_point3(target);
        assert!((in_view - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-4);
    }

    #[test]
    fn view_matrix_is_finite_looking_straight_up() {
        let mut cam = FlyCamera::default();
        cam.pitch = FRAC_PI_2;
        let v = cam.view_projection();
        assert!(v.to_cols_array().iter().all(|x| x.is_finite()));
    }
}
