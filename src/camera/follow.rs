use bevy::prelude::*;

#[derive(Resource, Clone, Debug)]
pub struct FollowConfig {
    // Camera position relative to the actor, in the actor's heading frame.
    pub offset: Vec3,
    // Look target relative to the actor, in the same frame.
    pub look_ahead: Vec3,
    // Higher values close the gap faster.
    pub stiffness: f32,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 3.5, 9.0),
            look_ahead: Vec3::new(0.0, 0.0, -6.0),
            stiffness: 3.0,
        }
    }
}

// Frame-rate independent lerp factor, `1 - e^(-k dt)`.
pub fn smoothing_factor(stiffness: f32, dt: f32) -> f32 {
    1.0 - (-stiffness * dt.max(0.0)).exp()
}

// Where the camera wants to be and what it wants to look at.
pub fn follow_targets(actor: Vec3, yaw: f32, config: &FollowConfig) -> (Vec3, Vec3) {
    let heading = Quat::from_rotation_y(yaw);
    (actor + heading * config.offset, actor + heading * config.look_ahead)
}

// Smoothed follow pose. The look point is kept between frames so the view
// turns as gently as it moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowPose {
    look: Option<Vec3>,
}

impl FollowPose {
    pub fn reset(&mut self) {
        self.look = None;
    }

    pub fn look(&self) -> Option<Vec3> {
        self.look
    }

    pub fn step(&mut self, eye: Vec3, targets: (Vec3, Vec3), factor: f32) -> (Vec3, Vec3) {
        let (eye_target, look_target) = targets;
        let look = self.look.unwrap_or(look_target).lerp(look_target, factor);
        self.look = Some(look);
        (eye.lerp(eye_target, factor), look)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_factor_limits() {
        assert_eq!(smoothing_factor(3.0, 0.0), 0.0);
        assert!(smoothing_factor(3.0, 100.0) > 0.999);
        // Two half steps land where one full step does.
        let half = smoothing_factor(3.0, 0.05);
        let full = smoothing_factor(3.0, 0.1);
        assert!((1.0 - (1.0 - half) * (1.0 - half) - full).abs() < 1e-5);
    }

    #[test]
    fn test_targets_sit_behind_and_ahead_of_heading() {
        let config = FollowConfig::default();
        let (eye, look) = follow_targets(Vec3::ZERO, 0.0, &config);
        assert_eq!(eye, Vec3::new(0.0, 3.5, 9.0));
        assert_eq!(look, Vec3::new(0.0, 0.0, -6.0));

        let (eye, _) = follow_targets(Vec3::new(5.0, 2.0, 0.0), std::f32::consts::FRAC_PI_2, &config);
        // Facing -x, the camera trails along +x.
        assert!((eye - Vec3::new(14.0, 5.5, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_pose_converges_on_targets() {
        let config = FollowConfig::default();
        let targets = follow_targets(Vec3::new(10.0, 3.0, -20.0), 0.4, &config);
        let mut pose = FollowPose::default();
        let mut eye = Vec3::new(0.0, 40.0, 80.0);
        for _ in 0..600 {
            let (next_eye, _) = pose.step(eye, targets, smoothing_factor(config.stiffness, 1.0 / 60.0));
            eye = next_eye;
        }
        assert!(eye.distance(targets.0) < 1e-2);
        assert_eq!(pose.look(), Some(targets.1));
    }
}
