use bevy::prelude::*;
use bevy::render::primitives::Aabb;

use constants::camera::{
    DEFAULT_FRAMING_PADDING, FAR_PLANE_MULTIPLIER, FRAMING_DIRECTION, NEAR_PLANE_DIVISOR,
};

use crate::engine::assets::bounds::{ModelBounds, compute_subtree_bounds};
use crate::engine::assets::viewer_assets::CurrentModel;
use crate::engine::camera::orbit_camera::{OrbitCamera, ViewerCamera};
use crate::engine::loading::progress::LoadingProgress;

/// Camera pose that frames a bounding volume with padding.
///
/// Derived and never persisted; applied straight onto the camera and the
/// orbit rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

/// Request to (re)frame the displayed model.
#[derive(Event, Debug, Clone, Copy)]
pub struct FrameRequest {
    pub padding: f32,
}

impl Default for FrameRequest {
    fn default() -> Self {
        Self {
            padding: DEFAULT_FRAMING_PADDING,
        }
    }
}

/// Distance at which `size` exactly fills the vertical frame, scaled by
/// `padding`.
pub fn framing_distance(size: f32, fov_y: f32, padding: f32) -> f32 {
    (size / (2.0 * (fov_y * 0.5).tan())) * padding
}

/// Derive the framing pose for `bounds`.
///
/// The largest axis extent drives the distance so flat or tall models are
/// not under-framed; clip planes scale with the distance so depth precision
/// holds at any model size. A degenerate box yields a zero/NaN pose by
/// design — callers validate before applying.
pub fn compute_frame_pose(bounds: &ModelBounds, fov_y: f32, padding: f32) -> CameraPose {
    let center = bounds.center();
    let distance = framing_distance(bounds.max_extent(), fov_y, padding);
    CameraPose {
        position: center + FRAMING_DIRECTION.normalize() * distance,
        target: center,
        distance,
        near: distance / NEAR_PLANE_DIVISOR,
        far: distance * FAR_PLANE_MULTIPLIER,
    }
}

/// Frame the model once its meshes have spawned, and again whenever a
/// caller asks. Bounds are recomputed fresh on every pass; a prior result
/// is never reused across subtree mutations.
pub fn frame_displayed_model(
    mut requests: EventReader<FrameRequest>,
    current: Option<ResMut<CurrentModel>>,
    mut rig: ResMut<OrbitCamera>,
    mut progress: ResMut<LoadingProgress>,
    mut cameras: Query<(&mut Transform, &mut Projection), (With<Camera3d>, With<ViewerCamera>)>,
    children: Query<&Children>,
    volumes: Query<(&Aabb, &GlobalTransform), With<Mesh3d>>,
) {
    let Some(mut current) = current else {
        requests.clear();
        return;
    };

    let mut padding = None;
    if !current.framed {
        padding = Some(DEFAULT_FRAMING_PADDING);
    }
    for request in requests.read() {
        padding = Some(request.padding);
    }
    let Some(padding) = padding else {
        return;
    };

    let Some(bounds) = compute_subtree_bounds(current.root, &children, &volumes) else {
        // Scene instance still spawning; try again next frame.
        return;
    };
    if bounds.is_degenerate() {
        warn!("Model bounds are degenerate; camera left unchanged");
        current.framed = true;
        return;
    }

    let Ok((mut transform, mut projection)) = cameras.single_mut() else {
        return;
    };
    let Projection::Perspective(ref mut perspective) = *projection else {
        return;
    };

    let pose = compute_frame_pose(&bounds, perspective.fov, padding);
    perspective.near = pose.near;
    perspective.far = pose.far;

    // Re-anchor the rig so interactive orbiting pivots around the model.
    rig.retarget(pose.target, pose.distance);
    rig.set_view_direction(FRAMING_DIRECTION);
    *transform = Transform::from_translation(pose.position).looking_at(pose.target, Vec3::Y);

    if !current.framed {
        progress.stage_done("Framing");
        current.framed = true;
    }
    info!("Framed model at distance {:.3}", pose.distance);
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-3;
    const FOV_60: f32 = std::f32::consts::FRAC_PI_3;

    fn unit_cube() -> ModelBounds {
        ModelBounds::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn distance_matches_reference_scenario() {
        // size=2, fov=60 degrees, padding=1.25.
        let distance = framing_distance(2.0, FOV_60, 1.25);
        assert!((distance - 2.165).abs() < TOLERANCE);
    }

    #[test]
    fn pose_matches_reference_scenario() {
        let pose = compute_frame_pose(&unit_cube(), FOV_60, 1.25);
        assert_eq!(pose.target, Vec3::ZERO);
        assert!((pose.near - 0.02165).abs() < 1e-4);
        assert!((pose.far - 216.5).abs() < 0.1);
        let expected = FRAMING_DIRECTION.normalize() * pose.distance;
        assert!((pose.position - expected).length() < TOLERANCE);
    }

    #[test]
    fn distance_is_strictly_increasing_in_size_and_padding() {
        let sizes = [0.5, 1.0, 2.0, 4.0, 100.0];
        for pair in sizes.windows(2) {
            assert!(framing_distance(pair[1], FOV_60, 1.25) > framing_distance(pair[0], FOV_60, 1.25));
        }
        let paddings = [1.0, 1.1, 1.25, 2.0];
        for pair in paddings.windows(2) {
            assert!(framing_distance(2.0, FOV_60, pair[1]) > framing_distance(2.0, FOV_60, pair[0]));
        }
    }

    #[test]
    fn largest_axis_drives_framing() {
        let flat = ModelBounds::from_min_max(Vec3::new(-3.0, 0.0, -0.1), Vec3::new(3.0, 0.2, 0.1));
        let pose = compute_frame_pose(&flat, FOV_60, 1.0);
        assert!((pose.distance - framing_distance(6.0, FOV_60, 1.0)).abs() < TOLERANCE);
    }

    #[test]
    fn framing_is_idempotent_for_an_unchanged_input() {
        let first = compute_frame_pose(&unit_cube(), FOV_60, 1.25);
        let second = compute_frame_pose(&unit_cube(), FOV_60, 1.25);
        assert!((first.position - second.position).length() < f32::EPSILON);
        assert_eq!(first.near, second.near);
        assert_eq!(first.far, second.far);
    }

    #[test]
    fn clip_planes_scale_linearly_with_distance() {
        let small = compute_frame_pose(&unit_cube(), FOV_60, 1.25);
        let big_bounds = ModelBounds::from_min_max(Vec3::splat(-500.0), Vec3::splat(500.0));
        let big = compute_frame_pose(&big_bounds, FOV_60, 1.25);

        assert!(small.near < small.far);
        assert!(big.near < big.far);
        let scale = big.distance / small.distance;
        assert!((big.near / small.near - scale).abs() / scale < 1e-4);
        assert!((big.far / small.far - scale).abs() / scale < 1e-4);
    }
}
