use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::primitives::Aabb;

use constants::render_settings::{GRID_COLOUR, GRID_EXTENT_FACTOR, GRID_LINE_COUNT};

use crate::engine::assets::bounds::{ModelBounds, compute_subtree_bounds};
use crate::engine::assets::viewer_assets::CurrentModel;

/// Marker for ground grid entities.
#[derive(Component)]
pub struct GroundGrid;

/// Grid display toggle; the grid geometry itself is rebuilt per model.
#[derive(Resource)]
pub struct GridSettings {
    pub visible: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self { visible: true }
    }
}

/// Tracks which model root the current grid was built for.
#[derive(Resource, Default)]
pub struct GridState {
    pub built_for: Option<Entity>,
}

/// Half extent of a grid sized to sit comfortably under `bounds`.
pub fn grid_half_extent(bounds: &ModelBounds) -> f32 {
    let size = bounds.size();
    (size.x.max(size.z) * 0.5 * GRID_EXTENT_FACTOR).max(1.0)
}

/// Rebuild the ground grid under the displayed model once its bounds are
/// known. Each model gets its own grid; the previous one is despawned.
pub fn refresh_ground_grid(
    mut commands: Commands,
    mut state: ResMut<GridState>,
    settings: Res<GridSettings>,
    current: Option<Res<CurrentModel>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    existing: Query<Entity, With<GroundGrid>>,
    children: Query<&Children>,
    volumes: Query<(&Aabb, &GlobalTransform), With<Mesh3d>>,
) {
    let Some(current) = current else {
        return;
    };
    if state.built_for == Some(current.root) {
        return;
    }
    let Some(bounds) = compute_subtree_bounds(current.root, &children, &volumes) else {
        return;
    };
    if bounds.is_degenerate() {
        return;
    }

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let grid_material = materials.add(StandardMaterial {
        base_color: GRID_COLOUR,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    let mesh = create_grid_line_mesh(bounds.center(), grid_half_extent(&bounds), bounds.min.y);
    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(grid_material),
        if settings.visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        },
        Transform::IDENTITY,
        GroundGrid,
    ));

    state.built_for = Some(current.root);
    info!("Grid rebuilt");
}

/// Apply the visibility toggle to existing grid entities.
pub fn apply_grid_visibility(
    settings: Res<GridSettings>,
    mut grids: Query<&mut Visibility, With<GroundGrid>>,
) {
    if !settings.is_changed() {
        return;
    }
    for mut visibility in &mut grids {
        *visibility = if settings.visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// One LineList mesh holding every grid line, centred under the model at
/// its base height.
fn create_grid_line_mesh(center: Vec3, half: f32, height: f32) -> Mesh {
    let mut vertices: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    let step = (half * 2.0) / GRID_LINE_COUNT as f32;
    for i in 0..=GRID_LINE_COUNT {
        let offset = -half + i as f32 * step;

        // Line running along Z at fixed X.
        push_line(
            &mut vertices,
            &mut indices,
            [center.x + offset, height, center.z - half],
            [center.x + offset, height, center.z + half],
        );
        // Line running along X at fixed Z.
        push_line(
            &mut vertices,
            &mut indices,
            [center.x - half, height, center.z + offset],
            [center.x + half, height, center.z + offset],
        );
    }

    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

fn push_line(vertices: &mut Vec<[f32; 3]>, indices: &mut Vec<u32>, a: [f32; 3], b: [f32; 3]) {
    let base = vertices.len() as u32;
    vertices.push(a);
    vertices.push(b);
    indices.extend_from_slice(&[base, base + 1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_extends_beyond_the_model() {
        let bounds = ModelBounds::from_min_max(Vec3::new(-2.0, 0.0, -1.0), Vec3::new(2.0, 1.0, 1.0));
        let half = grid_half_extent(&bounds);
        assert!((half - 2.0 * GRID_EXTENT_FACTOR).abs() < 1e-6);
    }

    #[test]
    fn tiny_models_still_get_a_usable_grid() {
        let bounds = ModelBounds::from_min_max(Vec3::splat(-0.01), Vec3::splat(0.01));
        assert_eq!(grid_half_extent(&bounds), 1.0);
    }

    #[test]
    fn line_mesh_has_matching_vertex_and_index_counts() {
        let mesh = create_grid_line_mesh(Vec3::ZERO, 5.0, 0.0);
        let lines = 2 * (GRID_LINE_COUNT as usize + 1);
        assert_eq!(mesh.count_vertices(), lines * 2);
        assert_eq!(mesh.indices().map(|indices| indices.len()), Some(lines * 2));
    }
}
