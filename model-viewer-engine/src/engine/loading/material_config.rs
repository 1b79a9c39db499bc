use bevy::pbr::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;

use crate::engine::assets::viewer_assets::CurrentModel;
use crate::engine::loading::progress::LoadingProgress;

/// Post-load material pass over the spawned subtree.
///
/// Every mesh node becomes a shadow caster and receiver, and base-colour
/// textures are forced into the sRGB colour space. The loader does not
/// always infer the colour space from file metadata; sampling base colour
/// as linear visibly washes the surface out.
pub fn configure_model_materials(
    mut commands: Commands,
    current: Option<ResMut<CurrentModel>>,
    mut progress: ResMut<LoadingProgress>,
    children: Query<&Children>,
    mesh_nodes: Query<&MeshMaterial3d<StandardMaterial>, With<Mesh3d>>,
    materials: Res<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
) {
    let Some(mut current) = current else {
        return;
    };
    if current.materials_configured {
        return;
    }

    let mut configured = 0usize;
    for entity in children.iter_descendants(current.root) {
        let Ok(material_handle) = mesh_nodes.get(entity) else {
            continue;
        };
        commands
            .entity(entity)
            .remove::<(NotShadowCaster, NotShadowReceiver)>();
        if let Some(material) = materials.get(&material_handle.0) {
            if let Some(texture) = &material.base_color_texture {
                if let Some(image) = images.get_mut(texture) {
                    force_srgb(image);
                }
            }
        }
        configured += 1;
    }

    // The scene instance spawns asynchronously; retry until meshes appear.
    if configured > 0 {
        info!("✓ Configured {configured} mesh nodes for shading");
        progress.stage_done("Materials");
        current.materials_configured = true;
    }
}

/// Rewrite the descriptor so samples decode as sRGB.
fn force_srgb(image: &mut Image) {
    let format = image.texture_descriptor.format;
    if !format.is_srgb() {
        image.texture_descriptor.format = format.add_srgb_suffix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::RenderAssetUsages;
    use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

    fn test_image(format: TextureFormat) -> Image {
        Image::new_fill(
            Extent3d {
                width: 2,
                height: 2,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            &[255, 255, 255, 255],
            format,
            RenderAssetUsages::all(),
        )
    }

    #[test]
    fn linear_base_colour_becomes_srgb() {
        let mut image = test_image(TextureFormat::Rgba8Unorm);
        force_srgb(&mut image);
        assert_eq!(image.texture_descriptor.format, TextureFormat::Rgba8UnormSrgb);
    }

    #[test]
    fn srgb_base_colour_is_left_alone() {
        let mut image = test_image(TextureFormat::Rgba8UnormSrgb);
        force_srgb(&mut image);
        assert_eq!(image.texture_descriptor.format, TextureFormat::Rgba8UnormSrgb);
    }
}
