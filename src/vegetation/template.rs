use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use image::{ImageBuffer, Rgba, RgbaImage};

pub const BLADE_TEXTURE_WIDTH: u32 = 16;
pub const BLADE_TEXTURE_HEIGHT: u32 = 64;

// Two unit quads crossed at right angles, rooted at the origin and one unit
// tall. Scaled per instance.
pub fn build_blade_mesh() -> Mesh {
    let mut positions = Vec::with_capacity(8);
    let mut normals = Vec::with_capacity(8);
    let mut uvs = Vec::with_capacity(8);

    for (axis, normal) in [(Vec3::X, Vec3::Z), (Vec3::Z, Vec3::X)] {
        for (u, v) in [(0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)] {
            let p = axis * (u - 0.5) + Vec3::Y * (1.0 - v);
            positions.push(p.to_array());
            normals.push(normal.to_array());
            uvs.push([u, v]);
        }
    }

    let mut indices = Vec::with_capacity(12);
    for quad in 0..2u32 {
        let base = quad * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

// Root-to-tip green gradient in the shape of a tapering blade. Texels outside
// the blade are fully transparent so the alpha mask cuts the silhouette.
pub fn draw_blade_gradient(width: u32, height: u32) -> RgbaImage {
    let root = [46.0, 92.0, 30.0];
    let tip = [168.0, 204.0, 92.0];
    ImageBuffer::from_fn(width, height, |x, y| {
        // y = 0 is the top row of the texture, which maps to the tip.
        let t = 1.0 - y as f32 / (height.max(2) - 1) as f32;
        let half = (1.0 - t) * 0.5 + 0.04;
        let u = (x as f32 + 0.5) / width as f32 - 0.5;
        let alpha = if u.abs() <= half { 255 } else { 0 };
        let channel = |i: usize| (root[i] + (tip[i] - root[i]) * t).round() as u8;
        Rgba([channel(0), channel(1), channel(2), alpha])
    })
}

pub fn blade_texture() -> Image {
    let gradient = draw_blade_gradient(BLADE_TEXTURE_WIDTH, BLADE_TEXTURE_HEIGHT);
    Image::new(
        Extent3d {
            width: gradient.width(),
            height: gradient.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        gradient.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

// Alpha-tested, double-sided blade material.
pub fn blade_material(texture: Handle<Image>, tint: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: tint,
        base_color_texture: Some(texture),
        alpha_mode: AlphaMode::Mask(0.5),
        double_sided: true,
        cull_mode: None,
        perceptual_roughness: 0.85,
        ..default()
    }
}
