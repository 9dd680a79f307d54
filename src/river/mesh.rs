use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};

use crate::curve::RiverCurve;
use crate::river::RiverConfig;

// Vertex positions of a flat `width x length` grid centered on the origin,
// with every vertex pushed sideways by `offset(z)`. Row-major along z.
pub fn warped_grid_positions(curve: &RiverCurve, config: &RiverConfig) -> Vec<[f32; 3]> {
    let columns = config.width_segments;
    let rows = config.length_segments;
    let (z_min, _) = config.z_bounds();

    let mut vertices = Vec::with_capacity(((columns + 1) * (rows + 1)) as usize);
    for row in 0..=rows {
        let z = z_min + row as f32 / rows as f32 * config.length;
        let offset = curve.offset(z);
        for column in 0..=columns {
            let local_x = (column as f32 / columns as f32 - 0.5) * config.width;
            vertices.push([local_x + offset, config.water_level, z]);
        }
    }
    vertices
}

pub fn create_river_water_mesh(curve: &RiverCurve, config: &RiverConfig) -> Mesh {
    let columns = config.width_segments;
    let rows = config.length_segments;
    let vertices = warped_grid_positions(curve, config);

    let mut uvs = Vec::with_capacity(vertices.len());
    for row in 0..=rows {
        for column in 0..=columns {
            // v repeats along the river so the texture flow does not stretch
            uvs.push([column as f32 / columns as f32, row as f32 * 0.25]);
        }
    }

    let per_row = columns + 1;
    let mut indices = Vec::with_capacity((columns * rows * 6) as usize);
    for row in 0..rows {
        for column in 0..columns {
            let top_left = row * per_row + column;
            let top_right = top_left + 1;
            let bottom_left = (row + 1) * per_row + column;
            let bottom_right = bottom_left + 1;

            // First triangle
            indices.push(top_left);
            indices.push(bottom_left);
            indices.push(top_right);

            // Second triangle
            indices.push(top_right);
            indices.push(bottom_left);
            indices.push(bottom_right);
        }
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh.compute_smooth_normals();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_column_matches_curve_exactly() {
        let curve = RiverCurve;
        let config = RiverConfig::default();
        let vertices = warped_grid_positions(&curve, &config);
        let per_row = (config.width_segments + 1) as usize;
        let center = (config.width_segments / 2) as usize;
        for row in vertices.chunks(per_row) {
            let [x, _, z] = row[center];
            assert_eq!(x, curve.offset(z));
        }
    }

    #[test]
    fn test_every_row_keeps_full_width() {
        let curve = RiverCurve;
        let config = RiverConfig::default();
        let vertices = warped_grid_positions(&curve, &config);
        let per_row = (config.width_segments + 1) as usize;
        assert_eq!(vertices.len(), per_row * (config.length_segments + 1) as usize);
        for row in vertices.chunks(per_row) {
            let span = row[per_row - 1][0] - row[0][0];
            assert!((span - config.width).abs() < 1e-3);
            assert!(row.iter().all(|v| v[1] == config.water_level));
        }
    }

    #[test]
    fn test_water_mesh_has_normals_and_indices() {
        let config = RiverConfig {
            width_segments: 4,
            length_segments: 10,
            ..default()
        };
        let mesh = create_river_water_mesh(&RiverCurve, &config);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
        assert_eq!(mesh.indices().map(|i| i.len()), Some(4 * 10 * 6));
    }
}
