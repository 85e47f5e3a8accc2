use crate::material::{Material, MaterialLibrary};
use flyview_common::Aabb;
use glam::Vec3;

/// Interleaved vertex as parsed from OBJ.
///
/// `uv` keeps OBJ's convention (v = 0 at the bottom of the image).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// One drawable chunk of a model with a single material.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub material: Option<String>,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)))
    }
}

/// A fully loaded model: geometry bound to its material library.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub name: String,
    pub meshes: Vec<MeshData>,
    pub materials: MaterialLibrary,
}

impl LoadedModel {
    /// Bounding box of all meshes in model space.
    pub fn bounds(&self) -> Option<Aabb> {
        self.meshes
            .iter()
            .filter_map(MeshData::bounds)
            .reduce(|a, b| a.union(&b))
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }

    /// Material used by `mesh`, if it names one present in the library.
    pub fn material_for(&self, mesh: &MeshData) -> Option<&Material> {
        mesh.material
            .as_deref()
            .and_then(|name| self.materials.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(p: [f32; 3]) -> ModelVertex {
        ModelVertex {
            position: p,
            normal: [0.0, 1.0, 0.0],
            uv: [0.0, 0.0],
        }
    }

    fn mesh(material: Option<&str>, points: &[[f32; 3]]) -> MeshData {
        MeshData {
            name: "m".into(),
            material: material.map(str::to_string),
            vertices: points.iter().copied().map(vertex).collect(),
            indices: (0..points.len() as u32).collect(),
        }
    }

    #[test]
    fn bounds_span_all_meshes() {
        let model = LoadedModel {
            name: "cobb".into(),
            meshes: vec![
                mesh(None, &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 0.0]]),
                mesh(None, &[[-2.0, 0.0, 4.0], [0.0, 3.0, 0.0], [0.0, 0.0, 0.0]]),
            ],
            materials: MaterialLibrary::new(),
        };
        let b = model.bounds().unwrap();
        assert_eq!(b.min, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 3.0, 4.0));
        assert_eq!(model.vertex_count(), 6);
        assert_eq!(model.triangle_count(), 2);
    }

    #[test]
    fn empty_model_has_no_bounds() {
        let model = LoadedModel {
            name: "empty".into(),
            meshes: Vec::new(),
            materials: MaterialLibrary::new(),
        };
        assert!(model.bounds().is_none());
    }

    #[test]
    fn material_lookup_by_name() {
        let mut materials = MaterialLibrary::new();
        materials.insert(Material::named("Wood"));
        let model = LoadedModel {
            name: "cobb".into(),
            meshes: vec![
                mesh(Some("Wood"), &[[0.0; 3]; 3]),
                mesh(Some("Missing"), &[[0.0; 3]; 3]),
            ],
            materials,
        };
        assert_eq!(model.material_for(&model.meshes[0]).unwrap().name, "Wood");
        assert!(model.material_for(&model.meshes[1]).is_none());
    }
}
