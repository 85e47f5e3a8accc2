use crate::material::{MaterialLibrary, TextureData, parse_mtl};
use crate::model::LoadedModel;
use crate::obj::parse_obj;
use crate::AssetError;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Where asset bytes come from.
///
/// Paths are `/`-separated and relative to the source root.
pub trait AssetSource {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, AssetError>>;
}

/// Reads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full = self.root.join(path);
        std::fs::read(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(full.display().to_string())
            } else {
                AssetError::Io {
                    path: full.display().to_string(),
                    source,
                }
            }
        })
    }
}

/// Loads one named model in two stages: materials, then geometry.
pub struct SceneLoader<S> {
    source: S,
    directory: String,
}

impl<S: AssetSource> SceneLoader<S> {
    pub const DEFAULT_DIRECTORY: &'static str = "obj";

    pub fn new(source: S) -> Self {
        Self {
            source,
            directory: Self::DEFAULT_DIRECTORY.to_string(),
        }
    }

    /// Use a directory other than `obj/` for model files.
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into().trim_end_matches('/').to_string();
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn material_path(&self, name: &str) -> String {
        format!("{}/{name}.mtl", self.directory)
    }

    pub fn geometry_path(&self, name: &str) -> String {
        format!("{}/{name}.obj", self.directory)
    }

    /// Load `name` completely. The material library resolves before the
    /// geometry request is issued.
    pub async fn load(&self, name: &str) -> Result<LoadedModel, AssetError> {
        tracing::info!(model = name, "loading model");
        let materials = self.load_materials(name).await?;
        let model = self.load_geometry(name, materials).await?;
        tracing::info!(
            model = name,
            meshes = model.meshes.len(),
            vertices = model.vertex_count(),
            triangles = model.triangle_count(),
            "model loaded"
        );
        Ok(model)
    }

    /// Stage one: fetch and parse the material library, then preload its
    /// diffuse textures.
    pub async fn load_materials(&self, name: &str) -> Result<MaterialLibrary, AssetError> {
        let path = self.material_path(name);
        let bytes = self.source.fetch(&path).await?;
        let mut library = parse_mtl(&String::from_utf8_lossy(&bytes))
            .map_err(|source| AssetError::Parse {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path, materials = library.len(), "material library parsed");
        self.preload_textures(&mut library).await;
        Ok(library)
    }

    /// Stage two: fetch the geometry and bind it to `materials`.
    pub async fn load_geometry(
        &self,
        name: &str,
        materials: MaterialLibrary,
    ) -> Result<LoadedModel, AssetError> {
        let path = self.geometry_path(name);
        let bytes = self.source.fetch(&path).await?;
        let obj = parse_obj(&String::from_utf8_lossy(&bytes)).map_err(|source| {
            AssetError::Parse {
                path: path.clone(),
                source,
            }
        })?;

        for mesh in &obj.meshes {
            if let Some(material) = &mesh.material {
                if materials.get(material).is_none() {
                    tracing::warn!(mesh = %mesh.name, material = %material, "mesh uses unknown material");
                }
            }
        }

        let model = LoadedModel {
            name: name.to_string(),
            meshes: obj.meshes,
            materials,
        };
        if model.triangle_count() == 0 {
            return Err(AssetError::EmptyModel(name.to_string()));
        }
        Ok(model)
    }

    async fn preload_textures(&self, library: &mut MaterialLibrary) {
        let mut fetched: HashMap<String, Option<TextureData>> = HashMap::new();
        for material in library.iter_mut() {
            let Some(map) = material.diffuse_map.clone() else {
                continue;
            };
            let path = self.resolve(&map);
            if !fetched.contains_key(&path) {
                let texture = match self.fetch_texture(&path).await {
                    Ok(texture) => {
                        tracing::debug!(
                            path = %path,
                            width = texture.width,
                            height = texture.height,
                            "texture decoded"
                        );
                        Some(texture)
                    }
                    Err(e) => {
                        tracing::warn!(material = %material.name, "texture unavailable, rendering untextured: {e}");
                        None
                    }
                };
                fetched.insert(path.clone(), texture);
            }
            material.diffuse_texture = fetched.get(&path).cloned().flatten();
        }
    }

    async fn fetch_texture(&self, path: &str) -> Result<TextureData, AssetError> {
        let bytes = self.source.fetch(path).await?;
        TextureData::decode(&bytes).map_err(|source| AssetError::Texture {
            path: path.to_string(),
            source,
        })
    }

    /// Texture paths are relative to the material library's directory.
    fn resolve(&self, map: &str) -> String {
        match map.strip_prefix('/') {
            Some(rooted) => rooted.to_string(),
            None => format!("{}/{map}", self.directory),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const CUBE_OBJ: &str = "\
mtllib cobb.mtl
v 0 0 0
v 2 0 0
v 2 2 0
v 0 2 -4
usemtl Wood
f 1 2 3
f 1 3 4
";

    #[derive(Default)]
    struct RecordingSource {
        files: HashMap<String, Vec<u8>>,
        requests: RefCell<Vec<String>>,
    }

    impl RecordingSource {
        fn with(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
            self.files.insert(path.to_string(), bytes.into());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl AssetSource for RecordingSource {
        async fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
            self.requests.borrow_mut().push(path.to_string());
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| AssetError::NotFound(path.to_string()))
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 100, 50, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn fetches_material_then_geometry() {
        let source = RecordingSource::default()
            .with("obj/cobb.mtl", "newmtl Wood\nKd 0.5 0.4 0.3\n")
            .with("obj/cobb.obj", CUBE_OBJ);
        let loader = SceneLoader::new(source);
        let model = pollster::block_on(loader.load("cobb")).unwrap();

        assert_eq!(loader.source().requests(), ["obj/cobb.mtl", "obj/cobb.obj"]);
        assert_eq!(model.name, "cobb");
        assert_eq!(model.triangle_count(), 2);
        assert_eq!(model.material_for(&model.meshes[0]).unwrap().name, "Wood");
    }

    #[test]
    fn textures_preload_between_stages() {
        let source = RecordingSource::default()
            .with("obj/cobb.mtl", "newmtl Wood\nmap_Kd wood.png\nnewmtl Oak\nmap_Kd wood.png\n")
            .with("obj/wood.png", png_bytes())
            .with("obj/cobb.obj", CUBE_OBJ);
        let loader = SceneLoader::new(source);
        let model = pollster::block_on(loader.load("cobb")).unwrap();

        assert_eq!(
            loader.source().requests(),
            ["obj/cobb.mtl", "obj/wood.png", "obj/cobb.obj"]
        );
        for material in model.materials.iter() {
            let tex = material.diffuse_texture.as_ref().unwrap();
            assert_eq!((tex.width, tex.height), (4, 4));
        }
    }

    #[test]
    fn missing_texture_degrades_material() {
        let source = RecordingSource::default()
            .with("obj/cobb.mtl", "newmtl Wood\nmap_Kd gone.png\n")
            .with("obj/cobb.obj", CUBE_OBJ);
        let loader = SceneLoader::new(source);
        let model = pollster::block_on(loader.load("cobb")).unwrap();
        let wood = model.materials.get("Wood").unwrap();
        assert_eq!(wood.diffuse_map.as_deref(), Some("gone.png"));
        assert!(wood.diffuse_texture.is_none());
    }

    #[test]
    fn material_failure_stops_before_geometry() {
        let source = RecordingSource::default().with("obj/cobb.obj", CUBE_OBJ);
        let loader = SceneLoader::new(source);
        let err = pollster::block_on(loader.load("cobb")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(ref p) if p == "obj/cobb.mtl"));
        assert_eq!(loader.source().requests(), ["obj/cobb.mtl"]);
    }

    #[test]
    fn geometry_parse_error_names_file() {
        let source = RecordingSource::default()
            .with("obj/cobb.mtl", "")
            .with("obj/cobb.obj", "v 0 0 0\nf 1 2 3\n");
        let loader = SceneLoader::new(source);
        let err = pollster::block_on(loader.load("cobb")).unwrap_err();
        match err {
            AssetError::Parse { path, source } => {
                assert_eq!(path, "obj/cobb.obj");
                assert_eq!(source.line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn geometry_without_faces_is_empty_model() {
        let source = RecordingSource::default()
            .with("obj/cobb.mtl", "")
            .with("obj/cobb.obj", "v 0 0 0\n");
        let loader = SceneLoader::new(source);
        let err = pollster::block_on(loader.load("cobb")).unwrap_err();
        assert!(matches!(err, AssetError::EmptyModel(_)));
    }

    #[test]
    fn custom_directory_and_rooted_texture() {
        let loader = SceneLoader::new(RecordingSource::default()).with_directory("models/");
        assert_eq!(loader.material_path("cobb"), "models/cobb.mtl");
        assert_eq!(loader.geometry_path("cobb"), "models/cobb.obj");
        assert_eq!(loader.resolve("tex/a.png"), "models/tex/a.png");
        assert_eq!(loader.resolve("/shared/a.png"), "shared/a.png");
    }

    #[test]
    fn loads_from_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let obj_dir = dir.path().join("obj");
        std::fs::create_dir(&obj_dir).unwrap();
        std::fs::write(obj_dir.join("cobb.mtl"), "newmtl Wood\nmap_Kd wood.png\n").unwrap();
        std::fs::write(obj_dir.join("wood.png"), png_bytes()).unwrap();
        std::fs::write(obj_dir.join("cobb.obj"), CUBE_OBJ).unwrap();

        let loader = SceneLoader::new(FsSource::new(dir.path()));
        let model = pollster::block_on(loader.load("cobb")).unwrap();
        assert_eq!(model.meshes.len(), 1);
        assert!(model.materials.get("Wood").unwrap().diffuse_texture.is_some());

        let bounds = model.bounds().unwrap();
        assert_eq!(bounds.center(), glam::Vec3::new(1.0, 1.0, -2.0));
    }

    #[test]
    fn filesystem_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsSource::new(dir.path());
        let err = pollster::block_on(source.fetch("obj/none.mtl")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }
}
