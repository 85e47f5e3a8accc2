//! Scene Loader: OBJ geometry and MTL materials for a single named model.
//!
//! A model named `cobb` lives at `obj/cobb.mtl` and `obj/cobb.obj`. Loading
//! is a two-stage future: the material library (and any diffuse textures it
//! names) resolves first, then the geometry is fetched and bound to it.
//!
//! # Invariants
//! - The material file is always requested before the geometry file.
//! - A failed load is an `Err`, never a silent stall.
//! - A missing texture degrades the material, it does not fail the load.

pub mod loader;
pub mod material;
pub mod model;
pub mod obj;

pub use loader::{AssetSource, FsSource, SceneLoader};
pub use material::{Material, MaterialLibrary, TextureData, parse_mtl};
pub use model::{LoadedModel, MeshData, ModelVertex};
pub use obj::{ObjData, parse_obj};

/// A syntax error in an OBJ or MTL document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
    #[error("failed to decode texture {path}: {source}")]
    Texture {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("model {0} contains no geometry")]
    EmptyModel(String),
}
