//! Wavefront OBJ geometry parser.
//!
//! Polygons are fan-triangulated. Each `o`, `g` or `usemtl` that follows
//! geometry starts a new mesh, so every mesh carries exactly one material.
//! Faces without normals get a flat face normal.

use crate::ParseError;
use crate::model::{MeshData, ModelVertex};
use glam::Vec3;
use std::collections::HashMap;

/// Parsed OBJ document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    /// File names from `mtllib` lines, in order.
    pub material_libraries: Vec<String>,
    pub meshes: Vec<MeshData>,
}

/// Resolved zero-based (position, texcoord, normal) indices of a face corner.
type CornerKey = (usize, Option<usize>, Option<usize>);

struct MeshBuilder {
    name: String,
    material: Option<String>,
    vertices: Vec<ModelVertex>,
    indices: Vec<u32>,
    shared: HashMap<CornerKey, u32>,
}

impl MeshBuilder {
    fn new(name: String, material: Option<String>) -> Self {
        Self {
            name,
            material,
            vertices: Vec::new(),
            indices: Vec::new(),
            shared: HashMap::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn push_shared(&mut self, key: CornerKey, vertex: ModelVertex) {
        let index = match self.shared.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.vertices.len() as u32;
                self.vertices.push(vertex);
                self.shared.insert(key, i);
                i
            }
        };
        self.indices.push(index);
    }

    fn push_unique(&mut self, vertex: ModelVertex) {
        self.indices.push(self.vertices.len() as u32);
        self.vertices.push(vertex);
    }

    fn finish_into(self, meshes: &mut Vec<MeshData>) {
        if self.is_empty() {
            return;
        }
        meshes.push(MeshData {
            name: self.name,
            material: self.material,
            vertices: self.vertices,
            indices: self.indices,
        });
    }
}

#[derive(Default)]
struct Attributes {
    positions: Vec<Vec3>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<Vec3>,
}

impl Attributes {
    fn vertex(&self, key: CornerKey, flat_normal: Option<Vec3>) -> ModelVertex {
        let (p, t, n) = key;
        let normal = flat_normal
            .or_else(|| n.map(|i| self.normals[i]))
            .unwrap_or(Vec3::Y);
        ModelVertex {
            position: self.positions[p].to_array(),
            normal: normal.to_array(),
            uv: t.map(|i| self.texcoords[i]).unwrap_or([0.0, 0.0]),
        }
    }
}

/// Parse an OBJ document.
pub fn parse_obj(text: &str) -> Result<ObjData, ParseError> {
    let mut attrs = Attributes::default();
    let mut data = ObjData::default();
    let mut current = MeshBuilder::new(String::new(), None);

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };

        match keyword {
            "v" => attrs.positions.push(parse_vec3(rest, line_no)?),
            "vn" => attrs.normals.push(parse_vec3(rest, line_no)?),
            "vt" => attrs.texcoords.push(parse_uv(rest, line_no)?),
            "f" => {
                let corners = rest
                    .split_whitespace()
                    .map(|token| parse_corner(token, &attrs, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(ParseError::new(
                        line_no,
                        format!("face needs at least 3 vertices, got {}", corners.len()),
                    ));
                }
                for i in 1..corners.len() - 1 {
                    add_triangle(&mut current, &attrs, [corners[0], corners[i], corners[i + 1]]);
                }
            }
            "o" | "g" => {
                let material = current.material.clone();
                let previous =
                    std::mem::replace(&mut current, MeshBuilder::new(rest.to_string(), material));
                previous.finish_into(&mut data.meshes);
            }
            "usemtl" => {
                if rest.is_empty() {
                    return Err(ParseError::new(line_no, "usemtl without a material name"));
                }
                if current.is_empty() {
                    current.material = Some(rest.to_string());
                } else {
                    let name = current.name.clone();
                    let previous = std::mem::replace(
                        &mut current,
                        MeshBuilder::new(name, Some(rest.to_string())),
                    );
                    previous.finish_into(&mut data.meshes);
                }
            }
            "mtllib" => data
                .material_libraries
                .extend(rest.split_whitespace().map(str::to_string)),
            _ => {
                tracing::trace!(line = line_no, keyword, "unsupported obj directive");
            }
        }
    }

    current.finish_into(&mut data.meshes);
    Ok(data)
}

fn add_triangle(mesh: &mut MeshBuilder, attrs: &Attributes, corners: [CornerKey; 3]) {
    if corners.iter().all(|c| c.2.is_some()) {
        for key in corners {
            mesh.push_shared(key, attrs.vertex(key, None));
        }
        return;
    }

    let [a, b, c] = corners.map(|k| attrs.positions[k.0]);
    // Zero-area faces still need a unit normal for lighting.
    let normal = (b - a).cross(c - a).normalize_or(Vec3::Y);
    for key in corners {
        mesh.push_unique(attrs.vertex(key, Some(normal)));
    }
}

fn parse_floats(s: &str, line: usize) -> Result<Vec<f32>, ParseError> {
    s.split_whitespace()
        .map(|t| {
            t.parse::<f32>()
                .map_err(|_| ParseError::new(line, format!("invalid number {t:?}")))
        })
        .collect()
}

fn parse_vec3(s: &str, line: usize) -> Result<Vec3, ParseError> {
    match parse_floats(s, line)?.as_slice() {
        [x, y, z, ..] => Ok(Vec3::new(*x, *y, *z)),
        other => Err(ParseError::new(
            line,
            format!("expected 3 components, got {}", other.len()),
        )),
    }
}

fn parse_uv(s: &str, line: usize) -> Result<[f32; 2], ParseError> {
    match parse_floats(s, line)?.as_slice() {
        [u] => Ok([*u, 0.0]),
        [u, v, ..] => Ok([*u, *v]),
        [] => Err(ParseError::new(line, "vt without components")),
    }
}

fn parse_corner(token: &str, attrs: &Attributes, line: usize) -> Result<CornerKey, ParseError> {
    let mut parts = token.split('/');
    let position = match parts.next() {
        Some(p) if !p.is_empty() => resolve_index(p, attrs.positions.len(), line)?,
        _ => return Err(ParseError::new(line, format!("face corner {token:?} has no position"))),
    };
    let texcoord = match parts.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, attrs.texcoords.len(), line)?),
        _ => None,
    };
    let normal = match parts.next() {
        Some(n) if !n.is_empty() => Some(resolve_index(n, attrs.normals.len(), line)?),
        _ => None,
    };
    if parts.next().is_some() {
        return Err(ParseError::new(line, format!("malformed face corner {token:?}")));
    }
    Ok((position, texcoord, normal))
}

/// OBJ indices are 1-based; negative values count back from the latest element.
fn resolve_index(token: &str, len: usize, line: usize) -> Result<usize, ParseError> {
    let raw: i64 = token
        .parse()
        .map_err(|_| ParseError::new(line, format!("invalid index {token:?}")))?;
    let resolved = match raw {
        0 => return Err(ParseError::new(line, "index 0 is not valid in OBJ")),
        i if i > 0 => i - 1,
        i => len as i64 + i,
    };
    if resolved < 0 || resolved >= len as i64 {
        return Err(ParseError::new(
            line,
            format!("index {raw} out of range ({len} defined)"),
        ));
    }
    Ok(resolved as usize)
}
