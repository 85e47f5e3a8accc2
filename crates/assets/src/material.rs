use crate::ParseError;
use glam::Vec3;

/// Decoded RGBA8 texture.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for TextureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

impl TextureData {
    /// Decode any image format enabled on the `image` crate.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }
}

/// A Phong material from an MTL library.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
    pub opacity: f32,
    /// `map_Kd` path, relative to the library file.
    pub diffuse_map: Option<String>,
    /// Filled in by the loader's texture preload.
    pub diffuse_texture: Option<TextureData>,
}

impl Material {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".into(),
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::splat(0x11 as f32 / 255.0),
            shininess: 30.0,
            opacity: 1.0,
            diffuse_map: None,
            diffuse_texture: None,
        }
    }
}

/// Materials in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, material: Material) {
        match self.materials.iter_mut().find(|m| m.name == material.name) {
            Some(existing) => *existing = material,
            None => self.materials.push(material),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.materials.iter().position(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Material> {
        self.materials.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Parse an MTL document.
pub fn parse_mtl(text: &str) -> Result<MaterialLibrary, ParseError> {
    let mut library = MaterialLibrary::new();
    let mut current: Option<Material> = None;

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

        if keyword == "newmtl" {
            if rest.is_empty() {
                return Err(ParseError::new(line_no, "newmtl without a name"));
            }
            if let Some(done) = current.take() {
                library.insert(done);
            }
            current = Some(Material::named(rest));
            continue;
        }

        let Some(material) = current.as_mut() else {
            tracing::trace!(line = line_no, keyword, "mtl directive before newmtl ignored");
            continue;
        };

        match keyword {
            "Ka" => material.ambient = parse_color(rest, line_no)?,
            "Kd" => material.diffuse = parse_color(rest, line_no)?,
            "Ks" => material.specular = parse_color(rest, line_no)?,
            "Ns" => material.shininess = parse_float(rest, line_no)?,
            "d" => material.opacity = parse_float(rest, line_no)?,
            "Tr" => material.opacity = 1.0 - parse_float(rest, line_no)?,
            "map_Kd" => {
                // Options like `-s 1 1 1` precede the file name.
                let path = rest
                    .split_whitespace()
                    .last()
                    .ok_or_else(|| ParseError::new(line_no, "map_Kd without a path"))?;
                material.diffuse_map = Some(path.replace('\\', "/"));
            }
            _ => {
                tracing::trace!(line = line_no, keyword, "unsupported mtl directive");
            }
        }
    }

    if let Some(done) = current.take() {
        library.insert(done);
    }
    Ok(library)
}

fn parse_float(s: &str, line: usize) -> Result<f32, ParseError> {
    let token = s
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new(line, "missing number"))?;
    token
        .parse::<f32>()
        .map_err(|_| ParseError::new(line, format!("invalid number {token:?}")))
}

/// `r [g b]`; a single component is used for all three.
fn parse_color(s: &str, line: usize) -> Result<Vec3, ParseError> {
    let values = s
        .split_whitespace()
        .map(|t| {
            t.parse::<f32>()
                .map_err(|_| ParseError::new(line, format!("invalid color component {t:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        [r] => Ok(Vec3::splat(*r)),
        [r, g, b, ..] => Ok(Vec3::new(*r, *g, *b)),
        _ => Err(ParseError::new(line, "expected 1 or 3 color components")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAFE_MTL: &str = "\
# cafe materials
newmtl Wood
Ns 96.078431
Ka 1.000000 1.000000 1.000000
Kd 0.640000 0.420000 0.200000
Ks 0.5 0.5 0.5
d 1.0
illum 2
map_Kd -s 1 1 1 textures\\wood.png

newmtl Glass
Kd 0.9
Tr 0.75
";

    #[test]
    fn parses_materials_in_order() {
        let lib = parse_mtl(CAFE_MTL).unwrap();
        assert_eq!(lib.len(), 2);
        let names: Vec<_> = lib.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Wood", "Glass"]);
        assert_eq!(lib.index_of("Glass"), Some(1));
    }

    #[test]
    fn parses_colors_and_scalars() {
        let lib = parse_mtl(CAFE_MTL).unwrap();
        let wood = lib.get("Wood").unwrap();
        assert_eq!(wood.diffuse, Vec3::new(0.64, 0.42, 0.2));
        assert_eq!(wood.ambient, Vec3::ONE);
        assert_eq!(wood.specular, Vec3::splat(0.5));
        assert!((wood.shininess - 96.078431).abs() < 1e-4);
        assert_eq!(wood.opacity, 1.0);
    }

    #[test]
    fn map_kd_skips_options_and_normalizes_separators() {
        let lib = parse_mtl(CAFE_MTL).unwrap();
        let wood = lib.get("Wood").unwrap();
        assert_eq!(wood.diffuse_map.as_deref(), Some("textures/wood.png"));
        assert!(wood.diffuse_texture.is_none());
    }

    #[test]
    fn single_component_color_and_transparency() {
        let lib = parse_mtl(CAFE_MTL).unwrap();
        let glass = lib.get("Glass").unwrap();
        assert_eq!(glass.diffuse, Vec3::splat(0.9));
        assert!((glass.opacity - 0.25).abs() < 1e-6);
        assert_eq!(glass.diffuse_map, None);
    }

    #[test]
    fn bad_number_reports_line() {
        let err = parse_mtl("newmtl A\nKd 1.0 oops 1.0\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("oops"));
    }

    #[test]
    fn newmtl_requires_name() {
        let err = parse_mtl("newmtl\n").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn directives_before_newmtl_are_ignored() {
        let lib = parse_mtl("Kd 1 0 0\nnewmtl A\n").unwrap();
        assert_eq!(lib.get("A").unwrap().diffuse, Vec3::ONE);
    }

    #[test]
    fn redefinition_replaces_material() {
        let lib = parse_mtl("newmtl A\nKd 1 0 0\nnewmtl A\nKd 0 1 0\n").unwrap();
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.get("A").unwrap().diffuse, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn empty_document_is_empty_library() {
        assert!(parse_mtl("# nothing here\n\n").unwrap().is_empty());
    }

    #[test]
    fn decodes_png_texture() {
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let tex = TextureData::decode(&bytes).unwrap();
        assert_eq!((tex.width, tex.height), (2, 3));
        assert_eq!(tex.rgba.len(), 2 * 3 * 4);
        assert_eq!(&tex.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn rejects_garbage_texture() {
        assert!(TextureData::decode(b"not an image").is_err());
    }
}
