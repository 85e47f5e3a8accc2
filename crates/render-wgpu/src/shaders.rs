/// WGSL shader for lit, optionally textured OBJ meshes.
///
/// Lighting follows the Phong model: one ambient term plus one directional
/// light with a Blinn half-vector specular highlight.
pub const MODEL_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
    ambient: vec4<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
};

struct ModelUniform {
    model: mat4x4<f32>,
    normal: mat4x4<f32>,
};

struct MaterialUniform {
    // rgb diffuse, a opacity
    diffuse: vec4<f32>,
    // rgb specular, a shininess
    specular: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> instance: ModelUniform;

@group(2) @binding(0)
var<uniform> material: MaterialUniform;
@group(2) @binding(1)
var diffuse_map: texture_2d<f32>;
@group(2) @binding(2)
var diffuse_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = instance.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = globals.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = (instance.normal * vec4<f32>(vertex.normal, 0.0)).xyz;
    // OBJ texture space starts bottom-left
    out.uv = vec2<f32>(vertex.uv.x, 1.0 - vertex.uv.y);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(diffuse_map, diffuse_sampler, in.uv);
    let base = material.diffuse.rgb * texel.rgb;

    let n = normalize(in.world_normal);
    let l = normalize(globals.light_dir.xyz);
    let v = normalize(globals.eye.xyz - in.world_position);
    let h = normalize(l + v);

    let lambert = max(dot(n, l), 0.0);
    var highlight = 0.0;
    if (lambert > 0.0) {
        highlight = pow(max(dot(n, h), 0.0), max(material.specular.a, 1.0));
    }

    let color = globals.ambient.rgb * base
        + globals.light_color.rgb * (base * lambert + material.specular.rgb * highlight);
    return vec4<f32>(color, material.diffuse.a * texel.a);
}
"#;
