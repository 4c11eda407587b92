//! GLSL sources for the shared composite and colour-lookup programs.

use crate::render::device::ShaderSource;

pub const UNIFORM_SOURCE: &str = "u_source";
pub const UNIFORM_COLOUR: &str = "u_colour";
pub const UNIFORM_LUT: &str = "u_lut";
pub const UNIFORM_LUT_SIZE: &str = "u_lut_size";
pub const UNIFORM_DOMAIN_MIN: &str = "u_domain_min";
pub const UNIFORM_DOMAIN_MAX: &str = "u_domain_max";

/// Texture unit carrying the clip source.
pub const SOURCE_UNIT: u32 = 0;
/// Texture unit carrying a colour lookup table.
pub const LUT_UNIT: u32 = 1;

const QUAD_VERTEX: &str = r#"#version 330 core
layout(location = 0) in vec2 a_pos;
layout(location = 1) in vec2 a_uv;
uniform mat4 u_mvp;
out vec2 v_uv;
void main() {
    v_uv = a_uv;
    gl_Position = u_mvp * vec4(a_pos, 0.0, 1.0);
}
"#;

const COMPOSITE_FRAGMENT: &str = r#"#version 330 core
in vec2 v_uv;
uniform sampler2D u_source;
uniform vec4 u_colour;
out vec4 o_colour;
void main() {
    o_colour = texture(u_source, v_uv) * u_colour;
}
"#;

const LUT3D_FRAGMENT: &str = r#"#version 330 core
in vec2 v_uv;
uniform sampler2D u_source;
uniform sampler3D u_lut;
uniform float u_lut_size;
uniform vec3 u_domain_min;
uniform vec3 u_domain_max;
uniform vec4 u_colour;
out vec4 o_colour;
void main() {
    vec4 src = texture(u_source, v_uv);
    vec3 c = clamp((src.rgb - u_domain_min) / (u_domain_max - u_domain_min), 0.0, 1.0);
    vec3 coord = (c * (u_lut_size - 1.0) + 0.5) / u_lut_size;
    o_colour = vec4(texture(u_lut, coord).rgb, src.a) * u_colour;
}
"#;

const LUT1D_FRAGMENT: &str = r#"#version 330 core
in vec2 v_uv;
uniform sampler2D u_source;
uniform sampler1D u_lut;
uniform float u_lut_size;
uniform vec3 u_domain_min;
uniform vec3 u_domain_max;
uniform vec4 u_colour;
out vec4 o_colour;
void main() {
    vec4 src = texture(u_source, v_uv);
    vec3 c = clamp((src.rgb - u_domain_min) / (u_domain_max - u_domain_min), 0.0, 1.0);
    vec3 coord = (c * (u_lut_size - 1.0) + 0.5) / u_lut_size;
    vec3 mapped = vec3(texture(u_lut, coord.r).r, texture(u_lut, coord.g).g, texture(u_lut, coord.b).b);
    o_colour = vec4(mapped, src.a) * u_colour;
}
"#;

pub fn composite() -> ShaderSource {
    ShaderSource {
        vertex: QUAD_VERTEX.to_string(),
        fragment: COMPOSITE_FRAGMENT.to_string(),
    }
}

pub fn lut3d() -> ShaderSource {
    ShaderSource {
        vertex: QUAD_VERTEX.to_string(),
        fragment: LUT3D_FRAGMENT.to_string(),
    }
}

pub fn lut1d() -> ShaderSource {
    ShaderSource {
        vertex: QUAD_VERTEX.to_string(),
        fragment: LUT1D_FRAGMENT.to_string(),
    }
}

pub const COMPOSITE_UNIFORMS: &[&str] = &[UNIFORM_SOURCE, UNIFORM_COLOUR];

pub const LUT_UNIFORMS: &[&str] = &[
    UNIFORM_SOURCE,
    UNIFORM_COLOUR,
    UNIFORM_LUT,
    UNIFORM_LUT_SIZE,
    UNIFORM_DOMAIN_MIN,
    UNIFORM_DOMAIN_MAX,
];
