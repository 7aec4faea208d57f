use glam::Mat4;

use super::{
    AttributeType, BlendFactor, BlendScope, BlendState, RenderDevice, Uniform, VertexAttribute,
};
use crate::assets::ShaderSource;
use crate::effects::Flashlight;
use crate::{BeatVizError, Result};

pub const FLASHLIGHT_VERTEX: &str = "assets/shaders/flashlight.vsh";
pub const FLASHLIGHT_FRAGMENT: &str = "assets/shaders/flashlight.fsh";

/// Uniforms written on every draw.
pub const FLASHLIGHT_UNIFORMS: [&str; 4] = ["cursorPosition", "radius", "dim", "invMatrix"];

/// Standard colour blending with additive alpha.
const FLASHLIGHT_BLEND: BlendState = BlendState::separate(
    BlendFactor::SrcAlpha,
    BlendFactor::OneMinusSrcAlpha,
    BlendFactor::One,
    BlendFactor::One,
);

/// Two triangles covering clip space.
const QUAD: [f32; 12] = [
    -1.0, -1.0, //
    1.0, -1.0, //
    1.0, 1.0, //
    1.0, 1.0, //
    -1.0, 1.0, //
    -1.0, -1.0, //
];

/// Draws the flashlight overlay. The shader program and quad are created
/// once and owned here; only uniform values change between frames.
pub struct FlashlightPass<D: RenderDevice> {
    shader: D::Shader,
    quad: D::Geometry,
}

impl<D: RenderDevice> FlashlightPass<D> {
    pub fn new(device: &mut D, assets: &impl ShaderSource) -> Result<Self> {
        let vertex = assets.get_string(FLASHLIGHT_VERTEX)?;
        let fragment = assets.get_string(FLASHLIGHT_FRAGMENT)?;

        let shader = device.create_shader(&vertex, &fragment)?;
        if let Some(missing) = FLASHLIGHT_UNIFORMS
            .iter()
            .find(|name| !device.has_uniform(&shader, name))
        {
            return Err(BeatVizError::MissingUniform((*missing).to_string()));
        }

        let quad = device.create_geometry(
            &[VertexAttribute {
                name: "in_position",
                kind: AttributeType::Vec2,
            }],
            &QUAD,
        )?;

        tracing::info!("flashlight pass ready");
        Ok(Self { shader, quad })
    }

    /// Draws with the values `flashlight` resolved on its last update.
    /// `matrix` maps playfield coordinates to clip space; the shader gets its
    /// inverse to recover playfield positions per fragment.
    pub fn draw(&self, device: &mut D, flashlight: &Flashlight, matrix: Mat4) {
        let mut device = BlendScope::new(device, FLASHLIGHT_BLEND);

        device.bind_shader(&self.shader);
        device.set_uniform(&self.shader, "cursorPosition", Uniform::Vec2(flashlight.position()));
        device.set_uniform(&self.shader, "radius", Uniform::Float(flashlight.size() as f32));
        device.set_uniform(&self.shader, "dim", Uniform::Float(flashlight.dim() as f32));
        device.set_uniform(&self.shader, "invMatrix", Uniform::Mat4(matrix.inverse()));

        device.bind_geometry(&self.quad);
        device.draw(&self.quad);
        device.unbind_geometry(&self.quad);

        device.unbind_shader(&self.shader);
    }
}
