use std::collections::BTreeSet;

use super::{BlendState, RenderDevice, Uniform, VertexAttribute};
use crate::{BeatVizError, Result};

/// Shader program held by a [`HeadlessDevice`].
#[derive(Debug, Clone)]
pub struct HeadlessShader {
    id: usize,
    uniforms: BTreeSet<String>,
}

impl HeadlessShader {
    pub fn uniforms(&self) -> impl Iterator<Item = &str> {
        self.uniforms.iter().map(String::as_str)
    }
}

/// Vertex data held by a [`HeadlessDevice`].
#[derive(Debug, Clone)]
pub struct HeadlessGeometry {
    id: usize,
    stride: usize,
    vertices: Vec<f32>,
}

impl HeadlessGeometry {
    pub fn vertex_count(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.vertices.len() / self.stride
        }
    }
}

/// Every state change or draw issued against a [`HeadlessDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    SetBlend(BlendState),
    BindShader(usize),
    SetUniform {
        shader: usize,
        name: String,
        value: Uniform,
    },
    UnbindShader(usize),
    BindGeometry(usize),
    Draw { geometry: usize, vertices: usize },
    UnbindGeometry(usize),
}

/// Device without a GPU behind it. Shader text is scanned for `uniform`
/// declarations and every call is logged, which is enough to drive the
/// visualiser offline and to inspect what a pass did.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    blend: BlendState,
    next_id: usize,
    bound_shader: Option<usize>,
    bound_geometry: Option<usize>,
    calls: Vec<DeviceCall>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Returns and clears the call log.
    pub fn take_calls(&mut self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn bound_shader(&self) -> Option<usize> {
        self.bound_shader
    }

    pub fn bound_geometry(&self) -> Option<usize> {
        self.bound_geometry
    }

    fn next_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderDevice for HeadlessDevice {
    type Shader = HeadlessShader;
    type Geometry = HeadlessGeometry;

    fn create_shader(&mut self, vertex: &str, fragment: &str) -> Result<HeadlessShader> {
        for (stage, source) in [("vertex", vertex), ("fragment", fragment)] {
            if !source.contains("void main") {
                return Err(BeatVizError::Shader(format!("{stage} stage has no entry point")));
            }
        }

        let uniforms = declared_uniforms(vertex)
            .chain(declared_uniforms(fragment))
            .collect();

        Ok(HeadlessShader {
            id: self.next_id(),
            uniforms,
        })
    }

    fn create_geometry(
        &mut self,
        attributes: &[VertexAttribute],
        vertices: &[f32],
    ) -> Result<HeadlessGeometry> {
        let stride: usize = attributes.iter().map(|attr| attr.kind.components()).sum();
        if stride == 0 || vertices.len() % stride != 0 {
            return Err(BeatVizError::msg(format!(
                "{} floats do not fit a vertex stride of {stride}",
                vertices.len()
            )));
        }

        Ok(HeadlessGeometry {
            id: self.next_id(),
            stride,
            vertices: vertices.to_vec(),
        })
    }

    fn has_uniform(&self, shader: &HeadlessShader, name: &str) -> bool {
        shader.uniforms.contains(name)
    }

    fn blend_state(&self) -> BlendState {
        self.blend
    }

    fn set_blend_state(&mut self, state: BlendState) {
        self.blend = state;
        self.calls.push(DeviceCall::SetBlend(state));
    }

    fn bind_shader(&mut self, shader: &HeadlessShader) {
        self.bound_shader = Some(shader.id);
        self.calls.push(DeviceCall::BindShader(shader.id));
    }

    fn set_uniform(&mut self, shader: &HeadlessShader, name: &str, value: Uniform) {
        if !shader.uniforms.contains(name) {
            tracing::warn!(shader = shader.id, name, "uniform is not declared by shader");
        }

        self.calls.push(DeviceCall::SetUniform {
            shader: shader.id,
            name: name.to_string(),
            value,
        });
    }

    fn unbind_shader(&mut self, shader: &HeadlessShader) {
        self.bound_shader = None;
        self.calls.push(DeviceCall::UnbindShader(shader.id));
    }

    fn bind_geometry(&mut self, geometry: &HeadlessGeometry) {
        self.bound_geometry = Some(geometry.id);
        self.calls.push(DeviceCall::BindGeometry(geometry.id));
    }

    fn draw(&mut self, geometry: &HeadlessGeometry) {
        self.calls.push(DeviceCall::Draw {
            geometry: geometry.id,
            vertices: geometry.vertex_count(),
        });
    }

    fn unbind_geometry(&mut self, geometry: &HeadlessGeometry) {
        self.bound_geometry = None;
        self.calls.push(DeviceCall::UnbindGeometry(geometry.id));
    }
}

/// Names declared with `uniform <type> <name>;` in GLSL source.
fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let mut tokens = line.trim().trim_end_matches(';').split_whitespace();
        if tokens.next()? != "uniform" {
            return None;
        }
        let _ty = tokens.next()?;
        let name = tokens.next()?.trim_end_matches(';');
        Some(name.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::AttributeType;

    const VERTEX: &str = "#version 330\nuniform mat4 proj;\nin vec2 in_position;\nvoid main() {}\n";
    const FRAGMENT: &str =
        "#version 330\nuniform float alpha;\nuniform vec2 centre;\nvoid main() {}\n";

    #[test]
    fn collects_uniforms_from_both_stages() {
        let mut device = HeadlessDevice::new();
        let shader = device.create_shader(VERTEX, FRAGMENT).unwrap();

        let names: Vec<_> = shader.uniforms().collect();
        assert_eq!(names, vec!["alpha", "centre", "proj"]);
        assert!(device.has_uniform(&shader, "proj"));
        assert!(!device.has_uniform(&shader, "in_position"));
    }

    #[test]
    fn rejects_shader_without_entry_point() {
        let mut device = HeadlessDevice::new();
        let err = device.create_shader(VERTEX, "uniform float a;").unwrap_err();

        assert!(format!("{err}").contains("fragment"));
    }

    #[test]
    fn geometry_must_fill_whole_vertices() {
        let mut device = HeadlessDevice::new();
        let layout = [VertexAttribute {
            name: "in_position",
            kind: AttributeType::Vec2,
        }];

        let quad = device.create_geometry(&layout, &[0.0; 12]).unwrap();
        assert_eq!(quad.vertex_count(), 6);
        assert!(device.create_geometry(&layout, &[0.0; 5]).is_err());
    }
}
