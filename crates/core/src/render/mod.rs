//! Rendering seam.
//!
//! GPU resources are owned by whoever created them through a
//! [`RenderDevice`]; the device itself only sees them by reference. Blend
//! state is a device-wide setting that passes change through a
//! [`BlendScope`], which puts the previous state back when dropped.

use std::ops::{Deref, DerefMut};

use glam::{Mat4, Vec2};

use crate::Result;

mod flashlight;
mod headless;

pub use flashlight::{FlashlightPass, FLASHLIGHT_FRAGMENT, FLASHLIGHT_UNIFORMS, FLASHLIGHT_VERTEX};
pub use headless::{DeviceCall, HeadlessDevice, HeadlessGeometry, HeadlessShader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
}

/// Separate colour and alpha blend functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl BlendState {
    /// Same factors for colour and alpha.
    pub const fn function(src: BlendFactor, dst: BlendFactor) -> Self {
        Self::separate(src, dst, src, dst)
    }

    pub const fn separate(
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) -> Self {
        Self {
            src_color,
            dst_color,
            src_alpha,
            dst_alpha,
        }
    }
}

impl Default for BlendState {
    fn default() -> Self {
        Self::function(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl AttributeType {
    pub fn components(self) -> usize {
        match self {
            Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub kind: AttributeType,
}

/// Values a pass can push into a shader uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Float(f32),
    Vec2(Vec2),
    Mat4(Mat4),
}

/// Opaque-handle view of a graphics backend.
pub trait RenderDevice {
    type Shader;
    type Geometry;

    fn create_shader(&mut self, vertex: &str, fragment: &str) -> Result<Self::Shader>;

    /// Uploads interleaved `vertices` laid out as `attributes`.
    fn create_geometry(
        &mut self,
        attributes: &[VertexAttribute],
        vertices: &[f32],
    ) -> Result<Self::Geometry>;

    fn has_uniform(&self, shader: &Self::Shader, name: &str) -> bool;

    fn blend_state(&self) -> BlendState;
    fn set_blend_state(&mut self, state: BlendState);

    fn bind_shader(&mut self, shader: &Self::Shader);
    fn set_uniform(&mut self, shader: &Self::Shader, name: &str, value: Uniform);
    fn unbind_shader(&mut self, shader: &Self::Shader);

    fn bind_geometry(&mut self, geometry: &Self::Geometry);
    fn draw(&mut self, geometry: &Self::Geometry);
    fn unbind_geometry(&mut self, geometry: &Self::Geometry);
}

/// Scoped blend state change. Derefs to the device so drawing happens
/// through the scope; the saved state is restored on drop.
pub struct BlendScope<'a, D: RenderDevice> {
    device: &'a mut D,
    saved: BlendState,
}

impl<'a, D: RenderDevice> BlendScope<'a, D> {
    pub fn new(device: &'a mut D, state: BlendState) -> Self {
        let saved = device.blend_state();
        device.set_blend_state(state);
        Self { device, saved }
    }
}

impl<D: RenderDevice> Deref for BlendScope<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.device
    }
}

impl<D: RenderDevice> DerefMut for BlendScope<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.device
    }
}

impl<D: RenderDevice> Drop for BlendScope<'_, D> {
    fn drop(&mut self) {
        self.device.set_blend_state(self.saved);
    }
}
