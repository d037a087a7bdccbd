//! Light layer
//!
//! Render-to-texture lighting: the scene renders into an offscreen target,
//! lights render additively into a same-sized mask cleared to the ambient
//! color, and the mask multiplies the scene on its way to the screen.
//! Both passes share the world camera, so lights are placed in world
//! coordinates like any sprite.
//!
//! The blend modes come from two materials wrapping the engine's standard
//! passthrough shader. If the materials fail to build, the layer degrades
//! to drawing the scene unlit.

use macroquad::prelude::*;
use macroquad::miniquad::{BlendFactor, BlendState, BlendValue, Equation, PipelineParams, ShaderSource};
use crate::game::GameCamera;

const VERTEX_SHADER: &str = r#"#version 100
attribute vec3 position;
attribute vec2 texcoord;
attribute vec4 color0;
varying lowp vec2 uv;
varying lowp vec4 color;
uniform mat4 Model;
uniform mat4 Projection;
void main() {
    gl_Position = Projection * Model * vec4(position, 1);
    color = color0 / 255.0;
    uv = texcoord;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 100
varying lowp vec4 color;
varying lowp vec2 uv;
uniform sampler2D Texture;
void main() {
    gl_FragColor = color * texture2D(Texture, uv);
}
"#;

/// Falloff of a light towards its radius
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightMode {
    /// Smooth falloff to darkness at the radius
    Soft,
    /// Full brightness inside the radius, sharp edge
    Hard,
}

/// A single light in the scene
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub position: Vec2,
    pub radius: f32,
    pub color: Color,
    pub mode: LightMode,
}

struct BlendMaterials {
    /// One/One additive, for accumulating lights into the mask
    additive: Material,
    /// Dst*SrcColor multiply, for applying the mask to the scene
    multiply: Material,
}

fn blend_material(state: BlendState) -> Result<Material, macroquad::Error> {
    load_material(
        ShaderSource::Glsl {
            vertex: VERTEX_SHADER,
            fragment: FRAGMENT_SHADER,
        },
        MaterialParams {
            pipeline_params: PipelineParams {
                color_blend: Some(state),
                alpha_blend: Some(state),
                ..Default::default()
            },
            ..Default::default()
        },
    )
}

impl BlendMaterials {
    fn new() -> Result<Self, macroquad::Error> {
        Ok(Self {
            additive: blend_material(BlendState::new(
                Equation::Add,
                BlendFactor::One,
                BlendFactor::One,
            ))?,
            multiply: blend_material(BlendState::new(
                Equation::Add,
                BlendFactor::Zero,
                BlendFactor::Value(BlendValue::SourceColor),
            ))?,
        })
    }
}

/// Generate a radial falloff sprite sampled by every light of that mode
fn falloff_texture(mode: LightMode) -> Texture2D {
    const SIZE: u16 = 256;
    let mut image = Image::gen_image_color(SIZE, SIZE, BLACK);
    let center = SIZE as f32 / 2.0;
    for y in 0..SIZE as u32 {
        for x in 0..SIZE as u32 {
            let dx = (x as f32 + 0.5 - center) / center;
            let dy = (y as f32 + 0.5 - center) / center;
            let distance = (dx * dx + dy * dy).sqrt();
            let intensity = match mode {
                LightMode::Hard => {
                    if distance <= 1.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                LightMode::Soft => {
                    let t = (1.0 - distance).clamp(0.0, 1.0);
                    // smoothstep
                    t * t * (3.0 - 2.0 * t)
                }
            };
            image.set_pixel(x, y, Color::new(intensity, intensity, intensity, 1.0));
        }
    }
    let texture = Texture2D::from_image(&image);
    texture.set_filter(FilterMode::Linear);
    texture
}

/// Everything drawn between `begin` and `finish` gets rendered through the
/// light layer and composited to the screen with ambient + lights applied.
pub struct LightLayer {
    scene_target: RenderTarget,
    mask_target: RenderTarget,
    size: (u32, u32),
    materials: Option<BlendMaterials>,
    soft_falloff: Texture2D,
    hard_falloff: Texture2D,
    /// Light level of areas no light reaches
    pub ambient: Color,
    /// Lights rendered this frame; absent lights are simply off
    pub lights: Vec<Light>,
}

impl LightLayer {
    pub fn new(width: u32, height: u32, ambient: Color) -> Self {
        let materials = match BlendMaterials::new() {
            Ok(materials) => Some(materials),
            Err(e) => {
                warn!("Light layer materials unavailable ({}); rendering unlit", e);
                None
            }
        };
        Self {
            scene_target: make_target(width, height),
            mask_target: make_target(width, height),
            size: (width, height),
            materials,
            soft_falloff: falloff_texture(LightMode::Soft),
            hard_falloff: falloff_texture(LightMode::Hard),
            ambient,
            lights: Vec::new(),
        }
    }

    /// Redirect rendering into the scene target. The caller draws the
    /// world, then calls `finish`.
    pub fn begin(&mut self, camera: &GameCamera, clear: Color) {
        self.fit_to_screen();
        set_camera(&camera.to_target_camera(&self.scene_target));
        clear_background(clear);
    }

    /// Composite scene and lights to the screen and restore the default
    /// camera for GUI drawing.
    pub fn finish(&mut self, camera: &GameCamera) {
        let Some(materials) = &self.materials else {
            // No blend materials: show the scene unlit
            set_default_camera();
            draw_fullscreen(&self.scene_target.texture);
            return;
        };

        // Light mask: ambient everywhere, lights added on top, in the same
        // world space as the scene
        set_camera(&camera.to_target_camera(&self.mask_target));
        clear_background(self.ambient);
        gl_use_material(&materials.additive);
        for light in &self.lights {
            let falloff = match light.mode {
                LightMode::Soft => &self.soft_falloff,
                LightMode::Hard => &self.hard_falloff,
            };
            draw_texture_ex(
                falloff,
                light.position.x - light.radius,
                light.position.y - light.radius,
                light.color,
                DrawTextureParams {
                    dest_size: Some(vec2(light.radius * 2.0, light.radius * 2.0)),
                    ..Default::default()
                },
            );
        }
        gl_use_default_material();

        // Screen = scene * mask
        set_default_camera();
        draw_fullscreen(&self.scene_target.texture);
        gl_use_material(&materials.multiply);
        draw_fullscreen(&self.mask_target.texture);
        gl_use_default_material();
    }

    /// Recreate the targets when the window size changes
    fn fit_to_screen(&mut self) {
        let size = (screen_width() as u32, screen_height() as u32);
        if size != self.size && size.0 > 0 && size.1 > 0 {
            self.scene_target = make_target(size.0, size.1);
            self.mask_target = make_target(size.0, size.1);
            self.size = size;
        }
    }
}

fn draw_fullscreen(texture: &Texture2D) {
    draw_texture_ex(
        texture,
        0.0,
        0.0,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(screen_width(), screen_height())),
            ..Default::default()
        },
    );
}

fn make_target(width: u32, height: u32) -> RenderTarget {
    let target = render_target(width, height);
    target.texture.set_filter(FilterMode::Nearest);
    target
}
