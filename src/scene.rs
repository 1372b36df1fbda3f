use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::assets::TextureHandle;

/// Placement of an entity, light or camera. Rotation is XYZ Euler radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Model matrix: translation * rotation * scale.
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

/// Shape descriptor; tessellation is left to the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Cuboid {
        width: f32,
        height: f32,
        depth: f32,
    },
    /// Square line grid on the XZ plane, `size` across.
    Grid { size: f32, divisions: u32 },
}

/// Surface description. Textures are optional and purely decorative.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Vec3,
    pub texture: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
}

impl Material {
    pub fn from_hex(hex: u32) -> Self {
        Self {
            color: color_from_hex(hex),
            texture: None,
            normal_map: None,
        }
    }

    pub fn with_texture(mut self, texture: Option<TextureHandle>) -> Self {
        self.texture = texture;
        self
    }

    pub fn with_normal_map(mut self, normal_map: Option<TextureHandle>) -> Self {
        self.normal_map = normal_map;
        self
    }
}

/// Converts a `0xRRGGBB` literal into linear 0..1 components.
pub fn color_from_hex(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32;
    let g = ((hex >> 8) & 0xff) as f32;
    let b = (hex & 0xff) as f32;
    Vec3::new(r / 255.0, g / 255.0, b / 255.0)
}

/// Fixed per-tick rotation increment, radians per tick on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationPlan {
    pub delta: Vec3,
}

impl AnimationPlan {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            delta: Vec3::new(x, y, z),
        }
    }

    pub fn apply(&self, transform: &mut Transform) {
        transform.rotation += self.delta;
    }
}

/// A renderable object owned by the [`SceneGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub geometry: Geometry,
    pub material: Material,
    pub transform: Transform,
    pub animation: Option<AnimationPlan>,
}

impl Entity {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            transform: Transform::default(),
            animation: None,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn animated(mut self, plan: AnimationPlan) -> Self {
        self.animation = Some(plan);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightKind {
    Point,
    Ambient,
}

/// Light source. Only point lights carry a transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    pub transform: Option<Transform>,
}

impl Light {
    pub fn point(color: Vec3, position: Vec3) -> Self {
        Self {
            kind: LightKind::Point,
            color,
            intensity: 1.0,
            transform: Some(Transform::from_position(position)),
        }
    }

    pub fn ambient(color: Vec3) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity: 1.0,
            transform: None,
        }
    }

    pub fn position(&self) -> Option<Vec3> {
        self.transform.map(|transform| transform.position)
    }
}

/// Perspective camera. `fov` is the vertical field of view in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub transform: Transform,
}

impl Camera {
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
            transform: Transform::default(),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(75.0, 1.0, 0.1, 1000.0)
    }
}

/// Anything that can be placed in a [`SceneGraph`].
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Entity(Entity),
    Light(Light),
}

impl From<Entity> for SceneNode {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

impl From<Light> for SceneNode {
    fn from(light: Light) -> Self {
        Self::Light(light)
    }
}

/// Index of a node inside its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    Entity(usize),
    Light(usize),
}

/// Flat, ordered collection of entities and lights plus the active camera.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    entities: Vec<Entity>,
    lights: Vec<Light>,
    camera: Camera,
    background: Option<TextureHandle>,
}

impl SceneGraph {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    /// Appends an entity or light; insertion order is preserved.
    pub fn add(&mut self, node: impl Into<SceneNode>) -> NodeId {
        match node.into() {
            SceneNode::Entity(entity) => {
                self.entities.push(entity);
                NodeId::Entity(self.entities.len() - 1)
            }
            SceneNode::Light(light) => {
                self.lights.push(light);
                NodeId::Light(self.lights.len() - 1)
            }
        }
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn entity(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// First entity with the given name, in insertion order.
    pub fn find(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    pub fn set_background(&mut self, texture: Option<TextureHandle>) {
        self.background = texture;
    }

    pub fn background(&self) -> Option<&TextureHandle> {
        self.background.as_ref()
    }
}
