use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::camera::ScrollCameraController;
use crate::scene::AnimationPlan;
use crate::starfield::ProceduralStarField;

/// Design constants for the hand-authored scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub scroll: ScrollCameraController,
    pub star_count: usize,
    pub stars: ProceduralStarField,
    pub torus: TorusConfig,
    pub point_light: PointLightConfig,
    pub ambient_color: u32,
    pub textures: TextureConfig,
    pub helpers: HelperConfig,
    /// Scrollable length of the simulated page on native windows, in pixels.
    pub page_length: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            scroll: ScrollCameraController::default(),
            star_count: 200,
            stars: ProceduralStarField::default(),
            torus: TorusConfig::default(),
            point_light: PointLightConfig::default(),
            ambient_color: 0x5ab5fa,
            textures: TextureConfig::default(),
            helpers: HelperConfig::default(),
            page_length: 4000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 100.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TorusConfig {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
    pub color: u32,
    pub spin: AnimationPlan,
}

impl Default for TorusConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            tube: 3.0,
            radial_segments: 16,
            tubular_segments: 100,
            color: 0xf983ff,
            spin: AnimationPlan::new(0.01, 0.008, 0.01),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLightConfig {
    pub color: u32,
    pub position: Vec3,
}

impl Default for PointLightConfig {
    fn default() -> Self {
        Self {
            color: 0xfddad3,
            position: Vec3::new(14.0, 16.0, 5.0),
        }
    }
}

/// Debug aids: a floor grid and a marker at the point light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HelperConfig {
    pub enabled: bool,
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub grid_color: u32,
    pub light_marker_size: f32,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            grid_size: 200.0,
            grid_divisions: 50,
            grid_color: 0x888888,
            light_marker_size: 1.0,
        }
    }
}

/// Texture paths resolved through the asset loader. `None` skips the texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureConfig {
    pub background: Option<String>,
    pub avatar: Option<String>,
    pub moon: Option<String>,
    pub moon_normal: Option<String>,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            background: Some("space.jpg".to_string()),
            avatar: Some("avatar.png".to_string()),
            moon: Some("moon.jpg".to_string()),
            moon_normal: Some("normal.jpg".to_string()),
        }
    }
}

impl TextureConfig {
    pub fn disabled() -> Self {
        Self {
            background: None,
            avatar: None,
            moon: None,
            moon_normal: None,
        }
    }
}

impl SceneConfig {
    /// Reads overrides from a `<scene>` document. Every element is optional.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        if !root.has_tag_name("scene") {
            return Err(anyhow!(
                "expected <scene> root element, found <{}>",
                root.tag_name().name()
            ));
        }
        let mut config = Self::default();

        if let Some(camera) = child(&root, "camera") {
            let target = &mut config.camera;
            target.fov = parse_f32(optional_text(&camera, "fov"), target.fov)?;
            target.near = parse_f32(optional_text(&camera, "near"), target.near)?;
            target.far = parse_f32(optional_text(&camera, "far"), target.far)?;
        }

        if let Some(scroll) = child(&root, "scroll") {
            config.scroll.gain = parse_vec3(optional_text(&scroll, "gain"), config.scroll.gain)
                .context("invalid <scroll><gain>")?;
            config.page_length =
                parse_f32(optional_text(&scroll, "page-length"), config.page_length)?;
        }

        if let Some(stars) = child(&root, "stars") {
            config.star_count = parse_usize(optional_text(&stars, "count"), config.star_count)?;
            let field = &mut config.stars;
            field.bound = parse_f32(optional_text(&stars, "bound"), field.bound)?;
            field.radius = parse_f32(optional_text(&stars, "radius"), field.radius)?;
            field.color = parse_hex(optional_text(&stars, "color"), field.color)?;
        }

        if let Some(torus) = child(&root, "torus") {
            let target = &mut config.torus;
            target.radius = parse_f32(optional_text(&torus, "radius"), target.radius)?;
            target.tube = parse_f32(optional_text(&torus, "tube"), target.tube)?;
            target.radial_segments = parse_usize(
                optional_text(&torus, "radial-segments"),
                target.radial_segments as usize,
            )? as u32;
            target.tubular_segments = parse_usize(
                optional_text(&torus, "tubular-segments"),
                target.tubular_segments as usize,
            )? as u32;
            target.color = parse_hex(optional_text(&torus, "color"), target.color)?;
            target.spin.delta = parse_vec3(optional_text(&torus, "spin"), target.spin.delta)
                .context("invalid <torus><spin>")?;
        }

        if let Some(light) = child(&root, "light") {
            let target = &mut config.point_light;
            target.color = parse_hex(optional_text(&light, "color"), target.color)?;
            target.position = parse_vec3(optional_text(&light, "position"), target.position)
                .context("invalid <light><position>")?;
        }

        config.ambient_color = parse_hex(optional_text(&root, "ambient"), config.ambient_color)?;

        if let Some(textures) = child(&root, "textures") {
            if textures.attribute("enabled") == Some("false") {
                config.textures = TextureConfig::disabled();
            } else {
                let target = &mut config.textures;
                for (tag, slot) in [
                    ("background", &mut target.background),
                    ("avatar", &mut target.avatar),
                    ("moon", &mut target.moon),
                    ("moon-normal", &mut target.moon_normal),
                ] {
                    if let Some(path) = optional_text(&textures, tag) {
                        *slot = Some(path);
                    }
                }
            }
        }

        if let Some(helpers) = child(&root, "helpers") {
            let target = &mut config.helpers;
            if helpers.attribute("enabled") == Some("false") {
                target.enabled = false;
            }
            if let Some(grid) = child(&helpers, "grid") {
                target.grid_size = parse_f32(optional_text(&grid, "size"), target.grid_size)?;
                target.grid_divisions = parse_usize(
                    optional_text(&grid, "divisions"),
                    target.grid_divisions as usize,
                )? as u32;
                target.grid_color = parse_hex(optional_text(&grid, "color"), target.grid_color)?;
            }
        }

        Ok(config)
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let numbers = value
        .split_whitespace()
        .map(|component| {
            let number = component
                .parse::<f32>()
                .map_err(|err| anyhow!("invalid vector component {component:?}: {err}"))?;
            finite(number, component)
        })
        .collect::<Result<Vec<_>>>()?;
    match numbers.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(anyhow!("expected 3 vector components, found {}", numbers.len())),
    }
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => {
            let number = value
                .parse::<f32>()
                .map_err(|err| anyhow!("failed to parse float {value:?}: {err}"))?;
            finite(number, &value)
        }
        None => Ok(default),
    }
}

// `f32::from_str` accepts "NaN" and "inf"; no scene value may be either.
fn finite(number: f32, text: &str) -> Result<f32> {
    if number.is_finite() {
        Ok(number)
    } else {
        Err(anyhow!("failed to parse {text:?}: value must be finite"))
    }
}

fn parse_usize(value: Option<String>, default: usize) -> Result<usize> {
    match value {
        Some(value) => value
            .parse::<usize>()
            .map_err(|err| anyhow!("failed to parse count {value:?}: {err}")),
        None => Ok(default),
    }
}

/// Accepts `#rrggbb`, `0xrrggbb` or bare `rrggbb`.
fn parse_hex(value: Option<String>, default: u32) -> Result<u32> {
    let Some(value) = value else {
        return Ok(default);
    };
    let digits = value
        .strip_prefix('#')
        .or_else(|| value.strip_prefix("0x"))
        .unwrap_or(&value);
    let color = u32::from_str_radix(digits, 16)
        .map_err(|err| anyhow!("failed to parse color {value:?}: {err}"))?;
    if color > 0xff_ffff {
        return Err(anyhow!("color {value:?} has more than 24 bits"));
    }
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
    <scene>
        <camera>
            <fov>75</fov>
        </camera>
        <scroll>
            <gain>0 0 -0.05</gain>
        </scroll>
        <stars>
            <count>12</count>
            <bound>5</bound>
        </stars>
        <torus>
            <color>#ff6347</color>
            <spin>0.02 0 0</spin>
        </torus>
        <ambient>0x202020</ambient>
        <textures>
            <moon>assets/moon.jpg</moon>
        </textures>
    </scene>
    "##;

    #[test]
    fn overrides_apply_and_defaults_remain() {
        let config = SceneConfig::from_xml(SAMPLE).unwrap();
        assert_eq!(config.camera.fov, 75.0);
        assert_eq!(config.camera.far, 1000.0);
        assert_eq!(config.scroll.gain, Vec3::new(0.0, 0.0, -0.05));
        assert_eq!(config.star_count, 12);
        assert_eq!(config.stars.bound, 5.0);
        assert_eq!(config.stars.radius, 0.25);
        assert_eq!(config.torus.color, 0xff6347);
        assert_eq!(config.torus.spin.delta, Vec3::new(0.02, 0.0, 0.0));
        assert_eq!(config.torus.radius, 10.0);
        assert_eq!(config.ambient_color, 0x202020);
        assert_eq!(config.textures.moon.as_deref(), Some("assets/moon.jpg"));
        assert_eq!(config.textures.background.as_deref(), Some("space.jpg"));
    }

    #[test]
    fn empty_scene_is_default() {
        assert_eq!(
            SceneConfig::from_xml("<scene/>").unwrap(),
            SceneConfig::default()
        );
    }

    #[test]
    fn textures_can_be_disabled() {
        let config =
            SceneConfig::from_xml(r#"<scene><textures enabled="false"/></scene>"#).unwrap();
        assert_eq!(config.textures, TextureConfig::disabled());
    }

    #[test]
    fn malformed_values_are_errors() {
        for xml in [
            "<scene><stars><count>many</count></stars></scene>",
            "<scene><torus><spin>1 2</spin></torus></scene>",
            "<scene><ambient>zzz</ambient></scene>",
            "<scene><stars><bound>NaN</bound></stars></scene>",
            "<scene><stars><radius>inf</radius></stars></scene>",
            "<scene><scroll><gain>0 -inf 0</gain></scroll></scene>",
            "<world/>",
        ] {
            assert!(SceneConfig::from_xml(xml).is_err(), "{xml} should be rejected");
        }
    }

    #[test]
    fn helpers_can_be_tuned_or_disabled() {
        let tuned = r#"
        <scene>
            <helpers>
                <grid><size>40</size><divisions>8</divisions></grid>
            </helpers>
        </scene>
        "#;
        let config = SceneConfig::from_xml(tuned).unwrap();
        assert!(config.helpers.enabled);
        assert_eq!(config.helpers.grid_size, 40.0);
        assert_eq!(config.helpers.grid_divisions, 8);

        let disabled = r#"<scene><helpers enabled="false"/></scene>"#;
        assert!(!SceneConfig::from_xml(disabled).unwrap().helpers.enabled);
    }

    #[test]
    fn default_constants_match_the_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.star_count, 200);
        assert_eq!(config.scroll.gain, Vec3::new(-0.0002, -0.0002, -0.01));
        assert_eq!(config.camera.fov, 100.0);
    }
}
