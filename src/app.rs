use std::fmt::Write;

use glam::Vec3;
use log::info;
use rand::Rng;

use crate::assets::{load_optional, AssetLoader};
use crate::config::SceneConfig;
use crate::scene::{color_from_hex, Camera, Entity, Geometry, Light, Material, SceneGraph};

/// Assembles the full scene: torus, lights, props and star field.
pub fn build_scene<R: Rng + ?Sized>(
    config: &SceneConfig,
    aspect: f32,
    loader: &dyn AssetLoader,
    rng: &mut R,
) -> SceneGraph {
    let mut scene = SceneGraph::new(Camera::perspective(
        config.camera.fov,
        aspect,
        config.camera.near,
        config.camera.far,
    ));

    let torus = &config.torus;
    scene.add(
        Entity::new(
            "torus",
            Geometry::Torus {
                radius: torus.radius,
                tube: torus.tube,
                radial_segments: torus.radial_segments,
                tubular_segments: torus.tubular_segments,
            },
            Material::from_hex(torus.color),
        )
        .animated(torus.spin),
    );

    scene.add(Light::point(
        color_from_hex(config.point_light.color),
        config.point_light.position,
    ));
    scene.add(Light::ambient(color_from_hex(config.ambient_color)));

    let textures = &config.textures;
    scene.add(
        Entity::new(
            "avatar",
            Geometry::Cuboid {
                width: 3.0,
                height: 3.0,
                depth: 3.0,
            },
            Material::from_hex(0xffffff)
                .with_texture(load_optional(loader, textures.avatar.as_deref())),
        )
        .at(Vec3::new(2.0, 0.0, -5.0)),
    );
    scene.add(
        Entity::new(
            "moon",
            Geometry::Sphere {
                radius: 3.0,
                width_segments: 32,
                height_segments: 32,
            },
            Material::from_hex(0xffffff)
                .with_texture(load_optional(loader, textures.moon.as_deref()))
                .with_normal_map(load_optional(loader, textures.moon_normal.as_deref())),
        )
        .at(Vec3::new(-10.0, 0.0, 30.0)),
    );
    scene.set_background(load_optional(loader, textures.background.as_deref()));

    let helpers = &config.helpers;
    if helpers.enabled {
        // coarse sphere in the light's color marks where it sits
        scene.add(
            Entity::new(
                "light-helper",
                Geometry::Sphere {
                    radius: helpers.light_marker_size,
                    width_segments: 4,
                    height_segments: 2,
                },
                Material::from_hex(config.point_light.color),
            )
            .at(config.point_light.position),
        );
        scene.add(Entity::new(
            "grid",
            Geometry::Grid {
                size: helpers.grid_size,
                divisions: helpers.grid_divisions,
            },
            Material::from_hex(helpers.grid_color),
        ));
    }

    config.stars.populate_with(&mut scene, config.star_count, rng);

    info!(
        "scene assembled: {} entities, {} lights",
        scene.entities().len(),
        scene.lights().len()
    );
    scene
}

/// Human-readable summary of the scene after `ticks` frames.
pub fn final_state_report(scene: &SceneGraph, ticks: u64) -> String {
    let mut report = String::new();
    let camera = scene.camera().transform.position;
    let _ = writeln!(report, "Final scene state after {ticks} tick(s):");
    let _ = writeln!(report, " - camera pos={}", triple(camera));
    let mut stars = 0;
    for entity in scene.entities() {
        if entity.name == "star" {
            stars += 1;
            continue;
        }
        let _ = writeln!(
            report,
            " - {} pos={} rot={}",
            entity.name,
            triple(entity.transform.position),
            triple(entity.transform.rotation)
        );
    }
    let _ = writeln!(report, " - {stars} star(s)");
    report
}

fn triple(value: Vec3) -> String {
    // round to the printed precision first so tiny negatives print as 0.00,
    // then adding zero folds -0.0 into 0.0
    let value = (value * 100.0).round() / 100.0 + Vec3::ZERO;
    format!("({:.2}, {:.2}, {:.2})", value.x, value.y, value.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::NoAssets;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene() -> SceneGraph {
        build_scene(
            &SceneConfig::default(),
            16.0 / 9.0,
            &NoAssets,
            &mut StdRng::seed_from_u64(3),
        )
    }

    #[test]
    fn default_scene_contents() {
        let scene = scene();
        assert_eq!(scene.entities().len(), 205);
        assert_eq!(
            scene.entities().iter().filter(|e| e.name == "star").count(),
            200
        );
        assert_eq!(scene.lights().len(), 2);
        assert_eq!(scene.camera().fov, 100.0);
        assert!((scene.camera().aspect - 16.0 / 9.0).abs() < f32::EPSILON);

        let torus = scene.find("torus").unwrap();
        assert!(torus.animation.is_some());
        assert!(scene.find("moon").unwrap().animation.is_none());
        assert_eq!(
            scene.find("moon").unwrap().transform.position,
            Vec3::new(-10.0, 0.0, 30.0)
        );

        let marker = scene.find("light-helper").unwrap();
        assert_eq!(marker.transform.position, Vec3::new(14.0, 16.0, 5.0));
        assert_eq!(marker.material.color, color_from_hex(0xfddad3));
        assert_eq!(
            scene.find("grid").unwrap().geometry,
            Geometry::Grid {
                size: 200.0,
                divisions: 50
            }
        );
    }

    #[test]
    fn helpers_can_be_left_out() {
        let mut config = SceneConfig::default();
        config.helpers.enabled = false;
        let scene = build_scene(&config, 1.0, &NoAssets, &mut StdRng::seed_from_u64(3));
        assert_eq!(scene.entities().len(), 203);
        assert!(scene.find("grid").is_none());
        assert!(scene.find("light-helper").is_none());
    }

    #[test]
    fn missing_textures_leave_flat_materials() {
        let scene = scene();
        assert!(scene.background().is_none());
        assert!(scene.find("avatar").unwrap().material.texture.is_none());
    }

    #[test]
    fn report_never_prints_negative_zero() {
        let mut scene = scene();
        scene.camera_mut().transform.position = Vec3::splat(-0.0);
        let report = final_state_report(&scene, 1);
        assert!(report.contains(" - camera pos=(0.00, 0.00, 0.00)"));

        scene.camera_mut().transform.position = Vec3::new(-0.0002, -0.004, 0.004);
        let report = final_state_report(&scene, 1);
        assert!(report.contains(" - camera pos=(0.00, 0.00, 0.00)"));
    }

    #[test]
    fn report_lists_named_entities_and_star_count() {
        let report = final_state_report(&scene(), 0);
        assert!(report.contains("after 0 tick(s)"));
        assert!(report.contains(" - torus pos=(0.00, 0.00, 0.00) rot=(0.00, 0.00, 0.00)"));
        assert!(report.contains(" - 200 star(s)"));
        assert!(!report.contains(" - star pos"));
    }
}
