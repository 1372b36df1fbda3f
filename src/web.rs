#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use log::{error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use crate::app::build_scene;
use crate::assets::NoAssets;
use crate::config::{SceneConfig, TextureConfig};
use crate::error::{SceneError, SchedulerError};
use crate::input::wasm::DocumentScroll;
use crate::render::{RenderSurface, Renderer};
use crate::scene::SceneGraph;
use crate::scheduler::{AnimationScheduler, FrameHost};

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Binds the scene to the canvas with id `canvas_id` and starts animating.
#[wasm_bindgen]
pub fn run(canvas_id: String) -> Result<(), JsValue> {
    start(&canvas_id).map_err(|err| JsValue::from_str(&format!("{err:#}")))
}

fn start(canvas_id: &str) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| init_error("window not available"))?;
    let document = window
        .document()
        .ok_or_else(|| init_error("document not available"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| init_error("canvas element not found"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| init_error("element is not a canvas"))?;

    let mut renderer =
        Renderer::new(canvas).map_err(|err| init_error(&format!("canvas: {err:#}")))?;
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(1280.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(720.0);
    // One-time sizing; the canvas is not resized afterwards.
    renderer.configure_surface(window.device_pixel_ratio(), width as u32, height as u32);
    let (surface_width, surface_height) = renderer.size();

    let config = SceneConfig {
        textures: TextureConfig::disabled(),
        ..SceneConfig::default()
    };
    let scene = build_scene(
        &config,
        surface_width as f32 / surface_height.max(1) as f32,
        &NoAssets,
        &mut rand::rng(),
    );
    info!(
        "Loaded scene with {} entities ({} lights)",
        scene.entities().len(),
        scene.lights().len()
    );

    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let app = Rc::new(RefCell::new(WebApp {
        scene,
        scheduler: AnimationScheduler::new(config.scroll),
        renderer,
        scroll: DocumentScroll::attach()?,
        host: AnimationFrameHost {
            window,
            callback: Rc::clone(&callback),
        },
    }));

    let app_clone = Rc::clone(&app);
    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if let Err(err) = app_clone.borrow_mut().tick() {
            error!("animation loop stopped: {err}");
        }
    }) as Box<dyn FnMut()>));

    let mut state = app.borrow_mut();
    let WebApp { scheduler, host, .. } = &mut *state;
    scheduler.start(host)?;
    Ok(())
}

fn init_error(message: &str) -> anyhow::Error {
    anyhow!(SceneError::Initialization(message.to_string()))
}

struct WebApp {
    scene: SceneGraph,
    scheduler: AnimationScheduler,
    renderer: Renderer,
    scroll: DocumentScroll,
    host: AnimationFrameHost,
}

impl WebApp {
    fn tick(&mut self) -> Result<(), SchedulerError> {
        self.scheduler
            .tick(
                &mut self.scene,
                &self.scroll,
                &mut self.renderer,
                &mut self.host,
            )
            .map(|_| ())
    }
}

/// Schedules ticks through `requestAnimationFrame`.
struct AnimationFrameHost {
    window: web_sys::Window,
    callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl FrameHost for AnimationFrameHost {
    fn request_frame(&mut self) -> Result<()> {
        let callback = self.callback.borrow();
        let callback = callback
            .as_ref()
            .ok_or_else(|| anyhow!("animation callback not installed"))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|err| anyhow!("requestAnimationFrame failed: {err:?}"))?;
        Ok(())
    }
}
