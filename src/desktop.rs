use std::env;
use std::fs;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::Window;

use scrollscape::{
    build_scene, final_state_report, AnimationScheduler, FixedScroll, FrameHost, FsAssetLoader,
    HeadlessSurface, RenderSurface, Renderer, SceneConfig, SceneError, SceneGraph, WheelScroll,
};

/// Pixels scrolled per wheel notch when the platform reports lines.
const LINE_HEIGHT: f32 = 40.0;

pub fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let mut config = match &options.scene {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read scene file {path}"))?;
            SceneConfig::from_xml(&xml).with_context(|| format!("failed to parse {path}"))?
        }
        None => SceneConfig::default(),
    };
    if let Some(stars) = options.stars {
        config.star_count = stars;
    }

    if options.headless {
        run_headless(&config, &options)
    } else {
        match run_interactive(&config, &options) {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.downcast_ref::<SceneError>().is_some() {
                    eprintln!(
                        "{err}. Falling back to --headless mode \
                         (set DISPLAY or install a GPU driver to enable rendering)."
                    );
                    run_headless(&config, &options)
                } else {
                    Err(err)
                }
            }
        }
    }
}

fn print_scene_summary(scene: &SceneGraph) {
    println!(
        "Loaded scene with {} entities ({} lights)",
        scene.entities().len(),
        scene.lights().len()
    );
}

fn run_headless(config: &SceneConfig, options: &CliOptions) -> Result<()> {
    let loader = FsAssetLoader::new(&options.assets);
    let mut scene = build_scene(config, 16.0 / 9.0, &loader, &mut rand::rng());
    print_scene_summary(&scene);

    let mut surface = HeadlessSurface::new();
    surface.configure_surface(1.0, 1280, 720);
    let scroll = FixedScroll(options.scroll);
    let mut host = HeadlessHost::default();
    let mut scheduler = AnimationScheduler::new(config.scroll);

    scheduler.start(&mut host)?;
    while scheduler.ticks() < options.frames && host.take_request() {
        scheduler.tick(&mut scene, &scroll, &mut surface, &mut host)?;
    }
    println!("Presented {} frame(s)", surface.frames_presented());
    print!("{}", final_state_report(&scene, scheduler.ticks()));
    Ok(())
}

/// Frame host for headless runs: a requested frame runs on the next loop turn.
#[derive(Debug, Default)]
struct HeadlessHost {
    pending: bool,
}

impl HeadlessHost {
    fn take_request(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl FrameHost for HeadlessHost {
    fn request_frame(&mut self) -> Result<()> {
        self.pending = true;
        Ok(())
    }
}

/// Frame host backed by the window's redraw requests.
struct WindowHost {
    window: Arc<Window>,
}

impl FrameHost for WindowHost {
    fn request_frame(&mut self) -> Result<()> {
        self.window.request_redraw();
        Ok(())
    }
}

fn run_interactive(config: &SceneConfig, options: &CliOptions) -> Result<()> {
    let event_loop = EventLoop::new()
        .map_err(|err| SceneError::Initialization(format!("event loop: {err}")))?;
    // Resizing is not supported; the surface keeps its startup size.
    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("scrollscape")
                    .with_inner_size(LogicalSize::new(1280.0, 720.0))
                    .with_resizable(false),
            )
            .map_err(|err| SceneError::Initialization(format!("window: {err}")))?,
    );

    let mut renderer = block_on(Renderer::new(Arc::clone(&window)))?;
    let scale = window.scale_factor();
    let logical = window.inner_size().to_logical::<u32>(scale);
    renderer.configure_surface(scale, logical.width, logical.height);
    let size = renderer.size();
    let aspect = size.width as f32 / size.height.max(1) as f32;

    let loader = FsAssetLoader::new(&options.assets);
    let scene = build_scene(config, aspect, &loader, &mut rand::rng());
    print_scene_summary(&scene);

    let mut app = AppState {
        scene,
        scheduler: AnimationScheduler::new(config.scroll),
        renderer,
        scroll: Arc::new(WheelScroll::new(config.page_length)),
        host: WindowHost { window },
        last_error: None,
    };

    #[allow(deprecated)]
    event_loop.run(|event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);
        if let Err(err) = app.process_event(&event, elwt) {
            app.last_error = Some(err);
            elwt.exit();
        }
    })?;

    print!("{}", final_state_report(&app.scene, app.scheduler.ticks()));
    match app.last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct AppState {
    scene: SceneGraph,
    scheduler: AnimationScheduler,
    renderer: Renderer,
    scroll: Arc<WheelScroll>,
    host: WindowHost,
    last_error: Option<anyhow::Error>,
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, elwt: &ActiveEventLoop) -> Result<()> {
        match event {
            Event::Resumed => {
                self.scheduler.start(&mut self.host)?;
            }
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::MouseWheel { delta, .. } => {
                        let pixels = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y * LINE_HEIGHT,
                            MouseScrollDelta::PixelDelta(position) => position.y as f32,
                        };
                        self.scroll.scroll_by(pixels);
                    }
                    WindowEvent::Resized(size) => {
                        debug!("ignoring resize to {}x{}", size.width, size.height);
                    }
                    WindowEvent::RedrawRequested => {
                        self.scheduler.tick(
                            &mut self.scene,
                            &self.scroll,
                            &mut self.renderer,
                            &mut self.host,
                        )?;
                    }
                    _ => {}
                }
            }
            Event::LoopExiting => {
                info!("animation loop exiting after {} tick(s)", self.scheduler.ticks());
            }
            _ => {}
        }
        Ok(())
    }
}

struct CliOptions {
    scene: Option<String>,
    assets: String,
    headless: bool,
    frames: u64,
    scroll: f32,
    stars: Option<usize>,
}

const USAGE: &str = concat!(
    "Usage: scrollscape [--scene <file.xml>] [--assets <dir>] [--headless] ",
    "[--frames N] [--scroll PIXELS] [--stars N]"
);

impl CliOptions {
    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            scene: None,
            assets: ".".to_string(),
            headless: false,
            frames: 60,
            scroll: 0.0,
            stars: None,
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--headless" => options.headless = true,
                "--scene" => options.scene = Some(value(&mut args, "--scene")?),
                "--assets" => options.assets = value(&mut args, "--assets")?,
                "--frames" => {
                    options.frames = value(&mut args, "--frames")?
                        .parse()
                        .context("--frames expects a whole number")?;
                }
                "--scroll" => {
                    options.scroll = value(&mut args, "--scroll")?
                        .parse()
                        .context("--scroll expects a number of pixels")?;
                }
                "--stars" => {
                    options.stars = Some(
                        value(&mut args, "--stars")?
                            .parse()
                            .context("--stars expects a whole number")?,
                    );
                }
                other => return Err(anyhow!("Unknown argument: {other}. {USAGE}")),
            }
        }
        Ok(options)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse_from(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn defaults_without_arguments() {
        let options = parse(&[]).unwrap();
        assert!(!options.headless);
        assert_eq!(options.frames, 60);
        assert_eq!(options.assets, ".");
        assert!(options.scene.is_none());
    }

    #[test]
    fn negative_scroll_is_a_value_not_a_flag() {
        let options = parse(&["--headless", "--scroll", "-1000", "--frames", "5"]).unwrap();
        assert!(options.headless);
        assert_eq!(options.scroll, -1000.0);
        assert_eq!(options.frames, 5);
    }

    #[test]
    fn rejects_unknown_flags_and_missing_values() {
        assert!(parse(&["--fast"]).is_err());
        assert!(parse(&["--frames"]).is_err());
        assert!(parse(&["--stars", "lots"]).is_err());
    }
}
