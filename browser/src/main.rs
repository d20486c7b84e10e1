mod surface;
mod wheel;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use pixels::{Pixels, SurfaceTexture};
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use engine::{FixedMetrics, FontManager, NetworkConfig, NetworkManager, Page, TypeMetrics, Viewport};
use surface::PixelSurface;
use wheel::WheelScroll;

/// Quire - renders the text of a web page
#[derive(Parser, Debug)]
#[command(name = "quire", version, about)]
struct Cli {
    /// Page to open (http://, https:// or file://)
    #[arg(value_name = "URL")]
    address: String,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Pixels moved per scroll event
    #[arg(long, default_value_t = 100.0)]
    scroll_step: f32,

    /// Font file used for every style instead of the system fonts
    #[arg(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// Print the visible display list instead of opening a window
    #[arg(long)]
    headless: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let viewport = Viewport {
        width: cli.width,
        height: cli.height,
        scroll_step: cli.scroll_step,
        ..Viewport::default()
    };
    let network = NetworkManager::with_config(NetworkConfig {
        timeout_secs: cli.timeout,
        ..NetworkConfig::default()
    })
    .context("failed to set up networking")?;

    if cli.headless {
        // Without an explicit font the headless dump needs no font files.
        let mut metrics: Box<dyn TypeMetrics> = match &cli.font {
            Some(path) => Box::new(FontManager::from_file(path)?),
            None => Box::new(FixedMetrics),
        };
        let page = Page::load(&network, &cli.address, metrics.as_mut(), viewport)
            .with_context(|| format!("failed to load {}", cli.address))?;
        print_display_list(&page);
        return Ok(());
    }

    let mut fonts = match &cli.font {
        Some(path) => FontManager::from_file(path)?,
        None => FontManager::new(),
    };
    let page = Page::load(&network, &cli.address, &mut fonts, viewport)
        .with_context(|| format!("failed to load {}", cli.address))?;
    run_window(page, fonts)
}

fn print_display_list(page: &Page) {
    if let Some(title) = page.title() {
        println!("# {}", title);
    }
    println!(
        "# {} fragments, content height {:.2}",
        page.display_list().len(),
        page.content_height()
    );
    for fragment in page.visible() {
        println!(
            "{:>8.2} {:>8.2}  {:<18} {}",
            fragment.x,
            fragment.y,
            fragment.style.to_string(),
            fragment.text
        );
    }
}

fn run_window(mut page: Page, mut fonts: FontManager) -> Result<()> {
    let viewport = *page.viewport();
    let title = match page.title() {
        Some(title) => format!("Quire - {}", title),
        None => "Quire".to_string(),
    };

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(title)
        .with_inner_size(LogicalSize::new(viewport.width as f64, viewport.height as f64))
        .with_resizable(false)
        .build(&event_loop)
        .context("failed to create window")?;

    let (buffer_width, buffer_height) = (viewport.width as u32, viewport.height as u32);
    let mut pixels = {
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        Pixels::new(buffer_width, buffer_height, surface_texture).context("failed to create frame buffer")?
    };
    let mut wheel = WheelScroll::new(viewport.scroll_step);
    info!("window open, {} fragments on page", page.display_list().len());

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event: WindowEvent::CloseRequested, .. } => {
                *control_flow = ControlFlow::Exit
            }
            Event::WindowEvent {
                event:
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(key),
                                ..
                            },
                        ..
                    },
                ..
            } => match key {
                VirtualKeyCode::Down => {
                    page.scroll_down();
                    window.request_redraw();
                }
                VirtualKeyCode::Up => {
                    page.scroll_up();
                    window.request_redraw();
                }
                _ => {}
            },
            Event::WindowEvent { event: WindowEvent::MouseWheel { delta, .. }, .. } => {
                let steps = wheel.steps(delta);
                for _ in 0..steps.unsigned_abs() {
                    if steps > 0 {
                        page.scroll_down();
                    } else {
                        page.scroll_up();
                    }
                }
                if steps != 0 {
                    window.request_redraw();
                }
            }
            Event::RedrawRequested(_) => {
                {
                    let mut surface = PixelSurface::new(
                        pixels.frame_mut(),
                        buffer_width as usize,
                        buffer_height as usize,
                        &mut fonts,
                    );
                    page.draw(&mut surface);
                }
                if let Err(e) = pixels.render() {
                    error!("render failed: {}", e);
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    });
}
