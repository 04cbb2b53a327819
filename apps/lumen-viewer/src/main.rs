use anyhow::Result;
use clap::Parser;
use lumen_assets::{AssetEvent, AssetSink, AssetSource, spawn_environment_load, spawn_model_load};
use lumen_common::Viewport;
use lumen_common::constants::{DEFAULT_ENVIRONMENT_URL, DEFAULT_MODEL_PATH};
use lumen_input::InputEvent;
use lumen_render::{FallbackNotice, FrameOutcome, Viewer};
use lumen_render_wgpu::WgpuBackend;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

const WINDOW_TITLE: &str = "Lumen";

#[derive(Parser)]
#[command(name = "lumen-viewer", about = "glTF model viewer with HDR environment lighting")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// glTF or GLB model to display
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Radiance HDR environment map, as a URL or a file path
    #[arg(long, default_value = DEFAULT_ENVIRONMENT_URL)]
    environment: String,
}

/// Forwards loader events into the winit event loop as user events.
struct ProxySink(EventLoopProxy<AssetEvent>);

impl AssetSink for ProxySink {
    fn deliver(&self, event: AssetEvent) {
        if self.0.send_event(event).is_err() {
            tracing::debug!("event loop closed; dropping asset event");
        }
    }
}

/// Shows the fallback message in the window title and on stderr.
struct WindowNotice<'a> {
    window: &'a Window,
}

impl FallbackNotice for WindowNotice<'_> {
    fn show(&mut self, message: &str) {
        self.window.set_title(&format!("{WINDOW_TITLE} - {message}"));
        eprintln!("{message}");
    }
}

fn window_viewport(window: &Window) -> Viewport {
    let size = window.inner_size();
    Viewport::new(size.width, size.height, window.scale_factor())
}

struct ViewerApp {
    window: Option<Arc<Window>>,
    viewer: Viewer<WgpuBackend>,
}

impl ViewerApp {
    fn new() -> Self {
        Self {
            window: None,
            viewer: Viewer::new(Viewport::default()),
        }
    }
}

impl ApplicationHandler<AssetEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let target = window.clone();
        let mut notice = WindowNotice { window: &window };
        let ready = self.viewer.initialize(
            window_viewport(&window),
            move |viewport| WgpuBackend::new(target, viewport),
            &mut notice,
        );
        if ready {
            self.viewer.start();
            window.request_redraw();
        }

        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let viewport = Viewport::new(size.width, size.height, window.scale_factor());
                self.viewer.handle_input(InputEvent::Resized(viewport));
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = window.inner_size();
                let viewport = Viewport::new(size.width, size.height, scale_factor);
                self.viewer.handle_input(InputEvent::Resized(viewport));
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.viewer.handle_input(InputEvent::PointerMoved {
                    x: position.x,
                    y: position.y,
                });
            }
            WindowEvent::RedrawRequested => {
                if self.viewer.frame() == FrameOutcome::Continue {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AssetEvent) {
        self.viewer.handle_asset_event(event);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("lumen-viewer starting");

    let event_loop = EventLoop::<AssetEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let proxy = event_loop.create_proxy();
    let environment = AssetSource::parse(&cli.environment);
    if let Err(e) = spawn_environment_load(environment, ProxySink(proxy.clone())) {
        tracing::error!("failed to start environment load: {e}");
    }
    if let Err(e) = spawn_model_load(cli.model, ProxySink(proxy)) {
        tracing::error!("failed to start model load: {e}");
    }

    let mut app = ViewerApp::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
