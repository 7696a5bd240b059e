#![warn(clippy::all)]

//! Globe Workbench - an interactive orthographic globe.
//!
//! Drag the globe to rotate it; countries are re-projected every frame and
//! the current view can be exported as an SVG document. On native the
//! export is also available headless through `--export-svg`.

mod state;
mod ui;

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use eframe::egui;
use globe_workbench::config::GlobeConfig;
use globe_workbench::data::{GeometryLoadChannel, GeometryLoadResult};
use globe_workbench::geo::{Frame, Surface, SvgSurface};
use globe_workbench::Globe;
use state::AppState;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

/// Command line options (native only).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "globe-workbench", version, about)]
struct Args {
    /// JSON configuration file; defaults are used when omitted or invalid.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Render one frame to this SVG file and exit instead of opening a window.
    #[arg(long)]
    export_svg: Option<std::path::PathBuf>,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f64,
}

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = GlobeConfig::load_or_default(args.config.as_deref());

    if let Some(path) = &args.export_svg {
        if let Err(e) = export_headless(&config, args.width, args.height, path) {
            log::error!("SVG export failed: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([args.width as f32, args.height as f32 + 36.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Globe Workbench",
        native_options,
        Box::new(move |cc| Ok(Box::new(GlobeApp::new(cc, config)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document to attach the globe to");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("app_canvas")
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("app_canvas is missing or not a canvas element");
            return;
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(GlobeApp::new(cc, GlobeConfig::default())))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    log::error!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct GlobeApp {
    /// Viewer state (status, hover, export requests)
    state: AppState,

    config: GlobeConfig,

    /// Created by the canvas on the first frame with a usable size
    globe: Option<Globe>,

    /// Channel for the one-shot geometry load
    load_channel: GeometryLoadChannel,

    /// Load result received before the globe existed
    pending_geometry: Option<GeometryLoadResult>,
}

impl GlobeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: GlobeConfig) -> Self {
        let mut state = AppState::new();

        let load_channel = GeometryLoadChannel::new();
        state.on_load_started(&config.countries_url);
        load_channel.load(
            cc.egui_ctx.clone(),
            config.countries_url.clone(),
            config.countries_object.clone(),
        );

        Self {
            state,
            config,
            globe: None,
            load_channel,
            pending_geometry: None,
        }
    }

    fn handle_export(&mut self) {
        self.state.export_requested = false;

        let Some(globe) = &self.globe else {
            self.state.status_message = "Nothing to export yet".to_string();
            return;
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let path = self.state.export_path.clone();
            self.state.status_message = match write_svg(globe.frame(), &path) {
                Ok(()) => format!("Exported {}", path.display()),
                Err(e) => {
                    log::error!("SVG export failed: {}", e);
                    format!("Export failed: {}", e)
                }
            };
        }

        #[cfg(target_arch = "wasm32")]
        {
            let document = render_svg(globe.frame());
            log::info!("SVG export ({} bytes):\n{}", document.len(), document);
            self.state.status_message = "SVG written to the developer console".to_string();
        }
    }
}

impl eframe::App for GlobeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for the completed geometry load
        if let Some(result) = self.load_channel.try_recv() {
            self.state.on_geometry_loaded(&result);
            self.pending_geometry = Some(result);
        }

        ui::render_top_bar(ctx, &mut self.state);
        ui::render_canvas(ctx, &mut self.state, &mut self.globe, &self.config);

        if let Some(globe) = self.globe.as_mut() {
            if let Some(result) = self.pending_geometry.take() {
                globe.set_geometry(result);
                ctx.request_repaint();
            }
        }

        if self.state.export_requested {
            self.handle_export();
        }
    }
}

/// Serializes a frame as a standalone SVG document.
fn render_svg(frame: &Frame) -> String {
    let mut surface = SvgSurface::new();
    surface.paint(frame);
    surface.into_document()
}

#[cfg(not(target_arch = "wasm32"))]
fn write_svg(frame: &Frame, path: &Path) -> globe_workbench::Result<()> {
    let document = render_svg(frame);
    std::fs::write(path, &document)?;
    log::info!("Wrote {} ({} bytes)", path.display(), document.len());
    Ok(())
}

/// Loads the geometry synchronously and writes a single frame.
///
/// A failed load still exports the bare sphere.
#[cfg(not(target_arch = "wasm32"))]
fn export_headless(
    config: &GlobeConfig,
    width: f64,
    height: f64,
    path: &Path,
) -> globe_workbench::Result<()> {
    let mut globe = Globe::new(config, width, height)?;
    globe.set_geometry(globe_workbench::data::load_geometry(
        &config.countries_url,
        &config.countries_object,
    ));
    globe.tick();
    write_svg(globe.frame(), path)
}
