//! One-shot loading of the country dataset.
//!
//! Fetching is asynchronous but egui's `update()` is synchronous, so the
//! result travels back to the UI thread through a channel that the app polls
//! every frame. Once a result is sent the UI is asked to repaint.

use std::sync::mpsc::{channel, Receiver, Sender};

use eframe::egui;

use crate::error::{GlobeError, Result};
use crate::geo::GeometrySource;

/// Outcome of a geometry load.
pub type GeometryLoadResult = Result<GeometrySource>;

/// Channel carrying the geometry load result to the UI thread.
pub struct GeometryLoadChannel {
    sender: Sender<GeometryLoadResult>,
    receiver: Receiver<GeometryLoadResult>,
}

impl Default for GeometryLoadChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryLoadChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Starts loading `object` from the topology at `location`.
    ///
    /// On native the load runs on its own thread; on WASM it runs as a
    /// `spawn_local` future. The load is never cancelled.
    pub fn load(&self, ctx: egui::Context, location: String, object: String) {
        let sender = self.sender.clone();
        log::info!("Loading country data from {}", location);

        #[cfg(not(target_arch = "wasm32"))]
        {
            std::thread::spawn(move || {
                let result = load_geometry(&location, &object);
                let _ = sender.send(result);
                ctx.request_repaint();
            });
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let result = match fetch_text_web(&location).await {
                    Ok(json) => GeometrySource::from_topojson(&json, &object),
                    Err(e) => Err(e),
                };
                let _ = sender.send(result);
                ctx.request_repaint();
            });
        }
    }

    /// Non-blocking check for a finished load.
    pub fn try_recv(&self) -> Option<GeometryLoadResult> {
        self.receiver.try_recv().ok()
    }
}

/// Loads and decodes the dataset, blocking the calling thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_geometry(location: &str, object: &str) -> Result<GeometrySource> {
    let json = read_text(location)?;
    GeometrySource::from_topojson(&json, object)
}

/// Reads `location` as an http(s) URL or, failing that, a local path.
#[cfg(not(target_arch = "wasm32"))]
pub fn read_text(location: &str) -> Result<String> {
    if is_remote(location) {
        fetch_text(location)
    } else {
        Ok(std::fs::read_to_string(location)?)
    }
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[cfg(not(target_arch = "wasm32"))]
fn fetch_text(url: &str) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("globe-workbench/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| GlobeError::Fetch(format!("Client error: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| GlobeError::Fetch(format!("Request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(GlobeError::Fetch(format!("HTTP {} for {}", status.as_u16(), url)));
    }

    response
        .text()
        .map_err(|e| GlobeError::Fetch(format!("Failed to read body: {}", e)))
}

#[cfg(target_arch = "wasm32")]
async fn fetch_text_web(url: &str) -> Result<String> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let js_err = |e: wasm_bindgen::JsValue| GlobeError::Fetch(format!("{:?}", e));

    let window = web_sys::window().ok_or_else(|| GlobeError::Fetch("no window".to_string()))?;

    let opts = web_sys::RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(web_sys::RequestMode::Cors);
    let request = web_sys::Request::new_with_str_and_init(url, &opts).map_err(js_err)?;

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?;
    let response: web_sys::Response = response.dyn_into().map_err(js_err)?;
    if !response.ok() {
        return Err(GlobeError::Fetch(format!(
            "HTTP {} for {}",
            response.status(),
            url
        )));
    }

    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    text.as_string()
        .ok_or_else(|| GlobeError::Fetch("response body is not text".to_string()))
}
