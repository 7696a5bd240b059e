//! Loading of the geography dataset.
//!
//! The country topology is fetched once per session, either over HTTP(S) or
//! from a local file, and handed to the UI thread through
//! [`GeometryLoadChannel`].

mod fetch;

pub use fetch::{is_remote, GeometryLoadChannel, GeometryLoadResult};

#[cfg(not(target_arch = "wasm32"))]
pub use fetch::{load_geometry, read_text};
