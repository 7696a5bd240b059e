//! Globe Workbench library.
//!
//! An orthographic globe driven by pointer drags: the [`globe::Globe`]
//! instance owns the projection state and drag controller, [`geo`] decodes
//! and projects the country geometry, and [`data`] loads it.

pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod globe;

pub use config::GlobeConfig;
pub use error::{GlobeError, Result};
pub use globe::Globe;
