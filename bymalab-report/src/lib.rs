//! BymaLab Report: chart models and rendering.
//!
//! Models are plain data built from rankings and equity history; only
//! [`render::render`] touches the filesystem.

pub mod barh;
pub mod density;
pub mod equity;
pub mod error;
pub mod kde;
pub mod render;

pub use barh::BarChart;
pub use density::DensityChart;
pub use equity::EquityChart;
pub use error::{DrawError, ReportError};
pub use kde::Kde;
pub use render::{render, Chart};
