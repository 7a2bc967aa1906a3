use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("nothing to plot: {0}")]
    Empty(&'static str),

    #[error("render {path}: {reason}")]
    Render { path: String, reason: String },
}

/// Failure while drawing a chart onto a backend.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("nothing to plot: {0}")]
    Empty(&'static str),

    #[error("{0}")]
    Backend(String),
}
