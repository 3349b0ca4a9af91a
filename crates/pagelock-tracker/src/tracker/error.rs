use pagelock_core::ViewportError;

/// A tunable outside its accepted range.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("{name} must be in {range} (got {value})")]
    OutOfRange {
        name: &'static str,
        range: &'static str,
        value: f32,
    },
    #[error("{name} must be >= 1")]
    Zero { name: &'static str },
}

/// Errors returned by the frame tracker.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error(transparent)]
    Viewport(#[from] ViewportError),
    #[error("invalid {section} parameters: {source}")]
    InvalidParams {
        section: &'static str,
        #[source]
        source: ParamsError,
    },
}
