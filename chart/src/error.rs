use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },
    #[error("failed to render chart: {0}")]
    Render(String),
}
