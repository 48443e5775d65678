use thiserror::Error;

#[derive(Error, Debug)]
pub enum AreaError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid postal range {start}..{end}: {reason}")]
    InvalidRangeError {
        start: String,
        end: String,
        reason: String,
    },

    #[error("Failed to parse boundary for {code}: {message}")]
    ParseError { code: String, message: String },

    #[error("Polygon fetch failed: {message}")]
    FetchError { message: String },

    #[error("Boundary export failed: {message}")]
    ExportError { message: String },

    #[error("No boundary polygons returned for included regions")]
    NoGeometryError,

    #[error("Persistence error: {message}")]
    PersistenceError { message: String },

    #[error("Worker task failed: {message}")]
    TaskError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl AreaError {
    /// 網路或上游 HTTP 狀態造成的錯誤；批次取得時以 warn 記錄，其餘以 error 記錄
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AreaError::ApiError(_) | AreaError::FetchError { .. })
    }
}

pub type Result<T> = std::result::Result<T, AreaError>;
