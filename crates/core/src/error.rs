use crate::native::ResourceType;

/// Result alias that carries the custom [`MediaError`] type.
pub type Result<T> = std::result::Result<T, MediaError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// A null or otherwise unusable native pointer was handed to an owning
    /// constructor.
    #[error("invalid {kind} resource: {reason}")]
    InvalidResource {
        kind: ResourceType,
        reason: &'static str,
    },
    /// The native allocator rejected a creation request. `diagnostic` is the
    /// allocator's own text, untouched.
    #[error("failed to create {kind} from {origin}: {diagnostic}")]
    AllocationFailed {
        kind: ResourceType,
        origin: String,
        diagnostic: String,
    },
    /// A stored hint value could not be parsed as the hint's declared type.
    #[error("hint `{hint}` holds malformed value `{value}`: {reason}")]
    MalformedValue {
        hint: String,
        value: String,
        reason: String,
    },
    /// The backend lacks a capability the operation depends on.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// A preset referenced a hint name that is not declared in the catalog.
    #[error("unknown hint `{0}`")]
    UnknownHint(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration documents that fail to deserialize.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl MediaError {
    pub(crate) fn malformed(hint: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            hint: hint.to_owned(),
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}
