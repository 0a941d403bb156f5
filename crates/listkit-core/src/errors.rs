use listkit_core_types::CorrelationId;
use thiserror::Error;

/// Result type alias using ListKitError
pub type Result<T> = std::result::Result<T, ListKitError>;

/// Result type alias using the canonical ExError
pub type ExResult<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages. Per-item batch failures are never errors: they are
/// reported in the outcome map. Only configuration problems, malformed
/// batches, and transport/protocol failures surface as `ExError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidConfiguration,
    DuplicateStep,
    UnknownDependency,
    EmptyBatch,

    // Submission
    /// The batch round trip itself failed (connection, timeout, 5xx on the envelope)
    Transport,
    /// The collaborator answered, but the per-item results do not match the submitted batch
    Protocol,

    // Configuration lifecycle
    AlreadyConfigured,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfiguration => "ERR_INVALID_CONFIGURATION",
            ExErrorKind::DuplicateStep => "ERR_DUPLICATE_STEP",
            ExErrorKind::UnknownDependency => "ERR_UNKNOWN_DEPENDENCY",
            ExErrorKind::EmptyBatch => "ERR_EMPTY_BATCH",
            ExErrorKind::Transport => "ERR_TRANSPORT",
            ExErrorKind::Protocol => "ERR_PROTOCOL",
            ExErrorKind::AlreadyConfigured => "ERR_ALREADY_CONFIGURED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a failure of this kind may succeed if the same batch is sent again
    pub fn is_transient(&self) -> bool {
        matches!(self, ExErrorKind::Transport | ExErrorKind::Protocol)
    }
}

/// Canonical structured error type
///
/// Carries the classification kind plus optional context (operation, step id,
/// attempt number, correlation id) for programmatic handling and debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    step_id: Option<String>,
    attempt: Option<u32>,
    correlation_id: Option<CorrelationId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            step_id: None,
            attempt: None,
            correlation_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add batch step id context
    pub fn with_step_id(mut self, id: impl Into<String>) -> Self {
        self.step_id = Some(id.into());
        self
    }

    /// Add attempt number context (1-based)
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    /// Add correlation ID context
    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the step ID context, if any
    pub fn step_id(&self) -> Option<&str> {
        self.step_id.as_deref()
    }

    /// Get the attempt number, if any
    pub fn attempt(&self) -> Option<u32> {
        self.attempt
    }

    /// Get the correlation ID context, if any
    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(step_id) = &self.step_id {
            write!(f, " (step_id: {})", step_id)?;
        }
        if let Some(attempt) = self.attempt {
            write!(f, " (attempt: {})", attempt)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for listkit operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ListKitError {
    // ===== Configuration Errors =====
    /// Retry options failed validation (non-positive retry count or delay)
    #[error("Invalid retry options: {reason}")]
    InvalidRetryOptions { reason: String },

    /// A configuration source held a value that could not be parsed
    #[error("Invalid value for {key}: {value:?}")]
    InvalidConfigValue { key: String, value: String },

    /// Process-wide retry defaults were already installed
    #[error("Default retry options are already configured")]
    DefaultsAlreadyConfigured,

    // ===== Batch Structure Errors =====
    /// Two steps in one batch share a request id
    #[error("Duplicate batch step id: {step_id}")]
    DuplicateStepId { step_id: String },

    /// A step depends on an id that is not part of the batch
    #[error("Step {step_id} depends on unknown step {dependency_id}")]
    UnknownDependency {
        step_id: String,
        dependency_id: String,
    },

    /// A step lists itself as a dependency
    #[error("Step {step_id} depends on itself")]
    SelfDependency { step_id: String },

    /// A batch with no steps was submitted
    #[error("Batch contains no steps")]
    EmptyBatch,

    /// A snapshot source was not a JSON object
    #[error("Snapshot source must be a JSON object, got {found}")]
    NotAnObject { found: String },

    // ===== Submission Errors =====
    /// The batch round trip failed
    #[error("Batch transport failed: {message}")]
    Transport { message: String },

    /// The collaborator returned no result for a submitted step
    #[error("No response returned for step {step_id}")]
    MissingItemResponse { step_id: String },

    /// The collaborator returned a result for a step that was not submitted
    #[error("Response returned for unsubmitted step {step_id}")]
    UnexpectedItemResponse { step_id: String },
}

/// Conversion from ListKitError to ExError
impl From<ListKitError> for ExError {
    fn from(err: ListKitError) -> Self {
        let message = err.to_string();
        match err {
            ListKitError::InvalidRetryOptions { .. } => {
                ExError::new(ExErrorKind::InvalidConfiguration).with_message(message)
            }

            ListKitError::InvalidConfigValue { key, .. } => {
                ExError::new(ExErrorKind::InvalidConfiguration)
                    .with_op(format!("read_config:{}", key))
                    .with_message(message)
            }

            ListKitError::DefaultsAlreadyConfigured => {
                ExError::new(ExErrorKind::AlreadyConfigured)
                    .with_op("install_default_retry_options")
                    .with_message(message)
            }

            ListKitError::DuplicateStepId { step_id } => {
                ExError::new(ExErrorKind::DuplicateStep)
                    .with_step_id(step_id)
                    .with_message(message)
            }

            ListKitError::UnknownDependency { step_id, .. }
            | ListKitError::SelfDependency { step_id } => {
                ExError::new(ExErrorKind::UnknownDependency)
                    .with_step_id(step_id)
                    .with_message(message)
            }

            ListKitError::EmptyBatch => ExError::new(ExErrorKind::EmptyBatch).with_message(message),

            ListKitError::NotAnObject { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            ListKitError::Transport { .. } => {
                ExError::new(ExErrorKind::Transport).with_message(message)
            }

            ListKitError::MissingItemResponse { step_id }
            | ListKitError::UnexpectedItemResponse { step_id } => {
                ExError::new(ExErrorKind::Protocol)
                    .with_step_id(step_id)
                    .with_message(message)
            }
        }
    }
}
