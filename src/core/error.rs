use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the build model.
/// Every module returns `Result<T, GraphError>`.
#[derive(Debug, Error)]
pub enum GraphError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Serialization ───────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("POM serialization error: {0}")]
    Pom(String),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Maven ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    // ── Targets ─────────────────────────────────────────
    #[error("Target already declared: {0}")]
    DuplicateTarget(String),

    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Dependency cycle between targets: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("Target '{dependent}' cannot depend on '{dependency}': {reason}")]
    InvalidDependency {
        dependent: String,
        dependency: String,
        reason: String,
    },

    #[error("Target '{0}' has no separate client compilation")]
    ClientNotSupported(String),

    #[error("Target '{0}' does not declare a Minecraft version")]
    MissingMinecraftVersion(String),

    #[error("Property '{property}' cannot be changed: {reason}")]
    RestrictedProperty { property: String, reason: String },

    #[error("Project is sealed, cannot modify {0}")]
    Sealed(String),

    // ── Graph invariants ────────────────────────────────
    #[error("Cannot statically link {from} to {to}: {reason}")]
    IncompatibleLink {
        from: String,
        to: String,
        reason: String,
    },

    // ── Variants ────────────────────────────────────────
    #[error("No variant matches request {0}")]
    NoMatchingVariant(String),

    #[error("Request {request} is ambiguous between: {}", .candidates.join(", "))]
    AmbiguousVariants {
        request: String,
        candidates: Vec<String>,
    },

    // ── External collaborators ──────────────────────────
    #[error("Minecraft {version} ({distribution}) is not available")]
    MinecraftUnavailable {
        version: String,
        distribution: String,
    },

    #[error("Stub API task for {0} has no inputs")]
    EmptyStubInputs(String),

    #[error("Transform chain cannot reach state {0}")]
    UnreachableTransformState(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type GraphResult<T> = Result<T, GraphError>;

impl From<std::io::Error> for GraphError {
    fn from(source: std::io::Error) -> Self {
        GraphError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
