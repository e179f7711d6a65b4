use std::path::PathBuf;

/// Errors surfaced by the orchestration core.
///
/// Anything that should be skipped rather than aborted on (an unreadable
/// results fragment during a merge, a missing rename source) is handled with a
/// warning at the call site instead of a variant here.
#[derive(Debug, thiserror::Error)]
pub enum MpbError {
    #[error(
        "config template not found at {path}: run the benchmark binary without \
         arguments to generate benchmark_template.json"
    )]
    TemplateNotFound { path: PathBuf },

    #[error("benchmark binary not found at {path}")]
    BinaryNotFound { path: PathBuf },

    #[error("missing settings key `{path}`")]
    MissingKey { path: String },

    #[error("settings key `{path}` is not an object")]
    NotAnObject { path: String },

    #[error("settings key `{path}` has unexpected type (expected {expected})")]
    WrongType { path: String, expected: &'static str },

    #[error("none of the merge sources could be read")]
    NoMergeSources,

    #[error("failed to spawn {binary}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{context} ({path})")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MpbError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MpbError>;
