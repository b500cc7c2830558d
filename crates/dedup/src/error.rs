use std::fmt;

#[derive(Debug)]
pub enum DedupError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (duplicate field, bad threshold, etc.).
    ConfigValidation(String),
    /// Blocking or classifier references a field absent from the schema.
    UnknownField { context: String, field: String },
    /// Missing required column in input data.
    MissingColumn { column: String },
    /// IO error (file read, CSV decode, etc.).
    Io(String),
    /// Cluster assignment dropped or duplicated a record. Indicates a bug
    /// in the union-find merge logic, not a data problem.
    ClusterInvariant(String),
}

impl fmt::Display for DedupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownField { context, field } => {
                write!(f, "{context}: unknown field '{field}'")
            }
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::ClusterInvariant(msg) => write!(f, "cluster invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for DedupError {}
