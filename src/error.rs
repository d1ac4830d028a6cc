use thiserror::Error;

/// Phase of schema application that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaPhase {
    Drop,
    Load,
    Constrain,
}

impl std::fmt::Display for SchemaPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaPhase::Drop => write!(f, "drop"),
            SchemaPhase::Load => write!(f, "load"),
            SchemaPhase::Constrain => write!(f, "constrain"),
        }
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode raw records: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{phase} phase failed on {table}")]
    Schema {
        phase: SchemaPhase,
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("invalid schema definition: {0}")]
    SchemaDefinition(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl EtlError {
    pub(crate) fn schema(phase: SchemaPhase, table: impl Into<String>, source: rusqlite::Error) -> Self {
        EtlError::Schema {
            phase,
            table: table.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
