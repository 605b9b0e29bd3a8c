use crate::domain::console::GeometryRejected;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("no match for {query}")]
    NoMatch { query: String },

    #[error("unparsable response token `{token}`")]
    UnparsableResponse { token: String },

    #[error("terminal rejected geometry change: {0}")]
    GeometryRejected(#[from] GeometryRejected),

    #[error("no item {choice}, choose 1..={count}")]
    SelectionOutOfRange { choice: u32, count: usize },

    #[error("command `{name}` failed")]
    ActionFault {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("terminal i/o failed")]
    Io(#[from] std::io::Error),
}
