use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("could not bind signal handler: {0}")]
    SignalSetup(String),

    #[error("an error has occurred in forking: {0}")]
    Fork(#[source] io::Error),

    #[error("error occurred during pipe, abort: {0}")]
    Pipe(#[source] io::Error),

    #[error("cannot redirect output to {}: {source}", path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error waiting for process {pid}: {source}")]
    Wait {
        pid: libc::pid_t,
        #[source]
        source: io::Error,
    },

    #[error("argument contains a NUL byte: {0:?}")]
    InvalidArgument(String),

    #[error("syntax error: missing redirection target")]
    MissingRedirectTarget,

    #[error("syntax error: empty pipeline stage")]
    EmptyPipeStage,

    #[error("Invalid job")]
    InvalidJob,

    #[error("No job selected")]
    NoJobSelected,

    #[error("error reading input: {0}")]
    ReadInput(#[source] io::Error),
}

impl ShellError {
    /// Fatal errors end the session with status 1; the rest are reported
    /// inline and the loop carries on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShellError::SignalSetup(_)
                | ShellError::Fork(_)
                | ShellError::Pipe(_)
                | ShellError::ReadInput(_)
        )
    }
}
