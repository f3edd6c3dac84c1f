use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShellError>;

/// Errors reported back to the prompt loop. None of them stop the shell.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// The program exists but could not be started.
    #[error("{command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    /// A `<`, `>` or `>>` target could not be opened.
    #[error("{command}: {target}: {source}")]
    Redirect {
        command: String,
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("pipe: {0}")]
    Pipe(#[from] nix::Error),

    #[error("{command}: {source}")]
    Builtin {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("syntax error near unexpected token `|'")]
    EmptyStage,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Maps a spawn failure to "command not found" when the OS could not resolve the name.
    pub fn launch(command: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => ShellError::CommandNotFound(command.to_string()),
            _ => ShellError::Launch {
                command: command.to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_not_found() {
        let err = ShellError::launch("nope", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, ShellError::CommandNotFound(ref name) if name == "nope"));
        assert_eq!(err.to_string(), "nope: command not found");
    }

    #[test]
    fn test_launch_permission_denied() {
        let err = ShellError::launch(
            "./script",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, ShellError::Launch { .. }));
        assert!(err.to_string().starts_with("./script: "));
    }
}
