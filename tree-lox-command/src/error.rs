use std::path::PathBuf;

use tree_lox_ast::{parser::ParseError, scanner::TokenizationError};

/// Exit code for a script that failed to scan or parse.
pub const EXIT_COMPILE_ERROR: u8 = 65;
/// Exit code for a script that could not be read.
pub const EXIT_IO_ERROR: u8 = 66;
/// Exit code for a script that failed while running.
pub const EXIT_RUNTIME_ERROR: u8 = 70;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tokenization(#[from] TokenizationError),
    #[error("{}", join_lines(.0))]
    Parse(Vec<ParseError>),
    #[error(transparent)]
    Runtime(#[from] tree_lox_interpreter::Error),
    #[error("Error: could not read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn join_lines(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl Error {
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Tokenization(_) | Error::Parse(_) => EXIT_COMPILE_ERROR,
            Error::Runtime(_) => EXIT_RUNTIME_ERROR,
            Error::Io { .. } => EXIT_IO_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_lox_ast::{parser::Parser, scanner::Scanner};

    #[test]
    fn parse_errors_render_one_per_line() {
        let tokens = Scanner::new("print ;\nvar = 1;").scan_tokens().unwrap();
        let error = Error::Parse(Parser::new(tokens).parse().errors);
        assert_eq!(
            error.to_string(),
            "[line 1] Error at ';' of token type 'SEMICOLON': Expect expression.\n\
             [line 2] Error at '=' of token type 'EQUAL': Expect variable name."
        );
        assert_eq!(error.exit_code(), EXIT_COMPILE_ERROR);
    }

    #[test]
    fn tokenization_errors_are_compile_errors() {
        let error: Error = Scanner::new("@").scan_tokens().unwrap_err().into();
        assert_eq!(error.to_string(), "[line 1] Error: Unexpected character '@'.");
        assert_eq!(error.exit_code(), EXIT_COMPILE_ERROR);
    }

    #[test]
    fn unreadable_scripts_are_io_errors() {
        let error = Error::Io {
            path: PathBuf::from("missing.lox"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(error.exit_code(), EXIT_IO_ERROR);
        assert!(error.to_string().starts_with("Error: could not read 'missing.lox'"));
    }
}
