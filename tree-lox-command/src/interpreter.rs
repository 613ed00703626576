use std::{
    fs,
    io::{stdin, BufRead, Write},
    path::Path,
    process::ExitCode,
};

use log::{debug, info};
use tree_lox_ast::{parser::Parser, scanner::Scanner};
use tree_lox_interpreter::Interpreter;

use crate::error::Error;

/// Runs one piece of source text against `interpreter`.
///
/// Nothing is executed unless the whole text scans and parses cleanly. On
/// success the echo of the top-level expression statements is returned; the
/// output of `print` has already been written to the interpreter's sink.
pub fn run_source(interpreter: &mut Interpreter<'_>, source: &str) -> Result<String, Error> {
    let tokens = Scanner::new(source).scan_tokens()?;
    debug!("scanned {} tokens", tokens.len());
    let result = Parser::new(tokens).parse();
    if !result.errors.is_empty() {
        return Err(Error::Parse(result.errors));
    }
    debug!("parsed {} statements", result.stmts.len());
    Ok(interpreter.interpret(&result.stmts)?)
}

pub fn run_file(file_path: &Path, interpreter: &mut Interpreter<'_>) -> Result<(), Error> {
    info!("running {}", file_path.display());
    let source = fs::read_to_string(file_path).map_err(|source| Error::Io {
        path: file_path.to_path_buf(),
        source,
    })?;
    let echo = run_source(interpreter, &source)?;
    write!(interpreter.out(), "{}", echo).map_err(tree_lox_interpreter::Error::from)?;
    Ok(())
}

/// Reads one line at a time from `input` until end of input.
///
/// Every line runs against the same interpreter, so definitions persist. A
/// failing line is reported to `err` and the prompt carries on.
pub fn run_prompt<I, E>(
    input: I,
    interpreter: &mut Interpreter<'_>,
    err: &mut E,
) -> anyhow::Result<()>
where
    I: BufRead,
    E: Write,
{
    let mut lines = input.lines();
    loop {
        write!(interpreter.out(), "> ")?;
        interpreter.out().flush()?;
        let Some(line) = lines.next() else {
            // Ctrl-d
            writeln!(interpreter.out())?;
            break;
        };
        match run_source(interpreter, &line?) {
            Ok(echo) => write!(interpreter.out(), "{}", echo)?,
            Err(e) => writeln!(err, "{}", e)?,
        }
    }
    Ok(())
}

pub fn run_interpreter<S, O, E>(file_name: Option<S>, out: &mut O, err: &mut E) -> ExitCode
where
    S: AsRef<Path>,
    O: Write,
    E: Write,
{
    let mut interpreter = Interpreter::new(out);
    match file_name {
        None => match run_prompt(stdin().lock(), &mut interpreter, err) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                let _ = writeln!(err, "{}", e);
                ExitCode::FAILURE
            }
        },
        Some(name) => match run_file(name.as_ref(), &mut interpreter) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                let _ = writeln!(err, "{}", e);
                ExitCode::from(e.exit_code())
            }
        },
    }
}
