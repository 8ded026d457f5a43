use std::error::Error;
use std::fs::File;
use std::io::{Write, stderr};

use clap::Parser;
use log::{debug, error};
use ri_common::error::RuntimeError;
use ri_common::logger::initialize_logger;
use ri_lister::cli::Arguments;
use ri_lister::configuration::Configuration;
use ri_lister::runner;

fn _prompt<W>(mut out: W) -> Result<(), RuntimeError>
where
    W: Write,
{
    write!(out, "Access token (hidden)>")
        .and_then(|()| out.flush())
        .map_err(|e| RuntimeError::new(format!("Unable to show access token prompt: {e}")))
}

fn _read_token() -> Result<String, RuntimeError> {
    _prompt(stderr())?;
    rpassword::read_password()
        .map(|token| token.trim().to_string())
        .map_err(|e| RuntimeError::new(format!("Unable to read access token: {e}")))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut arguments = Arguments::parse();

    let configuration = Configuration::load(arguments.config.as_deref())?;
    let log_file = match &arguments.log_file {
        Some(path) => Some(File::create(path).map_err(|e| {
            RuntimeError::new(format!("Unable to create log file {}: {e}", path.display()))
        })?),
        None => None,
    };
    initialize_logger(
        arguments.log_level.unwrap_or(configuration.log_level),
        log_file,
    )?;
    debug!("Initialized logger");

    if arguments.ask_token {
        arguments.token = Some(_read_token().inspect_err(|e| error!("{e}"))?);
    }

    runner::execute(arguments, configuration).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use super::_prompt;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn prompt_is_written_and_flushed() {
        let mut out = vec![];
        _prompt(&mut out).unwrap();
        assert_eq!(out, b"Access token (hidden)>");
    }

    #[test]
    fn prompt_failure_is_reported() {
        let error = _prompt(ClosedPipe).unwrap_err();
        assert!(error.message().starts_with("Unable to show access token prompt"));
    }
}
