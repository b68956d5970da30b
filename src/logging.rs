use simplelog::*;
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;

/// Directory holding `app.log`, under the user's home
pub fn log_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("kantanplay")
            .join("logs"),
    )
}

fn terminal_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

/// Logs everything at debug level to the log file and warnings (or info with
/// `verbose`) to stderr. Without a home directory only stderr is used.
pub fn init_logger(verbose: bool) -> Result<(), Error> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        terminal_level(verbose),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(log_dir) = log_dir() {
        // Create the log directory if it doesn't exist
        fs::create_dir_all(&log_dir)?;

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("app.log"))?;
        loggers.push(WriteLogger::new(
            LevelFilter::Debug,
            Config::default(),
            log_file,
        ));
    }

    CombinedLogger::init(loggers)
        .map_err(|e| Error::new(ErrorKind::Other, format!("Logger initialization failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_level() {
        assert_eq!(terminal_level(true), LevelFilter::Info);
        assert_eq!(terminal_level(false), LevelFilter::Warn);
    }
}
