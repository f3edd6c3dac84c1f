use crate::utils::config::Config;
use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::process;

pub fn parse_level(level: &str) -> LevelFilter {
    match level {
        level if level.eq_ignore_ascii_case("error") => LevelFilter::Error,
        level if level.eq_ignore_ascii_case("warn") => LevelFilter::Warn,
        level if level.eq_ignore_ascii_case("info") => LevelFilter::Info,
        level if level.eq_ignore_ascii_case("debug") => LevelFilter::Debug,
        level if level.eq_ignore_ascii_case("trace") => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    }
}

fn open_log_file(dir: &Path) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    let date = Local::now().format("%Y-%m-%d");
    File::options()
        .create(true)
        .append(true)
        .open(dir.join(format!("mishell_{}.log", date)))
}

/// Logs go to a dated file in the log directory, mirrored to stderr when
/// configured. Without a usable file, stderr is the only sink.
pub fn init_logger(config: &Config) {
    let level = parse_level(&config.logger_level);

    let mut writers: Vec<Box<dyn Write + Send + Sync>> = Vec::new();
    let file_error = match open_log_file(&config.logger_dir) {
        Ok(file) => {
            writers.push(Box::new(file));
            None
        }
        Err(e) => Some(e),
    };
    if config.log_to_stderr || file_error.is_some() {
        writers.push(Box::new(io::stderr()));
    }

    let result = Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[PID:{}][{}] {} - {}",
                process::id(),
                record.level(),
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(MultiWriter { writers })))
        .filter(Some(env!("CARGO_PKG_NAME")), level)
        .filter(None, LevelFilter::Warn)
        .try_init();

    if let Err(e) = result {
        eprintln!("-{}: logger: {}", config.name, e);
        return;
    }
    if let Some(e) = file_error {
        log::warn!(
            "cannot open log file in {}: {}",
            config.logger_dir.display(),
            e
        );
    }
    log::debug!("log level set to: {}", level);
}

struct MultiWriter {
    writers: Vec<Box<dyn Write + Send + Sync>>,
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for writer in &mut self.writers {
            writer.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for writer in &mut self.writers {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("error"), LevelFilter::Error);
        assert_eq!(parse_level("nonsense"), LevelFilter::Warn);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_multi_writer_fans_out() {
        let first: Vec<u8> = Vec::new();
        let second: Vec<u8> = Vec::new();
        let mut writer = MultiWriter {
            writers: vec![Box::new(first), Box::new(second)],
        };
        assert_eq!(writer.write(b"hello").unwrap(), 5);
        writer.flush().unwrap();
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_log_file_is_dated() {
        let dir = tempfile::TempDir::new().unwrap();
        open_log_file(&dir.path().join("nested")).unwrap();
        let name = fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .next()
            .unwrap();
        assert!(name.starts_with("mishell_") && name.ends_with(".log"));
    }
}
