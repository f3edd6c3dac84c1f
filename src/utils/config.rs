use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

pub struct Config {
    pub name: String,
    pub theme: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub log_to_stderr: bool,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/mishell")
        } else {
            PathBuf::from("tmp")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            name: String::from("mishell"),
            theme: String::from("default"),
            logger_level: String::from("warn"),
            logger_dir: config_dir.join("logs"),
            log_to_stderr: false,
        }
    }

    pub fn new() -> Self {
        // .env first, so it can seed the variables read below
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let mut config = Config::default();
        config.apply(|key| env::var(key).ok());
        config
    }

    fn apply<F: Fn(&str) -> Option<String>>(&mut self, var: F) {
        if let Some(theme) = var("MISHELL_THEME") {
            self.theme = theme;
        }

        if let Some(level) = var("MISHELL_LOG_LEVEL") {
            self.logger_level = level;
        }

        if let Some(dir) = var("MISHELL_LOG_DIR") {
            self.logger_dir = PathBuf::from(dir);
        }

        if var("MISHELL_LOG_STDERR").is_some() {
            self.log_to_stderr = true;
        }
    }
}
