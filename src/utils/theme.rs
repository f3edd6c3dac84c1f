use std::fmt::Display;

use colored::Colorize;

type Style = Box<dyn Fn(String) -> String>;

pub struct Theme {
    pub shell_name: String,
    pub host_style: Style,
    pub path_style: Style,
    pub error_style: Style,
    pub notice_style: Style,
}

impl Theme {
    fn with_name(shell_name: &str) -> Self {
        Theme {
            shell_name: shell_name.to_string(),
            host_style: Box::new(|s| s.bright_green().bold().to_string()),
            path_style: Box::new(|s| s.bright_blue().to_string()),
            error_style: Box::new(|s| s.bright_red().to_string()),
            notice_style: Box::new(|s| s.yellow().to_string()),
        }
    }

    /// `<user>@<hostname>:<cwd> <shellname>$ `
    pub fn prompt(&self, user: &str, hostname: &str, cwd: &str) -> String {
        format!(
            "{}:{} {}$ ",
            (self.host_style)(format!("{}@{}", user, hostname)),
            (self.path_style)(cwd.to_string()),
            self.shell_name
        )
    }

    /// One line on stderr naming the shell, e.g. `-mishell: cd: ...`.
    pub fn report_error(&self, err: &dyn Display) {
        eprintln!(
            "{}",
            (self.error_style)(format!("-{}: {}", self.shell_name, err))
        );
    }

    pub fn notice(&self, message: &str) {
        println!("{}", (self.notice_style)(message.to_string()));
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::with_name("mishell")
    }
}

pub fn load_theme(theme_name: &str, shell_name: &str) -> Theme {
    match theme_name {
        "dark" => Theme {
            host_style: Box::new(|s| s.bright_purple().to_string()),
            path_style: Box::new(|s| s.cyan().to_string()),
            error_style: Box::new(|s| s.red().to_string()),
            notice_style: Box::new(|s| s.magenta().to_string()),
            ..Theme::with_name(shell_name)
        },
        _ => Theme::with_name(shell_name),
    }
}
