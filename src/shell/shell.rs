use log::{debug, error, warn};
use std::env;
use std::error::Error;
use std::io::{self, Write};

use crate::shell::executor::{Dispatcher, Status};
use crate::shell::parser::Parser;
use crate::shell::readline::{LineEditor, ReadOutcome};
use crate::shell::signals;
use crate::utils::config::Config;
use crate::utils::path;
use crate::utils::theme::Theme;

pub struct Shell<'a> {
    config: &'a Config,
    theme: Theme,
    editor: LineEditor,
    dispatcher: Dispatcher,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config, theme: Theme) -> Self {
        Self {
            config,
            theme,
            editor: LineEditor::new(),
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        debug!("starting {}...", self.config.name);

        if let Err(e) = signals::ignore_interactive_signals() {
            warn!("cannot install signal handlers: {}", e);
        }

        self.run_loop()?;

        println!();
        debug!("leaving {}...", self.config.name);
        Ok(())
    }

    fn run_loop(&mut self) -> Result<(), Box<dyn Error>> {
        loop {
            self.report_finished_jobs();

            print!("{}", self.prompt());
            io::stdout().flush()?;

            let line = match self.editor.read_from_terminal()? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Terminated => {
                    debug!("end of input");
                    break;
                }
            };

            let pipeline = Parser::new(&line).parse();
            match self.dispatcher.dispatch(pipeline, &self.theme) {
                Ok(Status::Success) => {}
                Ok(Status::Exit) => break,
                Ok(Status::Unknown) => warn!("unknown status for line: {}", line),
                Err(e) => {
                    error!("{}: {}", line, e);
                    self.theme.report_error(&e);
                }
            }
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        let user = env::var("USER").unwrap_or_default();
        let hostname = nix::unistd::gethostname()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.theme.prompt(&user, &hostname, &path::current_dir())
    }

    fn report_finished_jobs(&mut self) {
        for job in self.dispatcher.reap_jobs() {
            self.theme.notice(&job.to_string());
        }
    }
}
