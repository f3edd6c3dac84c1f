use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use log::debug;

use crate::shell::error::{Result, ShellError};
use crate::shell::parser::ast::{CommandNode, Pipeline};
use crate::shell::tools::completion::{Completer, Completion};
use crate::shell::tools::{hdiff, mindmap};
use crate::utils::theme::Theme;

use super::job_manager::{Job, JobManager};
use super::pipeline;

pub const BUILTINS: [&str; 5] = ["cd", "exit", "jobs", "mindmap", "hdiff"];

/// Control signal handed back to the read-eval loop.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
    Success,
    Exit,
    /// Reserved; nothing produces it yet.
    #[allow(dead_code)]
    Unknown,
}

/// Routes one parsed line: completion first, then built-ins for single-stage
/// lines, and everything else to the pipeline executor.
pub struct Dispatcher {
    completer: Completer,
    jobs: JobManager,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_completer(Completer::new(&BUILTINS))
    }

    pub fn with_completer(completer: Completer) -> Self {
        Self {
            completer,
            jobs: JobManager::new(),
        }
    }

    /// Background jobs that finished since the last call.
    pub fn reap_jobs(&mut self) -> Vec<Job> {
        if self.jobs.is_empty() {
            return Vec::new();
        }
        self.jobs.reap()
    }

    pub fn dispatch(&mut self, mut pipeline: Pipeline, theme: &Theme) -> Result<Status> {
        if let Some(status) = self.resolve_completion(&mut pipeline)? {
            return Ok(status);
        }

        if pipeline.stages.len() > 1 {
            return self.run_external(&pipeline, theme);
        }

        if pipeline.is_empty() {
            return Ok(Status::Success);
        }
        let Some(command) = pipeline.head() else {
            return Ok(Status::Success);
        };

        if let Some(result) = self.handle_builtin(command) {
            debug!("builtin: {:?}", command);
            return result;
        }

        self.run_external(&pipeline, theme)
    }

    /// Replaces a partial command name with its unique completion. Returns a
    /// status when the line must not run (no match, or several).
    fn resolve_completion(&self, pipeline: &mut Pipeline) -> Result<Option<Status>> {
        let Some(stage) = pipeline.stages.last_mut() else {
            return Ok(None);
        };
        if !stage.auto_complete || !stage.take_completion_marker() {
            return Ok(None);
        }

        match self.completer.complete(&stage.name) {
            Completion::Unique(name) => {
                debug!("completed {:?} to {:?}", stage.name, name);
                stage.rename(name);
                Ok(None)
            }
            Completion::Ambiguous(candidates) => {
                println!("Multiple matches found:");
                for candidate in candidates {
                    println!("{}", candidate);
                }
                Ok(Some(Status::Success))
            }
            Completion::None => Err(ShellError::CommandNotFound(stage.name.clone())),
        }
    }

    fn run_external(&mut self, pipeline: &Pipeline, theme: &Theme) -> Result<Status> {
        debug!("external: {}", pipeline.line);
        let launch = pipeline::execute(pipeline, &mut self.jobs)?;
        for failure in &launch.failures {
            theme.report_error(failure);
        }
        if let Some(index) = launch.job {
            if let Some(job) = self.jobs.get_jobs().iter().find(|job| job.index == index) {
                theme.notice(&format!("[{}] {}", job.index, job.pid()));
            }
        }
        Ok(Status::Success)
    }

    fn handle_builtin(&mut self, command: &CommandNode) -> Option<Result<Status>> {
        match command.name.as_str() {
            "exit" => Some(Ok(Status::Exit)),
            "cd" => Some(self.builtin_cd(command)),
            "jobs" => Some(self.builtin_jobs()),
            "mindmap" => Some(self.builtin_mindmap(command)),
            "hdiff" => Some(self.builtin_hdiff(command)),
            _ => None,
        }
    }

    fn builtin_cd(&self, command: &CommandNode) -> Result<Status> {
        let path = command.operand(0).unwrap_or("~");
        let path = shellexpand::tilde(path);
        env::set_current_dir(path.as_ref()).map_err(|source| ShellError::Builtin {
            command: command.name.clone(),
            source,
        })?;
        debug!("cwd is now {}", path);
        Ok(Status::Success)
    }

    fn builtin_jobs(&self) -> Result<Status> {
        for job in self.jobs.get_jobs() {
            println!("{}", job);
        }
        Ok(Status::Success)
    }

    fn builtin_mindmap(&self, command: &CommandNode) -> Result<Status> {
        if command.operand_count() > 1 {
            println!("{}", mindmap::USAGE);
            return Ok(Status::Success);
        }
        let root = command.operand(0).unwrap_or(".");
        mindmap::render(Path::new(root), &mut io::stdout().lock()).map_err(|source| {
            ShellError::Builtin {
                command: command.name.clone(),
                source,
            }
        })?;
        Ok(Status::Success)
    }

    fn builtin_hdiff(&self, command: &CommandNode) -> Result<Status> {
        let (Some(flag), Some(path1), Some(path2), 3) = (
            command.operand(0),
            command.operand(1),
            command.operand(2),
            command.operand_count(),
        ) else {
            println!("{}", hdiff::USAGE);
            return Ok(Status::Success);
        };

        let Some(mode) = hdiff::DiffMode::from_flag(flag) else {
            println!("Invalid option: {}", flag);
            return Ok(Status::Success);
        };

        let builtin_error = |source: io::Error| ShellError::Builtin {
            command: command.name.clone(),
            source,
        };
        let open = |path: &str| {
            File::open(path).map_err(|e| {
                builtin_error(io::Error::new(e.kind(), format!("{}: {}", path, e)))
            })
        };
        let file1 = open(path1)?;
        let file2 = open(path2)?;

        let mut out = io::stdout().lock();
        match mode {
            hdiff::DiffMode::Text => hdiff::compare_text(
                (path1, BufReader::new(file1)),
                (path2, BufReader::new(file2)),
                &mut out,
            )
            .map(|_| ())
            .map_err(builtin_error)?,
            hdiff::DiffMode::Binary => hdiff::compare_binary(file1, file2, &mut out)
                .map(|_| ())
                .map_err(builtin_error)?,
        }
        Ok(Status::Success)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
