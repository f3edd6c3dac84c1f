use std::fs::{File, OpenOptions};
use std::os::fd::OwnedFd;
use std::process::{Child, Command, Stdio};

use log::{debug, error, warn};
use nix::fcntl::OFlag;
use nix::unistd::pipe2;

use crate::shell::error::{Result, ShellError};
use crate::shell::parser::ast::{CommandNode, Pipeline, RedirectOp};

use super::job_manager::JobManager;

/// What happened to a pipeline that was launched.
#[derive(Debug, Default)]
pub struct Launch {
    /// Stages that could not open a redirection target and were skipped.
    pub failures: Vec<ShellError>,
    /// Job index when the pipeline was sent to the background.
    pub job: Option<usize>,
}

/// Wires each stage's stdout to the next stage's stdin through an OS pipe,
/// starts one process per stage and waits for all of them unless the
/// pipeline runs in the background.
///
/// A pipe or spawn failure kills and reaps the stages already started and is
/// returned as an error; the shell itself keeps running.
pub fn execute(pipeline: &Pipeline, jobs: &mut JobManager) -> Result<Launch> {
    if pipeline.stages.iter().any(|stage| stage.name.is_empty()) {
        return Err(ShellError::EmptyStage);
    }

    let background = pipeline.is_background();
    let mut children: Vec<Child> = Vec::with_capacity(pipeline.stages.len());
    let mut launch = Launch::default();
    let mut upstream: Option<OwnedFd> = None;
    let last = pipeline.stages.len().saturating_sub(1);

    for (i, stage) in pipeline.stages.iter().enumerate() {
        // close-on-exec, so a stage never holds another stage's pipe ends open
        let (reader, writer) = if i < last {
            match pipe2(OFlag::O_CLOEXEC) {
                Ok((reader, writer)) => (Some(reader), Some(writer)),
                Err(e) => {
                    error!("pipe allocation failed before {}: {}", stage.name, e);
                    abort(&mut children);
                    return Err(ShellError::Pipe(e));
                }
            }
        } else {
            (None, None)
        };

        let stdin = match stage.redirection(RedirectOp::Input) {
            Some(target) => match File::open(target) {
                Ok(file) => Stdio::from(file),
                Err(source) => {
                    launch.failures.push(redirect_error(stage, target, source));
                    upstream = reader;
                    continue;
                }
            },
            None => match upstream.take() {
                Some(fd) => Stdio::from(fd),
                None if background => Stdio::null(),
                None => Stdio::inherit(),
            },
        };

        let stdout = match writer {
            Some(fd) => {
                if stage.redirection(RedirectOp::Output).is_some()
                    || stage.redirection(RedirectOp::Append).is_some()
                {
                    warn!("{}: stdout redirection ignored, stage is piped", stage.name);
                }
                Stdio::from(fd)
            }
            None => match open_output(stage) {
                Ok(stdout) => stdout,
                Err(failure) => {
                    launch.failures.push(failure);
                    upstream = reader;
                    continue;
                }
            },
        };

        match Command::new(&stage.name)
            .args(stage.operands())
            .stdin(stdin)
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .spawn()
        {
            Ok(child) => {
                debug!("spawned {} as pid {}", stage.name, child.id());
                children.push(child);
            }
            Err(e) => {
                abort(&mut children);
                return Err(ShellError::launch(&stage.name, e));
            }
        }
        upstream = reader;
    }

    if background {
        if !children.is_empty() {
            launch.job = Some(jobs.add_job(children, pipeline.line.clone()));
        }
    } else {
        wait_all(&mut children);
    }
    Ok(launch)
}

fn open_output(stage: &CommandNode) -> Result<Stdio> {
    let (target, file) = if let Some(target) = stage.redirection(RedirectOp::Append) {
        (
            target,
            OpenOptions::new().append(true).create(true).open(target),
        )
    } else if let Some(target) = stage.redirection(RedirectOp::Output) {
        (target, File::create(target))
    } else {
        return Ok(Stdio::inherit());
    };
    file.map(Stdio::from)
        .map_err(|source| redirect_error(stage, target, source))
}

fn redirect_error(stage: &CommandNode, target: &str, source: std::io::Error) -> ShellError {
    ShellError::Redirect {
        command: stage.name.clone(),
        target: target.to_string(),
        source,
    }
}

/// Blocks until every stage has exited; statuses are only logged.
fn wait_all(children: &mut [Child]) {
    for child in children.iter_mut() {
        match child.wait() {
            Ok(status) => debug!("pid {} exited: {}", child.id(), status),
            Err(e) => error!("failed to wait for pid {}: {}", child.id(), e),
        }
    }
}

fn abort(children: &mut Vec<Child>) {
    for child in children.iter_mut() {
        if let Err(e) = child.kill() {
            debug!("kill pid {}: {}", child.id(), e);
        }
    }
    wait_all(children);
    children.clear();
}
