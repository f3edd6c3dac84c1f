use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, ExitStatus};

use log::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Done,
    Killed,
    /// The last stage could not be waited on.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageState {
    Running,
    Exited(ExitStatus),
    Lost,
}

impl StageState {
    fn is_settled(self) -> bool {
        self != StageState::Running
    }
}

/// The job's final status, or `None` while any stage is still running.
/// Only the last stage decides how the job is reported.
fn settle(stages: &[StageState]) -> Option<JobStatus> {
    if !stages.iter().all(|stage| stage.is_settled()) {
        return None;
    }
    Some(match stages.last() {
        Some(StageState::Exited(status)) if status.signal().is_some() => JobStatus::Killed,
        Some(StageState::Lost) => JobStatus::Unknown,
        _ => JobStatus::Done,
    })
}

/// A background pipeline: every stage's child process, tracked until all of
/// them have exited.
#[derive(Debug)]
pub struct Job {
    pub index: usize,
    pub command: String,
    pub status: JobStatus,
    pub is_current: bool,
    pub is_previous: bool,
    children: Vec<Child>,
    stages: Vec<StageState>,
}

impl Job {
    fn new(index: usize, command: String, children: Vec<Child>) -> Self {
        let stages = vec![StageState::Running; children.len()];
        Self {
            index,
            command,
            status: JobStatus::Running,
            is_current: false,
            is_previous: false,
            children,
            stages,
        }
    }

    /// Pid of the last stage, the one reported to the user.
    pub fn pid(&self) -> u32 {
        self.children.last().map(Child::id).unwrap_or_default()
    }

    pub fn pids(&self) -> Vec<u32> {
        self.children.iter().map(Child::id).collect()
    }

    /// Polls every stage without blocking. Returns true once all have exited.
    fn poll(&mut self) -> bool {
        for (child, stage) in self.children.iter_mut().zip(self.stages.iter_mut()) {
            if stage.is_settled() {
                continue;
            }
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!("job [{}] pid {} exited: {}", self.index, child.id(), status);
                    *stage = StageState::Exited(status);
                }
                Ok(None) => {}
                Err(e) => {
                    error!("job [{}] pid {} wait failed: {}", self.index, child.id(), e);
                    *stage = StageState::Lost;
                }
            }
        }

        match settle(&self.stages) {
            Some(status) => {
                self.status = status;
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Killed => "killed",
            JobStatus::Unknown => "unknown",
        };
        let mark = if self.is_current {
            "+"
        } else if self.is_previous {
            "-"
        } else {
            " "
        };
        write!(
            f,
            "[{}] {} {} {} {}",
            self.index,
            mark,
            self.pid(),
            status,
            self.command
        )
    }
}

/// Registry of background jobs that the shell does not block on.
#[derive(Debug, Default)]
pub struct JobManager {
    jobs: Vec<Job>,
}

impl JobManager {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    pub fn get_jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn find_available_index(&self) -> usize {
        let mut index = 1;
        while self.jobs.iter().any(|job| job.index == index) {
            index += 1;
        }
        index
    }

    /// Registers the children of a background pipeline and returns the job index.
    pub fn add_job(&mut self, children: Vec<Child>, command: String) -> usize {
        let index = self.find_available_index();
        let mut job = Job::new(index, command, children);
        job.is_current = true;
        debug!("job [{}] started: {:?}", index, job.pids());
        self.jobs.push(job);
        self.update_marks(index);
        index
    }

    /// Removes and returns every job whose stages have all exited.
    pub fn reap(&mut self) -> Vec<Job> {
        let finished: Vec<usize> = self
            .jobs
            .iter_mut()
            .filter_map(|job| job.poll().then_some(job.index))
            .collect();

        finished
            .into_iter()
            .filter_map(|index| self.remove_job(index))
            .collect()
    }

    fn remove_job(&mut self, index: usize) -> Option<Job> {
        let pos = self.jobs.iter().position(|job| job.index == index)?;
        let job = self.jobs.remove(pos);

        if job.is_current && !self.jobs.is_empty() {
            // the previous job becomes current, otherwise the newest one does
            if let Some(prev_job) = self.jobs.iter_mut().find(|job| job.is_previous) {
                prev_job.is_current = true;
                prev_job.is_previous = false;
            } else {
                let last_idx = self.jobs.len() - 1;
                self.jobs[last_idx].is_current = true;
            }
        }
        Some(job)
    }

    fn update_marks(&mut self, current_job_index: usize) {
        for job in self.jobs.iter_mut() {
            if job.index == current_job_index {
                job.is_current = true;
                job.is_previous = false;
            } else if job.is_current {
                job.is_current = false;
                job.is_previous = true;
            } else {
                job.is_previous = false;
            }
        }
    }
}
