use std::io::Write;

use crate::error::{Result, ShellError};
use crate::job_control::{self, Liveness};
use crate::signals::ForegroundGuard;

/// A background process launched by this session.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub slot: usize,
    pub pid: libc::pid_t,
    pub command: String,
}

/// The session's job table.
///
/// Entries are appended and never removed, so a slot number stays valid for
/// the whole session. Whether a job is still running is asked of the OS each
/// time, never stored.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a background process. Returns its slot.
    pub fn register(&mut self, pid: libc::pid_t, command: impl Into<String>) -> usize {
        let slot = self.jobs.len();
        let command = command.into();
        log::info!("job [{slot}] {command} started as pid {pid}");
        self.jobs.push(Job { slot, pid, command });
        slot
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Job> {
        self.jobs.get(slot)
    }

    /// Jobs whose process is still running, in slot order.
    pub fn running(&self) -> Vec<&Job> {
        self.jobs
            .iter()
            .filter(|job| match job_control::probe_pid(job.pid) {
                Ok(Liveness::Running) => true,
                Ok(Liveness::Exited(code)) => {
                    log::debug!("job [{}] {} exited with {code}", job.slot, job.command);
                    false
                }
                Ok(Liveness::Gone) => false,
                Err(e) => {
                    log::warn!("probing job [{}] pid {}: {e}", job.slot, job.pid);
                    false
                }
            })
            .collect()
    }

    /// Print every running job as `[slot]\tcommand\tpid`.
    pub fn list(&self, out: &mut dyn Write) {
        if self.is_empty() {
            return;
        }
        for job in self.running() {
            let _ = writeln!(out, "[{}]\t{}\t{}", job.slot, job.command, job.pid);
        }
    }

    /// Block until the job in `slot` finishes.
    ///
    /// Returns `Ok(None)` when the process was already reaped, for example by
    /// an earlier `jobs` probe.
    pub fn wait_on(&self, slot: usize) -> Result<Option<i32>> {
        let job = self.get(slot).ok_or(ShellError::InvalidJob)?;
        if job.pid <= 0 {
            return Err(ShellError::InvalidJob);
        }
        // A reaped pid can be handed to a newer job; that process is not ours
        // to wait on under this slot.
        if self.jobs[slot + 1..].iter().any(|later| later.pid == job.pid) {
            log::debug!("job [{slot}] pid {} reused by a later job", job.pid);
            return Ok(None);
        }

        let _fg = ForegroundGuard::new(job.pid);
        match job_control::wait_for_pid(job.pid) {
            Ok(code) => Ok(Some(code)),
            Err(e) if e.raw_os_error() == Some(libc::ECHILD) => Ok(None),
            Err(source) => Err(ShellError::Wait {
                pid: job.pid,
                source,
            }),
        }
    }
}
