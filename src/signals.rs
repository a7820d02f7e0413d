use std::io;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::config::PROMPT;
use crate::error::{Result, ShellError};
use crate::job_control;

/// No foreground process.
const NO_FOREGROUND: libc::pid_t = 0;

/// Pid of the process the session is currently blocked on, or
/// [`NO_FOREGROUND`]. Shared with the SIGINT and SIGTSTP handlers, which only
/// ever load it.
static FOREGROUND_PID: AtomicI32 = AtomicI32::new(NO_FOREGROUND);

/// What an interrupt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Killed(libc::pid_t),
    Reprompted,
}

/// RAII guard: marks `pid` as the foreground process for the duration of a
/// blocking wait and clears the marker on drop, whether the wait succeeded
/// or not.
pub struct ForegroundGuard {
    _private: (),
}

impl ForegroundGuard {
    pub fn new(pid: libc::pid_t) -> Self {
        FOREGROUND_PID.store(pid, Ordering::SeqCst);
        ForegroundGuard { _private: () }
    }
}

impl Drop for ForegroundGuard {
    fn drop(&mut self) {
        FOREGROUND_PID.store(NO_FOREGROUND, Ordering::SeqCst);
    }
}

pub fn foreground_pid() -> Option<libc::pid_t> {
    match FOREGROUND_PID.load(Ordering::SeqCst) {
        NO_FOREGROUND => None,
        pid => Some(pid),
    }
}

/// Install the session's SIGINT and SIGTSTP handling.
pub fn install() -> Result<()> {
    ctrlc::set_handler(|| {
        if let Interrupt::Killed(pid) = handle_interrupt() {
            log::debug!("interrupt: killed foreground pid {pid}");
        }
    })
    .map_err(|e| ShellError::SignalSetup(format!("SIGINT: {e}")))?;

    install_raw(libc::SIGTSTP, on_terminal_stop)
        .map_err(|e| ShellError::SignalSetup(format!("SIGTSTP: {e}")))?;

    Ok(())
}

/// SIGINT: kill the foreground process outright, or give the user a fresh
/// prompt when nothing is running.
pub fn handle_interrupt() -> Interrupt {
    match foreground_pid() {
        Some(pid) => {
            let _ = job_control::kill_pid(pid, libc::SIGKILL);
            Interrupt::Killed(pid)
        }
        None => {
            reprompt();
            Interrupt::Reprompted
        }
    }
}

/// Runs in signal context: no allocation, no locks.
extern "C" fn on_terminal_stop(_signal: libc::c_int) {
    reprompt();
}

fn reprompt() {
    job_control::write_raw(libc::STDOUT_FILENO, b"\n");
    job_control::write_raw(libc::STDOUT_FILENO, PROMPT.as_bytes());
}

fn install_raw(signal: libc::c_int, handler: extern "C" fn(libc::c_int)) -> io::Result<()> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);

        if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Called first thing in a background child: an interrupt aimed at the
/// foreground task must not take this one down. The ignored disposition
/// survives `exec`.
pub(crate) fn ignore_interrupt_in_child() {
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_IGN);
    }
}
