use std::ffi::{CStr, CString, OsString};
use std::io;
use std::os::raw::c_char;
use std::os::unix::ffi::OsStrExt;

use crate::status;

pub(crate) enum Fork {
    Child,
    Parent(libc::pid_t),
}

/// Result of a non-blocking liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Liveness {
    Running,
    Exited(i32),
    /// Already reaped (or never ours); nothing left to wait for.
    Gone,
}

pub(crate) fn fork_process() -> io::Result<Fork> {
    match unsafe { libc::fork() } {
        -1 => Err(io::Error::last_os_error()),
        0 => Ok(Fork::Child),
        pid => Ok(Fork::Parent(pid)),
    }
}

/// Block until `pid` terminates and return its shell-style exit code.
pub(crate) fn wait_for_pid(pid: libc::pid_t) -> io::Result<i32> {
    let mut raw_status: libc::c_int = 0;

    loop {
        let rc = unsafe { libc::waitpid(pid, &mut raw_status, 0) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                continue;
            }
            return Err(err);
        }

        if let Some(code) = status::exit_code_from_wait_status(raw_status) {
            return Ok(code);
        }
    }
}

/// `waitpid(WNOHANG)`. A process that has exited is reaped by the probe.
pub(crate) fn probe_pid(pid: libc::pid_t) -> io::Result<Liveness> {
    let mut raw_status: libc::c_int = 0;

    loop {
        let rc = unsafe { libc::waitpid(pid, &mut raw_status, libc::WNOHANG) };
        if rc == 0 {
            return Ok(Liveness::Running);
        }
        if rc > 0 {
            return Ok(match status::exit_code_from_wait_status(raw_status) {
                Some(code) => Liveness::Exited(code),
                None => Liveness::Running,
            });
        }

        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(code) if code == libc::EINTR => continue,
            Some(code) if code == libc::ECHILD => return Ok(Liveness::Gone),
            _ => return Err(err),
        }
    }
}

pub(crate) fn kill_pid(pid: libc::pid_t, signal: libc::c_int) -> io::Result<()> {
    if pid <= 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "invalid process id",
        ));
    }

    if unsafe { libc::kill(pid, signal) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Duplicate `fd` with close-on-exec set, so launched programs never inherit
/// the copy.
pub(crate) fn duplicate_fd(fd: libc::c_int) -> io::Result<libc::c_int> {
    let rc = unsafe { libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, 0) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(rc)
}

/// `dup2(from, to)`, retried on `EINTR`. Safe to call between fork and exec.
pub(crate) fn redirect_fd(from: libc::c_int, to: libc::c_int) -> io::Result<()> {
    loop {
        if unsafe { libc::dup2(from, to) } >= 0 {
            return Ok(());
        }

        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EINTR) {
            continue;
        }
        return Err(err);
    }
}

pub(crate) fn close_fd(fd: libc::c_int) {
    unsafe {
        libc::close(fd);
    }
}

/// Write all of `bytes` with raw `write(2)`. Usable from signal handlers and
/// from a forked child, where the std stdout lock must not be touched.
pub(crate) fn write_raw(fd: libc::c_int, bytes: &[u8]) {
    let mut rest = bytes;
    while !rest.is_empty() {
        let rc = unsafe { libc::write(fd, rest.as_ptr().cast(), rest.len()) };
        if rc < 0 {
            if io::Error::last_os_error().raw_os_error() == Some(libc::EINTR) {
                continue;
            }
            return;
        }
        rest = &rest[rc as usize..];
    }
}

/// A program image ready to be exec'd. Everything that allocates happens in
/// [`ExecImage::new`], before the fork.
pub(crate) struct ExecImage {
    args: Vec<CString>,
    argv: Vec<*const c_char>,
    failure_message: Vec<u8>,
}

impl ExecImage {
    pub(crate) fn new(words: &[OsString]) -> Result<Self, String> {
        let args = words
            .iter()
            .map(|word| {
                CString::new(word.as_bytes()).map_err(|_| word.to_string_lossy().into_owned())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut argv: Vec<*const c_char> = args.iter().map(|arg| arg.as_ptr()).collect();
        argv.push(std::ptr::null());

        let program = words.first().map(|word| word.as_bytes()).unwrap_or_default();
        let mut failure_message = b"An error has occurred in executing \"".to_vec();
        failure_message.extend_from_slice(program);
        failure_message.extend_from_slice(b"\"\n");

        Ok(ExecImage {
            args,
            argv,
            failure_message,
        })
    }

    pub(crate) fn program(&self) -> &CStr {
        &self.args[0]
    }

    /// Replace the current process image. Only returns by terminating: on
    /// failure the error is reported on stdout and the process exits with 1.
    pub(crate) fn exec(&self) -> ! {
        unsafe {
            libc::execvp(self.program().as_ptr(), self.argv.as_ptr());
        }
        write_raw(libc::STDOUT_FILENO, &self.failure_message);
        exit_child(1)
    }
}

/// Terminate a forked child without running the parent's atexit handlers or
/// flushing buffers it inherited.
pub(crate) fn exit_child(code: libc::c_int) -> ! {
    unsafe { libc::_exit(code) }
}
