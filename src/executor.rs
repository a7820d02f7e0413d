use std::ffi::OsString;
use std::io::{self, Write};
use std::os::fd::AsRawFd;

use crate::error::{Result, ShellError};
use crate::job_control::{self, ExecImage, Fork};
use crate::parser::Stages;
use crate::signals;

/// Where a launched command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Foreground,
    Background,
}

/// Launch one command, or two joined by a pipe, and return the pid the
/// session tracks: the only child for a single command, the left-hand
/// stage for a pipeline.
///
/// The right-hand stage of a pipeline is forked by the left-hand child, so
/// the session never waits on it directly. It runs until its input reaches
/// end-of-file, which happens once the left stage exits or is killed.
pub fn launch(stages: &Stages<'_>, mode: Mode) -> Result<libc::pid_t> {
    let (left, right) = match stages {
        Stages::Single(words) => (image_for(words)?, None),
        Stages::Pipe(left, right) => (image_for(left)?, Some(image_for(right)?)),
    };

    let pipe = if right.is_some() {
        Some(os_pipe::pipe().map_err(ShellError::Pipe)?)
    } else {
        None
    };

    // A forked child inherits whatever is still buffered.
    let _ = io::stdout().flush();

    match job_control::fork_process().map_err(ShellError::Fork)? {
        Fork::Child => {
            if mode == Mode::Background {
                signals::ignore_interrupt_in_child();
            }
            match (pipe, right) {
                (Some((reader, writer)), Some(right)) => {
                    run_pipeline_child(&left, &right, reader.as_raw_fd(), writer.as_raw_fd())
                }
                _ => left.exec(),
            }
        }
        Fork::Parent(pid) => {
            log::debug!("forked pid {pid} for {:?} ({mode:?})", left.program());
            // Dropping the pipe closes the session's copies of both ends.
            drop(pipe);
            Ok(pid)
        }
    }
}

/// Body of the left-hand child: fork the right-hand stage reading the pipe,
/// then become the left-hand command writing into it.
fn run_pipeline_child(
    left: &ExecImage,
    right: &ExecImage,
    read_end: libc::c_int,
    write_end: libc::c_int,
) -> ! {
    match job_control::fork_process() {
        Ok(Fork::Child) => {
            // The write end must be gone before reading, or end-of-file
            // never arrives.
            connect(read_end, libc::STDIN_FILENO, read_end, write_end);
            right.exec()
        }
        Ok(Fork::Parent(_)) => {
            connect(write_end, libc::STDOUT_FILENO, read_end, write_end);
            left.exec()
        }
        Err(_) => {
            job_control::write_raw(
                libc::STDOUT_FILENO,
                b"An error has occurred in forking\n",
            );
            job_control::close_fd(read_end);
            job_control::close_fd(write_end);
            job_control::exit_child(1)
        }
    }
}

/// Put `pipe_end` on `target`, then close both original pipe descriptors.
fn connect(
    pipe_end: libc::c_int,
    target: libc::c_int,
    read_end: libc::c_int,
    write_end: libc::c_int,
) {
    let wired = job_control::redirect_fd(pipe_end, target);
    job_control::close_fd(read_end);
    job_control::close_fd(write_end);
    if wired.is_err() {
        job_control::write_raw(libc::STDOUT_FILENO, b"Error occurred during pipe, abort\n");
        job_control::exit_child(1);
    }
}

fn image_for(words: &[OsString]) -> Result<ExecImage> {
    if words.is_empty() {
        return Err(ShellError::EmptyPipeStage);
    }
    ExecImage::new(words).map_err(ShellError::InvalidArgument)
}
