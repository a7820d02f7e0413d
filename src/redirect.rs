use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::error::{Result, ShellError};
use crate::job_control;

/// Owner read/write, as `S_IRUSR | S_IWUSR`.
const REDIRECT_FILE_MODE: u32 = 0o600;

/// RAII guard: points a descriptor (standard output in practice) at a file
/// on construction and puts the original back on drop, so every exit path
/// of a command restores the terminal.
///
/// The file is created if missing and truncated if present.
pub struct RedirectGuard {
    fd: libc::c_int,
    saved: libc::c_int,
    // Closed after `saved` is dup'd back over `fd`.
    _target: File,
}

impl RedirectGuard {
    /// Send standard output to `path` until the guard is dropped.
    pub fn stdout_to(path: impl AsRef<Path>) -> Result<Self> {
        // Anything still buffered belongs to the terminal, not the file.
        let _ = io::stdout().flush();
        Self::apply(libc::STDOUT_FILENO, path.as_ref())
    }

    fn apply(fd: libc::c_int, path: &Path) -> Result<Self> {
        let redirect_error = |source: io::Error| ShellError::Redirect {
            path: PathBuf::from(path),
            source,
        };

        let target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(REDIRECT_FILE_MODE)
            .open(path)
            .map_err(redirect_error)?;

        let saved = job_control::duplicate_fd(fd).map_err(redirect_error)?;
        if let Err(e) = job_control::redirect_fd(target.as_raw_fd(), fd) {
            job_control::close_fd(saved);
            return Err(redirect_error(e));
        }

        log::debug!("fd {fd} redirected to {}", path.display());
        Ok(RedirectGuard {
            fd,
            saved,
            _target: target,
        })
    }
}

impl Drop for RedirectGuard {
    fn drop(&mut self) {
        if self.fd == libc::STDOUT_FILENO {
            let _ = io::stdout().flush();
        }
        if let Err(e) = job_control::redirect_fd(self.saved, self.fd) {
            log::error!("failed to restore fd {}: {e}", self.fd);
        }
        job_control::close_fd(self.saved);
    }
}
