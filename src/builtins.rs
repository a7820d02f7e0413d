use std::ffi::OsString;
use std::io::Write;

use crate::error::ShellError;
use crate::jobs::JobTable;

/// The list of all builtin command names.
const BUILTINS: &[&str] = &["pwd", "cd", "exit", "jobs", "fg"];

#[derive(Debug, PartialEq)]
pub enum BuiltinAction {
    Continue,
    Exit,
}

/// Returns true if the command name is a shell builtin.
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Execute a builtin command, writing its output to `stdout`.
pub fn execute(
    program: &str,
    args: &[OsString],
    stdout: &mut dyn Write,
    job_table: &JobTable,
) -> BuiltinAction {
    match program {
        "pwd" => builtin_pwd(stdout),
        "cd" => builtin_cd(args, stdout),
        "exit" => return BuiltinAction::Exit,
        "jobs" => job_table.list(stdout),
        "fg" => builtin_fg(args, job_table, stdout),
        _ => {
            log::warn!("unknown builtin: {program}");
        }
    }
    BuiltinAction::Continue
}

fn builtin_pwd(stdout: &mut dyn Write) {
    match std::env::current_dir() {
        Ok(path) => {
            let _ = writeln!(stdout, "{}", path.display());
        }
        Err(e) => log::warn!("pwd: {e}"),
    }
}

/// A failed change is silent; the directory is printed either way.
fn builtin_cd(args: &[OsString], stdout: &mut dyn Write) {
    if let Some(target) = args.first() {
        if let Err(e) = std::env::set_current_dir(target) {
            log::debug!("cd: {}: {e}", target.to_string_lossy());
        }
    }

    match std::env::current_dir() {
        Ok(path) => {
            let _ = writeln!(stdout, "New wd: {}", path.display());
        }
        Err(e) => log::warn!("cd: {e}"),
    }
}

// ── Job control builtins ──

/// Wait for the job in the given slot as if it were a foreground command.
fn builtin_fg(args: &[OsString], job_table: &JobTable, stdout: &mut dyn Write) {
    let Some(arg) = args.first() else {
        let _ = writeln!(stdout, "{}", ShellError::NoJobSelected);
        return;
    };

    let result = arg
        .to_str()
        .and_then(|arg| arg.parse::<usize>().ok())
        .ok_or(ShellError::InvalidJob)
        .and_then(|slot| job_table.wait_on(slot));

    match result {
        Ok(Some(code)) => report_exit_code(code, stdout),
        Ok(None) => {}
        Err(e) => {
            let _ = writeln!(stdout, "{e}");
        }
    }
}

/// Report a non-zero exit code from a command the session waited on.
pub fn report_exit_code(code: i32, stdout: &mut dyn Write) {
    if code != 0 {
        let _ = writeln!(stdout, "Process finished with exit code {code}");
    }
}
