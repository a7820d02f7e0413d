use std::io::{self, BufRead, Write};

use crate::builtins::{self, BuiltinAction};
use crate::config::PROMPT;
use crate::error::{Result, ShellError};
use crate::executor::{self, Mode};
use crate::job_control;
use crate::jobs::JobTable;
use crate::parser::{self, Stages};
use crate::redirect::RedirectGuard;
use crate::signals::ForegroundGuard;

/// Whether the loop should keep reading.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Continue,
    Exit,
}

/// How a session came to an end.
#[derive(Debug, PartialEq)]
pub enum Ended {
    /// The `exit` built-in ran.
    Exit,
    /// The input stream was exhausted.
    EndOfInput,
}

/// Everything that lives for one interactive session.
#[derive(Debug, Default)]
pub struct Session {
    jobs: JobTable,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    /// Read and run lines until `exit` or end of input.
    ///
    /// Only fatal errors come back out; anything else is reported on stdout
    /// and the loop moves on to the next line. Lines are raw bytes and need
    /// not be valid UTF-8.
    pub fn run(&mut self, mut input: impl BufRead) -> Result<Ended> {
        let mut stdout = io::stdout();
        let mut line = Vec::new();

        loop {
            print!("{PROMPT}");
            let _ = stdout.flush();

            line.clear();
            match input.read_until(b'\n', &mut line) {
                Ok(0) => {
                    println!();
                    return Ok(Ended::EndOfInput);
                }
                Ok(_) => {}
                Err(e) => return Err(ShellError::ReadInput(e)),
            }

            match self.execute_line(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(Ended::Exit),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => println!("{e}"),
            }
        }
    }

    /// Run one line. Syntax errors are caught before any file is touched,
    /// and any output redirection is undone before this returns, on every
    /// path.
    pub fn execute_line(&mut self, line: &[u8]) -> Result<Flow> {
        let mut parsed = parser::parse(line);
        let target = parsed.take_redirect_target()?;
        if parsed.is_empty() {
            return Ok(Flow::Continue);
        }
        let stages = parsed.stages()?;

        let _redirect = target.map(RedirectGuard::stdout_to).transpose()?;

        let command = match stages {
            Stages::Single(words) | Stages::Pipe(words, _) => words,
        };
        let program = command[0].to_string_lossy();

        if builtins::is_builtin(&program) {
            let action =
                builtins::execute(&program, &command[1..], &mut io::stdout(), &self.jobs);
            return Ok(match action {
                BuiltinAction::Continue => Flow::Continue,
                BuiltinAction::Exit => Flow::Exit,
            });
        }

        let mode = if parsed.background {
            Mode::Background
        } else {
            Mode::Foreground
        };
        let pid = executor::launch(&stages, mode)?;

        match mode {
            Mode::Foreground => {
                let code = {
                    let _fg = ForegroundGuard::new(pid);
                    job_control::wait_for_pid(pid)
                }
                .map_err(|source| ShellError::Wait { pid, source })?;
                builtins::report_exit_code(code, &mut io::stdout());
            }
            Mode::Background => {
                let slot = self.jobs.register(pid, program);
                log::debug!("[{slot}] {pid} ({} job(s) tracked)", self.jobs.len());
            }
        }

        Ok(Flow::Continue)
    }
}
