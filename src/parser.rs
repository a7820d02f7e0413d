use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;

use crate::error::{Result, ShellError};

/// One line of input, split into words plus the flags the line carried.
///
/// Words are raw bytes from the terminal; nothing requires them to be UTF-8.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLine {
    /// Every word of the line, with the `|` separator removed.
    pub argv: Vec<OsString>,
    /// An `&` appeared somewhere in the line.
    pub background: bool,
    /// A `>` appeared somewhere in the line. The target is still the last
    /// word of `argv` until [`ParsedLine::take_redirect_target`] removes it.
    pub redirect: bool,
    /// Index in `argv` where the right-hand command of a pipe starts.
    pub pipe_split: Option<usize>,
}

/// The one or two commands a line asks to launch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stages<'a> {
    Single(&'a [OsString]),
    Pipe(&'a [OsString], &'a [OsString]),
}

impl ParsedLine {
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }

    /// Remove the redirection target from the end of `argv`.
    ///
    /// Returns `Ok(None)` when the line had no `>`. The target is assumed to
    /// contain no whitespace. At least one word must remain to run.
    pub fn take_redirect_target(&mut self) -> Result<Option<OsString>> {
        if !self.redirect {
            return Ok(None);
        }
        if self.argv.len() < 2 {
            return Err(ShellError::MissingRedirectTarget);
        }

        let target = self.argv.pop();
        if let Some(split) = self.pipe_split {
            if split >= self.argv.len() {
                return Err(ShellError::EmptyPipeStage);
            }
        }
        Ok(target)
    }

    /// Split `argv` into the commands to launch.
    pub fn stages(&self) -> Result<Stages<'_>> {
        match self.pipe_split {
            None if self.argv.is_empty() => Err(ShellError::EmptyPipeStage),
            None => Ok(Stages::Single(&self.argv)),
            Some(split) => {
                if split == 0 || split >= self.argv.len() {
                    return Err(ShellError::EmptyPipeStage);
                }
                let (left, right) = self.argv.split_at(split);
                Ok(Stages::Pipe(left, right))
            }
        }
    }
}

/// Split one raw line into a [`ParsedLine`].
///
/// Only the first `&` and the first `>` are recognised, wherever they occur;
/// each is blanked out and recorded as a flag. A word that is exactly `|`
/// ends the left-hand command. Every word is cut at its first control
/// character, which drops a stray carriage return.
pub fn parse(line: &[u8]) -> ParsedLine {
    let mut raw = line.to_vec();
    let background = blank_first(&mut raw, b'&');
    let redirect = blank_first(&mut raw, b'>');

    let mut argv = Vec::new();
    let mut pipe_split = None;

    for word in raw.split(|&b| matches!(b, b' ' | b'\t' | b'\n')) {
        let word = truncate_at_control(word);
        if word.is_empty() {
            continue;
        }
        if word == b"|" {
            pipe_split = Some(argv.len());
        } else {
            argv.push(OsString::from_vec(word.to_vec()));
        }
    }

    ParsedLine {
        argv,
        background,
        redirect,
        pipe_split,
    }
}

fn blank_first(line: &mut [u8], marker: u8) -> bool {
    match line.iter().position(|&b| b == marker) {
        Some(pos) => {
            line[pos] = b' ';
            true
        }
        None => false,
    }
}

fn truncate_at_control(word: &[u8]) -> &[u8] {
    match word.iter().position(|&b| b <= b' ') {
        Some(end) => &word[..end],
        None => word,
    }
}
