/// Convert a raw `waitpid` status into shell-style exit code semantics.
///
/// A process terminated by a signal maps to `128 + signal`. Returns `None`
/// for statuses that are neither (stopped or continued children).
pub fn exit_code_from_wait_status(raw_status: libc::c_int) -> Option<i32> {
    if libc::WIFEXITED(raw_status) {
        return Some(libc::WEXITSTATUS(raw_status));
    }

    if libc::WIFSIGNALED(raw_status) {
        return Some(128 + libc::WTERMSIG(raw_status));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // Linux/BSD encoding: exit code in bits 8..16, terminating signal in the low 7 bits.
    fn exited(code: i32) -> libc::c_int {
        (code & 0xff) << 8
    }

    fn signaled(signal: i32) -> libc::c_int {
        signal & 0x7f
    }

    #[test]
    fn normal_exit_keeps_code() {
        assert_eq!(exit_code_from_wait_status(exited(0)), Some(0));
        assert_eq!(exit_code_from_wait_status(exited(3)), Some(3));
    }

    #[test]
    fn killed_child_maps_to_128_plus_signal() {
        assert_eq!(exit_code_from_wait_status(signaled(libc::SIGKILL)), Some(137));
        assert_eq!(exit_code_from_wait_status(signaled(libc::SIGINT)), Some(130));
    }

    #[test]
    fn stopped_child_has_no_exit_code() {
        let stopped = (libc::SIGTSTP << 8) | 0x7f;
        assert_eq!(exit_code_from_wait_status(stopped), None);
    }
}
