use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn run_shell(lines: &[&str]) -> std::process::Output {
    let mut child = spawn_shell();

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        for line in lines {
            writeln!(stdin, "{line}").expect("write line");
        }
        writeln!(stdin, "exit").expect("write exit");
    }

    child.wait_with_output().expect("wait output")
}

fn spawn_shell() -> Child {
    Command::new(env!("CARGO_BIN_EXE_simple-shell"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn simple-shell")
}

fn send_line(stdin: &mut ChildStdin, line: &str) {
    writeln!(stdin, "{line}").expect("write line");
    stdin.flush().expect("flush");
}

fn interrupt(shell: &Child) {
    let rc = unsafe { libc::kill(shell.id() as libc::pid_t, libc::SIGINT) };
    assert_eq!(rc, 0, "could not signal the shell");
}

#[test]
fn background_job_returns_prompt_immediately() {
    // The job must not hold the shell's stdout/stderr open, or collecting the
    // output would wait for it to finish.
    let mut shell = Command::new(env!("CARGO_BIN_EXE_simple-shell"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn simple-shell");
    let mut stdin = shell.stdin.take().expect("stdin");

    let started = Instant::now();
    send_line(&mut stdin, "sleep 5 > /dev/null &");
    send_line(&mut stdin, "jobs");
    send_line(&mut stdin, "exit");
    drop(stdin);

    let output = shell.wait_with_output().expect("wait output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(started.elapsed() < Duration::from_secs(4), "shell blocked on a background job");
    assert!(stdout.contains("[0]\tsleep\t"), "stdout was: {stdout}");
}

#[test]
fn jobs_omits_finished_entries_but_keeps_slots() {
    let output = run_shell(&["true &", "sleep 5 &", "sleep 0.5", "jobs"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!stdout.contains("\ttrue\t"), "stdout was: {stdout}");
    assert!(stdout.contains("[1]\tsleep\t"), "stdout was: {stdout}");
}

#[test]
fn fg_waits_for_background_job() {
    let started = Instant::now();
    let output = run_shell(&["sleep 1 &", "fg 0", "echo DONE"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(started.elapsed() >= Duration::from_millis(900), "fg did not block");
    assert!(stdout.contains("DONE"), "stdout was: {stdout}");
}

#[test]
fn fg_reports_failing_job() {
    let output = run_shell(&["false &", "fg 0"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Process finished with exit code 1"),
        "stdout was: {stdout}"
    );
}

#[test]
fn fg_rejects_missing_and_invalid_jobs() {
    let output = run_shell(&["fg", "fg 4", "fg x", "echo ALIVE"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("No job selected"), "stdout was: {stdout}");
    assert_eq!(stdout.matches("Invalid job").count(), 2, "stdout was: {stdout}");
    assert!(stdout.contains("ALIVE"), "stdout was: {stdout}");
}

#[test]
fn interrupt_kills_foreground_child() {
    let mut shell = spawn_shell();
    let mut stdin = shell.stdin.take().expect("stdin");

    // Give the handlers time to be installed before anything is signalled.
    thread::sleep(Duration::from_millis(300));
    let started = Instant::now();
    send_line(&mut stdin, "sleep 30");
    thread::sleep(Duration::from_millis(500));
    interrupt(&shell);

    send_line(&mut stdin, "echo ALIVE");
    send_line(&mut stdin, "exit");
    drop(stdin);

    let output = shell.wait_with_output().expect("wait output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(started.elapsed() < Duration::from_secs(20), "foreground child was not killed");
    assert!(
        stdout.contains("Process finished with exit code 137"),
        "stdout was: {stdout}"
    );
    assert!(stdout.contains("ALIVE"), "stdout was: {stdout}");
    assert!(output.status.success());
}

#[test]
fn interrupt_kills_job_resumed_with_fg() {
    let mut shell = spawn_shell();
    let mut stdin = shell.stdin.take().expect("stdin");

    thread::sleep(Duration::from_millis(300));
    let started = Instant::now();
    send_line(&mut stdin, "sleep 30 > /dev/null &");
    send_line(&mut stdin, "fg 0");
    thread::sleep(Duration::from_millis(500));
    interrupt(&shell);

    send_line(&mut stdin, "echo ALIVE");
    send_line(&mut stdin, "exit");
    drop(stdin);

    let output = shell.wait_with_output().expect("wait output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(started.elapsed() < Duration::from_secs(20), "fg job was not killed");
    let killed = stdout
        .find("Process finished with exit code 137")
        .unwrap_or_else(|| panic!("stdout was: {stdout}"));
    assert!(stdout[killed..].contains("sh >> ALIVE"), "stdout was: {stdout}");
    assert!(output.status.success());
}

#[test]
fn interrupt_at_prompt_only_reprints_prompt() {
    let mut shell = spawn_shell();
    let mut stdin = shell.stdin.take().expect("stdin");

    thread::sleep(Duration::from_millis(300));
    interrupt(&shell);
    thread::sleep(Duration::from_millis(200));

    send_line(&mut stdin, "echo ALIVE");
    send_line(&mut stdin, "exit");
    drop(stdin);

    let output = shell.wait_with_output().expect("wait output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("ALIVE"), "stdout was: {stdout}");
    // Initial prompt, the redraw, and the prompt before `exit`.
    assert!(stdout.matches("sh >> ").count() >= 3, "stdout was: {stdout}");
    assert!(output.status.success());
}

#[test]
fn background_job_survives_interrupt() {
    let mut shell = spawn_shell();
    let mut stdin = shell.stdin.take().expect("stdin");

    thread::sleep(Duration::from_millis(300));
    send_line(&mut stdin, "sleep 5 &");
    send_line(&mut stdin, "sleep 30");
    thread::sleep(Duration::from_millis(500));
    interrupt(&shell);

    send_line(&mut stdin, "jobs");
    send_line(&mut stdin, "exit");
    drop(stdin);

    let output = shell.wait_with_output().expect("wait output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[0]\tsleep\t"), "stdout was: {stdout}");
}

#[test]
fn terminal_stop_at_prompt_does_not_stop_shell() {
    let mut shell = spawn_shell();
    let mut stdin = shell.stdin.take().expect("stdin");

    thread::sleep(Duration::from_millis(300));
    let rc = unsafe { libc::kill(shell.id() as libc::pid_t, libc::SIGTSTP) };
    assert_eq!(rc, 0);

    send_line(&mut stdin, "echo ALIVE");
    send_line(&mut stdin, "exit");
    drop(stdin);

    let output = shell.wait_with_output().expect("wait output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ALIVE"), "stdout was: {stdout}");
}
