use std::io::Write;
use std::process::{Command, Output, Stdio};

/// Runs the shell with `script` on stdin; returns its output and pid.
fn run_shell(args: &[&str], script: &str) -> (Output, u32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_shellex"))
        .args(args)
        .current_dir("/")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start shellex");
    let pid = child.id();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (output, pid)
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect()
}

#[test]
fn prints_banner_and_exits_cleanly_on_eof() {
    let (output, _) = run_shell(&[], "");
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["shellex: launched!"]);
}

#[test]
fn pid_and_ppid_match_the_process_tree() {
    let (output, pid) = run_shell(&[], "pid\nppid\n");
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            "shellex: launched!".to_string(),
            pid.to_string(),
            std::process::id().to_string(),
        ]
    );
}

#[test]
fn blank_lines_print_nothing() {
    let (output, _) = run_shell(&[], "\n   \n\t\n&\n");
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["shellex: launched!"]);
}

#[test]
fn cd_then_cd_reports_new_directory() {
    let (output, _) = run_shell(&[], "cd\ncd /\ncd\n");
    assert_eq!(stdout_lines(&output), vec!["shellex: launched!", "/", "/"]);
}

#[test]
fn foreground_output_precedes_next_line() {
    let (output, pid) = run_shell(&[], "echo first\npid\n");
    assert_eq!(
        stdout_lines(&output),
        vec!["shellex: launched!".to_string(), "first".to_string(), pid.to_string()]
    );
}

#[test]
fn background_launch_prints_pid_and_text() {
    let (output, pid) = run_shell(&[], "sleep 0.2 &\npid\n");
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 3, "unexpected output: {:?}", lines);

    let (job, text) = lines[1].split_once(' ').expect("pid followed by text");
    assert!(job.parse::<u32>().is_ok(), "not a pid: {}", job);
    assert_eq!(text, "sleep 0.2 &");
    assert_eq!(lines[2], pid.to_string());
}

#[test]
fn unknown_command_does_not_stop_the_shell() {
    let (output, pid) = run_shell(&[], "no-such-command-shellex arg\npid\n");
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            "shellex: launched!".to_string(),
            "no-such-command-shellex: Command not found.".to_string(),
            pid.to_string(),
        ]
    );
}

#[test]
fn exit_stops_reading_with_status_zero() {
    let (output, _) = run_shell(&[], "exit\npid\n");
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["shellex: launched!"]);
}

#[test]
fn prompt_option_does_not_change_evaluation() {
    let (output, pid) = run_shell(&["-p", "mine", "--reap-background"], "pid\n");
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec!["shellex: launched!".to_string(), pid.to_string()]
    );
}

#[test]
fn help_lists_builtins() {
    let (output, _) = run_shell(&[], "help\n");
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains(shellex::HELP_TEXT));
}
