use forksh::{Interpreter, LineOutcome, ShellConfig};
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Fresh scratch directory for one test, unique per process and name.
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("forksh_tests_{}_{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn run(line: &str) -> LineOutcome {
    Interpreter::default().run_line(line.as_bytes()).expect("shell failure")
}

fn read(path: &PathBuf) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

#[test]
fn test_echo_arguments_land_in_file() {
    let dir = scratch("echo");
    let out = dir.join("out.txt");
    assert_eq!(
        run(&format!("echo a b c > {}", out.display())),
        LineOutcome::Completed(0)
    );
    assert_eq!(read(&out), "a b c\n");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_append_after_truncate() {
    let dir = scratch("append");
    let f = dir.join("f.txt");
    run(&format!("echo x > {}", f.display()));
    run(&format!("echo y >> {}", f.display()));
    assert_eq!(read(&f), "x\ny\n");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_truncate_twice_keeps_second_write() {
    let dir = scratch("truncate");
    let f = dir.join("f.txt");
    run(&format!("echo first > {}", f.display()));
    run(&format!("echo x > {}", f.display()));
    assert_eq!(read(&f), "x\n");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_pipe_delivers_output_exactly_once() {
    let dir = scratch("pipe");
    let grouped = dir.join("grouped.txt");
    let inner = dir.join("inner.txt");
    assert_eq!(
        run(&format!("(printf ab | cat) > {}", grouped.display())),
        LineOutcome::Completed(0)
    );
    assert_eq!(read(&grouped), "ab");
    run(&format!("printf ab | cat > {}", inner.display()));
    assert_eq!(read(&inner), "ab");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_three_stage_pipeline() {
    let dir = scratch("pipe3");
    let out = dir.join("out.txt");
    run(&format!("printf abc | cat | cat > {}", out.display()));
    assert_eq!(read(&out), "abc");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_input_redirection_feeds_stdin() {
    let dir = scratch("stdin");
    let input = dir.join("in.txt");
    let out = dir.join("out.txt");
    fs::write(&input, "hello\n").unwrap();
    run(&format!("cat < {} > {}", input.display(), out.display()));
    assert_eq!(read(&out), "hello\n");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_sequence_runs_right_side_after_failure() {
    let dir = scratch("seq");
    let out = dir.join("out.txt");
    assert_eq!(
        run(&format!("false ; echo done > {}", out.display())),
        LineOutcome::Completed(0)
    );
    assert_eq!(read(&out), "done\n");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_group_output_is_redirected_as_a_whole() {
    let dir = scratch("group");
    let out = dir.join("out.txt");
    run(&format!("(echo a ; echo b) > {}", out.display()));
    assert_eq!(read(&out), "a\nb\n");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_background_does_not_block() {
    let started = Instant::now();
    assert_eq!(run("sleep 1 &"), LineOutcome::Completed(0));
    assert!(started.elapsed() < Duration::from_millis(900));
}

#[test]
fn test_background_work_still_completes() {
    let dir = scratch("background");
    let out = dir.join("late.txt");
    let started = Instant::now();
    run(&format!("(sleep 1 ; echo late > {}) &", out.display()));
    assert!(started.elapsed() < Duration::from_millis(900));

    let deadline = Instant::now() + Duration::from_secs(10);
    while !(out.exists() && read(&out) == "late\n") {
        assert!(Instant::now() < deadline, "background job never finished");
        std::thread::sleep(Duration::from_millis(50));
    }
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_exit_status_of_program_is_reported() {
    assert_eq!(run("true"), LineOutcome::Completed(0));
    assert_eq!(run("false"), LineOutcome::Completed(1));
}

#[test]
fn test_unknown_program_fails_the_child() {
    assert_eq!(run("no-such-program-forksh"), LineOutcome::Completed(1));
}

#[test]
fn test_missing_input_file_fails_the_child() {
    assert_eq!(
        run("cat < /nonexistent-forksh-dir/in.txt"),
        LineOutcome::Completed(1)
    );
}

#[test]
fn test_failed_stage_does_not_stop_its_partner() {
    let dir = scratch("partner");
    let out = dir.join("out.txt");
    assert_eq!(
        run(&format!("no-such-program-forksh | echo ok > {}", out.display())),
        LineOutcome::Completed(0)
    );
    assert_eq!(read(&out), "ok\n");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_malformed_line_runs_nothing_and_shell_stays_usable() {
    let dir = scratch("malformed");
    let out = dir.join("out.txt");
    let mut sh = Interpreter::default();
    assert_eq!(sh.run_line(b"echo |").unwrap(), LineOutcome::Rejected);
    assert_eq!(
        sh.run_line(format!("echo fine > {}", out.display()).as_bytes()).unwrap(),
        LineOutcome::Completed(0)
    );
    assert_eq!(read(&out), "fine\n");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_search_dir_is_the_only_lookup_location() {
    let config = ShellConfig::new(
        "/nonexistent-forksh-dir",
        10,
        "$ ",
        log::LevelFilter::Off,
        None,
    )
    .unwrap();
    let mut sh = Interpreter::new(config);
    assert_eq!(sh.run_line(b"echo hi").unwrap(), LineOutcome::Completed(1));
}

#[test]
fn test_exit_and_cd_bypass_the_parser() {
    let mut sh = Interpreter::default();
    assert_eq!(
        sh.run_line(b"cd /nonexistent-forksh-dir | (").unwrap(),
        LineOutcome::Builtin(1)
    );
    assert_eq!(sh.run_line(b"exit |").unwrap(), LineOutcome::Exit);
}

#[test]
fn test_non_utf8_file_name_reaches_the_program() {
    let dir = scratch("bytes");
    let mut line = format!("echo x > {}/caf", dir.display()).into_bytes();
    line.extend_from_slice(b"\xe9.txt");
    let mut sh = Interpreter::default();
    assert_eq!(sh.run_line(&line).unwrap(), LineOutcome::Completed(0));
    let name = std::ffi::OsStr::from_bytes(b"caf\xe9.txt");
    assert_eq!(read(&dir.join(name)), "x\n");
    let _ = fs::remove_dir_all(dir);
}
