use crate::command::ExitCode;
use crate::env::Environment;
use log::debug;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

/// Commands the shell handles itself, before the line reaches the parser.
///
/// Built-ins match on a raw byte prefix of the line; they never see tokens.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Claim `line` if it belongs to this built-in.
    fn recognize(line: &[u8]) -> Option<Self>;

    /// Run in the shell process itself. Returns a shell-style status.
    fn execute(self, env: &mut Environment) -> ExitCode;
}

/// `exit`: any line starting with those four bytes stops the shell.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn recognize(line: &[u8]) -> Option<Self> {
        line.starts_with(b"exit").then_some(Exit)
    }

    fn execute(self, env: &mut Environment) -> ExitCode {
        env.should_exit = true;
        0
    }
}

/// `cd <dir>`: everything after `cd ` up to the line separator is the target,
/// spaces included.
pub struct Cd {
    pub target: Vec<u8>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn recognize(line: &[u8]) -> Option<Self> {
        let rest = line.strip_prefix(b"cd ")?;
        let rest = rest.strip_suffix(b"\n").unwrap_or(rest);
        let rest = rest.strip_suffix(b"\r").unwrap_or(rest);
        Some(Cd {
            target: rest.to_vec(),
        })
    }

    fn execute(self, env: &mut Environment) -> ExitCode {
        let target = OsStr::from_bytes(&self.target);
        match env.change_dir(target) {
            Ok(()) => 0,
            Err(err) => {
                debug!("chdir {target:?}: {err}");
                eprintln!("cannot cd {}", target.to_string_lossy());
                1
            }
        }
    }
}

fn try_run<T: BuiltinCommand>(line: &[u8], env: &mut Environment) -> Option<ExitCode> {
    let cmd = T::recognize(line)?;
    debug!("built-in {}", T::name());
    Some(cmd.execute(env))
}

/// Run `line` as a built-in if one claims it.
pub(crate) fn dispatch(line: &[u8], env: &mut Environment) -> Option<ExitCode> {
    try_run::<Exit>(line, env).or_else(|| try_run::<Cd>(line, env))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_is_a_plain_prefix_match() {
        assert!(Exit::recognize(b"exit").is_some());
        assert!(Exit::recognize(b"exit 3\n").is_some());
        assert!(Exit::recognize(b"exited").is_some());
        assert!(Exit::recognize(b" exit").is_none());
    }

    #[test]
    fn test_exit_sets_the_flag() {
        let mut env = Environment::new();
        assert_eq!(dispatch(b"exit\n", &mut env), Some(0));
        assert!(env.should_exit);
    }

    #[test]
    fn test_cd_needs_the_trailing_space() {
        assert!(Cd::recognize(b"cd").is_none());
        assert!(Cd::recognize(b"cdx /tmp").is_none());
    }

    #[test]
    fn test_cd_strips_only_the_line_separator() {
        assert_eq!(Cd::recognize(b"cd /tmp\n").unwrap().target, b"/tmp");
        assert_eq!(Cd::recognize(b"cd /tmp\r\n").unwrap().target, b"/tmp");
        assert_eq!(Cd::recognize(b"cd my dir ").unwrap().target, b"my dir ");
    }

    #[test]
    fn test_cd_failure_is_reported_and_recovered() {
        let mut env = Environment::new();
        let before = env.current_dir.clone();
        assert_eq!(dispatch(b"cd /nonexistent-forksh-dir\n", &mut env), Some(1));
        assert_eq!(env.current_dir, before);
        assert!(!env.should_exit);
    }

    #[test]
    fn test_cd_into_current_directory_succeeds() {
        let mut env = Environment::new();
        let here = env.current_dir.display().to_string();
        assert_eq!(dispatch(format!("cd {here}").as_bytes(), &mut env), Some(0));
    }

    #[test]
    fn test_other_lines_are_not_builtins() {
        let mut env = Environment::new();
        assert_eq!(dispatch(b"echo exit", &mut env), None);
    }

    #[test]
    fn test_cd_target_may_be_any_bytes() {
        let cd = Cd::recognize(b"cd caf\xe9\n").unwrap();
        assert_eq!(cd.target, b"caf\xe9");
        let mut env = Environment::new();
        assert_eq!(cd.execute(&mut env), 1);
    }
}
