use anyhow::{Context, Result};
use argh::FromArgs;
use forksh::config::{DEFAULT_PROMPT, DEFAULT_SEARCH_DIR};
use forksh::{Interpreter, LineOutcome, MAXARGS, ShellConfig, logging};
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(FromArgs)]
/// A minimal shell with pipes, redirections, sequencing and background jobs.
struct Args {
    #[argh(option, default = "DEFAULT_SEARCH_DIR.to_string()")]
    /// directory program names are appended to (default: /bin/)
    search_dir: String,

    #[argh(option, default = "MAXARGS")]
    /// maximum number of words per command (default: 10)
    max_args: usize,

    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// prompt printed before each line
    prompt: String,

    #[argh(option, default = "String::from(\"warn\")")]
    /// one of off, error, warn, info, debug, trace (default: warn)
    log_level: String,

    #[argh(option)]
    /// also append log records to this file
    log_file: Option<PathBuf>,

    #[argh(option, short = 'c')]
    /// run this one line instead of starting a prompt
    command: Option<String>,
}

fn run(args: Args) -> Result<i32> {
    let level = LevelFilter::from_str(&args.log_level)
        .with_context(|| format!("unknown log level {:?}", args.log_level))?;
    let config = ShellConfig::new(
        args.search_dir,
        args.max_args,
        args.prompt,
        level,
        args.log_file,
    )?;
    logging::init(config.log_level, config.log_file.as_deref())?;

    let mut sh = Interpreter::new(config);
    match args.command {
        Some(line) => Ok(match sh.run_line(line.as_bytes())? {
            LineOutcome::Exit | LineOutcome::Blank => 0,
            LineOutcome::Builtin(code) | LineOutcome::Completed(code) => code,
            LineOutcome::Rejected => 2,
        }),
        None => {
            sh.repl()?;
            Ok(0)
        }
    }
}

fn main() {
    let args: Args = argh::from_env();
    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("forksh: {err:#}");
            std::process::exit(1);
        }
    }
}
