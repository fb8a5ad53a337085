use crate::parser::MAXARGS;
use anyhow::{Result, bail};
use log::LevelFilter;
use std::path::PathBuf;

/// Default directory programs are looked up in.
pub const DEFAULT_SEARCH_DIR: &str = "/bin/";

/// Default prompt printed before each line.
pub const DEFAULT_PROMPT: &str = "prompt> ";

/// Runtime settings for the shell.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Prefix glued onto every program name. Always ends with `/`.
    pub search_dir: String,
    /// Upper bound on arguments per command, program name included.
    pub max_args: usize,
    pub prompt: String,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl ShellConfig {
    /// Build a config, normalizing and validating the fields that need it.
    pub fn new(
        search_dir: impl Into<String>,
        max_args: usize,
        prompt: impl Into<String>,
        log_level: LevelFilter,
        log_file: Option<PathBuf>,
    ) -> Result<Self> {
        let mut search_dir = search_dir.into();
        if search_dir.is_empty() {
            bail!("search directory must not be empty");
        }
        if search_dir.contains('\0') {
            bail!("search directory contains a NUL byte");
        }
        if !search_dir.ends_with('/') {
            search_dir.push('/');
        }
        if max_args == 0 {
            bail!("max-args must be at least 1");
        }
        Ok(Self {
            search_dir,
            max_args,
            prompt: prompt.into(),
            log_level,
            log_file,
        })
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            search_dir: DEFAULT_SEARCH_DIR.to_string(),
            max_args: MAXARGS,
            prompt: DEFAULT_PROMPT.to_string(),
            log_level: LevelFilter::Warn,
            log_file: None,
        }
    }
}
