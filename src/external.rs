use crate::command::ExitCode;
use nix::sys::wait::WaitStatus;
use std::ffi::{CStr, CString};

/// Resolve a program name the way this shell does: by gluing it onto a single
/// search directory.
///
/// There is no PATH walk and no special handling of names that already contain
/// a `/`, so `sub/prog` resolves to `<search_dir>sub/prog`.
pub fn resolve_program(search_dir: &[u8], name: &CStr) -> CString {
    let mut path = Vec::with_capacity(search_dir.len() + name.to_bytes().len());
    path.extend_from_slice(search_dir);
    path.extend_from_slice(name.to_bytes());
    // Neither half contains a NUL: `name` is a C string and the search
    // directory is checked when the configuration is built.
    CString::new(path).unwrap_or_default()
}

/// Map a wait status onto a shell-style exit code.
///
/// Signal deaths become `128 + signo`, as in POSIX shells.
pub fn exit_code(status: WaitStatus) -> ExitCode {
    match status {
        WaitStatus::Exited(_, code) => code,
        WaitStatus::Signaled(_, signal, _) => 128 + signal as i32,
        _ => -1,
    }
}
