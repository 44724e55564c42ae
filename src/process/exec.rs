// src/process/exec.rs

//! Image replacement for use inside a forked child.

use std::convert::Infallible;
use std::ffi::CString;

use nix::errno::Errno;
use nix::unistd;

use crate::errors::{ProclabError, Result};

/// Replace the calling process's program with `program`, looked up on
/// `PATH` when it has no slash, passing `argv` as its argument vector.
///
/// `argv[0]` is what the new program sees as its own name; an empty `argv`
/// passes `program` in that slot.
///
/// On success this never returns. On failure the caller is still running
/// its old image and must terminate explicitly; the fleet's child wrapper
/// does that when a body returns the error.
pub fn replace_image<S: AsRef<str>>(program: &str, argv: &[S]) -> Result<Infallible> {
    if program.trim().is_empty() {
        return Err(ProclabError::InvalidInput("empty program path".to_string()));
    }

    let invalid = || ProclabError::Exec {
        program: program.to_string(),
        source: Errno::EINVAL,
    };

    let c_program = CString::new(program).map_err(|_| invalid())?;
    let mut c_args = argv
        .iter()
        .map(|arg| CString::new(arg.as_ref()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    if c_args.is_empty() {
        c_args.push(c_program.clone());
    }

    unistd::execvp(&c_program, &c_args).map_err(|source| ProclabError::Exec {
        program: program.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program_is_rejected_before_exec() {
        let argv: [&str; 0] = [];
        assert!(matches!(replace_image("", &argv), Err(ProclabError::InvalidInput(_))));
        assert!(matches!(replace_image("  ", &["x"]), Err(ProclabError::InvalidInput(_))));
    }

    #[test]
    fn interior_nul_is_rejected_before_exec() {
        match replace_image("ls", &["ls", "bad\0arg"]) {
            Err(ProclabError::Exec { program, source }) => {
                assert_eq!(program, "ls");
                assert_eq!(source, Errno::EINVAL);
            }
            other => panic!("expected Exec error, got {other:?}"),
        }
    }
}
