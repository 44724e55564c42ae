// src/fleet/child.rs

//! The child side of a fork.

use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};

use super::{ChildBody, ChildContext};
use crate::process::CurrentProcess;

/// Exit code of a child whose body returned an error.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Exit code of a child whose body panicked.
pub const PANIC_EXIT_CODE: i32 = 101;

/// Run `body` in the freshly forked child and terminate the process.
///
/// Uses `_exit` so that nothing inherited from the parent (atexit hooks,
/// destructors, buffered streams) runs a second time in the child.
pub(crate) fn run_and_exit<B>(index: usize, body: &B) -> !
where
    B: ChildBody + ?Sized,
{
    let ctx = ChildContext {
        index,
        process: CurrentProcess::acquire(),
    };

    let code = match panic::catch_unwind(AssertUnwindSafe(|| body.run(&ctx))) {
        Ok(Ok(code)) => code,
        Ok(Err(err)) => {
            let _ = writeln!(
                io::stderr(),
                "child {} (pid {}): {err}",
                index + 1,
                ctx.process.pid()
            );
            FAILURE_EXIT_CODE
        }
        Err(_) => PANIC_EXIT_CODE,
    };

    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    // SAFETY: `_exit` terminates the process immediately; nothing runs after it.
    unsafe { libc::_exit(code) }
}
