use std::io;
use tracing::debug;

/// Keep the process from being suspended with ^Z for its whole lifetime.
///
/// A stop in the middle of a large write to a pipe leaves the reader with a
/// half-written listing once the process is continued in the background.
#[cfg(unix)]
pub fn block_terminal_stop() -> io::Result<()> {
    unsafe {
        let mut blocked: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut blocked);
        libc::sigaddset(&mut blocked, libc::SIGTSTP);
        if libc::sigprocmask(libc::SIG_BLOCK, &blocked, std::ptr::null_mut()) == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    debug!(target: "cli", "SIGTSTP blocked");
    Ok(())
}

#[cfg(not(unix))]
pub fn block_terminal_stop() -> io::Result<()> {
    Ok(())
}
