use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

// The handler must stay async-signal-safe: it only sets this flag.
// Collection and printing happen on the interpreter loop.
static SIGCHLD_PENDING: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigchld(_: libc::c_int) {
    SIGCHLD_PENDING.store(true, Ordering::Relaxed);
}

pub fn install() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_sigchld),
        SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP,
        SigSet::empty(),
    );
    unsafe { signal::sigaction(Signal::SIGCHLD, &action) }?;
    Ok(())
}

/// Collects every finished child of the shell's own process group without
/// blocking. Pipeline stages run in their own groups and are waited on by
/// pid, so only background jobs show up here.
pub fn drain() -> Vec<Pid> {
    let mut finished = Vec::new();
    if !SIGCHLD_PENDING.swap(false, Ordering::Relaxed) {
        return finished;
    }
    loop {
        match waitpid(Pid::from_raw(0), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(wait_status) => {
                if let Some(pid) = wait_status.pid() {
                    debug!("reaped background job {pid}");
                    finished.push(pid);
                }
            }
        }
    }
    finished
}
