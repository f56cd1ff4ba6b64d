use nix::sys::wait::WaitStatus;
use nix::unistd::{self, Pid};

use crate::shell::syntax::ast::Command;

const COLOR_BLUE: &str = "\x1b[34m";
const COLOR_RESET: &str = "\x1b[0m";

/// Exit code for a normal exit, negative signal number for a killed or
/// stopped child.
pub fn normalize(wait_status: WaitStatus) -> i32 {
    match wait_status {
        WaitStatus::Exited(_, code) => code,
        WaitStatus::Signaled(_, signal, _) => -(signal as i32),
        WaitStatus::Stopped(_, signal) => -(signal as i32),
        _ => 0,
    }
}

/// Classifies a wait result and prints one line when stdout is a
/// terminal. Pipelines and empty commands are normalized silently;
/// pipelines report per segment.
pub(crate) fn print_status_info(cmd: &Command, wait_status: WaitStatus) -> i32 {
    let code = normalize(wait_status);
    if cmd.text().is_empty() || matches!(cmd, Command::Pipeline(..)) {
        return code;
    }
    let action = match wait_status {
        WaitStatus::Exited(..) => "exited",
        WaitStatus::Signaled(..) => "killed",
        WaitStatus::Stopped(..) => "stopped",
        _ => return code,
    };
    if stdout_is_tty() {
        println!(
            "{COLOR_BLUE}\tProgram: [{}] {action}, status: {code} {COLOR_RESET}",
            cmd.text()
        );
    }
    code
}

pub(crate) fn print_back_info(pid: Pid) {
    if stdout_is_tty() {
        println!("{COLOR_BLUE}  [PID={pid}] {COLOR_RESET}");
    }
}

pub(crate) fn print_back_return(pid: Pid) {
    println!("{COLOR_BLUE} [ENDED ==> PID: {pid}] {COLOR_RESET}");
}

fn stdout_is_tty() -> bool {
    unistd::isatty(libc::STDOUT_FILENO).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use nix::sys::signal::Signal;
    use nix::sys::wait::WaitStatus;
    use nix::unistd::Pid;

    use super::normalize;

    #[test]
    fn normal_exit_keeps_its_code() {
        assert_eq!(normalize(WaitStatus::Exited(Pid::from_raw(42), 0)), 0);
        assert_eq!(normalize(WaitStatus::Exited(Pid::from_raw(42), 7)), 7);
    }

    #[test]
    fn signal_termination_is_negative_signal_number() {
        let pid = Pid::from_raw(42);
        assert_eq!(
            normalize(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            -9
        );
        assert_eq!(
            normalize(WaitStatus::Signaled(pid, Signal::SIGTERM, false)),
            -15
        );
    }

    #[test]
    fn stop_is_negative_signal_number() {
        let pid = Pid::from_raw(42);
        assert_eq!(normalize(WaitStatus::Stopped(pid, Signal::SIGTSTP)), -20);
    }
}
