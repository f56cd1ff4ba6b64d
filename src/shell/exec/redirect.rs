use std::os::unix::io::RawFd;
use std::path::Path;

use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::unistd;

use super::ExecError;
use crate::shell::syntax::ast::RedirectCommand;

/// Rebinds the standard streams named by a redirect node. Stdin first;
/// stdout and stderr in the order their markers appeared in the source
/// text, so `2>&1` aliases whatever stdout denotes at that point.
pub(super) fn apply(cmd: &RedirectCommand) -> Result<(), ExecError> {
    if let Some(target) = &cmd.stdin_file {
        rebind(target, libc::STDIN_FILENO, OFlag::O_RDONLY)?;
    }

    let stdout = (
        cmd.stdout_file.as_deref(),
        libc::STDOUT_FILENO,
        OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
    );
    let stderr = (
        cmd.stderr_file.as_deref(),
        libc::STDERR_FILENO,
        OFlag::O_WRONLY | OFlag::O_CREAT,
    );
    let ordered = if cmd.stderr_before_stdout {
        [stderr, stdout]
    } else {
        [stdout, stderr]
    };
    for (target, slot, flags) in ordered {
        if let Some(target) = target {
            rebind(target, slot, flags)?;
        }
    }
    Ok(())
}

/// Opens (or resolves, for an `&N` alias) the target and duplicates it
/// onto the stream slot. Not O_CLOEXEC: the exec'd image must inherit
/// the rebound streams.
fn rebind(target: &str, slot: RawFd, flags: OFlag) -> Result<(), ExecError> {
    if let Some(fd) = fd_alias(target) {
        unistd::dup2(fd, slot)?;
        return Ok(());
    }
    let mode = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH;
    let fd = fcntl::open(Path::new(target), flags, mode)?;
    unistd::dup2(fd, slot)?;
    if fd != slot {
        unistd::close(fd)?;
    }
    Ok(())
}

fn fd_alias(target: &str) -> Option<RawFd> {
    target.strip_prefix('&')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::fd_alias;

    #[test]
    fn alias_targets() {
        assert_eq!(fd_alias("&1"), Some(1));
        assert_eq!(fd_alias("&2"), Some(2));
        assert_eq!(fd_alias("out"), None);
        assert_eq!(fd_alias("&x"), None);
    }
}
