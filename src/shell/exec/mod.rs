pub mod status;

mod redirect;

use std::convert::Infallible;
use std::env;
use std::ffi::CString;
use std::os::unix::io::RawFd;
use std::process;

use log::debug;
use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{self, ForkResult, Pid};
use thiserror::Error;

use super::syntax::ast::{Command, SimpleCommand};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{0}")]
    Sys(#[from] nix::Error),
    #[error("argument contains an interior nul byte")]
    Nul(#[from] std::ffi::NulError),
}

/// Runs one command tree and returns its normalized status. Returns
/// immediately for background commands; their completion is observed
/// later by the reaper.
pub fn run(cmd: Command) -> i32 {
    match cmd {
        Command::Background(inner) => spawn_background(*inner),
        Command::Pipeline(left, right) => run_pipeline(*left, *right),
        leaf => run_foreground(leaf),
    }
}

fn run_foreground(cmd: Command) -> i32 {
    match unsafe { unistd::fork() } {
        Ok(ForkResult::Child) => exec_leaf(cmd),
        Ok(ForkResult::Parent { child }) => {
            debug!("forked {child} for `{}`", cmd.text());
            match waitpid(child, None) {
                Ok(wait_status) => status::print_status_info(&cmd, wait_status),
                Err(e) => {
                    eprintln!("wait for {child} failed: {e}");
                    1
                }
            }
        }
        Err(e) => {
            eprintln!("fork failed: {e}");
            1
        }
    }
}

/// Forks once and lets the child run the inner command; the parent does
/// not wait. The child stays in the shell's process group so the reaper
/// can observe its completion.
fn spawn_background(inner: Command) -> i32 {
    match unsafe { unistd::fork() } {
        Ok(ForkResult::Child) => exec_leaf(inner),
        Ok(ForkResult::Parent { child }) => {
            debug!("background job {child} for `{}`", inner.text());
            status::print_back_info(child);
            0
        }
        Err(e) => {
            eprintln!("fork failed: {e}");
            1
        }
    }
}

/// Wires one pipe between two forked children and waits for both.
/// A nested right-hand pipeline recurses inside the right child, which
/// exits with the recursion's combined status.
fn run_pipeline(left: Command, right: Command) -> i32 {
    // No partial pipeline: a failed pipe aborts the whole attempt.
    let (read_fd, write_fd) = match unistd::pipe() {
        Ok(fds) => fds,
        Err(e) => {
            eprintln!("pipe failed: {e}");
            return 1;
        }
    };

    let left_pid = match unsafe { unistd::fork() } {
        Ok(ForkResult::Child) => {
            if let Err(e) = prepare_writer(read_fd, write_fd) {
                eprintln!("pipe setup failed: {e}");
                process::exit(1);
            }
            exec_leaf(left)
        }
        Ok(ForkResult::Parent { child }) => child,
        Err(e) => {
            let _ = unistd::close(read_fd);
            let _ = unistd::close(write_fd);
            eprintln!("fork failed: {e}");
            return 1;
        }
    };

    let right_is_pipeline = matches!(right, Command::Pipeline(_, _));
    let right_pid = match unsafe { unistd::fork() } {
        Ok(ForkResult::Child) => {
            if let Err(e) = prepare_reader(read_fd, write_fd) {
                eprintln!("pipe setup failed: {e}");
                process::exit(1);
            }
            match right {
                Command::Pipeline(next_left, next_right) => {
                    process::exit(run_pipeline(*next_left, *next_right))
                }
                leaf => exec_leaf(leaf),
            }
        }
        Ok(ForkResult::Parent { child }) => child,
        Err(e) => {
            let _ = unistd::close(read_fd);
            let _ = unistd::close(write_fd);
            eprintln!("fork failed: {e}");
            // Reap the writer so the failed attempt leaves no zombie.
            let _ = waitpid(left_pid, None);
            return 1;
        }
    };
    debug!("pipeline stages {left_pid} | {right_pid}");

    // Both parent ends must be closed before waiting; holding either open
    // keeps the reader from ever seeing end-of-file.
    let _ = unistd::close(read_fd);
    let _ = unistd::close(write_fd);

    let left_code = match waitpid(left_pid, None) {
        Ok(wait_status) => status::print_status_info(&left, wait_status),
        Err(e) => {
            eprintln!("wait for {left_pid} failed: {e}");
            1
        }
    };
    let right_code = match waitpid(right_pid, None) {
        // A nested pipeline already reported its own segments.
        Ok(wait_status) if right_is_pipeline => status::normalize(wait_status),
        Ok(wait_status) => status::print_status_info(&right, wait_status),
        Err(e) => {
            eprintln!("wait for {right_pid} failed: {e}");
            1
        }
    };

    if left_code != 0 || right_code != 0 {
        1
    } else {
        0
    }
}

/// New process group, stdout into the pipe, both pipe ends closed.
fn prepare_writer(read_fd: RawFd, write_fd: RawFd) -> nix::Result<()> {
    unistd::setpgid(Pid::from_raw(0), Pid::from_raw(0))?;
    unistd::close(read_fd)?;
    unistd::dup2(write_fd, libc::STDOUT_FILENO)?;
    unistd::close(write_fd)?;
    Ok(())
}

/// New process group, stdin from the pipe, both pipe ends closed.
fn prepare_reader(read_fd: RawFd, write_fd: RawFd) -> nix::Result<()> {
    unistd::setpgid(Pid::from_raw(0), Pid::from_raw(0))?;
    unistd::close(write_fd)?;
    unistd::dup2(read_fd, libc::STDIN_FILENO)?;
    unistd::close(read_fd)?;
    Ok(())
}

/// Dispatches a command inside an already-forked child. Never returns:
/// the process either replaces its image or exits with a status.
fn exec_leaf(cmd: Command) -> ! {
    match cmd {
        Command::Simple(simple) => launch(simple),
        Command::Redirect(redirect_cmd) => {
            if let Err(e) = redirect::apply(&redirect_cmd) {
                eprintln!("{}: {}", redirect_cmd.simple.text, e);
                process::exit(1);
            }
            launch(redirect_cmd.simple)
        }
        Command::Pipeline(left, right) => process::exit(run_pipeline(*left, *right)),
        Command::Background(inner) => exec_leaf(*inner),
    }
}

/// Applies environment overrides and replaces the process image. On
/// failure the child terminates itself; its exit status is the only
/// channel back to the parent.
fn launch(simple: SimpleCommand) -> ! {
    match do_launch(&simple) {
        Ok(never) => match never {},
        Err(ExecError::Sys(Errno::ENOENT)) if !path_qualified(&simple.argv[0]) => {
            eprintln!("{}: command not found", simple.argv[0]);
        }
        Err(e) => eprintln!("{}: {}", simple.text, e),
    }
    process::exit(1);
}

fn do_launch(simple: &SimpleCommand) -> Result<Infallible, ExecError> {
    for (key, value) in &simple.environ {
        env::set_var(key, value);
    }
    let argv = simple
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<CString>, _>>()?;
    Ok(unistd::execvp(&argv[0], &argv)?)
}

fn path_qualified(program: &str) -> bool {
    program.starts_with('.') || program.contains('/')
}
