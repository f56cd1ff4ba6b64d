use std::env;
use std::path::Path;

use nix::unistd;

use super::Shell;

pub enum BuiltinOutcome {
    NotBuiltin,
    Handled,
    /// Sentinel recognized by the interpreter loop to terminate.
    Exit,
}

/// Builtins touch only process-wide state and run in the shell process,
/// so they are dispatched on the raw line before parsing.
pub fn dispatch(shell: &mut Shell, line: &str) -> BuiltinOutcome {
    if line == "exit" {
        return BuiltinOutcome::Exit;
    }
    if line == "pwd" {
        match unistd::getcwd() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => eprintln!("pwd: {e}"),
        }
        return BuiltinOutcome::Handled;
    }
    if line == "history" {
        for (index, entry) in shell.history().iter().enumerate() {
            println!("{:5}  {}", index + 1, entry);
        }
        return BuiltinOutcome::Handled;
    }
    if line == "cd" || line.starts_with("cd ") {
        change_dir(shell, line[2..].trim());
        return BuiltinOutcome::Handled;
    }
    BuiltinOutcome::NotBuiltin
}

fn change_dir(shell: &mut Shell, arg: &str) {
    let target = if arg.is_empty() {
        env::var("HOME").unwrap_or_default()
    } else {
        arg.to_string()
    };
    match unistd::chdir(Path::new(&target)) {
        Ok(()) => shell.refresh_prompt(),
        Err(e) => eprintln!("cannot cd to {target}: {e}"),
    }
}
