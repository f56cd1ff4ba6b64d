mod builtins;
pub mod exec;
pub mod reaper;
pub mod syntax;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

use log::debug;
use nix::unistd;

use self::builtins::BuiltinOutcome;

pub struct Shell {
    prompt: String,
    history: Vec<String>,
}

impl Shell {
    /// Starts in `$HOME`, like the login shells it imitates. A failed
    /// chdir is reported but not fatal.
    pub fn new() -> Shell {
        let home = env::var("HOME").unwrap_or_default();
        if let Err(e) = unistd::chdir(Path::new(&home)) {
            eprintln!("cannot cd to {home}: {e}");
        }
        let mut shell = Shell {
            prompt: String::new(),
            history: Vec::new(),
        };
        shell.refresh_prompt();
        shell
    }

    pub fn run_interactive(&mut self) -> i32 {
        if let Err(e) = reaper::install() {
            eprintln!("sigaction: {e}");
            return 1;
        }
        let interactive = unistd::isatty(libc::STDIN_FILENO).unwrap_or(false);
        let stdin = io::stdin();

        loop {
            // Background completions are observed between iterations,
            // never concurrently with a synchronous wait.
            for pid in reaper::drain() {
                exec::status::print_back_return(pid);
            }

            if interactive {
                print!("({}) $ ", self.prompt);
                let _ = io::stdout().flush();
            }
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => return 0,
                Ok(_) => {}
                Err(e) => {
                    eprintln!("input error: {e}");
                    return 1;
                }
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.history.push(line.to_string());

            match builtins::dispatch(self, line) {
                BuiltinOutcome::Exit => return 0,
                BuiltinOutcome::Handled => continue,
                BuiltinOutcome::NotBuiltin => {}
            }

            match syntax::lexer::lex(line) {
                Ok((rest, tokens)) if rest.is_empty() => {
                    match syntax::parser::parse(&tokens) {
                        Ok(cmd) => {
                            debug!("parsed: {cmd:?}");
                            let code = exec::run(cmd);
                            debug!("status: {code}");
                        }
                        Err(e) => eprintln!("syntax error: {e}"),
                    }
                }
                Ok((rest, _)) => {
                    eprintln!("syntax error: extraneous characters `{rest}`");
                }
                Err(e) => eprintln!("syntax error: {e}"),
            }
        }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn refresh_prompt(&mut self) {
        self.prompt = unistd::getcwd()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
    }
}
