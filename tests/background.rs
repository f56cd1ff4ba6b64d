use std::thread;
use std::time::{Duration, Instant};

use salsify::shell::syntax::ast::Command;
use salsify::shell::syntax::{lexer, parser};
use salsify::shell::{exec, reaper};

fn parse_line(line: &str) -> Command {
    let (rest, tokens) = lexer::lex(line).expect("lex failed");
    assert_eq!(rest, "", "unconsumed input");
    parser::parse(&tokens).expect("parse failed")
}

// Lives in its own test binary: the reaper's drain collects any finished
// child of the process group and must not race other tests' children.
#[test]
fn background_dispatch_returns_before_completion_and_is_reaped() {
    reaper::install().unwrap();

    let started = Instant::now();
    assert_eq!(exec::run(parse_line("sleep 1 &")), 0);
    assert!(
        started.elapsed() < Duration::from_millis(500),
        "background dispatch blocked on the child"
    );

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut finished = Vec::new();
    while finished.is_empty() && Instant::now() < deadline {
        finished = reaper::drain();
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(finished.len(), 1, "reaper never observed the job");
}
