use std::fs;

use salsify::shell::exec;
use salsify::shell::syntax::ast::Command;
use salsify::shell::syntax::{lexer, parser};

fn parse_line(line: &str) -> Command {
    let (rest, tokens) = lexer::lex(line).expect("lex failed");
    assert_eq!(rest, "", "unconsumed input");
    parser::parse(&tokens).expect("parse failed")
}

// Lives in its own test binary: the child applies the override with
// setenv between fork and exec, which must not contend with threads
// holding the environment lock.
#[test]
fn env_overrides_reach_the_child_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out");

    let cmd = parse_line(&format!(
        "GREETING=hola sh -c \"echo $GREETING\" > {}",
        path.display()
    ));
    assert_eq!(exec::run(cmd), 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), "hola\n");

    // The shell's own environment is untouched.
    assert!(std::env::var("GREETING").is_err());
}
