use thiserror::Error;

use super::ast::{Command, RedirectCommand, SimpleCommand};
use super::tokens::Token;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    EmptyCommand,
    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),
}

/// Builds a command tree from a lexed line. A trailing `&` wraps the
/// whole line; `|` splits right-recursively, so `a | b | c` parses as
/// `a | (b | c)`.
pub fn parse(tokens: &[Token]) -> Result<Command, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyCommand);
    }
    if let Some((Token::Background, rest)) = tokens.split_last() {
        return Ok(Command::Background(Box::new(parse(rest)?)));
    }
    parse_pipeline(tokens)
}

fn parse_pipeline(tokens: &[Token]) -> Result<Command, ParseError> {
    match tokens.iter().position(|t| *t == Token::Pipe) {
        Some(split) => {
            let left = parse_segment(&tokens[..split])?;
            let right = parse_pipeline(&tokens[split + 1..])?;
            Ok(Command::Pipeline(Box::new(left), Box::new(right)))
        }
        None => parse_segment(tokens),
    }
}

fn parse_segment(tokens: &[Token]) -> Result<Command, ParseError> {
    let mut argv: Vec<String> = Vec::new();
    let mut environ: Vec<(String, String)> = Vec::new();
    let mut stdin_file = None;
    let mut stdout_file = None;
    let mut stderr_file = None;
    // Some(true) when the first out/err marker seen was `2>`.
    let mut err_marker_first: Option<bool> = None;

    for token in tokens {
        match token {
            Token::Word(word) => match env_assignment(word) {
                Some(pair) if argv.is_empty() => environ.push(pair),
                _ => argv.push(word.clone()),
            },
            Token::RedirectIn(target) => stdin_file = Some(target.clone()),
            Token::RedirectOut(target) => {
                err_marker_first.get_or_insert(false);
                stdout_file = Some(target.clone());
            }
            Token::RedirectErr(target) => {
                err_marker_first.get_or_insert(true);
                stderr_file = Some(target.clone());
            }
            other => {
                return Err(ParseError::UnexpectedToken(render_token(other)));
            }
        }
    }

    if argv.is_empty() {
        return Err(ParseError::EmptyCommand);
    }
    let simple = SimpleCommand {
        argv,
        environ,
        text: render(tokens),
    };
    if stdin_file.is_none() && stdout_file.is_none() && stderr_file.is_none() {
        Ok(Command::Simple(simple))
    } else {
        Ok(Command::Redirect(RedirectCommand {
            simple,
            stdin_file,
            stdout_file,
            stderr_file,
            stderr_before_stdout: err_marker_first == Some(true),
        }))
    }
}

fn env_assignment(word: &str) -> Option<(String, String)> {
    let (key, value) = word.split_once('=')?;
    let mut chars = key.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(render_token)
        .collect::<Vec<String>>()
        .join(" ")
}

fn render_token(token: &Token) -> String {
    match token {
        Token::Word(word) => word.clone(),
        Token::Pipe => "|".to_string(),
        Token::Background => "&".to_string(),
        Token::RedirectIn(target) => format!("< {target}"),
        Token::RedirectOut(target) => format!("> {target}"),
        Token::RedirectErr(target) if target.starts_with('&') => {
            format!("2>{target}")
        }
        Token::RedirectErr(target) => format!("2> {target}"),
    }
}
