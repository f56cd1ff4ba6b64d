#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Pipe,
    Background,
    RedirectIn(String),
    RedirectOut(String),
    RedirectErr(String),
}
