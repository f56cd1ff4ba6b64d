/// A parsed command tree. Ownership is exclusive and tree-shaped; every
/// node is owned by exactly one parent and moves with it.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Simple(SimpleCommand),
    Redirect(RedirectCommand),
    Pipeline(Box<Command>, Box<Command>),
    Background(Box<Command>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleCommand {
    pub argv: Vec<String>,
    /// `KEY=value` overrides applied in the child before exec.
    pub environ: Vec<(String, String)>,
    /// Source text of this segment, kept for diagnostics.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedirectCommand {
    pub simple: SimpleCommand,
    pub stdin_file: Option<String>,
    pub stdout_file: Option<String>,
    pub stderr_file: Option<String>,
    /// Whether `2>` appeared before `>` in the source text. The order is
    /// observable: a later redirect can alias an earlier one's already
    /// rebound target.
    pub stderr_before_stdout: bool,
}

impl Command {
    pub fn text(&self) -> &str {
        match self {
            Command::Simple(simple) => &simple.text,
            Command::Redirect(redirect) => &redirect.simple.text,
            Command::Background(inner) => inner.text(),
            Command::Pipeline(..) => "",
        }
    }
}
