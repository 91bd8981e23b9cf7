use std::fmt;
use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or inconsistent header, system description or software version.
    Header,
    /// A line that no rule of the current section accepts.
    Scope,
    /// A well-formed line that refers to something that does not exist.
    Semantic,
    /// A token that has no mapping for the value it should set.
    Token,
    /// Reading the input failed.
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            ErrorKind::Header => "header error",
            ErrorKind::Scope => "unexpected input",
            ErrorKind::Semantic => "invalid reference",
            ErrorKind::Token => "unknown token",
            ErrorKind::Io => "read error",
        }
    }
}

/// An enclosing section that was being parsed when the error happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Section name, empty at top-level.
    pub scope: String,
    pub line: u32,
}

/// "at top-level" or "in 'name' section".
pub(crate) fn scope_where(scope: &str) -> String {
    if scope.is_empty() {
        "at top-level".to_string()
    } else {
        format!("in '{}' section", scope)
    }
}

#[derive(Clone, Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub line: u32,
    pub msg: String,
    pub file_name: String,
    /// Innermost section first.
    pub context: Vec<Context>,
}

impl Error {
    pub fn new(kind: ErrorKind, msg: impl Into<String>, line: u32) -> Error {
        Error {
            kind,
            line,
            msg: msg.into(),
            file_name: "config-text".to_string(),
            context: Vec::new(),
        }
    }

    pub fn header(msg: impl Into<String>, line: u32) -> Error {
        Error::new(ErrorKind::Header, msg, line)
    }

    pub fn scope(msg: impl Into<String>, line: u32) -> Error {
        Error::new(ErrorKind::Scope, msg, line)
    }

    pub fn semantic(msg: impl Into<String>, line: u32) -> Error {
        Error::new(ErrorKind::Semantic, msg, line)
    }

    pub fn token(msg: impl Into<String>, line: u32) -> Error {
        Error::new(ErrorKind::Token, msg, line)
    }

    /// Kind of the failure that started the chain.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Record that this error happened while parsing the line at `line`
    /// inside the section `scope`.
    pub(crate) fn within(mut self, scope: &str, line: u32) -> Error {
        self.context.push(Context {
            scope: scope.to_string(),
            line,
        });
        self
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}: {}: {}", self.file_name, self.kind.as_str(), self.msg)?;
        } else {
            write!(f, "{}:{}: {}: {}", self.file_name, self.line, self.kind.as_str(), self.msg)?;
        }
        for ctx in &self.context {
            write!(f, "\n  from line {}: error {}", ctx.line, scope_where(&ctx.scope))?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}
