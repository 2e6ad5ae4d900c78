use std::fmt;

/// One operator command: a name and the rest of the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub arg: String,
}

impl Command {
    /// Split a line at the first run of whitespace
    ///
    /// Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim_start()),
            None => (line, ""),
        };
        Some(Self {
            name: name.to_string(),
            arg: arg.to_string(),
        })
    }

    pub(crate) fn eof() -> Self {
        Self {
            name: "EOF".to_string(),
            arg: String::new(),
        }
    }

    pub fn terminator(&self) -> Option<Terminator> {
        Terminator::from_name(&self.name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arg.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} {}", self.name, self.arg)
        }
    }
}

/// Commands that end a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// `continue`, `c`, `cont`
    Continue,
    /// `quit`, `q`, `exit`
    Quit,
    /// End of operator input, or an explicit `EOF`
    Eof,
}

impl Terminator {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "continue" | "c" | "cont" => Some(Terminator::Continue),
            "quit" | "q" | "exit" => Some(Terminator::Quit),
            "EOF" => Some(Terminator::Eof),
            _ => None,
        }
    }
}
