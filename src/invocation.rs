use std::ffi::OsString;
use std::path::PathBuf;

use errors::*;

pub const USAGE: &'static str = "usage: tee-pipefail [-a] <command> [args...] <file>
where <command> is an executable command and <file> is the name of the file into which \
the output of <command> will be duplicated. <args> is the list of zero or more arguments \
that will be given to <command>.";

/// One run of the wrapper: what to launch and where its output goes.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: OsString,
    pub arguments: Vec<OsString>,
    pub destination: PathBuf,
    pub append: bool,
}

impl Invocation {
    /// The first token names the command and the last one the destination;
    /// everything in between is handed to the command untouched.
    pub fn resolve<I>(tokens: I, append: bool) -> Result<Invocation>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut tokens = tokens.into_iter();
        let command = tokens
            .next()
            .and_then(|c| if c.is_empty() { None } else { Some(c) })
            .ok_or(ErrorKind::MissingCommand)?;

        let mut arguments = tokens.collect::<Vec<_>>();
        let destination = arguments
            .pop()
            .map(PathBuf::from)
            .ok_or(ErrorKind::MissingDestination)?;

        Ok(Invocation {
            command: command,
            arguments: arguments,
            destination: destination,
            append: append,
        })
    }

    pub fn program_name(&self) -> String {
        self.command.to_string_lossy().into_owned()
    }

    /// Space-joined rendition, for diagnostics only. The child is always
    /// launched from the argument vector.
    pub fn command_line(&self) -> String {
        let mut line = self.program_name();
        for arg in &self.arguments {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}
