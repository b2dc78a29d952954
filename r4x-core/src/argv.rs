//! Per-request command arguments.

use std::fmt;

use bytes::Bytes;

/// The resolved arguments of one Redis command, in order.
///
/// The first argument is the command name. Built once per request from the
/// location's templates and handed to the Redis client by value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CommandArgv {
    args: Vec<Bytes>,
}

impl CommandArgv {
    /// Creates an empty argument list with room for `capacity` arguments.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            args: Vec::with_capacity(capacity),
        }
    }

    /// Appends an argument.
    pub fn push(&mut self, arg: impl Into<Bytes>) {
        self.args.push(arg.into());
    }

    /// Number of arguments, including the command name.
    pub fn argc(&self) -> usize {
        self.args.len()
    }

    /// Returns `true` if no argument has been pushed.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The command name, if any.
    pub fn name(&self) -> Option<&Bytes> {
        self.args.first()
    }

    /// Iterates over the arguments.
    pub fn iter(&self) -> impl Iterator<Item = &Bytes> {
        self.args.iter()
    }

    /// Byte length of every argument, in order.
    pub fn lens(&self) -> impl Iterator<Item = usize> + '_ {
        self.args.iter().map(Bytes::len)
    }

    /// Consumes the list, returning the raw arguments.
    pub fn into_inner(self) -> Vec<Bytes> {
        self.args
    }
}

impl<T: Into<Bytes>> FromIterator<T> for CommandArgv {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Debug for CommandArgv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.args.iter().map(|arg| String::from_utf8_lossy(arg)))
            .finish()
    }
}
