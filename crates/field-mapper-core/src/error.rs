//! Error taxonomy for loading, writing and editing a mapping table.
//!
//! Every failing operation returns exactly one [`Error`] with its root cause
//! attached. A failed load never leaves a partially replaced table behind.

use std::fmt;
use std::io;

use crate::link::LinkId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a mapping table operation.
#[derive(Debug)]
pub enum Error {
    /// The `<map>` document is structurally invalid.
    Parse(ParseError),
    /// A connector hook rejected a source or target value.
    Mapping(MappingError),
    /// The underlying reader or writer failed.
    Io(io::Error),
    /// An insertion index past the end of the table.
    Position { index: usize, len: usize },
    /// The link id does not belong to this table.
    UnknownLink(LinkId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "invalid mapping document: {}", e),
            Error::Mapping(e) => write!(f, "mapping rejected: {}", e),
            Error::Io(e) => write!(f, "mapping I/O failed: {}", e),
            Error::Position { index, len } => {
                write!(f, "position {} is out of range for {} links", index, len)
            }
            Error::UnknownLink(id) => write!(f, "link {} is not in this mapping", id),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Mapping(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Position { .. } | Error::UnknownLink(_) => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<MappingError> for Error {
    fn from(e: MappingError) -> Self {
        Error::Mapping(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// What was wrong with the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Not well-formed XML, or a malformed attribute.
    Syntax(String),
    /// An element that the `<map>` grammar does not allow at this point.
    UnexpectedElement(String),
    /// A required attribute is absent from an element.
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    /// An attribute the element does not accept.
    UnexpectedAttribute {
        element: &'static str,
        attribute: String,
    },
    /// A `<link>` without a `<target>` child.
    MissingTarget,
    /// A `<link>` with more than one `<target>` child.
    DuplicateTarget,
    /// Non-whitespace character data inside the document.
    UnexpectedText,
    /// The document ended before a `<map>` root was seen, or was truncated.
    MissingRoot,
}

/// A structural error in a `<map>` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset in the input where the problem was detected.
    pub position: u64,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, position: u64) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::Syntax(msg) => write!(f, "{}", msg)?,
            ParseErrorKind::UnexpectedElement(name) => {
                write!(f, "unexpected element <{}>", name)?
            }
            ParseErrorKind::MissingAttribute { element, attribute } => {
                write!(f, "<{}> is missing required attribute '{}'", element, attribute)?
            }
            ParseErrorKind::UnexpectedAttribute { element, attribute } => {
                write!(f, "<{}> does not accept attribute '{}'", element, attribute)?
            }
            ParseErrorKind::MissingTarget => write!(f, "<link> has no <target>")?,
            ParseErrorKind::DuplicateTarget => write!(f, "<link> has more than one <target>")?,
            ParseErrorKind::UnexpectedText => write!(f, "unexpected text content")?,
            ParseErrorKind::MissingRoot => write!(f, "document has no complete <map> root")?,
        }
        write!(f, " (at byte {})", self.position)
    }
}

impl std::error::Error for ParseError {}

/// Which factory hook rejected a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Source,
    Target,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Source => write!(f, "source"),
            HookKind::Target => write!(f, "target"),
        }
    }
}

/// Rejection raised by a connector's factory hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HookError {}

/// A hook failure, located at the link that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingError {
    /// Zero-based index of the `<link>` element, or `None` outside a load.
    pub link_index: Option<usize>,
    pub hook: HookKind,
    /// The raw source name or target name that was rejected.
    pub value: String,
    pub cause: HookError,
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.link_index {
            Some(i) => write!(
                f,
                "link #{}: {} '{}': {}",
                i, self.hook, self.value, self.cause
            ),
            None => write!(f, "{} '{}': {}", self.hook, self.value, self.cause),
        }
    }
}

impl std::error::Error for MappingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}
