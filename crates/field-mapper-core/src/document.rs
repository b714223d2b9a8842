//! The persisted `<map>` document.
//!
//! ```text
//! <map>
//!   <link source="url">
//!     <target name="content_url" crawlUrl="true"/>
//!   </link>
//! </map>
//! ```
//!
//! Reading is purely structural: it yields one [`RawLink`] per `<link>` in
//! document order and never calls connector hooks, so the table can run the
//! hooks afterwards and swap in the result only when everything succeeded.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, ParseError, ParseErrorKind};
use crate::target::TargetNode;

const MAP: &[u8] = b"map";
const LINK: &[u8] = b"link";
const TARGET: &[u8] = b"target";

/// A `<link>` element before any connector hook has seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawLink {
    pub source: String,
    pub target: TargetNode,
}

enum State {
    Prolog,
    InMap,
    InLink {
        source: String,
        target: Option<TargetNode>,
    },
    InTarget {
        source: String,
        target: TargetNode,
    },
    Done,
}

/// Parses a complete `<map>` document.
pub(crate) fn read_links<R: BufRead>(input: R) -> Result<Vec<RawLink>, Error> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut links = Vec::new();
    let mut state = State::Prolog;

    loop {
        let position = reader.buffer_position() as u64;
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => return Err(xml_error(e, reader.buffer_position() as u64)),
        };

        state = match event {
            Event::Start(e) => open(state, &e, false, position)?,
            Event::Empty(e) => open(state, &e, true, position)?,
            Event::End(_) => match state {
                State::InTarget { source, target } => State::InLink {
                    source,
                    target: Some(target),
                },
                State::InLink {
                    target: None, ..
                } => {
                    return Err(ParseError::new(ParseErrorKind::MissingTarget, position).into())
                }
                State::InLink {
                    source,
                    target: Some(target),
                } => {
                    links.push(RawLink { source, target });
                    State::InMap
                }
                State::InMap => State::Done,
                State::Prolog | State::Done => {
                    return Err(ParseError::new(ParseErrorKind::MissingRoot, position).into())
                }
            },
            Event::Text(text) => {
                if text.iter().any(|b| !b.is_ascii_whitespace()) {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedText, position).into());
                }
                state
            }
            Event::CData(_) => {
                return Err(ParseError::new(ParseErrorKind::UnexpectedText, position).into())
            }
            Event::Eof => match state {
                State::Done => break,
                _ => return Err(ParseError::new(ParseErrorKind::MissingRoot, position).into()),
            },
            // Declarations, comments, processing instructions, doctype.
            _ => state,
        };
        buf.clear();
    }

    Ok(links)
}

fn open(state: State, e: &BytesStart<'_>, empty: bool, position: u64) -> Result<State, Error> {
    let name = e.name();
    let unexpected = || {
        ParseError::new(
            ParseErrorKind::UnexpectedElement(String::from_utf8_lossy(name.as_ref()).into_owned()),
            position,
        )
    };

    match state {
        State::Prolog if name.as_ref() == MAP => {
            if let Some((key, _)) = attributes(e, position)?.into_iter().next() {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedAttribute {
                        element: "map",
                        attribute: key,
                    },
                    position,
                )
                .into());
            }
            Ok(if empty { State::Done } else { State::InMap })
        }
        State::InMap if name.as_ref() == LINK => {
            let mut source = None;
            for (key, value) in attributes(e, position)? {
                if key == "source" {
                    source = Some(value);
                } else {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedAttribute {
                            element: "link",
                            attribute: key,
                        },
                        position,
                    )
                    .into());
                }
            }
            let source = source.ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::MissingAttribute {
                        element: "link",
                        attribute: "source",
                    },
                    position,
                )
            })?;
            if empty {
                return Err(ParseError::new(ParseErrorKind::MissingTarget, position).into());
            }
            Ok(State::InLink {
                source,
                target: None,
            })
        }
        State::InLink { source, target } if name.as_ref() == TARGET => {
            if target.is_some() {
                return Err(ParseError::new(ParseErrorKind::DuplicateTarget, position).into());
            }
            let target = target_node(e, position)?;
            Ok(if empty {
                State::InLink {
                    source,
                    target: Some(target),
                }
            } else {
                State::InTarget { source, target }
            })
        }
        _ => Err(unexpected().into()),
    }
}

fn target_node(e: &BytesStart<'_>, position: u64) -> Result<TargetNode, ParseError> {
    let mut name = None;
    let mut rest = Vec::new();
    for (key, value) in attributes(e, position)? {
        if key == "name" {
            name = Some(value);
        } else {
            rest.push((key, value));
        }
    }
    let name = name.ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::MissingAttribute {
                element: "target",
                attribute: "name",
            },
            position,
        )
    })?;
    let mut node = TargetNode::new(name);
    for (key, value) in rest {
        node.set(key, value);
    }
    Ok(node)
}

fn attributes(e: &BytesStart<'_>, position: u64) -> Result<Vec<(String, String)>, ParseError> {
    let syntax = |msg: String| ParseError::new(ParseErrorKind::Syntax(msg), position);
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| syntax(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| syntax(err.to_string()))?
            .into_owned();
        out.push((key, value));
    }
    Ok(out)
}

fn xml_error(e: quick_xml::Error, position: u64) -> Error {
    match e {
        quick_xml::Error::Io(io) => Error::Io(
            Arc::try_unwrap(io)
                .unwrap_or_else(|shared| io::Error::new(shared.kind(), shared.to_string())),
        ),
        other => ParseError::new(ParseErrorKind::Syntax(other.to_string()), position).into(),
    }
}

/// Writes a complete `<map>` document, one `<link>` per pair, in order.
pub(crate) fn write_links<'a, W, I>(out: &mut W, links: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, TargetNode)>,
{
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;

    let mut links = links.into_iter().peekable();
    if links.peek().is_none() {
        writeln!(out, "<map/>")?;
        return out.flush();
    }

    writeln!(out, "<map>")?;
    for (source, target) in links {
        writeln!(out, r#"  <link source="{}">"#, escape(source))?;
        write!(out, r#"    <target name="{}""#, escape(target.name()))?;
        for (key, value) in target.attrs() {
            debug_assert!(is_attr_name(key), "invalid attribute name {:?}", key);
            write!(out, r#" {}="{}""#, key, escape(value))?;
        }
        writeln!(out, "/>")?;
        writeln!(out, "  </link>")?;
    }
    writeln!(out, "</map>")?;
    out.flush()
}

/// Whether `key` can be written as an attribute name and read back as a
/// target attribute.
fn is_attr_name(key: &str) -> bool {
    let mut chars = key.chars();
    let first_ok = matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_');
    first_ok
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
        && key != "name"
}

/// Attribute-safe escaping. Whitespace control characters become character
/// references so they survive a read.
fn escape(value: &str) -> Cow<'_, str> {
    let escaped = quick_xml::escape::escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    Cow::Owned(
        escaped
            .replace('\n', "&#10;")
            .replace('\r', "&#13;")
            .replace('\t', "&#9;"),
    )
}
