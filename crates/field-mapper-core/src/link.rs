//! A single source-to-target pairing.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LINK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Link`].
///
/// Two links mapping the same source name to the same target name are still
/// distinct entries; the id is what tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(u64);

impl LinkId {
    fn next() -> Self {
        LinkId(NEXT_LINK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An owned pairing of one source field and one target descriptor.
///
/// Links are immutable; tables replace or remove them whole. Equality is by
/// identity, so a link is only ever equal to itself.
#[derive(Debug)]
pub struct Link<S, T> {
    id: LinkId,
    source: S,
    target: T,
}

impl<S, T> Link<S, T> {
    pub fn new(source: S, target: T) -> Self {
        Self {
            id: LinkId::next(),
            source,
            target,
        }
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn into_parts(self) -> (S, T) {
        (self.source, self.target)
    }
}

impl<S, T> PartialEq for Link<S, T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S, T> Eq for Link<S, T> {}
