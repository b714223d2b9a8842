//! The ordered mapping table.
//!
//! A [`MappingTable`] is a plain in-memory sequence of links between a
//! `load` and a `write`. It holds no handle on where the document came
//! from, does no locking, and never merges: a load replaces everything or
//! nothing.
//!
//! Order is meaningful. It is the order links are written in, and any
//! single-result lookup resolves ambiguity by taking the first match.

use std::fmt;
use std::io::{BufRead, Write};

use crate::document::{self, RawLink};
use crate::error::{Error, HookKind, MappingError, Result};
use crate::field::SourceField;
use crate::hooks::FieldHooks;
use crate::link::{Link, LinkId};
use crate::target::{TargetField, TargetNode};

/// Link type produced by a given set of hooks.
pub type LinkOf<H> = Link<<H as FieldHooks>::Source, <H as FieldHooks>::Target>;

/// An ordered table of source-to-target links, bound to one connector's
/// field types through its hooks.
pub struct MappingTable<H: FieldHooks> {
    hooks: H,
    links: Vec<LinkOf<H>>,
}

impl<H: FieldHooks> MappingTable<H> {
    /// Creates an empty table.
    pub fn new(hooks: H) -> Self {
        Self {
            hooks,
            links: Vec::new(),
        }
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    // ── Load / write ────────────────────────────────────────────────────

    /// Replaces the table's contents with the links in a `<map>` document.
    ///
    /// The whole document is parsed and every link passed through the hooks
    /// before anything is replaced. On error the table is left exactly as it
    /// was.
    pub fn load<R: BufRead>(&mut self, input: R) -> Result<()> {
        let raw = document::read_links(input)?;
        let links = self.build_links(raw)?;
        self.links = links;
        Ok(())
    }

    /// [`load`](Self::load) from an in-memory document.
    pub fn load_str(&mut self, doc: &str) -> Result<()> {
        self.load(doc.as_bytes())
    }

    fn build_links(&self, raw: Vec<RawLink>) -> Result<Vec<LinkOf<H>>> {
        raw.into_iter()
            .enumerate()
            .map(|(index, raw)| self.make_link(Some(index), &raw.source, &raw.target))
            .collect()
    }

    fn make_link(
        &self,
        link_index: Option<usize>,
        source: &str,
        target: &TargetNode,
    ) -> Result<LinkOf<H>> {
        let src = self.hooks.load_source(source).map_err(|cause| MappingError {
            link_index,
            hook: HookKind::Source,
            value: source.to_string(),
            cause,
        })?;
        let tgt = self.hooks.load_target(target).map_err(|cause| MappingError {
            link_index,
            hook: HookKind::Target,
            value: target.name().to_string(),
            cause,
        })?;
        Ok(Link::new(src, tgt))
    }

    /// Writes every link, in order, as a `<map>` document.
    ///
    /// Output is streamed; on an I/O error the sink may hold a partial
    /// document. Write to a temporary location and swap if that matters.
    pub fn write<W: Write>(&self, mut out: W) -> Result<()> {
        let nodes = self
            .links
            .iter()
            .map(|link| (link.source().name(), self.target_node(link)));
        document::write_links(&mut out, nodes)?;
        Ok(())
    }

    /// [`write`](Self::write) into a string.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Renders a link's target through the write hook.
    pub fn target_node(&self, link: &LinkOf<H>) -> TargetNode {
        let mut node = TargetNode::new(link.target().name());
        self.hooks.write_target(link.target(), &mut node);
        node
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// All links in table order.
    pub fn list(&self) -> &[LinkOf<H>] {
        &self.links
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LinkOf<H>> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LinkOf<H>> {
        self.links.get(index)
    }

    pub fn position(&self, id: LinkId) -> Option<usize> {
        self.links.iter().position(|link| link.id() == id)
    }

    /// Every link reading from `source`, in table order.
    pub fn find_by_source(&self, source: &H::Source) -> Vec<&LinkOf<H>> {
        self.links
            .iter()
            .filter(|link| link.source().matches(source))
            .collect()
    }

    /// Like [`find_by_source`](Self::find_by_source), building the probe
    /// field from a raw name with the source hook.
    pub fn find_by_source_name(&self, name: &str) -> Result<Vec<&LinkOf<H>>> {
        let probe = self.hooks.load_source(name).map_err(|cause| MappingError {
            link_index: None,
            hook: HookKind::Source,
            value: name.to_string(),
            cause,
        })?;
        Ok(self.find_by_source(&probe))
    }

    /// The first link, in table order, whose target is named `name`.
    pub fn find_by_target_name(&self, name: &str) -> Option<&LinkOf<H>> {
        self.links.iter().find(|link| link.target().name() == name)
    }

    // ── Mutation ────────────────────────────────────────────────────────

    /// Builds a link from persisted-form parts, running both load hooks.
    pub fn link_from_node(&self, source: &str, target: &TargetNode) -> Result<LinkOf<H>> {
        self.make_link(None, source, target)
    }

    /// Appends a link.
    pub fn add(&mut self, link: LinkOf<H>) -> LinkId {
        let id = link.id();
        self.links.push(link);
        id
    }

    /// Inserts a link at `index`, shifting later links back. `index` may
    /// equal [`len`](Self::len).
    pub fn insert_at(&mut self, index: usize, link: LinkOf<H>) -> Result<LinkId> {
        if index > self.links.len() {
            return Err(Error::Position {
                index,
                len: self.links.len(),
            });
        }
        let id = link.id();
        self.links.insert(index, link);
        Ok(id)
    }

    /// Removes a link, returning it.
    pub fn remove(&mut self, id: LinkId) -> Option<LinkOf<H>> {
        let index = self.position(id)?;
        Some(self.links.remove(index))
    }

    /// Removes the link at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<LinkOf<H>> {
        if index >= self.links.len() {
            return Err(Error::Position {
                index,
                len: self.links.len(),
            });
        }
        Ok(self.links.remove(index))
    }

    /// Swaps a link for another at the same position, returning the old one.
    pub fn replace(&mut self, id: LinkId, link: LinkOf<H>) -> Result<LinkOf<H>> {
        let index = self.position(id).ok_or(Error::UnknownLink(id))?;
        Ok(std::mem::replace(&mut self.links[index], link))
    }

    pub fn clear(&mut self) {
        self.links.clear();
    }
}

impl<'a, H: FieldHooks> IntoIterator for &'a MappingTable<H> {
    type Item = &'a LinkOf<H>;
    type IntoIter = std::slice::Iter<'a, LinkOf<H>>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

impl<H: FieldHooks> fmt::Debug for MappingTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingTable")
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}
