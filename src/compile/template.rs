use super::parse::tree::Node;

/// A compiled template, ready to be rendered.
///
/// Borrows the source text it was compiled from, which is used to
/// point at the offending expression when rendering fails.
#[derive(Debug, Clone)]
pub struct Template<'source> {
    /// Nodes rendered in order to produce output.
    nodes: Vec<Node>,
    /// Reference to the source text.
    source: &'source str,
}

impl<'source> Template<'source> {
    /// Create a new [`Template`] from the given nodes and source.
    pub(crate) fn new(nodes: Vec<Node>, source: &'source str) -> Self {
        Self { nodes, source }
    }

    /// Return the nodes of the template.
    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the source text the template was compiled from.
    pub fn source(&self) -> &'source str {
        self.source
    }
}
