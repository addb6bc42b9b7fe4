use anyhow::{bail, Result};
use indexmap::IndexMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Directed,
    Undirected,
}

/// Which incidence bucket of a vertex to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incidence {
    In,
    Out,
    Both,
}

#[derive(Debug, Clone)]
pub struct VertexData {
    pub id: String,
}

/// An immutable pattern or target graph.
///
/// Vertices and edges live in flat arenas with contiguous zero-based
/// indices; every edge is stored exactly once as an ordered (origin,
/// target) pair. For undirected graphs the orientation is arbitrary but
/// fixed at construction, and incidence queries consider both directions.
#[derive(Debug, Clone)]
pub struct GraphModel {
    graph: DiGraph<VertexData, ()>,
    vertex_lookup: IndexMap<String, NodeIndex>,
    kind: GraphKind,
}

impl GraphModel {
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_directed(&self) -> bool {
        self.kind == GraphKind::Directed
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn vertex_id(&self, index: usize) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(index))
            .map(|data| data.id.as_str())
    }

    pub fn vertex_by_id(&self, id: &str) -> Option<usize> {
        self.vertex_lookup.get(id).map(|idx| idx.index())
    }

    /// Endpoints of edge `index` as (origin, target).
    pub fn endpoints(&self, index: usize) -> Option<(usize, usize)> {
        self.graph
            .edge_endpoints(EdgeIndex::new(index))
            .map(|(origin, target)| (origin.index(), target.index()))
    }

    /// Ordered list of (origin, target) pairs for every edge.
    pub fn edge_list(&self) -> Vec<(usize, usize)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index()))
            .collect()
    }

    /// Edge indices incident to `vertex` in the requested bucket.
    ///
    /// For undirected graphs the stored orientation is immaterial, so
    /// `In`, `Out` and `Both` all return every incident edge.
    pub fn incident_edges(&self, vertex: usize, incidence: Incidence) -> Vec<usize> {
        let node = NodeIndex::new(vertex);
        let directions: &[Direction] = if self.is_directed() {
            match incidence {
                Incidence::In => &[Direction::Incoming],
                Incidence::Out => &[Direction::Outgoing],
                Incidence::Both => &[Direction::Incoming, Direction::Outgoing],
            }
        } else {
            &[Direction::Incoming, Direction::Outgoing]
        };

        let mut edges = Vec::new();
        for direction in directions {
            for edge in self.graph.edges_directed(node, *direction) {
                edges.push(edge.id().index());
            }
        }
        edges
    }

    /// Degree of `vertex`. Undirected self-loops count twice because the
    /// edge appears in both incidence directions.
    pub fn degree(&self, vertex: usize) -> usize {
        self.incident_edges(vertex, Incidence::Both).len()
    }

    /// First edge connecting `origin` to `target`, honouring the graph
    /// kind: undirected graphs accept either stored orientation.
    pub fn find_edge(&self, origin: usize, target: usize) -> Option<usize> {
        let forward = self
            .graph
            .find_edge(NodeIndex::new(origin), NodeIndex::new(target));
        if let Some(edge) = forward {
            return Some(edge.index());
        }
        if !self.is_directed() {
            return self
                .graph
                .find_edge(NodeIndex::new(target), NodeIndex::new(origin))
                .map(|edge| edge.index());
        }
        None
    }

    pub fn contains_edge(&self, origin: usize, target: usize) -> bool {
        self.find_edge(origin, target).is_some()
    }
}

/// Incremental construction of a [`GraphModel`]; the result is immutable.
#[derive(Debug)]
pub struct GraphBuilder {
    graph: DiGraph<VertexData, ()>,
    vertex_lookup: IndexMap<String, NodeIndex>,
    kind: GraphKind,
}

impl GraphBuilder {
    pub fn new(kind: GraphKind) -> Self {
        Self {
            graph: DiGraph::new(),
            vertex_lookup: IndexMap::new(),
            kind,
        }
    }

    pub fn with_capacity(kind: GraphKind, vertices: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(vertices, edges),
            vertex_lookup: IndexMap::with_capacity(vertices),
            kind,
        }
    }

    /// Adds a vertex and returns its index. Identifiers must be unique.
    pub fn add_vertex(&mut self, id: impl Into<String>) -> Result<usize> {
        let id = id.into();
        if self.vertex_lookup.contains_key(&id) {
            bail!("duplicate vertex identifier '{id}'");
        }
        let index = self.graph.add_node(VertexData { id: id.clone() });
        self.vertex_lookup.insert(id, index);
        Ok(index.index())
    }

    /// Adds an edge between two existing vertices and returns its index.
    pub fn add_edge(&mut self, origin: usize, target: usize) -> Result<usize> {
        let count = self.graph.node_count();
        if origin >= count || target >= count {
            bail!(
                "edge ({origin}, {target}) references a vertex outside 0..{}",
                count
            );
        }
        let edge = self
            .graph
            .add_edge(NodeIndex::new(origin), NodeIndex::new(target), ());
        Ok(edge.index())
    }

    pub fn finish(self) -> GraphModel {
        GraphModel {
            graph: self.graph,
            vertex_lookup: self.vertex_lookup,
            kind: self.kind,
        }
    }
}
