// Link resolver - derives the edge set from `[[Title]]` references.
//
// Edges are a pure function of the current node titles and bodies and
// are recomputed from scratch on every render; nothing here is cached.

use crate::story::Story;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

/// Extract the referenced titles from a body, in order of first
/// character position.
///
/// A reference is `[[` followed by one or more characters other than
/// `]`, closed by `]]`. No nesting, no escaping. Malformed openings
/// (`[[]]`, an unclosed `[[`, a single `]` inside) yield nothing and
/// scanning resumes after the opening delimiter.
pub fn extract_links(body: &str) -> Vec<&str> {
    let mut links = Vec::new();
    let mut rest = body;
    while let Some(open) = rest.find("[[") {
        let after = &rest[open + 2..];
        let inner_len = after.find(']').unwrap_or(after.len());
        let inner = &after[..inner_len];
        if !inner.is_empty() && after[inner_len..].starts_with("]]") {
            links.push(inner);
            rest = &after[inner_len + 2..];
        } else {
            rest = after;
        }
    }
    links
}

/// Derived edges as `(source, target)` indices into `story.nodes`.
///
/// Each well-formed reference contributes one edge when some node's
/// title equals it exactly (case-sensitive). Duplicate references
/// produce duplicate edges, self references are allowed, and dangling
/// titles are silently dropped. When several nodes share a title the
/// first one in list order wins.
pub fn resolve_edges(story: &Story) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for (source, node) in story.nodes.iter().enumerate() {
        for title in extract_links(&node.body) {
            if let Some(target) =
                story.nodes.iter().position(|n| n.title == title)
            {
                edges.push((source, target));
            }
        }
    }
    edges
}

/// The derived story graph over node list indices.
pub fn story_graph(story: &Story) -> DiGraph<usize, ()> {
    let mut graph = DiGraph::new();
    let indices: Vec<NodeIndex> = (0..story.nodes.len())
        .map(|i| graph.add_node(i))
        .collect();
    for (source, target) in resolve_edges(story) {
        graph.add_edge(indices[source], indices[target], ());
    }
    graph
}

/// Which nodes have a directed path from the main node.
///
/// Returns `None` when the story has no main node, in which case no
/// reachability judgement is possible.
pub fn reachable_from_main(story: &Story) -> Option<Vec<bool>> {
    let main = story.main_node_index()?;
    let graph = story_graph(story);
    let mut reached = vec![false; story.nodes.len()];
    let mut dfs = Dfs::new(&graph, NodeIndex::new(main));
    while let Some(idx) = dfs.next(&graph) {
        reached[graph[idx]] = true;
    }
    Some(reached)
}
