use anyhow::Result;

use ipgm::{AdjacencyParser, AdjacencyWriter, GraphModel, MatrixMode};

const SQUARE_AND_STAR: &str = "\
4
0 1 0 1
1 0 1 0
0 1 0 1
1 0 1 0

5
0 1 1 1 1
1 0 0 0 0
1 0 0 0 0
1 0 0 0 0
1 0 0 0 0
";

fn degree_multiset(graph: &GraphModel) -> Vec<usize> {
    let mut degrees: Vec<usize> = (0..graph.vertex_count())
        .map(|vertex| graph.degree(vertex))
        .collect();
    degrees.sort_unstable();
    degrees
}

#[test]
fn serialised_graphs_parse_back_isomorphic() -> Result<()> {
    let (pattern, target) = AdjacencyParser::parse_pair(SQUARE_AND_STAR, MatrixMode::Simple)?;
    let text = AdjacencyWriter::pair_to_text(&pattern, &target);
    let (pattern2, target2) = AdjacencyParser::parse_pair(&text, MatrixMode::Simple)?;

    assert_eq!(pattern.vertex_count(), pattern2.vertex_count());
    assert_eq!(pattern.edge_count(), pattern2.edge_count());
    assert_eq!(degree_multiset(&pattern), degree_multiset(&pattern2));

    assert_eq!(target.vertex_count(), target2.vertex_count());
    assert_eq!(target.edge_count(), target2.edge_count());
    assert_eq!(degree_multiset(&target), degree_multiset(&target2));

    // Adjacency itself survives, not just the counts.
    for i in 0..pattern.vertex_count() {
        for j in 0..pattern.vertex_count() {
            assert_eq!(pattern.contains_edge(i, j), pattern2.contains_edge(i, j));
        }
    }
    Ok(())
}

#[test]
fn multigraph_multiplicities_survive_the_roundtrip() -> Result<()> {
    let text = "\
3
1 2 0
2 0 3
0 3 0

2
0 1
1 0
";
    let (pattern, target) = AdjacencyParser::parse_pair(text, MatrixMode::Multigraph)?;
    assert_eq!(pattern.edge_count(), 6, "1 self-loop + 2 + 3 parallel");

    let serialised = AdjacencyWriter::pair_to_text(&pattern, &target);
    let (pattern2, _) = AdjacencyParser::parse_pair(&serialised, MatrixMode::Multigraph)?;
    assert_eq!(pattern2.edge_count(), 6);
    Ok(())
}

#[test]
fn directed_roundtrip_preserves_arc_directions() -> Result<()> {
    let text = "\
3
0 1 0
0 0 2
1 0 0

1
0
";
    let (pattern, target) = AdjacencyParser::parse_pair(text, MatrixMode::Directed)?;
    assert!(pattern.is_directed());
    assert_eq!(pattern.edge_count(), 4);
    assert!(pattern.contains_edge(0, 1));
    assert!(!pattern.contains_edge(1, 0));

    let serialised = AdjacencyWriter::pair_to_text(&pattern, &target);
    let (pattern2, _) = AdjacencyParser::parse_pair(&serialised, MatrixMode::Directed)?;
    assert!(pattern2.contains_edge(2, 0));
    assert!(!pattern2.contains_edge(0, 2));
    assert_eq!(pattern2.edge_count(), 4);
    Ok(())
}

#[test]
fn error_positions_are_one_based() {
    let text = "\
2
0 1
1 x

2
0 0
0 0
";
    let err = AdjacencyParser::parse_pair(text, MatrixMode::Simple).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("(2,2)"), "got: {message}");
    assert!(message.contains('x'), "got: {message}");
}

#[test]
fn truncated_second_block_is_rejected() {
    let text = "\
2
0 1
1 0

3
0 0 0
0 0 0
";
    let err = AdjacencyParser::parse_pair(text, MatrixMode::Simple).unwrap_err();
    assert!(format!("{err:#}").contains("second block"));
}
