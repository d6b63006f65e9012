use std::collections::HashSet;

use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use storyid_core::LineId;
use storyid_gen::{ContainerKind, MintPolicy, SyntaxNode, SyntaxTree, generate};

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `count` candidate lines, each followed by a line break, inside a major
/// container named `name`.
fn container_with_lines(name: &str, file: &str, count: usize) -> SyntaxNode {
    let mut children = Vec::new();
    for index in 0..count {
        children.push(SyntaxNode::text(format!("line {index}"), file, index + 2));
        children.push(SyntaxNode::line_break());
    }
    SyntaxNode::container(ContainerKind::Major, Some(name)).with_children(children)
}

#[test]
fn every_candidate_gets_a_distinct_identifier() {
    // 300 candidates share one prefix against a 1296-id space: every mint
    // must succeed and no two results may collide, because each accepted
    // draw is reserved before the next candidate is processed.
    let tree = SyntaxTree::from_nodes(vec![container_with_lines("Forest", "f.story", 300)]);
    let mut existing = HashSet::new();
    let policy = MintPolicy {
        suffix_len: 2,
        max_attempts: 100,
    };

    let report = generate(&tree, &mut existing, policy, &mut rng(11));

    assert_eq!(report.edits.len(), 300);
    assert!(report.exhausted.is_empty());

    let distinct: HashSet<&str> = report.edits.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(distinct.len(), 300);
    assert!(distinct.iter().all(|id| id.starts_with("Forest_")));
    assert_eq!(existing.len(), 300);
}

#[test]
fn exhaustion_is_reported_not_collided() {
    // Pre-fill the entire 36-id space for the prefix: the lone candidate
    // must surface as exhausted rather than reuse an existing identifier.
    let alphabet = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut existing: HashSet<LineId> = alphabet
        .chars()
        .map(|c| LineId::from_parts("Cave_", &c.to_string()).unwrap())
        .collect();

    let tree = SyntaxTree::from_nodes(vec![container_with_lines("Cave", "c.story", 1)]);
    let policy = MintPolicy {
        suffix_len: 1,
        max_attempts: 100,
    };

    let report = generate(&tree, &mut existing, policy, &mut rng(13));

    assert!(report.edits.is_empty());
    assert_eq!(report.exhausted.len(), 1);
    assert_eq!(report.exhausted[0].prefix, "Cave_");
    assert_eq!(report.exhausted[0].file, "c.story");
    assert_eq!(existing.len(), 36);
}

#[test]
fn nested_containers_build_the_hierarchical_prefix() {
    let clearing = SyntaxNode::container(ContainerKind::Minor, Some("Clearing")).with_children(
        vec![
            SyntaxNode::text("A clearing opens up.", "f.story", 5),
            SyntaxNode::line_break(),
        ],
    );
    let forest =
        SyntaxNode::container(ContainerKind::Major, Some("Forest")).with_children(vec![clearing]);
    let tree = SyntaxTree::from_nodes(vec![forest]);

    let mut existing = HashSet::new();
    let report = generate(&tree, &mut existing, MintPolicy::default(), &mut rng(17));

    assert_eq!(report.edits.len(), 1);
    let id = report.edits[0].id.as_str();
    assert!(id.starts_with("Forest_Clearing_"));
    assert_eq!(id.len(), "Forest_Clearing_".len() + 4);
    assert_eq!(report.edits[0].line, 5);
}

#[test]
fn already_tagged_candidates_are_recorded_not_reminted() {
    let nodes = vec![
        SyntaxNode::text("The lamp flickers.", "c.story", 10),
        SyntaxNode::tag("id:Cave_ZZ11", "c.story", 10),
        SyntaxNode::line_break(),
    ];
    let tree = SyntaxTree::from_nodes(vec![
        SyntaxNode::container(ContainerKind::Major, Some("Cave")).with_children(nodes),
    ]);

    let mut existing = HashSet::new();
    let report = generate(&tree, &mut existing, MintPolicy::default(), &mut rng(19));

    assert!(report.edits.is_empty());
    assert!(existing.contains(&LineId::parse("Cave_ZZ11").unwrap()));

    // A second pass over the same tree still mints nothing.
    let report = generate(&tree, &mut existing, MintPolicy::default(), &mut rng(23));
    assert!(report.is_empty());
}

#[test]
fn unrelated_tags_do_not_satisfy_the_scan() {
    // A mood tag between the text and its id tag must not end the scan; a
    // line break must.
    let tagged = vec![
        SyntaxNode::text("She hums.", "a.story", 1),
        SyntaxNode::tag("mood:soft", "a.story", 1),
        SyntaxNode::tag("id:HUM1", "a.story", 1),
        SyntaxNode::line_break(),
    ];
    let split = vec![
        SyntaxNode::text("He answers.", "a.story", 2),
        SyntaxNode::line_break(),
        SyntaxNode::tag("id:ANS1", "a.story", 3),
        SyntaxNode::line_break(),
    ];
    let tree = SyntaxTree::from_nodes([tagged, split].concat());

    let mut existing = HashSet::new();
    let report = generate(&tree, &mut existing, MintPolicy::default(), &mut rng(29));

    // "She hums." is already tagged; "He answers." is not — its tag sits
    // past the line break.
    assert_eq!(report.edits.len(), 1);
    assert_eq!(report.edits[0].text, "He answers.");
    assert!(existing.contains(&LineId::parse("HUM1").unwrap()));
}

#[test]
fn assignment_and_blank_text_are_not_candidates() {
    let tree = SyntaxTree::from_nodes(vec![
        SyntaxNode::assignment(vec![SyntaxNode::text("gold + 1", "a.story", 1)]),
        SyntaxNode::text("   ", "a.story", 2),
        SyntaxNode::line_break(),
        SyntaxNode::text("Real line.", "a.story", 3),
        SyntaxNode::line_break(),
    ]);

    let mut existing = HashSet::new();
    let report = generate(&tree, &mut existing, MintPolicy::default(), &mut rng(31));

    assert_eq!(report.edits.len(), 1);
    assert_eq!(report.edits[0].text, "Real line.");
    assert_eq!(report.edits[0].line, 3);
}

#[test]
fn edits_filter_by_file() {
    let tree = SyntaxTree::from_nodes(vec![
        SyntaxNode::text("In A.", "a.story", 1),
        SyntaxNode::line_break(),
        SyntaxNode::text("In B.", "b.story", 1),
        SyntaxNode::line_break(),
    ]);

    let mut existing = HashSet::new();
    let report = generate(&tree, &mut existing, MintPolicy::default(), &mut rng(37));

    assert_eq!(report.edits.len(), 2);
    assert_eq!(report.edits_for_file("a.story").count(), 1);
    assert_eq!(report.edits_for_file("b.story").count(), 1);
    assert_eq!(report.edits_for_file("c.story").count(), 0);
}
