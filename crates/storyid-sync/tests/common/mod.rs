//! A small line-based reference parser standing in for the external
//! narrative compiler in driver tests.
//!
//! Grammar, per line:
//! - `== Title ==` opens a major container (closing any open containers)
//! - `= title` opens a minor container inside the current major one
//! - `~ ...` is an assignment
//! - anything else is narrative/choice text; a `#id:` tag on the line
//!   becomes a tag node right after the text node
//!
//! Every content line ends with a line-break node, matching the node stream
//! a real compiler produces.

use std::collections::BTreeMap;

use storyid_core::{detect_tag, strip_tag};
use storyid_gen::{ContainerKind, SyntaxNode, SyntaxTree};

type OpenContainer = (Option<(ContainerKind, String)>, Vec<SyntaxNode>);

pub fn parse_project(files: &BTreeMap<String, String>) -> SyntaxTree {
    let mut roots = Vec::new();
    for (name, content) in files {
        roots.push(parse_file(name, content));
    }
    SyntaxTree::from_nodes(roots)
}

fn parse_file(name: &str, content: &str) -> SyntaxNode {
    let mut stack: Vec<OpenContainer> = vec![(None, Vec::new())];

    for (index, raw_line) in content.split('\n').enumerate() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let lineno = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix("==") {
            let title = header
                .trim_matches(|c: char| c == '=' || c.is_whitespace())
                .to_string();
            while stack.len() > 1 {
                close_container(&mut stack);
            }
            stack.push((Some((ContainerKind::Major, title)), Vec::new()));
            continue;
        }
        if let Some(header) = trimmed.strip_prefix('=') {
            let title = header.trim().to_string();
            while stack.len() > 2 {
                close_container(&mut stack);
            }
            stack.push((Some((ContainerKind::Minor, title)), Vec::new()));
            continue;
        }

        let children = &mut stack.last_mut().expect("root container").1;
        if trimmed.starts_with('~') {
            children.push(SyntaxNode::assignment(vec![SyntaxNode::text(
                trimmed, name, lineno,
            )]));
            children.push(SyntaxNode::line_break());
            continue;
        }

        match detect_tag(line) {
            Some(m) => {
                let clean = strip_tag(line);
                children.push(SyntaxNode::text(clean.trim(), name, lineno));
                children.push(SyntaxNode::tag(format!("id:{}", m.id), name, lineno));
            }
            None => {
                children.push(SyntaxNode::text(trimmed, name, lineno));
            }
        }
        children.push(SyntaxNode::line_break());
    }

    while stack.len() > 1 {
        close_container(&mut stack);
    }
    let (_, children) = stack.pop().expect("root container");
    SyntaxNode::other().with_children(children)
}

fn close_container(stack: &mut Vec<OpenContainer>) {
    let (meta, children) = stack.pop().expect("container stack underflow");
    let node = match meta {
        Some((kind, name)) => {
            SyntaxNode::container(kind, Some(name.as_str())).with_children(children)
        }
        None => SyntaxNode::other().with_children(children),
    };
    stack
        .last_mut()
        .expect("container stack underflow")
        .1
        .push(node);
}
