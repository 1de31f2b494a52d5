//! Family tree rendering for `kinship tree` output.

use std::io::{self, Write};

use colored::Colorize;

use super::color::{bold, colored_gender_icon, colorize_id, colorize_relationship, dimmed};
use super::{OutputConfig, OutputMode, lifespan};
use crate::tree::TreeNode;

/// Print a materialized tree with ASCII/Unicode connectors.
///
/// Renders a tree like:
/// ```text
/// ♂ smith-a1 John Smith (b. 1920-05-01) & Mary Jones (married)
/// ├── ♀ smith-b2 Anne Smith
/// │   └── ○ smith-c3 Sam Smith
/// └── ♂ smith-d4 Peter Smith
/// ```
///
/// JSON mode prints the serialized [`TreeNode`] on one line.
pub fn print_tree(root: &TreeNode, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_tree_text(&mut handle, root, &config),
        OutputMode::Json => write_tree_json(&mut handle, root),
    }
}

pub(crate) fn print_tree_text<W: Write>(
    w: &mut W,
    root: &TreeNode,
    config: &OutputConfig,
) -> io::Result<()> {
    if root.is_virtual() {
        let icon = if config.use_ascii { "*" } else { "◆" };
        let icon = if config.use_colors {
            icon.cyan().bold().to_string()
        } else {
            icon.to_string()
        };
        writeln!(w, "{} {}", icon, bold(&root.name, config))?;
    } else {
        writeln!(w, "{}", node_label(root, config))?;
    }

    print_tree_children(w, &root.children, config)
}

/// Indentation levels drawn before deeper lines are shifted left.
pub(crate) const MAX_INDENT_LEVELS: usize = 64;

/// Render children with connector lines, depth-first over an explicit stack.
///
/// `has_more` records, per ancestor level, whether siblings follow, which
/// decides between a vertical continuation (`│`) and blank space. Only the
/// innermost [`MAX_INDENT_LEVELS`] levels are drawn; a shifted line starts
/// with an ellipsis.
fn print_tree_children<W: Write>(
    w: &mut W,
    children: &[TreeNode],
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space, shifted) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ", "...")
    } else {
        ("├── ", "└── ", "│   ", "    ", "…")
    };

    let mut has_more: Vec<bool> = Vec::new();
    let mut stack: Vec<(&TreeNode, usize, bool)> = Vec::new();
    push_children(&mut stack, children, 0);

    while let Some((node, depth, is_last)) = stack.pop() {
        has_more.truncate(depth);

        let start = has_more.len().saturating_sub(MAX_INDENT_LEVELS);
        let mut prefix = String::new();
        if start > 0 {
            prefix.push_str(&dimmed(shifted, config));
        }
        for &more in &has_more[start..] {
            prefix.push_str(&dimmed(if more { pipe } else { space }, config));
        }
        let connector = dimmed(if is_last { corner } else { branch }, config);

        writeln!(w, "{}{}{}", prefix, connector, node_label(node, config))?;

        if !node.children.is_empty() {
            has_more.push(!is_last);
            push_children(&mut stack, &node.children, depth + 1);
        }
    }

    Ok(())
}

/// Push `children` so the first one pops next.
fn push_children<'a>(
    stack: &mut Vec<(&'a TreeNode, usize, bool)>,
    children: &'a [TreeNode],
    depth: usize,
) {
    let last = children.len().saturating_sub(1);
    stack.extend(
        children
            .iter()
            .enumerate()
            .rev()
            .map(|(i, child)| (child, depth, i == last)),
    );
}

/// Write `root` as compact JSON in the serialized shape of [`TreeNode`].
///
/// Nesting is walked over an explicit stack; only the flat fields of each
/// node go through serde.
pub(crate) fn write_tree_json<W: Write>(w: &mut W, root: &TreeNode) -> io::Result<()> {
    enum Step<'a> {
        Open(&'a TreeNode, bool),
        Close,
    }

    let mut stack = vec![Step::Open(root, true)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Open(node, first) => {
                if !first {
                    w.write_all(b",")?;
                }
                w.write_all(br#"{"id":"#)?;
                serde_json::to_writer(&mut *w, &node.id).map_err(io::Error::other)?;
                w.write_all(br#","name":"#)?;
                serde_json::to_writer(&mut *w, &node.name).map_err(io::Error::other)?;
                if let Some(attributes) = &node.attributes {
                    w.write_all(br#","attributes":"#)?;
                    serde_json::to_writer(&mut *w, attributes).map_err(io::Error::other)?;
                }
                w.write_all(br#","children":["#)?;

                stack.push(Step::Close);
                stack.extend(
                    node.children
                        .iter()
                        .enumerate()
                        .rev()
                        .map(|(i, child)| Step::Open(child, i == 0)),
                );
            }
            Step::Close => w.write_all(b"]}")?,
        }
    }
    writeln!(w)
}

fn node_label(node: &TreeNode, config: &OutputConfig) -> String {
    let Some(attributes) = &node.attributes else {
        return node.name.clone();
    };
    let id = node
        .id
        .as_ref()
        .map(|id| format!("{} ", colorize_id(id.as_str(), config)))
        .unwrap_or_default();

    let mut label = format!(
        "{} {}{}",
        colored_gender_icon(attributes.gender, config),
        id,
        node.name
    );
    if let Some(span) = lifespan(attributes.date_of_birth, attributes.date_of_death) {
        label.push_str(&format!(" {}", dimmed(&format!("({span})"), config)));
    }
    if let Some(partner) = &attributes.partner {
        let name = partner
            .name
            .clone()
            .unwrap_or_else(|| partner.id.to_string());
        label.push_str(&format!(
            " & {} ({})",
            name,
            colorize_relationship(partner.relationship, config)
        ));
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Gender, PersonId, RelationshipKind};
    use crate::tree::{NodeAttributes, PartnerSummary};
    use chrono::NaiveDate;

    fn node(id: &str, name: &str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            id: Some(PersonId::new(id)),
            name: name.to_string(),
            attributes: Some(NodeAttributes {
                gender: Gender::Other,
                date_of_birth: None,
                date_of_death: None,
                partner: None,
            }),
            children,
        }
    }

    fn render(root: &TreeNode, config: &OutputConfig) -> String {
        let mut buffer = Vec::new();
        print_tree_text(&mut buffer, root, config).expect("tree rendering should succeed");
        String::from_utf8(buffer).expect("output should be valid UTF-8")
    }

    #[test]
    fn test_tree_single_root_no_children() {
        let config = OutputConfig::new(false, false);
        let output = render(&node("s-a1", "Alice", vec![]), &config);
        assert_eq!(output, "○ s-a1 Alice\n");
    }

    #[test]
    fn test_tree_connectors_unicode() {
        let config = OutputConfig::new(false, false);
        let root = node(
            "s-a1",
            "Alice",
            vec![
                node("s-b2", "Bob", vec![node("s-d4", "Dan", vec![])]),
                node("s-c3", "Cara", vec![]),
            ],
        );

        let output = render(&root, &config);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], "├── ○ s-b2 Bob");
        assert_eq!(lines[2], "│   └── ○ s-d4 Dan");
        assert_eq!(lines[3], "└── ○ s-c3 Cara");
    }

    #[test]
    fn test_tree_connectors_ascii() {
        let config = OutputConfig::new(true, false);
        let root = node("s-a1", "Alice", vec![node("s-b2", "Bob", vec![])]);

        let output = render(&root, &config);
        assert!(
            output.contains("`-- o s-b2 Bob"),
            "ASCII mode should use backtick connector, got: {output}"
        );
    }

    #[test]
    fn test_virtual_root_shows_name_only() {
        let config = OutputConfig::new(true, false);
        let root = TreeNode {
            id: None,
            name: "Family".to_string(),
            attributes: None,
            children: vec![node("s-a1", "Alice", vec![]), node("s-b2", "Bob", vec![])],
        };

        let output = render(&root, &config);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "* Family");
        assert_eq!(lines[1], "|-- o s-a1 Alice");
        assert_eq!(lines[2], "`-- o s-b2 Bob");
    }

    /// A single line of descent, `depth` generations deep.
    fn chain(depth: usize) -> TreeNode {
        let mut current = node(&format!("s-{depth}"), "Last", vec![]);
        for generation in (0..depth).rev() {
            current = node(&format!("s-{generation}"), "Person", vec![current]);
        }
        current
    }

    #[test]
    fn test_deep_chain_renders_with_bounded_indent() {
        let config = OutputConfig::new(true, false);
        let root = chain(20_000);

        let output = render(&root, &config);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 20_001);
        assert_eq!(lines[1], "`-- o s-1 Person");
        assert!(lines[20_000].starts_with("..."));
        assert!(lines[20_000].ends_with("`-- o s-20000 Last"));
        let widest = lines.iter().map(|l| l.len()).max().unwrap_or(0);
        assert!(widest <= 3 + MAX_INDENT_LEVELS * 4 + 30, "line too wide: {widest}");
    }

    #[test]
    fn test_shifted_lines_keep_sibling_pipes() {
        let config = OutputConfig::new(true, false);
        let mut root = chain(MAX_INDENT_LEVELS + 2);
        root.children.push(node("s-x", "Sibling", vec![]));

        let output = render(&root, &config);
        let lines: Vec<&str> = output.lines().collect();

        // s-1 has a sibling below, so its children carry a pipe.
        assert!(lines[MAX_INDENT_LEVELS + 2].starts_with("..."));
        assert_eq!(lines.last().copied(), Some("`-- o s-x Sibling"));
        assert_eq!(lines[1], "|-- o s-1 Person");
        assert!(lines[2].starts_with("|   `-- "));
    }

    #[test]
    fn test_built_deep_family_prints() {
        use crate::domain::{Person, ScopeId};
        use crate::snapshot::FamilySnapshot;
        use crate::tree::TreeBuilder;

        let depth = 20_000;
        let mut persons: Vec<Person> = (0..depth)
            .map(|i| Person::new(PersonId::new(format!("s-{i}")), ScopeId::new("s"), "Kin"))
            .collect();
        for i in 1..depth {
            let (above, below) = persons.split_at_mut(i);
            above[i - 1].children.push(below[0].id.clone());
            below[0].parents.push(above[i - 1].id.clone());
        }
        let snapshot = FamilySnapshot::new(ScopeId::new("s"), persons);
        let tree = TreeBuilder::new(&snapshot).build(&[]).unwrap();

        let output = render(&tree, &OutputConfig::new(false, false));

        assert_eq!(output.lines().count(), depth);
        assert!(output.lines().last().unwrap().ends_with("└── ○ s-19999 Kin"));
    }

    #[test]
    fn test_tree_json_matches_serde_shape() {
        let root = TreeNode {
            id: None,
            name: "Family".to_string(),
            attributes: None,
            children: vec![
                node("s-a1", "Alice", vec![node("s-c3", "Cara \"CJ\"", vec![])]),
                node("s-b2", "Bob", vec![]),
            ],
        };

        let mut buffer = Vec::new();
        write_tree_json(&mut buffer, &root).unwrap();
        let written: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(written, serde_json::to_value(&root).unwrap());
    }

    #[test]
    fn test_tree_json_of_deep_chain() {
        let root = chain(20_000);
        let mut buffer = Vec::new();
        write_tree_json(&mut buffer, &root).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with(r#"{"id":"s-0","name":"Person""#));
        assert!(text.trim_end().ends_with(&"]}".repeat(20_001)));
    }

    #[test]
    fn test_label_includes_dates_and_partner() {
        let config = OutputConfig::new(false, false);
        let mut root = node("s-a1", "Alice", vec![]);
        if let Some(attributes) = root.attributes.as_mut() {
            attributes.date_of_birth = NaiveDate::from_ymd_opt(1950, 3, 14);
            attributes.partner = Some(PartnerSummary {
                id: PersonId::new("s-b2"),
                name: Some("Bob".to_string()),
                relationship: RelationshipKind::Married,
                start_date: None,
                end_date: None,
            });
        }

        let output = render(&root, &config);
        assert_eq!(output, "○ s-a1 Alice (b. 1950-03-14) & Bob (married)\n");
    }
}
