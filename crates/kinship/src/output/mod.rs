//! Output formatting for CLI commands.
//!
//! Every printer has a text form for people and a JSON form for programs,
//! selected with [`OutputMode`]. Text printers write to any `Write` so they
//! can be tested against a buffer.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)
//! - [`tree`]: Family tree rendering with ASCII/Unicode connectors

pub mod color;
pub mod tree;

use crate::domain::{Person, PersonId};
use crate::graph::Violation;
use crate::path::PathStep;
use crate::store::LoadWarning;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};
pub use tree::print_tree;

use color::{bold, colored_gender_icon, colorize_id, colorize_relationship, dimmed};

/// Id to display name, for members of the family tree being printed.
pub type NameIndex = HashMap<PersonId, String>;

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only icons and connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `KINSHIP_ASCII`: Set to "1" or "true" for ASCII-only output (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `KINSHIP_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with variables supplied by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let use_ascii = match lookup("KINSHIP_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "KINSHIP_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // Respect NO_COLOR (https://no-color.org/), then KINSHIP_COLOR.
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("KINSHIP_COLOR")
                .is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a person with their relatives (for the show command)
pub fn print_person_details(person: &Person, names: &NameIndex, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => {
            print_person_details_text(&mut handle, person, names, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(&mut handle, person),
    }
}

/// Print a list of persons in the specified format
pub fn print_persons(persons: &[Person], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => print_persons_text(&mut handle, persons, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, &persons),
    }
}

/// Print a relationship path and the labelled hops along it.
pub fn print_path(
    path: &[PersonId],
    steps: &[PathStep],
    names: &NameIndex,
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => {
            print_path_text(&mut handle, path, steps, names, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(
            &mut handle,
            &serde_json::json!({
                "path": path,
                "steps": steps,
                "hops": path.len().saturating_sub(1),
            }),
        ),
    }
}

/// Print the result of a consistency check
pub fn print_violations(violations: &[Violation], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => {
            print_violations_text(&mut handle, violations, &OutputConfig::from_env())
        }
        OutputMode::Json => {
            let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
            write_json(
                &mut handle,
                &serde_json::json!({
                    "consistent": violations.is_empty(),
                    "violations": messages,
                }),
            )
        }
    }
}

/// Report load warnings on stderr so JSON on stdout stays parseable.
pub fn print_load_warnings(warnings: &[LoadWarning]) -> io::Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    print_load_warnings_text(&mut handle, warnings, &OutputConfig::from_env())
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

/// Compact life dates: "b. 1950-03-14", "1950-03-14 to 2020-01-02", "d. 2020-01-02".
pub(crate) fn lifespan(born: Option<NaiveDate>, died: Option<NaiveDate>) -> Option<String> {
    match (born, died) {
        (Some(born), Some(died)) => Some(format!("{born} to {died}")),
        (Some(born), None) => Some(format!("b. {born}")),
        (None, Some(died)) => Some(format!("d. {died}")),
        (None, None) => None,
    }
}

fn display_name<'a>(id: &'a PersonId, names: &'a NameIndex) -> &'a str {
    names.get(id).map_or(id.as_str(), String::as_str)
}

fn print_person_details_text<W: Write>(
    w: &mut W,
    person: &Person,
    names: &NameIndex,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}: {}",
        colored_gender_icon(person.gender, config),
        colorize_id(person.id.as_str(), config),
        bold(&person.name, config)
    )?;
    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Gender:", config),
        person.gender,
        dimmed("Family tree:", config),
        person.scope
    )?;
    if let Some(born) = person.date_of_birth {
        writeln!(w, "{} {}", dimmed("Born:", config), born)?;
    }
    if let Some(died) = person.date_of_death {
        writeln!(w, "{} {}", dimmed("Died:", config), died)?;
    }
    if let Some(photo) = &person.photo {
        writeln!(w, "{} {}", dimmed("Photo:", config), photo)?;
    }
    if let Some(bio) = person.bio.as_deref().filter(|b| !b.is_empty()) {
        writeln!(w)?;
        writeln!(w, "{}:", bold("Bio", config))?;
        for line in bio.lines() {
            writeln!(w, "  {line}")?;
        }
    }

    for (title, ids) in [("Parents", &person.parents), ("Children", &person.children)] {
        if ids.is_empty() {
            continue;
        }
        writeln!(w)?;
        writeln!(w, "{} ({}):", bold(title, config), ids.len())?;
        for id in ids {
            writeln!(
                w,
                "  {} {}",
                colorize_id(id.as_str(), config),
                display_name(id, names)
            )?;
        }
    }

    if !person.partners.is_empty() {
        writeln!(w)?;
        writeln!(w, "{} ({}):", bold("Partners", config), person.partners.len())?;
        for edge in &person.partners {
            let dates = match (edge.start_date, edge.end_date) {
                (Some(start), Some(end)) => format!(" {start} to {end}"),
                (Some(start), None) => format!(" since {start}"),
                (None, Some(end)) => format!(" until {end}"),
                (None, None) => String::new(),
            };
            writeln!(
                w,
                "  {} {} ({}){}",
                colorize_id(edge.partner.as_str(), config),
                display_name(&edge.partner, names),
                colorize_relationship(edge.relationship, config),
                dates
            )?;
        }
    }

    Ok(())
}

fn print_persons_text<W: Write>(
    w: &mut W,
    persons: &[Person],
    config: &OutputConfig,
) -> io::Result<()> {
    if persons.is_empty() {
        writeln!(w, "No people found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} person(s):", persons.len())?;
    writeln!(w)?;

    for person in persons {
        let span = lifespan(person.date_of_birth, person.date_of_death)
            .map(|s| format!("  {}", dimmed(&s, config)))
            .unwrap_or_default();
        writeln!(
            w,
            "{} {}  {}{}",
            colored_gender_icon(person.gender, config),
            colorize_id(person.id.as_str(), config),
            person.name,
            span
        )?;
    }

    Ok(())
}

fn print_path_text<W: Write>(
    w: &mut W,
    path: &[PersonId],
    steps: &[PathStep],
    names: &NameIndex,
    config: &OutputConfig,
) -> io::Result<()> {
    let Some(start) = path.first() else {
        writeln!(w, "No relationship path found.")?;
        return Ok(());
    };

    let arrow = if config.use_ascii { "->" } else { "→" };
    writeln!(
        w,
        "{} ({} hop(s))",
        bold("Relationship path", config),
        steps.len()
    )?;
    writeln!(
        w,
        "  {} {}",
        colorize_id(start.as_str(), config),
        display_name(start, names)
    )?;
    for step in steps {
        writeln!(
            w,
            "  {} {} {} {}",
            dimmed(arrow, config),
            colorize_id(step.to.as_str(), config),
            display_name(&step.to, names),
            dimmed(&format!("({})", step.relation), config)
        )?;
    }
    Ok(())
}

fn print_violations_text<W: Write>(
    w: &mut W,
    violations: &[Violation],
    config: &OutputConfig,
) -> io::Result<()> {
    if violations.is_empty() {
        writeln!(w, "{}", success("No inconsistencies found.", config))?;
        return Ok(());
    }

    writeln!(
        w,
        "{}",
        error(&format!("Found {} inconsistenc(ies):", violations.len()), config)
    )?;
    for violation in violations {
        writeln!(w, "  {violation}")?;
    }
    Ok(())
}

fn print_load_warnings_text<W: Write>(
    w: &mut W,
    warnings: &[LoadWarning],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{}",
        warning(
            &format!("{} problem(s) found while loading people:", warnings.len()),
            config
        )
    )?;
    for item in warnings {
        writeln!(w, "  {item}")?;
    }
    writeln!(w, "  Run 'kinship check' for details.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Gender, PartnerDates, PartnerEdge, RelationshipKind, ScopeId};
    use crate::path::Relation;

    fn plain() -> OutputConfig {
        OutputConfig::new(false, false)
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn test_person() -> Person {
        let mut person = Person::new(PersonId::new("s-a1"), ScopeId::new("smith"), "Alice Smith");
        person.gender = Gender::Female;
        person.date_of_birth = NaiveDate::from_ymd_opt(1950, 3, 14);
        person.parents.push(PersonId::new("s-p1"));
        person.partners.push(PartnerEdge::new(
            PersonId::new("s-b2"),
            RelationshipKind::Married,
            PartnerDates {
                start: NaiveDate::from_ymd_opt(1972, 6, 1),
                end: None,
            },
        ));
        person
    }

    #[test]
    fn test_output_config_from_lookup() {
        let vars = |pairs: &'static [(&'static str, &'static str)]| {
            move |key: &str| {
                pairs
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| (*v).to_string())
            }
        };

        let config = OutputConfig::from_lookup(vars(&[]));
        assert_eq!(config, OutputConfig::default());

        let config = OutputConfig::from_lookup(vars(&[("KINSHIP_ASCII", "1")]));
        assert!(config.use_ascii);
        assert!(config.use_colors);

        let config = OutputConfig::from_lookup(vars(&[("KINSHIP_ASCII", "maybe")]));
        assert!(!config.use_ascii);

        let config = OutputConfig::from_lookup(vars(&[("NO_COLOR", "")]));
        assert!(!config.use_colors, "NO_COLOR should disable colors");

        let config = OutputConfig::from_lookup(vars(&[("KINSHIP_COLOR", "false")]));
        assert!(!config.use_colors, "KINSHIP_COLOR=false should disable colors");
    }

    #[test]
    fn test_lifespan_formats() {
        let born = NaiveDate::from_ymd_opt(1950, 3, 14);
        let died = NaiveDate::from_ymd_opt(2020, 1, 2);
        assert_eq!(lifespan(born, died).as_deref(), Some("1950-03-14 to 2020-01-02"));
        assert_eq!(lifespan(born, None).as_deref(), Some("b. 1950-03-14"));
        assert_eq!(lifespan(None, died).as_deref(), Some("d. 2020-01-02"));
        assert!(lifespan(None, None).is_none());
    }

    #[test]
    fn test_print_person_details_text() {
        let person = test_person();
        let names: NameIndex = [(PersonId::new("s-b2"), "Bob Smith".to_string())].into();

        let output = render(|w| print_person_details_text(w, &person, &names, &plain()));

        assert!(output.starts_with("♀ s-a1: Alice Smith\n"));
        assert!(output.contains("Born: 1950-03-14"));
        assert!(output.contains("Parents (1):"));
        // Unknown names fall back to the id.
        assert!(output.contains("  s-p1 s-p1"));
        assert!(output.contains("  s-b2 Bob Smith (married) since 1972-06-01"));
        assert!(!output.contains("Children"));
    }

    #[test]
    fn test_print_persons_text() {
        let output = render(|w| print_persons_text(w, &[test_person()], &plain()));
        assert!(output.contains("Found 1 person(s):"));
        assert!(output.contains("♀ s-a1  Alice Smith  b. 1950-03-14"));

        let output = render(|w| print_persons_text(w, &[], &plain()));
        assert_eq!(output, "No people found.\n");
    }

    #[test]
    fn test_print_path_text() {
        let path = vec![PersonId::new("s-a1"), PersonId::new("s-b2")];
        let steps = vec![PathStep {
            from: PersonId::new("s-a1"),
            to: PersonId::new("s-b2"),
            relation: Relation::Partner(RelationshipKind::Married),
        }];
        let names: NameIndex = [
            (PersonId::new("s-a1"), "Alice".to_string()),
            (PersonId::new("s-b2"), "Bob".to_string()),
        ]
        .into();

        let ascii = OutputConfig::new(true, false);
        let output = render(|w| print_path_text(w, &path, &steps, &names, &ascii));
        assert!(output.contains("Relationship path (1 hop(s))"));
        assert!(output.contains("  -> s-b2 Bob (partner (married))"));

        let output = render(|w| print_path_text(w, &[], &[], &names, &ascii));
        assert_eq!(output, "No relationship path found.\n");
    }

    #[test]
    fn test_print_violations_text() {
        let output = render(|w| print_violations_text(w, &[], &plain()));
        assert_eq!(output, "No inconsistencies found.\n");

        let violations = vec![Violation::SelfLoop {
            person: PersonId::new("s-a1"),
        }];
        let output = render(|w| print_violations_text(w, &violations, &plain()));
        assert!(output.contains("Found 1 inconsistenc(ies):"));
        assert!(output.contains("s-a1 references itself"));
    }

    #[test]
    fn test_print_person_json() {
        let output = render(|w| write_json(w, &test_person()));
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["id"], "s-a1");
        assert_eq!(parsed["familyTree"], "smith");
    }
}
