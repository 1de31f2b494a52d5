//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success:       green   (completed actions, married)
//!   - Warning:       yellow  (engaged, load warnings)
//!   - Error:         red     (violations, divorced)
//!   - Info/Reference: cyan   (person ids, tree roots)
//!   - Accent:        magenta (partners)
//!   - Muted:         dimmed  (field labels, connectors, virtual root)
//!   - Emphasis:      bold    (section headers, names)

use crate::domain::{Gender, RelationshipKind};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Colorize a person id (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Color a relationship kind by how current it is.
pub(crate) fn colorize_relationship(kind: RelationshipKind, config: &OutputConfig) -> String {
    let text = kind.to_string();
    if !config.use_colors {
        return text;
    }
    match kind {
        RelationshipKind::Married => text.green().to_string(),
        RelationshipKind::Divorced => text.red().to_string(),
        RelationshipKind::Engaged => text.yellow().to_string(),
        RelationshipKind::Partners => text.magenta().to_string(),
        RelationshipKind::Other => text,
    }
}

/// Gender icon, with ASCII fallback support.
pub(crate) fn gender_icon(gender: Gender, config: &OutputConfig) -> &'static str {
    if config.use_ascii {
        match gender {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "o",
        }
    } else {
        match gender {
            Gender::Male => "♂",
            Gender::Female => "♀",
            Gender::Other => "○",
        }
    }
}

/// Colored gender icon.
pub(crate) fn colored_gender_icon(gender: Gender, config: &OutputConfig) -> String {
    let icon = gender_icon(gender, config);
    if !config.use_colors {
        return icon.to_string();
    }
    match gender {
        Gender::Male => icon.blue().to_string(),
        Gender::Female => icon.magenta().to_string(),
        Gender::Other => icon.white().to_string(),
    }
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
