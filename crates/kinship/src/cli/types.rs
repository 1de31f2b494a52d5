//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{Gender, RelationshipKind};

/// Gender for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenderArg {
    /// Male
    Male,
    /// Female
    Female,
    /// Other or unspecified
    #[default]
    Other,
}

impl std::fmt::Display for GenderArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Gender::from(*self).fmt(f)
    }
}

/// Partner relationship kind for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationshipKindArg {
    /// Married couple
    #[default]
    Married,
    /// Formerly married
    Divorced,
    /// Engaged to be married
    Engaged,
    /// Unmarried partners
    Partners,
    /// Anything else
    Other,
}

impl std::fmt::Display for RelationshipKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        RelationshipKind::from(*self).fmt(f)
    }
}

// ============================================================================
// Domain Type Conversions
// ============================================================================

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
            GenderArg::Other => Gender::Other,
        }
    }
}

impl From<RelationshipKindArg> for RelationshipKind {
    fn from(arg: RelationshipKindArg) -> Self {
        match arg {
            RelationshipKindArg::Married => RelationshipKind::Married,
            RelationshipKindArg::Divorced => RelationshipKind::Divorced,
            RelationshipKindArg::Engaged => RelationshipKind::Engaged,
            RelationshipKindArg::Partners => RelationshipKind::Partners,
            RelationshipKindArg::Other => RelationshipKind::Other,
        }
    }
}
