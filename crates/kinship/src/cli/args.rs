//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use super::types::{GenderArg, RelationshipKindArg};
use super::validators::{
    parse_date, validate_bio, validate_name, validate_person_id, validate_prefix,
};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Person id prefix (e.g., "smith" for "smith-a1b2")
    ///
    /// Must be 2-20 alphanumeric characters.
    #[arg(short, long, value_parser = validate_prefix)]
    pub prefix: Option<String>,

    /// Family tree used when commands are run without `--scope`
    ///
    /// Defaults to the prefix.
    #[arg(long)]
    pub default_scope: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `add` command
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// Display name (maximum 200 characters)
    #[arg(value_parser = validate_name)]
    pub name: String,

    /// Gender
    #[arg(short, long, value_enum, default_value = "other")]
    pub gender: GenderArg,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub born: Option<NaiveDate>,

    /// Date of death (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub died: Option<NaiveDate>,

    /// Biography
    #[arg(long, value_parser = validate_bio)]
    pub bio: Option<String>,

    /// Photo reference (path or URL)
    #[arg(long)]
    pub photo: Option<String>,

    /// Existing parents to link (comma-separated person IDs)
    #[arg(long, value_delimiter = ',', value_parser = validate_person_id)]
    pub parents: Vec<String>,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Person ID to display
    #[arg(value_parser = validate_person_id)]
    pub person_id: String,
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone, Default)]
pub struct ListArgs {
    /// List people from every family tree
    #[arg(short, long)]
    pub all: bool,
}

/// Arguments for the `update` command
///
/// Only provided fields change. Relationships are edited with the `parent`
/// and `partner` commands.
#[derive(Parser, Debug, Clone)]
pub struct UpdateArgs {
    /// Person ID to update
    #[arg(value_parser = validate_person_id)]
    pub person_id: String,

    /// New name
    #[arg(long, value_parser = validate_name)]
    pub name: Option<String>,

    /// New gender
    #[arg(short, long, value_enum)]
    pub gender: Option<GenderArg>,

    /// New date of birth (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, conflicts_with = "clear_born")]
    pub born: Option<NaiveDate>,

    /// Remove the date of birth
    #[arg(long)]
    pub clear_born: bool,

    /// New date of death (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, conflicts_with = "clear_died")]
    pub died: Option<NaiveDate>,

    /// Remove the date of death
    #[arg(long)]
    pub clear_died: bool,

    /// New biography
    #[arg(long, value_parser = validate_bio, conflicts_with = "clear_bio")]
    pub bio: Option<String>,

    /// Remove the biography
    #[arg(long)]
    pub clear_bio: bool,

    /// New photo reference
    #[arg(long, conflicts_with = "clear_photo")]
    pub photo: Option<String>,

    /// Remove the photo reference
    #[arg(long)]
    pub clear_photo: bool,
}

/// Arguments for the `remove` command
#[derive(Parser, Debug, Clone)]
pub struct RemoveArgs {
    /// Person ID to remove
    #[arg(value_parser = validate_person_id)]
    pub person_id: String,
}

/// Arguments for the `parent` command
#[derive(Parser, Debug, Clone)]
pub struct ParentArgs {
    /// Parent subcommand
    #[command(subcommand)]
    pub action: ParentAction,
}

/// Parent/child edge actions
#[derive(Subcommand, Debug, Clone)]
pub enum ParentAction {
    /// Link a parent to a child
    Add {
        /// The parent
        #[arg(value_parser = validate_person_id)]
        parent: String,

        /// The child
        #[arg(value_parser = validate_person_id)]
        child: String,
    },

    /// Unlink a parent from a child
    Remove {
        /// The parent
        #[arg(value_parser = validate_person_id)]
        parent: String,

        /// The child
        #[arg(value_parser = validate_person_id)]
        child: String,
    },
}

/// Arguments for the `partner` command
#[derive(Parser, Debug, Clone)]
pub struct PartnerArgs {
    /// Partner subcommand
    #[command(subcommand)]
    pub action: PartnerAction,
}

/// Partner edge actions
#[derive(Subcommand, Debug, Clone)]
pub enum PartnerAction {
    /// Link two partners
    Add {
        /// First partner
        #[arg(value_parser = validate_person_id)]
        a: String,

        /// Second partner
        #[arg(value_parser = validate_person_id)]
        b: String,

        /// Kind of relationship
        #[arg(short, long, value_enum, default_value = "married")]
        kind: RelationshipKindArg,

        /// Start of the relationship (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,

        /// End of the relationship (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        until: Option<NaiveDate>,
    },

    /// Unlink two partners
    Remove {
        /// First partner
        #[arg(value_parser = validate_person_id)]
        a: String,

        /// Second partner
        #[arg(value_parser = validate_person_id)]
        b: String,
    },
}

/// Arguments for the `tree` command
#[derive(Parser, Debug, Clone, Default)]
pub struct TreeArgs {
    /// Root the tree at these people (comma-separated person IDs)
    ///
    /// By default every person without parents in the family tree is a root.
    #[arg(long, value_delimiter = ',', value_parser = validate_person_id)]
    pub roots: Vec<String>,
}

/// Arguments for the `path` command
#[derive(Parser, Debug, Clone)]
pub struct PathArgs {
    /// Where the path starts
    #[arg(value_parser = validate_person_id)]
    pub from: String,

    /// Where the path ends
    #[arg(value_parser = validate_person_id)]
    pub to: String,
}

/// Arguments for the `check` command
#[derive(Parser, Debug, Clone, Default)]
pub struct CheckArgs {}
