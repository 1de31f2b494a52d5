//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for kinship using clap's
//! derive API.
//!
//! # Commands
//!
//! - `init`: Initialize a new kinship repository
//! - `add`: Add a person, optionally with parents
//! - `show` / `list`: Inspect people
//! - `update`: Change a person's details
//! - `remove`: Remove a person and every reference to them
//! - `parent add|remove`, `partner add|remove`: Edit relationships
//! - `tree`: Render the family tree
//! - `path`: Shortest relationship path between two people
//! - `check`: Report relationship inconsistencies
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--scope`: Family tree to work in (defaults to `default-scope` in the config)
//!
//! # Example
//!
//! ```bash
//! kinship init --prefix smith
//! kinship add "John Smith" --gender male --born 1920-05-01
//! kinship add "Anne Smith" --gender female --parents smith-a1b2
//! kinship partner add smith-a1b2 smith-c3d4 --kind married --since 1945-06-01
//! kinship tree
//! kinship path smith-a1b2 smith-e5f6
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    AddArgs, CheckArgs, InitArgs, ListArgs, ParentAction, ParentArgs, PartnerAction, PartnerArgs,
    PathArgs, RemoveArgs, ShowArgs, TreeArgs, UpdateArgs,
};

pub use types::{GenderArg, RelationshipKindArg};

pub use validators::{
    parse_date, validate_bio, validate_name, validate_person_id, validate_prefix,
};

/// Kinship - family trees with consistent relationships
///
/// People and their parent, child and partner relationships are stored in
/// `.kinship/people.jsonl`, one person per line, for easy version control.
#[derive(Parser, Debug)]
#[command(name = "kinship")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Family tree to work in
    #[arg(short, long, global = true)]
    pub scope: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new kinship repository
    ///
    /// Creates the `.kinship/` directory with configuration and an empty
    /// people file.
    Init(InitArgs),

    /// Add a person
    ///
    /// Parents given with `--parents` must already exist in the same family
    /// tree; if any is rejected nothing is added.
    Add(AddArgs),

    /// Show a person and their relatives
    Show(ShowArgs),

    /// List the people in a family tree
    List(ListArgs),

    /// Update a person's details
    ///
    /// Only provided fields are updated; relationships are not touched.
    Update(UpdateArgs),

    /// Remove a person
    ///
    /// Every parent, child and partner reference to the person is removed
    /// first. If some cannot be cleaned the person is kept and the command
    /// can be retried.
    Remove(RemoveArgs),

    /// Link or unlink a parent and child
    Parent(ParentArgs),

    /// Link or unlink two partners
    Partner(PartnerArgs),

    /// Render the family tree
    ///
    /// Each person appears once; a child with two parents is shown under the
    /// first parent reached.
    Tree(TreeArgs),

    /// Find the shortest relationship path between two people
    Path(PathArgs),

    /// Check the family tree for inconsistent relationships
    Check(CheckArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Kinship family tree manager");
            println!("Use --help for more information");
            return Ok(());
        };

        if let Commands::Init(args) = command {
            return execute::execute_init(args).await;
        }

        let mut app = App::from_directory(&std::env::current_dir()?).await?;
        execute::report_load_warnings(&app)?;
        let scope = app.scope(self.scope.as_deref());

        match command {
            Commands::Init(_) => Ok(()),
            Commands::Add(args) => execute::execute_add(&mut app, args, scope, output_mode).await,
            Commands::Show(args) => execute::execute_show(&app, args, output_mode).await,
            Commands::List(args) => execute::execute_list(&app, args, scope, output_mode).await,
            Commands::Update(args) => execute::execute_update(&mut app, args, output_mode).await,
            Commands::Remove(args) => execute::execute_remove(&mut app, args, output_mode).await,
            Commands::Parent(args) => execute::execute_parent(&mut app, args, output_mode).await,
            Commands::Partner(args) => {
                execute::execute_partner(&mut app, args, output_mode).await
            }
            Commands::Tree(args) => execute::execute_tree(&app, args, scope, output_mode).await,
            Commands::Path(args) => execute::execute_path(&app, args, scope, output_mode).await,
            Commands::Check(args) => execute::execute_check(&app, args, scope, output_mode).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["kinship"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
        assert!(cli.scope.is_none());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["kinship", "tree", "--json", "--scope", "jones"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.scope.as_deref(), Some("jones"));
        assert!(matches!(cli.command, Some(Commands::Tree(_))));
    }

    #[test]
    fn test_parse_init_with_prefix() {
        let cli = Cli::try_parse_from(["kinship", "init", "--prefix", " smith "]).unwrap();
        match cli.command {
            Some(Commands::Init(args)) => {
                assert_eq!(args.prefix.as_deref(), Some("smith"));
                assert!(args.default_scope.is_none());
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_parse_init_rejects_bad_prefix() {
        assert!(Cli::try_parse_from(["kinship", "init", "--prefix", "van-dyke"]).is_err());
    }

    #[test]
    fn test_parse_add_full() {
        let cli = Cli::try_parse_from([
            "kinship",
            "add",
            "Anne Smith",
            "--gender",
            "female",
            "--born",
            "1946-02-11",
            "--parents",
            "smith-a1,smith-b2",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.name, "Anne Smith");
                assert_eq!(args.gender, GenderArg::Female);
                assert_eq!(args.born, NaiveDate::from_ymd_opt(1946, 2, 11));
                assert_eq!(args.parents, vec!["smith-a1", "smith-b2"]);
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_parse_add_defaults() {
        let cli = Cli::try_parse_from(["kinship", "add", "Sam"]).unwrap();
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.gender, GenderArg::Other);
                assert!(args.parents.is_empty());
                assert!(args.born.is_none());
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_parse_add_rejects_bad_date() {
        assert!(Cli::try_parse_from(["kinship", "add", "Sam", "--born", "1946-13-01"]).is_err());
    }

    #[test]
    fn test_parse_update_clear_conflicts() {
        let result = Cli::try_parse_from([
            "kinship",
            "update",
            "smith-a1",
            "--bio",
            "text",
            "--clear-bio",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_partner_add() {
        let cli = Cli::try_parse_from([
            "kinship", "partner", "add", "smith-a1", "smith-b2", "--kind", "divorced", "--since",
            "1970-01-01", "--until", "1980-01-01",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Partner(PartnerArgs {
                action:
                    PartnerAction::Add {
                        a,
                        b,
                        kind,
                        since,
                        until,
                    },
            })) => {
                assert_eq!(a, "smith-a1");
                assert_eq!(b, "smith-b2");
                assert_eq!(kind, RelationshipKindArg::Divorced);
                assert_eq!(since, NaiveDate::from_ymd_opt(1970, 1, 1));
                assert_eq!(until, NaiveDate::from_ymd_opt(1980, 1, 1));
            }
            _ => panic!("Expected Partner Add command"),
        }
    }

    #[test]
    fn test_parse_parent_remove() {
        let cli = Cli::try_parse_from(["kinship", "parent", "remove", "smith-a1", "smith-c3"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Parent(ParentArgs {
                action: ParentAction::Remove { .. }
            }))
        ));
    }

    #[test]
    fn test_parse_tree_roots() {
        let cli = Cli::try_parse_from(["kinship", "tree", "--roots", "smith-a1,smith-b2"]).unwrap();
        match cli.command {
            Some(Commands::Tree(args)) => assert_eq!(args.roots, vec!["smith-a1", "smith-b2"]),
            _ => panic!("Expected Tree command"),
        }
    }

    #[test]
    fn test_parse_path_requires_two_ids() {
        assert!(Cli::try_parse_from(["kinship", "path", "smith-a1"]).is_err());
        assert!(Cli::try_parse_from(["kinship", "path", "smith-a1", "smith-b2"]).is_ok());
    }
}
