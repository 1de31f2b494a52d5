//! Command execution logic.
//!
//! Each function runs one command against an [`App`]. Mutating commands save
//! the people file only after the graph operation succeeds.

use anyhow::Result;

use super::args::{
    AddArgs, CheckArgs, InitArgs, ListArgs, ParentAction, ParentArgs, PartnerAction, PartnerArgs,
    PathArgs, RemoveArgs, ShowArgs, TreeArgs, UpdateArgs,
};
use crate::app::App;
use crate::domain::{NewPerson, PartnerDates, PersonId, PersonUpdate, ScopeId};
use crate::error::Error;
use crate::output::{self, NameIndex, OutputConfig, OutputMode};
use crate::path::PathFinder;
use crate::snapshot::FamilySnapshot;
use crate::tree::TreeBuilder;

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;
    let result = init::init(
        &current_dir,
        args.prefix.as_deref(),
        args.default_scope.as_deref(),
    )
    .await?;

    if !args.quiet {
        println!("Initialized kinship in {}", result.kinship_dir.display());
        println!("  Config: {}", result.config_file.display());
        println!("  People: {}", result.people_file.display());
        println!("  Id prefix: {}", result.prefix);
        println!("  Default family tree: {}", result.default_scope);
    }

    Ok(())
}

/// Execute the add command
pub async fn execute_add(
    app: &mut App,
    args: &AddArgs,
    scope: ScopeId,
    output_mode: OutputMode,
) -> Result<()> {
    let new_person = NewPerson {
        date_of_birth: args.born,
        date_of_death: args.died,
        bio: args.bio.clone(),
        photo: args.photo.clone(),
        ..NewPerson::new(args.name.clone(), scope).with_gender(args.gender.into())
    };
    let parents: Vec<PersonId> = args.parents.iter().map(PersonId::new).collect();

    let id = app.graph_mut().add_person(new_person, &parents)?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&app.graph().get_person(&id)?)?,
        OutputMode::Text => output::print_message(&format!("Added person: {id}"))?,
    }
    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let person = app.graph().get_person(&PersonId::new(&args.person_id))?;
    let names = name_index(&app.graph().persons(&person.scope)?);
    output::print_person_details(&person, &names, output_mode)?;
    Ok(())
}

/// Execute the list command
pub async fn execute_list(
    app: &App,
    args: &ListArgs,
    scope: ScopeId,
    output_mode: OutputMode,
) -> Result<()> {
    use crate::store::PersonStore;

    let persons = if args.all {
        app.graph().store().list_all()?
    } else {
        app.graph().persons(&scope)?
    };
    output::print_persons(&persons, output_mode)?;
    Ok(())
}

/// Execute the update command
pub async fn execute_update(
    app: &mut App,
    args: &UpdateArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let updates = PersonUpdate {
        name: args.name.clone(),
        gender: args.gender.map(Into::into),
        date_of_birth: clearable(args.born, args.clear_born),
        date_of_death: clearable(args.died, args.clear_died),
        bio: clearable(args.bio.clone(), args.clear_bio),
        photo: clearable(args.photo.clone(), args.clear_photo),
    };

    let person = app
        .graph_mut()
        .update_person(&PersonId::new(&args.person_id), updates)?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&person)?,
        OutputMode::Text => output::print_message(&format!("Updated person: {}", person.id))?,
    }
    Ok(())
}

/// Execute the remove command
///
/// A partial cleanup is still saved, so the removal can simply be retried.
pub async fn execute_remove(app: &mut App, args: &RemoveArgs, output_mode: OutputMode) -> Result<()> {
    let id = PersonId::new(&args.person_id);

    match app.graph_mut().remove_person(&id) {
        Ok(()) => {}
        Err(e @ Error::PartialCleanupFailure { .. }) => {
            app.save().await?;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    }
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({ "removed": id }))?,
        OutputMode::Text => output::print_message(&format!("Removed person: {id}"))?,
    }
    Ok(())
}

/// Execute the parent command
pub async fn execute_parent(app: &mut App, args: &ParentArgs, output_mode: OutputMode) -> Result<()> {
    let (parent, child, linked) = match &args.action {
        ParentAction::Add { parent, child } => {
            let (parent, child) = (PersonId::new(parent), PersonId::new(child));
            app.graph_mut().add_parent_edge(&parent, &child)?;
            (parent, child, true)
        }
        ParentAction::Remove { parent, child } => {
            let (parent, child) = (PersonId::new(parent), PersonId::new(child));
            app.graph_mut().remove_parent_edge(&parent, &child)?;
            (parent, child, false)
        }
    };
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "parent": parent,
            "child": child,
            "linked": linked,
        }))?,
        OutputMode::Text if linked => {
            output::print_message(&format!("Linked {parent} as parent of {child}"))?;
        }
        OutputMode::Text => {
            output::print_message(&format!("Unlinked {parent} as parent of {child}"))?;
        }
    }
    Ok(())
}

/// Execute the partner command
pub async fn execute_partner(
    app: &mut App,
    args: &PartnerArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let (a, b, kind) = match &args.action {
        PartnerAction::Add {
            a,
            b,
            kind,
            since,
            until,
        } => {
            let (a, b) = (PersonId::new(a), PersonId::new(b));
            let dates = PartnerDates {
                start: *since,
                end: *until,
            };
            app.graph_mut()
                .add_partner_edge(&a, &b, (*kind).into(), dates)?;
            (a, b, Some(*kind))
        }
        PartnerAction::Remove { a, b } => {
            let (a, b) = (PersonId::new(a), PersonId::new(b));
            app.graph_mut().remove_partner_edge(&a, &b)?;
            (a, b, None)
        }
    };
    app.save().await?;

    match (output_mode, kind) {
        (OutputMode::Json, _) => output::print_json(&serde_json::json!({
            "a": a,
            "b": b,
            "linked": kind.is_some(),
            "relationship": kind.map(|k| k.to_string()),
        }))?,
        (OutputMode::Text, Some(kind)) => {
            output::print_message(&format!("Linked {a} and {b} ({kind})"))?;
        }
        (OutputMode::Text, None) => {
            output::print_message(&format!("Unlinked partners {a} and {b}"))?;
        }
    }
    Ok(())
}

/// Execute the tree command
pub async fn execute_tree(
    app: &App,
    args: &TreeArgs,
    scope: ScopeId,
    output_mode: OutputMode,
) -> Result<()> {
    let snapshot = app.graph().snapshot(&scope)?;
    let roots: Vec<PersonId> = args.roots.iter().map(PersonId::new).collect();

    let tree = TreeBuilder::new(&snapshot)
        .with_virtual_root_name(app.config().tree.virtual_root_name.clone())
        .build(&roots)?;

    output::print_tree(&tree, output_mode)?;
    Ok(())
}

/// Execute the path command
pub async fn execute_path(
    app: &App,
    args: &PathArgs,
    scope: ScopeId,
    output_mode: OutputMode,
) -> Result<()> {
    let (from, to) = (PersonId::new(&args.from), PersonId::new(&args.to));
    let snapshot = app.graph().snapshot(&scope)?;
    for id in [&from, &to] {
        if !snapshot.contains(id) {
            report_missing_member(app, id, &snapshot)?;
        }
    }

    let finder = PathFinder::new(&snapshot);
    let path = finder.shortest_path(&from, &to);
    let steps = finder.describe(&path).unwrap_or_default();

    output::print_path(&path, &steps, &name_index(snapshot.persons()), output_mode)?;
    Ok(())
}

/// Execute the check command
///
/// Fails when violations are found, so scripts can rely on the exit code.
pub async fn execute_check(
    app: &App,
    _args: &CheckArgs,
    scope: ScopeId,
    output_mode: OutputMode,
) -> Result<()> {
    let violations = app.graph().check_consistency(&scope)?;
    output::print_violations(&violations, output_mode)?;

    if !violations.is_empty() {
        anyhow::bail!(
            "Family tree '{scope}' has {} inconsistenc(ies)",
            violations.len()
        );
    }
    Ok(())
}

/// Print load warnings before running a command.
pub fn report_load_warnings(app: &App) -> Result<()> {
    output::print_load_warnings(app.load_warnings())?;
    Ok(())
}

// ========== Helpers ==========

fn name_index(persons: &[crate::domain::Person]) -> NameIndex {
    persons
        .iter()
        .map(|p| (p.id.clone(), p.name.clone()))
        .collect()
}

/// `Some(Some(v))` to set, `Some(None)` to clear, `None` to leave as is.
fn clearable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear { Some(None) } else { value.map(Some) }
}

/// A path endpoint outside the family tree yields an empty path; say why on
/// stderr so the empty result is not mistaken for "unrelated".
fn report_missing_member(app: &App, id: &PersonId, snapshot: &FamilySnapshot) -> Result<()> {
    let config = OutputConfig::from_env();
    let reason = match app.graph().get_person(id) {
        Ok(person) => format!(
            "{id} belongs to family tree '{}', not '{}'",
            person.scope,
            snapshot.scope()
        ),
        Err(Error::PersonNotFound(_)) => format!("{id} does not exist"),
        Err(e) => return Err(e.into()),
    };
    eprintln!("{} {reason}", output::warning("warning:", &config));
    Ok(())
}
