//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::form::Form;
use crate::mug::{Identifiable, Validatable};
use crate::outline::Outline;
use crate::position::Position;
use crate::question::Question;
use crate::tree::Tree;
use crate::tree_traits::ToTermTree;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show { outline }) => cmd_show(cli, outline),
        Some(Commands::Paths { outline }) => cmd_paths(cli, outline),
        Some(Commands::Validate { outline }) => cmd_validate(cli, outline),
        Some(Commands::Delete {
            outline,
            paths,
            undo,
        }) => cmd_delete(cli, outline, paths, *undo),
        Some(Commands::Move {
            outline,
            path,
            position,
            reference,
        }) => cmd_move(cli, outline, path, *position, reference.as_deref()),
        Some(Commands::Config) => cmd_config(cli),
        Some(Commands::Completion { shell }) => {
            cmd_completion(*shell);
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".to_string())),
    }
}

/// Absolute path of every question, in display order.
pub fn question_paths(tree: &Tree<Question>) -> Vec<String> {
    tree.mugs()
        .filter_map(|mug| tree.get_absolute_path(mug))
        .collect()
}

fn load_tree(cli: &Cli, outline: &Path) -> CliResult<Tree<Question>> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "settings loaded");
    let tree = Outline::load(outline)?.build_tree(settings.root_id, settings.tree_type)?;
    Ok(tree)
}

fn resolve(tree: &Tree<Question>, path: &str) -> CliResult<Question> {
    tree.get_mug_from_path(path)
        .cloned()
        .ok_or_else(|| CliError::UnknownPath(path.to_string()))
}

#[instrument(level = "debug", skip(cli))]
fn cmd_show(cli: &Cli, outline: &Path) -> CliResult<()> {
    let tree = load_tree(cli, outline)?;
    output::info(&tree.to_term_tree());
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_paths(cli: &Cli, outline: &Path) -> CliResult<()> {
    let tree = load_tree(cli, outline)?;
    for path in question_paths(&tree) {
        output::info(&path);
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_validate(cli: &Cli, outline: &Path) -> CliResult<()> {
    let tree = load_tree(cli, outline)?;
    let invalid: Vec<String> = tree.tree_map(|node| {
        node.value()
            .filter(|mug| !mug.is_valid())
            .map(|mug| tree.get_absolute_path(mug).unwrap_or_else(|| mug.node_id()))
    });

    if tree.is_tree_valid()? {
        output::success(&format!("{} question(s) valid", tree.len()));
        return Ok(());
    }
    for path in &invalid {
        output::failure(path);
    }
    Err(CliError::InvalidTree {
        invalid: invalid.len(),
    })
}

#[instrument(level = "debug", skip(cli))]
fn cmd_delete(cli: &Cli, outline: &Path, paths: &[String], undo: bool) -> CliResult<()> {
    let tree = load_tree(cli, outline)?;
    let selected = paths
        .iter()
        .map(|p| resolve(&tree, p))
        .collect::<CliResult<Vec<_>>>()?;

    let mut shown = false;
    let mut form = Form::with_affordance(tree, move |available: bool| {
        if available != shown {
            shown = available;
            if available {
                output::detail("(undo available)");
            }
        }
    });

    let removed = form.remove_questions(&selected);
    output::action("Deleted", &format!("{removed} question(s)"));
    output::info(&form.tree().to_term_tree());

    if undo {
        let restored = form.undo()?;
        output::action("Restored", &format!("{restored} question(s)"));
        output::info(&form.tree().to_term_tree());
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_move(
    cli: &Cli,
    outline: &Path,
    path: &str,
    position: Position,
    reference: Option<&str>,
) -> CliResult<()> {
    let mut tree = load_tree(cli, outline)?;
    let mug = resolve(&tree, path)?;
    let ref_mug = reference.map(|r| resolve(&tree, r)).transpose()?;

    tree.insert_mug(mug.clone(), position, ref_mug.as_ref())?;
    let new_path = tree.get_absolute_path(&mug).unwrap_or_default();
    output::action("Moved", &format!("{path} -> {new_path}"));
    output::info(&tree.to_term_tree());
    Ok(())
}

fn cmd_config(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    output::header("Effective settings");
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    eprintln!("Generating completion file for {shell:?}...");
    generate(shell, &mut cmd, name, &mut io::stdout());
}
