pub mod cli;
pub mod config;
pub mod display;
pub mod document;
pub mod engine;
pub mod focus;
pub mod highlight;
pub mod host;
pub mod model;
pub mod session;
pub mod settings;
pub mod tree;

pub use cli::{ColorMode, Commands, TerminalHost, cli_parse};
pub use config::{AppConfig, ConfigError, load_config, load_config_from_path};
pub use document::{DocumentHandle, DocumentMode, DocumentUri};
pub use host::{
    DecorationHandle, DecorationSink, EditorHost, EditorId, Host, Interaction, Notice,
    NoticeLevel, PromptRequest, TreeKind, TreeListener,
};
pub use model::{Color, EntityId, Filter, Group, ModelError, Pattern, Project, Workspace};
pub use session::{CommandOutcome, Session};
pub use settings::{JsonFileStore, MemoryStore, SettingsError, SettingsStore};

use anyhow::Context;
use cli::{FilterAction, GroupAction, ProjectAction};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_SETTINGS_FILE: &str = "log-focus.json";

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_FOCUS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn apply_color_mode(mode: ColorMode) {
    match mode {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }
}

/// Persist after a mutation that the project-level commands don't save on
/// their own. A one-shot CLI has no later save point.
fn persist_applied(session: &mut Session<TerminalHost>, outcome: CommandOutcome) -> CommandOutcome {
    if outcome == CommandOutcome::Applied && !session.persist() {
        return CommandOutcome::Rejected;
    }
    outcome
}

fn exit_code(outcome: CommandOutcome) -> ExitCode {
    match outcome {
        CommandOutcome::Applied => ExitCode::SUCCESS,
        CommandOutcome::Cancelled | CommandOutcome::Rejected => ExitCode::FAILURE,
    }
}

pub fn run() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = cli_parse();
    let config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    apply_color_mode(cli.color);

    let settings_path = cli
        .settings
        .clone()
        .or_else(|| config.settings_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    tracing::debug!(settings = %settings_path.display(), "starting");

    let store = JsonFileStore::new(&settings_path);
    let host = TerminalHost::new(config.focus.scheme.clone());
    let mut session = Session::new(host, Box::new(store), config)
        .with_context(|| format!("Failed to load projects from '{}'", settings_path.display()))?;

    let outcome = match cli.command {
        Commands::Project { action } => run_project(&mut session, action),
        Commands::Group { action } => {
            let outcome = match action {
                GroupAction::Add { name } => {
                    session.host_mut().push_answer(name);
                    session.add_group()
                }
                GroupAction::Rename { id, name } => {
                    session.host_mut().push_answer(name);
                    session.rename_group(&EntityId::from(id))
                }
                GroupAction::Delete { id } => session.delete_group(&EntityId::from(id)),
            };
            persist_applied(&mut session, outcome)
        }
        Commands::Filter { action } => {
            let outcome = match action {
                FilterAction::Add { group, regex } => {
                    session.host_mut().push_answer(regex);
                    session.add_filter(&EntityId::from(group))
                }
                FilterAction::Edit { id, regex } => {
                    session.host_mut().push_answer(regex);
                    session.edit_filter(&EntityId::from(id))
                }
                FilterAction::Delete { id } => session.delete_filter(&EntityId::from(id)),
            };
            persist_applied(&mut session, outcome)
        }
        Commands::Highlight { state, id } => {
            let outcome = session.set_highlight(&EntityId::from(id), state.is_on());
            persist_applied(&mut session, outcome)
        }
        Commands::Show { state, id } => {
            let outcome = session.set_shown(&EntityId::from(id), state.is_on());
            persist_applied(&mut session, outcome)
        }
        Commands::View { file } => {
            let editor = session.host_mut().open_file(&file)?;
            session.on_visible_editors_changed();
            print!("{}", session.host().render(editor));
            println!();
            print!("{}", display::format_counts(session.workspace().active_groups()));
            CommandOutcome::Applied
        }
        Commands::Focus { file } => {
            session.host_mut().open_file(&file)?;
            session.on_visible_editors_changed();
            let outcome = session.enter_focus_mode();
            if let Some(editor) = session.host().active_editor() {
                print!("{}", session.host().render(editor));
            }
            outcome
        }
        Commands::Tree { file } => {
            if let Some(file) = file {
                session.host_mut().open_file(&file)?;
                session.on_visible_editors_changed();
            }
            print!("{}", display::format_tree(session.filter_tree()));
            CommandOutcome::Applied
        }
        Commands::Export { path } => {
            session.host_mut().push_answer(path.display().to_string());
            session.export_filters()
        }
        Commands::Import { path } => {
            session.host_mut().push_answer(path.display().to_string());
            let outcome = session.import_filters();
            persist_applied(&mut session, outcome)
        }
    };

    Ok(exit_code(outcome))
}

fn run_project(session: &mut Session<TerminalHost>, action: ProjectAction) -> CommandOutcome {
    match action {
        ProjectAction::Add { name } => {
            session.host_mut().push_answer(name);
            session.add_project()
        }
        ProjectAction::Rename { id, name } => {
            session.host_mut().push_answer(name);
            session.rename_project(&EntityId::from(id))
        }
        ProjectAction::Delete { id } => session.delete_project(&EntityId::from(id)),
        ProjectAction::Select { id } => session.select_project(&EntityId::from(id)),
        ProjectAction::Save { name } => {
            if let Some(name) = name {
                session.host_mut().push_answer(name);
            }
            session.save_project()
        }
        ProjectAction::List => {
            print!("{}", display::format_projects(session.workspace().projects()));
            CommandOutcome::Applied
        }
    }
}
