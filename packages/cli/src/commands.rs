// ABOUTME: Subcommand definitions and handlers for the specgen CLI
// ABOUTME: Each handler drives a SpecSession loaded for the requested project

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Args, Subcommand};
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use inquire::Confirm;
use specgen_ai::AiSpecEngine;
use specgen_core::{ProjectRef, SectionKind};
use specgen_specs::{
    ExportFormat, ExportResult, MermaidHeaderCheck, Resolution, SectionView, SpecError,
    SpecSession,
};
use specgen_storage::{DocumentStore, SqliteDocumentStore};
use tracing::debug;

use crate::config::Config;

const REQUIREMENT_PREVIEW_CHARS: usize = 60;

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project ID
    #[arg(long, short = 'p')]
    pub project: String,

    /// Display name used in exported file names (defaults to the project ID)
    #[arg(long)]
    pub project_name: Option<String>,
}

impl ProjectArgs {
    pub fn project_ref(&self) -> ProjectRef {
        let name = self
            .project_name
            .clone()
            .unwrap_or_else(|| self.project.clone());
        ProjectRef::new(self.project.clone(), name)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new specification version from a requirement
    Generate {
        #[command(flatten)]
        project: ProjectArgs,

        /// Requirement description
        requirement: String,
    },

    /// List a project's specification versions
    List {
        #[command(flatten)]
        project: ProjectArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a section of a version (newest version by default)
    Show {
        #[command(flatten)]
        project: ProjectArgs,

        /// Version ID
        #[arg(long)]
        version: Option<String>,

        /// Section: interface, schema, interaction or sample
        #[arg(long, short = 's', default_value = "interface")]
        section: SectionKind,

        /// Output the whole version as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a section with new text from a file or stdin
    Edit {
        #[command(flatten)]
        project: ProjectArgs,

        /// Version ID
        #[arg(long)]
        version: Option<String>,

        /// Section to replace
        #[arg(long, short = 's')]
        section: SectionKind,

        /// File with the new section text (reads stdin when omitted)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// Rewrite a section according to an instruction
    Refine {
        #[command(flatten)]
        project: ProjectArgs,

        /// Version ID
        #[arg(long)]
        version: Option<String>,

        /// Section to refine
        #[arg(long, short = 's')]
        section: SectionKind,

        /// What to change
        #[arg(long, short = 'i')]
        instruction: String,
    },

    /// Delete a version
    Delete {
        #[command(flatten)]
        project: ProjectArgs,

        /// Version ID to delete
        version: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Export a version as JSON or Markdown
    Export {
        #[command(flatten)]
        project: ProjectArgs,

        /// Version ID
        #[arg(long)]
        version: Option<String>,

        /// Format: structured (json) or document (markdown)
        #[arg(long, default_value = "document")]
        format: ExportFormat,

        /// Directory to write the export to
        #[arg(long, short = 'o', default_value = "./")]
        output: PathBuf,
    },
}

pub async fn handle_command(cmd: Commands, config: &Config) -> anyhow::Result<()> {
    match cmd {
        Commands::Generate {
            project,
            requirement,
        } => {
            let mut session = open_session(config, &project).await?;
            generate_cmd(&mut session, &project.project, &requirement).await
        }
        Commands::List { project, json } => {
            let session = open_session(config, &project).await?;
            list_cmd(&session, json)
        }
        Commands::Show {
            project,
            version,
            section,
            json,
        } => {
            let mut session = open_session(config, &project).await?;
            select(&mut session, version.as_deref())?;
            show_cmd(&mut session, section, json)
        }
        Commands::Edit {
            project,
            version,
            section,
            file,
        } => {
            let mut session = open_session(config, &project).await?;
            select(&mut session, version.as_deref())?;
            let text = read_section_text(file.as_deref())?;
            edit_section(&mut session, section, text).await?;
            println!("{} {} section saved", "✓".green(), section.label());
            Ok(())
        }
        Commands::Refine {
            project,
            version,
            section,
            instruction,
        } => {
            let mut session = open_session(config, &project).await?;
            select(&mut session, version.as_deref())?;
            println!("{} Refining {}...", "✨".cyan(), section.label());
            refine_section(&mut session, section, &instruction).await?;
            println!("{} {} section refined", "✓".green(), section.label());
            show_cmd(&mut session, section, false)
        }
        Commands::Delete {
            project,
            version,
            yes,
        } => {
            let mut session = open_session(config, &project).await?;
            delete_cmd(&mut session, &version, yes).await
        }
        Commands::Export {
            project,
            version,
            format,
            output,
        } => {
            let mut session = open_session(config, &project).await?;
            select(&mut session, version.as_deref())?;
            let result = export_to_dir(&session, format, &output).await?;
            println!(
                "{} Exported {} ({} bytes)",
                "✓".green(),
                output.join(&result.file_name).display(),
                result.size_bytes
            );
            Ok(())
        }
    }
}

/// Open the SQLite store and load the project's versions into a new session
pub async fn open_session(config: &Config, project: &ProjectArgs) -> anyhow::Result<SpecSession> {
    let store: Arc<dyn DocumentStore> = Arc::new(
        SqliteDocumentStore::new(config.storage_config())
            .await
            .with_context(|| format!("Failed to open database {}", config.db_path.display()))?,
    );
    let engine = Arc::new(AiSpecEngine::new(config.ai_service(), store.clone()));

    let mut session = SpecSession::new(store, engine.clone(), engine)
        .with_renderer(Arc::new(MermaidHeaderCheck));
    session
        .load_versions(project.project_ref())
        .await
        .map_err(user_error)?;
    debug!(
        "Loaded {} versions for {}",
        session.versions().len(),
        project.project
    );
    Ok(session)
}

/// Surface the user-facing message of a session error
fn user_error(err: SpecError) -> anyhow::Error {
    anyhow!(err.user_message())
}

fn select(session: &mut SpecSession, version: Option<&str>) -> anyhow::Result<()> {
    if let Some(id) = version {
        if !session.select_version(id) {
            return Err(anyhow!("Version {} not found in this project", id));
        }
    }
    Ok(())
}

async fn generate_cmd(
    session: &mut SpecSession,
    project_id: &str,
    requirement: &str,
) -> anyhow::Result<()> {
    println!("{} Generating specification...", "✨".cyan());
    session
        .create_version(project_id, requirement)
        .await
        .map_err(user_error)?;

    let active = session
        .active()
        .ok_or_else(|| anyhow!("Generated version is not available"))?;
    let count = session.versions().len();
    println!(
        "{} Created version {} (v{})",
        "✓".green(),
        active.id.bold(),
        count
    );
    for kind in SectionKind::ALL {
        println!(
            "  {} {} ({} lines)",
            "•".cyan(),
            kind.label(),
            active.section(kind).lines().count()
        );
    }
    Ok(())
}

fn list_cmd(session: &SpecSession, json: bool) -> anyhow::Result<()> {
    let versions = session.versions();
    if json {
        println!("{}", serde_json::to_string_pretty(versions)?);
        return Ok(());
    }
    if versions.is_empty() {
        println!("{}", "No spec generated yet.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Version", "ID", "Requirement"]);

    for (option, version) in session.version_options().iter().zip(versions) {
        let marker = if option.active { "*" } else { "" };
        table.add_row(vec![
            marker.to_string(),
            option.label.clone(),
            option.id.clone(),
            preview(&version.requirement_description, REQUIREMENT_PREVIEW_CHARS),
        ]);
    }

    println!("{table}");
    println!();
    println!("{} {} versions", "Total:".dimmed(), versions.len());
    Ok(())
}

fn show_cmd(session: &mut SpecSession, section: SectionKind, json: bool) -> anyhow::Result<()> {
    if json {
        let active = session
            .active()
            .ok_or_else(|| anyhow!(SpecError::NoActiveVersion.user_message()))?;
        println!("{}", serde_json::to_string_pretty(active)?);
        return Ok(());
    }

    session.select_tab(section);
    match session.view() {
        SectionView::Empty { message } => println!("{}", message.yellow()),
        view => {
            if let Some(active) = session.active() {
                println!(
                    "{} {}",
                    "Requirement:".cyan(),
                    active.requirement_description
                );
            }
            println!("{}", section.label().yellow().bold());
            println!("{}", view.text());
        }
    }
    Ok(())
}

pub async fn edit_section(
    session: &mut SpecSession,
    section: SectionKind,
    text: String,
) -> anyhow::Result<Resolution> {
    session.select_tab(section);
    session.begin_edit().map_err(user_error)?;
    session.update_draft(text).map_err(user_error)?;
    session.commit_edit().await.map_err(user_error)
}

pub async fn refine_section(
    session: &mut SpecSession,
    section: SectionKind,
    instruction: &str,
) -> anyhow::Result<Resolution> {
    session.select_tab(section);
    session.open_prompt().map_err(user_error)?;
    session.set_instruction(instruction).map_err(user_error)?;
    session
        .submit_refinement(instruction)
        .await
        .map_err(user_error)
}

async fn delete_cmd(session: &mut SpecSession, version_id: &str, yes: bool) -> anyhow::Result<()> {
    let confirmation = session.request_delete(version_id).map_err(user_error)?;

    if !yes {
        let confirmed = Confirm::new(&format!("Delete version {}?", version_id))
            .with_default(false)
            .prompt()?;

        if !confirmed {
            println!("{}", "Delete cancelled".yellow());
            return Ok(());
        }
    }

    session
        .confirm_delete(confirmation)
        .await
        .map_err(user_error)?;
    println!("{} Version {} deleted", "✓".green(), version_id);
    Ok(())
}

/// Write the active version's export into `dir` under its generated file name
pub async fn export_to_dir(
    session: &SpecSession,
    format: ExportFormat,
    dir: &Path,
) -> anyhow::Result<ExportResult> {
    let result = session.export(format).map_err(user_error)?;
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(&result.file_name);
    tokio::fs::write(&path, result.content.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(result)
}

fn read_section_text(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read section text from stdin")?;
            Ok(text)
        }
    }
}

/// First line of `text`, cut to `max_chars`
pub fn preview(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= max_chars {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
