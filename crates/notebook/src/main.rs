//! Notebook CLI - browse and edit notes on a notebook server.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use notebook_client::{ApiClient, Notebook, Preferences, DEFAULT_API_BASE};
use notebook_core::{NoteData, NoteFilter, NoteWithTags, Tag};
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "notebook", about = "Notes with tags, from the terminal", version)]
struct Cli {
    /// Base URL of the notebook server
    #[arg(long, global = true, env = "NOTEBOOK_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Where local preferences are kept
    #[arg(long, global = true, env = "NOTEBOOK_PREFS", default_value = ".notebook-prefs.json")]
    prefs: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List notes, pinned first
    Ls {
        /// Only notes whose title contains this text (case-insensitive)
        #[arg(long)]
        title: Option<String>,
        /// Only notes carrying all of these comma-separated tag labels
        #[arg(long)]
        tags: Option<String>,
    },
    /// Show a note
    Show {
        /// Note ID
        id: String,
    },
    /// Add a new note
    Add {
        /// Note title
        #[arg(long)]
        title: String,
        /// Comma-separated tag labels; unknown labels are created
        #[arg(long)]
        tags: Option<String>,
        /// Note body in markdown (reads from stdin if not provided)
        #[arg(long)]
        body: Option<String>,
        /// Pin the note
        #[arg(long)]
        pinned: bool,
    },
    /// Edit a note
    Edit {
        /// Note ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New comma-separated tag labels; unknown labels are created
        #[arg(long)]
        tags: Option<String>,
        /// New body (reads from stdin if not provided and stdin is not a tty)
        #[arg(long)]
        body: Option<String>,
    },
    /// Pin or unpin a note
    Pin {
        /// Note ID
        id: String,
    },
    /// Delete one or more notes
    Rm {
        /// Note IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// List all tags
    Tags,
    /// Create a tag
    TagAdd {
        label: String,
    },
    /// Rename a tag
    TagRename {
        /// Tag ID
        id: String,
        label: String,
    },
    /// Delete a tag and remove it from every note
    TagRm {
        /// Tag ID
        id: String,
    },
    /// Show or set the color theme
    Theme {
        mode: Option<ThemeMode>,
        /// Treat the desktop as preferring dark when the theme follows the system
        #[arg(long, env = "NOTEBOOK_SYSTEM_DARK")]
        system_dark: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeMode {
    Dark,
    Light,
    System,
}

fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read from stdin")?;
    Ok(buf)
}

fn is_stdin_tty() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Pick the new body for an edit: the flag wins, then piped text that isn't blank.
fn resolve_body(flag: Option<String>, piped: Option<String>) -> Option<String> {
    flag.or_else(|| piped.filter(|text| !text.trim().is_empty()))
}

/// Resolve tag labels to existing tags, creating the ones that don't exist yet.
async fn resolve_or_create_tags(notebook: &mut Notebook, labels: &[String]) -> Result<Vec<Tag>> {
    let mut tags = Vec::new();
    for label in labels {
        let existing = notebook.tags_labeled(label).first().map(|t| (*t).clone());
        let tag = match existing {
            Some(tag) => tag,
            None => {
                let tag = notebook
                    .add_tag(label)
                    .await
                    .with_context(|| format!("Failed to create tag {}", label))?;
                println!("Created tag {} ({})", tag.label, tag.id);
                tag
            }
        };
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

/// Resolve tag labels to identifiers for filtering. A label may name several tags.
fn resolve_filter_tags(notebook: &Notebook, labels: &[String]) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for label in labels {
        let matching = notebook.tags_labeled(label);
        match matching.as_slice() {
            [] => bail!("No tag labeled {}", label),
            [tag] => ids.push(tag.id.clone()),
            _ => bail!(
                "Several tags are labeled {}; use distinct labels",
                label
            ),
        }
    }
    Ok(ids)
}

fn format_labels(note: &NoteWithTags) -> String {
    note.tags
        .iter()
        .map(|t| t.label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn note_or_bail(notebook: &Notebook, id: &str) -> Result<NoteWithTags> {
    match notebook.note(id) {
        Some(note) => Ok(note),
        None => bail!("Note {} not found", id),
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    if let Commands::Theme { mode, system_dark } = cli.command {
        let mut prefs = Preferences::load(&cli.prefs);
        if let Some(mode) = mode {
            prefs.dark_mode = match mode {
                ThemeMode::Dark => Some(true),
                ThemeMode::Light => Some(false),
                ThemeMode::System => None,
            };
            prefs.save(&cli.prefs)?;
        }
        let theme = if prefs.effective_dark_mode(system_dark) {
            "dark"
        } else {
            "light"
        };
        match prefs.dark_mode {
            Some(_) => println!("Theme: {}", theme),
            None => println!("Theme: {} (system)", theme),
        }
        return Ok(());
    }

    // All other commands talk to the server
    let api = ApiClient::new(&cli.api_base)?;
    let mut notebook = Notebook::connect(api)
        .await
        .with_context(|| format!("Failed to load notes from {}", cli.api_base))?;

    match cli.command {
        Commands::Theme { .. } => unreachable!(),

        Commands::Ls { title, tags } => {
            let tag_ids = match tags {
                Some(t) => resolve_filter_tags(&notebook, &parse_list(&t))?,
                None => Vec::new(),
            };
            let filter = NoteFilter {
                title: title.unwrap_or_default(),
                tag_ids,
            };

            for note in notebook.visible_notes(&filter) {
                let pin = if note.pinned { "* " } else { "" };
                if note.tags.is_empty() {
                    println!("{}{}: {}", pin, note.id, note.title);
                } else {
                    println!("{}{}: {} [{}]", pin, note.id, note.title, format_labels(&note));
                }
            }
        }

        Commands::Show { id } => {
            let note = note_or_bail(&notebook, &id)?;
            println!("# {}\n", note.title);
            println!("{}", note.markdown);
            println!("\n---\n");
            println!("Pinned: {}", if note.pinned { "yes" } else { "no" });
            println!("Tags: {}", format_labels(&note));
        }

        Commands::Add {
            title,
            tags,
            body,
            pinned,
        } => {
            let markdown = match body {
                Some(b) => b,
                None => read_stdin()?,
            };
            let labels = tags.map(|t| parse_list(&t)).unwrap_or_default();
            let tags = resolve_or_create_tags(&mut notebook, &labels).await?;

            let id = notebook
                .create_note(NoteData {
                    title: title.trim().to_string(),
                    markdown: markdown.trim().to_string(),
                    pinned,
                    tags,
                })
                .await?;
            println!("Added note {}", id);
        }

        Commands::Edit {
            id,
            title,
            tags,
            body,
        } => {
            let piped = if body.is_none() && !is_stdin_tty() {
                Some(read_stdin()?)
            } else {
                None
            };
            let body = resolve_body(body, piped);
            if title.is_none() && tags.is_none() && body.is_none() {
                bail!("Nothing to update");
            }

            let mut data = NoteData::from(note_or_bail(&notebook, &id)?);
            if let Some(title) = title {
                data.title = title.trim().to_string();
            }
            if let Some(body) = body {
                data.markdown = body.trim().to_string();
            }
            if let Some(tags) = tags {
                data.tags = resolve_or_create_tags(&mut notebook, &parse_list(&tags)).await?;
            }

            notebook.update_note(&id, data).await?;
            println!("Edited note {}", id);
        }

        Commands::Pin { id } => {
            if notebook.toggle_pin(&id).await? {
                println!("Pinned note {}", id);
            } else {
                println!("Unpinned note {}", id);
            }
        }

        Commands::Rm { ids } => {
            for id in &ids {
                notebook
                    .delete_note(id)
                    .await
                    .with_context(|| format!("Failed to delete note {}", id))?;
                println!("Deleted note {}", id);
            }
        }

        Commands::Tags => {
            for tag in notebook.tags() {
                println!("{}: {}", tag.id, tag.label);
            }
        }

        Commands::TagAdd { label } => {
            let label = label.trim();
            if label.is_empty() {
                bail!("Tag label cannot be empty");
            }
            let tag = notebook.add_tag(label).await?;
            println!("Added tag {} ({})", tag.label, tag.id);
        }

        Commands::TagRename { id, label } => {
            if notebook.tag(&id).is_none() {
                bail!("Tag {} not found", id);
            }
            notebook.update_tag(&id, label.trim()).await?;
            println!("Renamed tag {}", id);
        }

        Commands::TagRm { id } => {
            notebook.delete_tag(&id).await?;
            println!("Deleted tag {}", id);
        }
    }

    Ok(())
}
