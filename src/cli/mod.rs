//! Command-line interface for refract.
//!
//! Provides commands for managing programs and assets, driving generation
//! and regeneration, and inspecting generated-content history.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::adapters::{Generator, HttpGenerator};
use crate::config;
use crate::core::Orchestrator;
use crate::domain::{
    count_visible, latest_artifacts, Asset, AssetKind, ContentKind, Program,
};
use crate::source::DefaultResolver;
use crate::store::{JsonProgramStore, ProgramStore};

/// refract - AI content-repurposing engine
#[derive(Parser, Debug)]
#[command(name = "refract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage programs
    Program {
        #[command(subcommand)]
        command: ProgramCommands,
    },

    /// Attach a source asset to a program
    Asset {
        /// Program ID
        program_id: String,

        /// Asset kind (video, text, document)
        #[arg(short, long)]
        kind: String,

        /// Asset title
        #[arg(short, long)]
        title: String,

        /// Source URL (video assets)
        #[arg(long)]
        url: Option<String>,

        /// Inline content (text assets)
        #[arg(long)]
        content: Option<String>,

        /// Path to an uploaded file (document assets)
        #[arg(long)]
        file: Option<String>,
    },

    /// Generate content for an asset across one or more languages
    Generate {
        /// Program ID
        program_id: String,

        /// Asset ID
        asset_id: String,

        /// Content kind (summary, quiz, case_study, short_lecture,
        /// flashcards, audio_track, video_script)
        kind: String,

        /// Comma-separated language codes (defaults to the program's list)
        #[arg(short, long)]
        languages: Option<String>,
    },

    /// Regenerate one existing artifact as a new version
    Regenerate {
        /// Program ID
        program_id: String,

        /// Asset ID
        asset_id: String,

        /// Artifact ID to supersede
        artifact_id: String,
    },

    /// List generated artifacts for an asset
    Artifacts {
        /// Program ID
        program_id: String,

        /// Asset ID
        asset_id: String,

        /// Filter to one language
        #[arg(short, long)]
        language: Option<String>,

        /// Filter to one content kind
        #[arg(short, long)]
        kind: Option<String>,

        /// Show the full version history, including superseded versions
        #[arg(long)]
        history: bool,
    },

    /// Check that the configured generator backend is reachable
    Health,

    /// Show resolved configuration (debug)
    Config,
}

#[derive(Subcommand, Debug)]
pub enum ProgramCommands {
    /// Create a new program
    Create {
        /// Program title
        title: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Tags (comma-separated)
        #[arg(short, long)]
        tags: Option<String>,

        /// Supported languages (comma-separated)
        #[arg(short, long)]
        languages: Option<String>,

        /// Owning user
        #[arg(short, long, default_value = "local")]
        owner: String,
    },

    /// List programs, most recently updated first
    List {
        /// Maximum number of programs to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one program with its assets
    Show {
        /// Program ID
        program_id: String,
    },

    /// Search programs by title, description, or tag
    Search {
        /// Search query
        query: String,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Program { command } => execute_program(command).await,
            Commands::Asset {
                program_id,
                kind,
                title,
                url,
                content,
                file,
            } => add_asset(&program_id, &kind, &title, url, content, file).await,
            Commands::Generate {
                program_id,
                asset_id,
                kind,
                languages,
            } => generate(&program_id, &asset_id, &kind, languages).await,
            Commands::Regenerate {
                program_id,
                asset_id,
                artifact_id,
            } => regenerate(&program_id, &asset_id, &artifact_id).await,
            Commands::Artifacts {
                program_id,
                asset_id,
                language,
                kind,
                history,
            } => list_artifacts(&program_id, &asset_id, language, kind, history).await,
            Commands::Health => health_check().await,
            Commands::Config => show_config(),
        }
    }
}

/// Execute program subcommands
async fn execute_program(command: ProgramCommands) -> Result<()> {
    match command {
        ProgramCommands::Create {
            title,
            description,
            tags,
            languages,
            owner,
        } => create_program(&title, &description, tags, languages, &owner).await,
        ProgramCommands::List { limit } => list_programs(limit).await,
        ProgramCommands::Show { program_id } => show_program(&program_id).await,
        ProgramCommands::Search { query } => search_programs(&query).await,
    }
}

/// Build the orchestrator from configuration
fn build_orchestrator() -> Result<Orchestrator> {
    let generator_config = config::generator_config()?;
    let generator = HttpGenerator::from_config(&generator_config)
        .map_err(|e| anyhow::anyhow!("Generator configuration error: {}", e))?;
    let store = JsonProgramStore::from_config()?;

    Ok(Orchestrator::new(
        Arc::new(generator),
        Arc::new(store),
        Arc::new(DefaultResolver::new()),
    ))
}

fn open_store() -> Result<JsonProgramStore> {
    Ok(JsonProgramStore::from_config()?)
}

fn parse_id(id_str: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(id_str).with_context(|| format!("Invalid {} ID: {}", what, id_str))
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Create a new program
async fn create_program(
    title: &str,
    description: &str,
    tags: Option<String>,
    languages: Option<String>,
    owner: &str,
) -> Result<()> {
    let store = open_store()?;

    let mut program = Program::new(title, owner).with_description(description);

    if let Some(tags) = tags {
        program = program.with_tags(split_csv(&tags));
    }

    let languages = match languages {
        Some(raw) => split_csv(&raw),
        None => config::default_languages()?,
    };
    program = program.with_languages(languages);

    store.save(&mut program).await?;

    println!("Created program {}", program.id);
    println!("  Title: {}", program.title);
    println!("  Languages: {}", program.languages.join(", "));

    Ok(())
}

/// List programs
async fn list_programs(limit: usize) -> Result<()> {
    let store = open_store()?;
    let programs = store.list().await?;

    if programs.is_empty() {
        println!("No programs found");
        return Ok(());
    }

    println!("{:<38} {:<30} {:<8} {}", "PROGRAM ID", "TITLE", "ASSETS", "UPDATED");
    println!("{}", "-".repeat(95));

    for program in programs.iter().take(limit) {
        println!(
            "{:<38} {:<30} {:<8} {}",
            program.id,
            truncate(&program.title, 28),
            program.assets.len(),
            program.updated_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Show one program with its assets and per-asset visibility badges
async fn show_program(program_id: &str) -> Result<()> {
    let store = open_store()?;
    let program = store.load(parse_id(program_id, "program")?).await?;

    println!("Program: {}", program.title);
    println!("  ID: {}", program.id);
    if !program.description.is_empty() {
        println!("  Description: {}", program.description);
    }
    if !program.tags.is_empty() {
        println!("  Tags: {}", program.tags.join(", "));
    }
    println!("  Languages: {}", program.languages.join(", "));
    println!("  Published: {}", program.is_published);
    println!("  Owner: {}", program.owner);
    println!("  Created: {}", program.created_at.format("%Y-%m-%d %H:%M"));
    println!("  Updated: {}", program.updated_at.format("%Y-%m-%d %H:%M"));

    if program.assets.is_empty() {
        println!("\nNo assets attached");
        return Ok(());
    }

    println!("\nAssets:");
    for asset in &program.assets {
        println!(
            "  {} [{}] {} ({} generated)",
            asset.id,
            asset.kind,
            asset.title,
            count_visible(&asset.generated)
        );
    }

    Ok(())
}

/// Search programs
async fn search_programs(query: &str) -> Result<()> {
    let store = open_store()?;
    let programs = store.list().await?;

    let matches: Vec<_> = programs.iter().filter(|p| p.matches_query(query)).collect();

    if matches.is_empty() {
        println!("No programs match '{}'", query);
        return Ok(());
    }

    for program in matches {
        println!("{} {}", program.id, program.title);
    }

    Ok(())
}

/// Attach an asset to a program
async fn add_asset(
    program_id: &str,
    kind: &str,
    title: &str,
    url: Option<String>,
    content: Option<String>,
    file: Option<String>,
) -> Result<()> {
    let kind: AssetKind = kind.parse()?;
    let store = open_store()?;
    let mut program = store.load(parse_id(program_id, "program")?).await?;

    let asset = match kind {
        AssetKind::Video => {
            let url = url.context("Video assets require --url")?;
            Asset::video(url, title)
        }
        AssetKind::Text => {
            let content = content.context("Text assets require --content")?;
            Asset::text(title, content)
        }
        AssetKind::Document => {
            let path = file.context("Document assets require --file")?;
            let mut asset = Asset::document(&path, title);
            if let Ok(metadata) = std::fs::metadata(&path) {
                asset.size_bytes = Some(metadata.len());
            }
            asset
        }
    };

    let asset_id = asset.id;
    program.add_asset(asset);
    store.save(&mut program).await?;

    println!("Attached {} asset {} to program {}", kind, asset_id, program.id);

    Ok(())
}

/// Generate content for an asset
async fn generate(
    program_id: &str,
    asset_id: &str,
    kind: &str,
    languages: Option<String>,
) -> Result<()> {
    let program_id = parse_id(program_id, "program")?;
    let asset_id = parse_id(asset_id, "asset")?;
    let kind: ContentKind = kind.parse()?;

    let orchestrator = build_orchestrator()?;

    let languages = match languages {
        Some(raw) => split_csv(&raw),
        None => {
            let store = open_store()?;
            let program = store.load(program_id).await?;
            if program.languages.is_empty() {
                config::default_languages()?
            } else {
                program.languages.clone()
            }
        }
    };

    let outcome = orchestrator
        .generate(program_id, asset_id, kind, &languages)
        .await?;

    for artifact in &outcome.artifacts {
        println!(
            "Generated {} v{} [{}] {}",
            artifact.kind, artifact.version, artifact.language, artifact.id
        );
    }

    for failure in &outcome.failures {
        eprintln!("[{} failed: {}]", failure.language, failure.error);
    }

    if outcome.artifacts.is_empty() && !outcome.failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

/// Regenerate one artifact
async fn regenerate(program_id: &str, asset_id: &str, artifact_id: &str) -> Result<()> {
    let orchestrator = build_orchestrator()?;

    let artifact = orchestrator
        .regenerate(
            parse_id(program_id, "program")?,
            parse_id(asset_id, "asset")?,
            parse_id(artifact_id, "artifact")?,
        )
        .await?;

    println!(
        "Regenerated {} [{}] now at v{} ({})",
        artifact.kind, artifact.language, artifact.version, artifact.id
    );

    Ok(())
}

/// List artifacts for an asset
async fn list_artifacts(
    program_id: &str,
    asset_id: &str,
    language: Option<String>,
    kind: Option<String>,
    history: bool,
) -> Result<()> {
    let store = open_store()?;
    let program = store.load(parse_id(program_id, "program")?).await?;
    let asset = program.asset(parse_id(asset_id, "asset")?)?;

    let kind = kind.map(|k| k.parse::<ContentKind>()).transpose()?;

    if history {
        if asset.generated.is_empty() {
            println!("No artifacts generated");
            return Ok(());
        }

        println!(
            "{:<38} {:<14} {:<5} {:<4} {:<11} {}",
            "ARTIFACT ID", "KIND", "LANG", "VER", "STATUS", "GENERATED"
        );
        println!("{}", "-".repeat(95));

        for artifact in &asset.generated {
            if let Some(kind) = kind {
                if artifact.kind != kind {
                    continue;
                }
            }
            if let Some(ref language) = language {
                if &artifact.language != language {
                    continue;
                }
            }
            println!(
                "{:<38} {:<14} {:<5} {:<4} {:<11} {}",
                artifact.id,
                artifact.kind.to_string(),
                artifact.language,
                artifact.version,
                format!("{:?}", artifact.status).to_lowercase(),
                artifact.generated_at.format("%Y-%m-%d %H:%M")
            );
        }

        return Ok(());
    }

    let latest = latest_artifacts(&asset.generated, language.as_deref(), kind);

    if latest.is_empty() {
        println!("No visible artifacts");
        return Ok(());
    }

    println!(
        "{:<38} {:<14} {:<5} {:<4} {}",
        "ARTIFACT ID", "KIND", "LANG", "VER", "PREVIEW"
    );
    println!("{}", "-".repeat(100));

    for artifact in latest {
        println!(
            "{:<38} {:<14} {:<5} {:<4} {}",
            artifact.id,
            artifact.kind.to_string(),
            artifact.language,
            artifact.version,
            artifact.body.preview(40)
        );
    }

    Ok(())
}

/// Check generator reachability
async fn health_check() -> Result<()> {
    let generator_config = config::generator_config()?;
    let generator = HttpGenerator::from_config(&generator_config)
        .map_err(|e| anyhow::anyhow!("Generator configuration error: {}", e))?;

    match generator.health_check().await {
        Ok(()) => {
            println!("Generator '{}' is healthy", generator.name());
            Ok(())
        }
        Err(e) => {
            eprintln!("Generator health check failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("Resolved configuration:");
    println!("  Home: {}", config.home.display());
    println!("  Programs: {}", config.programs.display());
    println!("  Generator base URL: {}", config.generator.base_url);
    println!("  Generator model: {}", config.generator.model);
    println!("  API key env: {}", config.generator.api_key_env);
    println!("  Default languages: {}", config.default_languages.join(", "));
    match &config.config_file {
        Some(path) => println!("  Config file: {}", path.display()),
        None => println!("  Config file: (none found)"),
    }

    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}..", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_csv() {
        assert_eq!(split_csv("en, es ,de"), vec!["en", "es", "de"]);
        assert_eq!(split_csv("en,,es"), vec!["en", "es"]);
        assert!(split_csv("  ").is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title here", 8), "a longer..");
    }

    #[test]
    fn test_cli_parses_generate() {
        let cli = Cli::parse_from([
            "refract",
            "generate",
            "550e8400-e29b-41d4-a716-446655440000",
            "550e8400-e29b-41d4-a716-446655440001",
            "summary",
            "--languages",
            "en,es",
        ]);

        match cli.command {
            Commands::Generate {
                kind, languages, ..
            } => {
                assert_eq!(kind, "summary");
                assert_eq!(languages.as_deref(), Some("en,es"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
