use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use document::{load_document, save_document, Document, ImportConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use timeline::{
    ancestor_offsets, branch_duration, branch_track_layout, chapter_duration, merge_timelines,
    timeline_length, track_length, Chapter, ChapterId, RegionId, Seconds,
};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "programme-cli")]
#[command(about = "Inspect chapter timelines of multi-screen programmes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    /// Import settings (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the chapter tree with durations
    Tree {
        /// Programme file (chapter tree JSON)
        document: PathBuf,
    },

    /// Duration of a chapter including its children
    Duration { document: PathBuf, chapter: String },

    /// Time the branch ending at a chapter must occupy
    Branch { document: PathBuf, chapter: String },

    /// Flatten a chapter and its subtree into one timeline
    Merge { document: PathBuf, chapter: String },

    /// Offsets of a chapter within each of its ancestors
    Offsets { document: PathBuf, chapter: String },

    /// Tracks visible per region while editing a chapter
    Layout {
        document: PathBuf,
        chapter: String,

        /// Regions to lay out (defaults to every region in the programme)
        #[arg(short, long)]
        region: Vec<String>,
    },

    /// Re-import a programme and write it back out
    Normalize {
        /// Input file path
        input: PathBuf,

        /// Output file path
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries results only
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ImportConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => ImportConfig::default(),
    };
    debug!(?config, "import settings");

    let json = cli.json;
    match cli.command {
        Commands::Tree { document } => tree_command(&open(&document, &config)?, json),
        Commands::Duration { document, chapter } => {
            let document = open(&document, &config)?;
            let chapter = document.chapter(&ChapterId::from(chapter))?;
            print_seconds(chapter_duration(chapter, &document.timelines), json)
        }
        Commands::Branch { document, chapter } => {
            let document = open(&document, &config)?;
            let path = document.path_of(&ChapterId::from(chapter))?;
            let duration = branch_duration(&document.chapters, &document.timelines, &path)?;
            print_seconds(duration, json)
        }
        Commands::Merge { document, chapter } => {
            merge_command(&open(&document, &config)?, chapter.into(), json)
        }
        Commands::Offsets { document, chapter } => {
            offsets_command(&open(&document, &config)?, chapter.into(), json)
        }
        Commands::Layout {
            document,
            chapter,
            region,
        } => layout_command(&open(&document, &config)?, chapter.into(), region, json),
        Commands::Normalize { input, output } => {
            let document = open(&input, &config)?;
            save_document(&document, &output, &config)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("Wrote {:?}", output);
            Ok(())
        }
    }
}

fn open(path: &Path, config: &ImportConfig) -> Result<Document> {
    info!("Loading programme: {:?}", path);
    load_document(path, config).with_context(|| format!("failed to load {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_seconds(seconds: Seconds, json: bool) -> Result<()> {
    if json {
        print_json(&seconds)
    } else {
        println!("{}s", seconds);
        Ok(())
    }
}

#[derive(Serialize)]
struct ChapterSummary {
    id: ChapterId,
    name: Option<String>,
    duration: Seconds,
    children: Vec<ChapterSummary>,
}

fn summarize(chapter: &Chapter, document: &Document) -> ChapterSummary {
    ChapterSummary {
        id: chapter.id.clone(),
        name: chapter.name.clone(),
        duration: chapter_duration(chapter, &document.timelines),
        children: chapter
            .children
            .iter()
            .map(|c| summarize(c, document))
            .collect(),
    }
}

fn tree_command(document: &Document, json: bool) -> Result<()> {
    let summaries: Vec<_> = document
        .chapters
        .iter()
        .map(|c| summarize(c, document))
        .collect();
    if json {
        return print_json(&summaries);
    }

    fn print_node(summary: &ChapterSummary, depth: usize) {
        let name = summary.name.as_deref().unwrap_or("");
        println!(
            "{}{} {} ({}s)",
            "  ".repeat(depth),
            summary.id,
            name,
            summary.duration
        );
        for child in &summary.children {
            print_node(child, depth + 1);
        }
    }
    for summary in &summaries {
        print_node(summary, 0);
    }
    Ok(())
}

fn merge_command(document: &Document, chapter_id: ChapterId, json: bool) -> Result<()> {
    let chapter = document.chapter(&chapter_id)?;
    let merged = merge_timelines(chapter, &document.timelines);
    if json {
        return print_json(&merged);
    }

    println!(
        "{} tracks, {}s",
        merged.tracks.len(),
        timeline_length(Some(&merged))
    );
    for track in &merged.tracks {
        let lock = if track.locked { " [locked]" } else { "" };
        println!("{}{} ({}s)", track.region_id, lock, track_length(track));
        for element in &track.elements {
            let label = if element.is_padding() {
                "<gap>"
            } else {
                element.component_id.as_str()
            };
            println!("  +{}s {} {}s", element.offset, label, element.duration);
        }
    }
    Ok(())
}

fn offsets_command(document: &Document, chapter_id: ChapterId, json: bool) -> Result<()> {
    let path = document.path_of(&chapter_id)?;
    let offsets = ancestor_offsets(&document.chapters, &document.timelines, &path)?;
    if json {
        return print_json(&offsets);
    }

    for entry in &offsets {
        match &entry.chapter_id {
            Some(id) => println!("{} {} +{}s", entry.access_path, id, entry.offset),
            None => println!("{} (top)", entry.access_path),
        }
    }
    Ok(())
}

fn layout_command(
    document: &Document,
    chapter_id: ChapterId,
    regions: Vec<String>,
    json: bool,
) -> Result<()> {
    let regions: Vec<RegionId> = if regions.is_empty() {
        document.regions()
    } else {
        regions.into_iter().map(RegionId::from).collect()
    };

    let layout = branch_track_layout(
        &document.chapters,
        &document.timelines,
        &chapter_id,
        &regions,
    )?;
    if json {
        return print_json(&layout);
    }

    for row in &layout {
        match &row.track {
            Some(track) => println!(
                "{}: {} ({} elements, {}s){}",
                row.region_id,
                track.id,
                track.elements.len(),
                track_length(track),
                if track.locked { " [locked]" } else { "" }
            ),
            None => println!("{}: -", row.region_id),
        }
    }
    Ok(())
}
