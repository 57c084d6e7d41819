use crate::{GraphEvent, IdSource, Mindmap, PersistedNode, UlidIds};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// What a mind-map file may contain on disk
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredMap {
    Record(Mindmap),
    Bare(PersistedNode),
}

/// A mind map stored as one JSON file, with its event log alongside
pub struct MindmapFile {
    path: PathBuf,
}

impl MindmapFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write a fresh record with a single root node
    pub fn create(path: &Path, title: &str) -> Result<Self> {
        if path.exists() {
            return Err(anyhow!("Mind map file already exists: {}", path.display()));
        }
        let file = Self::new(path);
        let root = PersistedNode::new(UlidIds.next_id(), title);
        file.save(&Mindmap::new(0, title, 0, root))?;
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<name>.events.jsonl` next to the map
    pub fn events_path(&self) -> PathBuf {
        self.path.with_extension("events.jsonl")
    }

    /// Load the record; a bare document is wrapped in a new record titled
    /// after its root
    pub fn load(&self) -> Result<Mindmap> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open mind map: {}", self.path.display()))?;
        let reader = BufReader::new(file);

        let stored: StoredMap = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse mind map from: {}", self.path.display()))?;

        Ok(match stored {
            StoredMap::Record(mindmap) => mindmap,
            StoredMap::Bare(document) => {
                let title = document.text.clone();
                Mindmap::new(0, title, 0, document)
            }
        })
    }

    pub fn save(&self, mindmap: &Mindmap) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create mind map file: {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, mindmap)
            .with_context(|| format!("Failed to write mind map to: {}", self.path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush mind map: {}", self.path.display()))?;
        log::debug!("Wrote mind map {} to {}", mindmap.id, self.path.display());
        Ok(())
    }

    /// Append events to the event log, one JSON object per line
    pub fn append_events(&self, events: &[GraphEvent]) -> Result<()> {
        let events_path = self.events_path();

        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&events_path)
            .with_context(|| format!("Failed to open event log: {}", events_path.display()))?;

        let mut writer = BufWriter::new(file);

        for event in events {
            let json = serde_json::to_string(event)
                .with_context(|| format!("Failed to serialize event: {}", events_path.display()))?;
            writeln!(writer, "{}", json)
                .with_context(|| format!("Failed to write event to: {}", events_path.display()))?;
        }

        writer
            .flush()
            .with_context(|| format!("Failed to flush event log: {}", events_path.display()))?;

        Ok(())
    }

    pub fn load_events(&self) -> Result<Vec<GraphEvent>> {
        let events_path = self.events_path();

        if !events_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&events_path)
            .with_context(|| format!("Failed to open event log: {}", events_path.display()))?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| {
                format!(
                    "Failed to read line {} from: {}",
                    line_num + 1,
                    events_path.display()
                )
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let event: GraphEvent = serde_json::from_str(&line).with_context(|| {
                format!(
                    "Failed to parse event on line {} from: {}",
                    line_num + 1,
                    events_path.display()
                )
            })?;

            events.push(event);
        }

        Ok(events)
    }
}

/// Parse a document from a JSON string
pub fn document_from_json(json: &str) -> Result<PersistedNode> {
    serde_json::from_str(json).context("Failed to parse mind map document")
}

pub fn document_to_json(document: &PersistedNode) -> Result<String> {
    serde_json::to_string_pretty(document).context("Failed to serialize mind map document")
}
