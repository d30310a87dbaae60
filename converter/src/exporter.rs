use crate::chart::ChartRecord;
use anyhow::{Context, Result};
use std::path::Path;

impl ChartRecord {
    /// Export to the plain timed-notes text format
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("TITLE {}\n", self.title));
        output.push_str(&format!("BPM {}\n", self.bpm.trunc() as i64));

        for difficulty in &self.difficulties {
            output.push_str(&format!("DIFFICULTY {}\n", difficulty.name));
            output.push_str("NOTES\n");
            for note in &difficulty.notes {
                // Debug keeps a fractional digit on whole seconds ("1.0")
                output.push_str(&format!("{} {:?}\n", note.pattern, note.time));
            }
        }

        output
    }

    /// Export to JSON format
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Save chart to file
    pub fn save(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let content = match format {
            OutputFormat::Text => self.to_text(),
            OutputFormat::Json => self.to_json()?,
        };

        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}
