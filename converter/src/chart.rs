use serde::{Deserialize, Serialize};

/// A note row that survived normalization, placed at an absolute time in seconds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimedNote {
    pub pattern: String,
    pub time: f64,
}

impl TimedNote {
    pub fn new(pattern: impl Into<String>, time: f64) -> Self {
        TimedNote {
            pattern: pattern.into(),
            time,
        }
    }
}

/// One `#NOTES` block of a chart.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DifficultyChart {
    pub name: String,
    pub steps_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter: Option<u32>,
    pub notes: Vec<TimedNote>,
}

impl DifficultyChart {
    pub fn new(name: String, steps_type: String, meter: Option<u32>) -> Self {
        DifficultyChart {
            name,
            steps_type,
            meter,
            notes: Vec::new(),
        }
    }
}

/// Parsed content of a single chart file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChartRecord {
    pub title: String,
    pub bpm: f64,
    pub offset: f64,
    /// Difficulty blocks in file order.
    pub difficulties: Vec<DifficultyChart>,
}

impl ChartRecord {
    /// First difficulty block with the given name
    pub fn difficulty(&self, name: &str) -> Option<&DifficultyChart> {
        self.difficulties.iter().find(|d| d.name == name)
    }

    pub fn note_count(&self) -> usize {
        self.difficulties.iter().map(|d| d.notes.len()).sum()
    }
}
