use std::str::Lines;

use crate::chart::{ChartRecord, DifficultyChart};
use crate::error::ChartError;
use crate::timing::MeasureTiming;

/// Marks the start of a difficulty block.
pub const NOTES_MARKER: &str = "#NOTES:";

/// Header lines after the marker: steps type, description, difficulty, meter, groove radar.
const NOTES_HEADER_LINES: usize = 5;

/// Replace mines, keysounds, lifts and fakes with an empty column and hold/roll heads with a tap.
pub fn normalize_row(row: &str) -> String {
    row.chars()
        .map(|c| match c {
            'M' | 'K' | 'L' | 'F' => '0',
            '4' => '1',
            c => c,
        })
        .collect()
}

/// True when at least one column of a normalized row holds a note.
pub fn has_note(pattern: &str) -> bool {
    pattern.chars().any(|c| matches!(c, '1'..='9'))
}

/// Measure slot for a line inside a notes block.
///
/// `None` when the line is not a note row (blank, indented, comment). A row
/// with no note left after normalization is `Some(None)`.
pub fn row_slot(line: &str) -> Option<Option<String>> {
    if !line.starts_with(|c: char| !c.is_whitespace()) {
        return None;
    }
    let pattern = normalize_row(line);
    if !pattern.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(has_note(&pattern).then_some(pattern))
}

enum ReaderState {
    /// Collecting `#NAME:value;` fields, possibly spanning several lines.
    Header { buffer: String },
    /// Inside a notes block.
    Measure {
        rows: Vec<Option<String>>,
        measure_index: usize,
    },
}

/// Line-driven reader for StepMania `.sm` charts.
///
/// Header fields (`#NAME:value;`) are collected until the first `#NOTES:`
/// marker, then every notes block is read measure by measure. A measure is
/// timed as soon as its closing `,` or `;` is seen, so only the current
/// measure is buffered.
pub struct ChartReader<'a> {
    lines: Lines<'a>,
    state: ReaderState,
    title: String,
    bpm: Option<f64>,
    offset: f64,
    difficulties: Vec<DifficultyChart>,
}

impl<'a> ChartReader<'a> {
    pub fn new(text: &'a str) -> Self {
        ChartReader {
            lines: text.trim_start_matches('\u{feff}').lines(),
            state: ReaderState::Header {
                buffer: String::new(),
            },
            title: String::new(),
            bpm: None,
            offset: 0.0,
            difficulties: Vec::new(),
        }
    }

    /// Run the reader to the end of input.
    pub fn read(mut self) -> Result<ChartRecord, ChartError> {
        while let Some(line) = self.next_line() {
            self.step(line)?;
        }

        if let ReaderState::Measure { rows, .. } = &self.state {
            if !rows.is_empty() {
                log::warn!("Dropping {} rows of an unterminated measure", rows.len());
            }
        }

        let bpm = self.bpm.ok_or(ChartError::MissingTempo)?;

        Ok(ChartRecord {
            title: self.title,
            bpm,
            offset: self.offset,
            difficulties: self.difficulties,
        })
    }

    /// Next line without trailing whitespace
    fn next_line(&mut self) -> Option<&'a str> {
        self.lines.next().map(str::trim_end)
    }

    fn step(&mut self, line: &'a str) -> Result<(), ChartError> {
        if line.starts_with(NOTES_MARKER) {
            return self.read_notes_header();
        }

        match &mut self.state {
            ReaderState::Header { buffer } => {
                if line.trim_start().starts_with("//") {
                    return Ok(());
                }
                buffer.push_str(line);
                if buffer.ends_with(';') {
                    let field = std::mem::take(buffer);
                    self.read_field(&field)?;
                }
            }
            ReaderState::Measure {
                rows,
                measure_index,
            } => {
                if line.starts_with([',', ';']) {
                    let bpm = self.bpm.ok_or(ChartError::MissingTempo)?;
                    let notes = MeasureTiming::new(bpm, self.offset).time_measure(rows, *measure_index);
                    if let Some(difficulty) = self.difficulties.last_mut() {
                        difficulty.notes.extend(notes);
                    }
                    rows.clear();
                    *measure_index += 1;
                } else if let Some(slot) = row_slot(line) {
                    rows.push(slot);
                }
            }
        }

        Ok(())
    }

    /// Handle one complete `#NAME:value;` field.
    fn read_field(&mut self, field: &str) -> Result<(), ChartError> {
        let field = field.trim().trim_start_matches('#').trim_end_matches(';');
        if field.trim().is_empty() {
            return Ok(());
        }

        let (name, value) = field
            .split_once(':')
            .ok_or_else(|| ChartError::MalformedField(field.to_string()))?;

        match name.trim().to_ascii_uppercase().as_str() {
            "TITLE" => self.title = value.to_string(),
            "BPMS" => {
                if value.contains(',') {
                    return Err(ChartError::UnsupportedTempoChange(value.to_string()));
                }
                let bpm_text = value.rsplit('=').next().unwrap_or(value);
                let bpm = parse_number("BPMS", bpm_text)?;
                if bpm <= 0.0 {
                    return Err(ChartError::InvalidNumber {
                        field: "BPMS",
                        value: value.to_string(),
                    });
                }
                self.bpm = Some(bpm);
            }
            "STOPS" => {
                if !value.trim().is_empty() {
                    return Err(ChartError::UnsupportedStop(value.to_string()));
                }
            }
            "OFFSET" => self.offset = parse_number("OFFSET", value)?,
            other => log::trace!("Ignoring header field {}", other),
        }

        Ok(())
    }

    /// Consume the header lines that follow `#NOTES:` and open a new difficulty.
    fn read_notes_header(&mut self) -> Result<(), ChartError> {
        let mut header = Vec::with_capacity(NOTES_HEADER_LINES);
        for _ in 0..NOTES_HEADER_LINES {
            let line = self
                .next_line()
                .ok_or(ChartError::UnexpectedEndOfInput("notes header"))?;
            header.push(line.trim_start().trim_end_matches(':').trim_end());
        }

        let steps_type = header[0].to_string();
        let name = header[2].to_string();
        let meter = header[3].parse::<u32>().ok();

        log::debug!("Reading {} {} notes", steps_type, name);
        self.difficulties
            .push(DifficultyChart::new(name, steps_type, meter));
        self.state = ReaderState::Measure {
            rows: Vec::new(),
            measure_index: 0,
        };

        Ok(())
    }
}

fn parse_number(field: &'static str, text: &str) -> Result<f64, ChartError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ChartError::InvalidNumber {
            field,
            value: text.to_string(),
        })
}

/// Parse chart text into a [`ChartRecord`].
pub fn parse_chart(text: &str) -> Result<ChartRecord, ChartError> {
    ChartReader::new(text).read()
}
