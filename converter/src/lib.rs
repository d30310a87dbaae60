pub mod chart;
pub mod error;
pub mod exporter;
pub mod pairing;
pub mod reader;
pub mod timing;

use anyhow::{Context, Result};
use exporter::OutputFormat;
use pairing::{ChartPair, collect_pairs};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub use chart::{ChartRecord, DifficultyChart, TimedNote};
pub use error::ChartError;
pub use reader::parse_chart;

/// Main converter configuration
#[derive(Clone, Debug)]
pub struct ConverterConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub audio_extension: String, // without the dot
    pub copy_audio: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            input_dir: PathBuf::from("parseIn"),
            output_dir: PathBuf::from("parseOut"),
            format: OutputFormat::Text,
            audio_extension: "ogg".to_string(),
            copy_audio: true,
        }
    }
}

impl ConverterConfig {
    /// Defaults with `PARSE_IN` / `PARSE_OUT` applied when set
    pub fn from_env() -> Self {
        let defaults = ConverterConfig::default();
        ConverterConfig {
            input_dir: std::env::var("PARSE_IN").map(PathBuf::from).unwrap_or(defaults.input_dir),
            output_dir: std::env::var("PARSE_OUT").map(PathBuf::from).unwrap_or(defaults.output_dir),
            ..defaults
        }
    }
}

/// Outcome of a directory conversion
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
    pub unpaired: usize,
}

/// Read and parse a chart file. Invalid UTF-8 is replaced rather than rejected.
pub fn read_chart(path: &Path) -> Result<ChartRecord> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(parse_chart(&text)?)
}

/// Converts a tree of charts and their audio into timed-note files
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Converter { config }
    }

    /// Convert every chart/audio pair under the input directory.
    ///
    /// A chart that fails to convert is logged and counted; the rest of the batch continues.
    pub fn convert_directory(&self) -> Result<BatchSummary> {
        let start = Instant::now();
        let input = &self.config.input_dir;
        let output = &self.config.output_dir;

        if !input.is_dir() {
            anyhow::bail!("Invalid input directory: {}", input.display());
        }
        if !output.is_dir() {
            std::fs::create_dir_all(output)
                .with_context(|| format!("failed to create {}", output.display()))?;
            log::info!("Output directory missing, created {}", output.display());
        }

        let pairing = collect_pairs(input, &self.config.audio_extension)?;
        for chart in &pairing.unpaired {
            log::debug!("No {} audio for {}", self.config.audio_extension, chart.display());
        }

        let mut summary = BatchSummary {
            unpaired: pairing.unpaired.len(),
            ..BatchSummary::default()
        };

        for pair in &pairing.pairs {
            match self.convert_pair(pair) {
                Ok(()) => summary.converted += 1,
                Err(e) => {
                    log::warn!("Write failed for {}: {:#}", pair.chart.display(), e);
                    summary.failed += 1;
                }
            }
        }

        log::info!(
            "Converted {} charts ({} failed, {} without audio) in {:.3}s",
            summary.converted,
            summary.failed,
            summary.unpaired,
            start.elapsed().as_secs_f64()
        );

        Ok(summary)
    }

    /// Convert one pair: write the timed notes and copy the audio next to them.
    pub fn convert_pair(&self, pair: &ChartPair) -> Result<()> {
        let record = read_chart(&pair.chart)?;

        let output_path = self
            .config
            .output_dir
            .join(format!("{}.{}", pair.name, self.config.format.extension()));
        record.save(&output_path, self.config.format)?;
        log::debug!(
            "Saved {} ({} notes) to {}",
            record.title,
            record.note_count(),
            output_path.display()
        );

        if self.config.copy_audio {
            let audio_path = self
                .config
                .output_dir
                .join(format!("{}.{}", pair.name, self.config.audio_extension));
            std::fs::copy(&pair.audio, &audio_path).with_context(|| {
                format!("failed to copy {} to {}", pair.audio.display(), audio_path.display())
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = "#TITLE:Batch Song;
#OFFSET:0.000;
#BPMS:0.000=120.000;
#STOPS:;
#NOTES:
     dance-single:
     :
     Medium:
     5:
     0.0,0.0,0.0,0.0,0.0:
1000
0000
0010
0000
;
";

    fn config_for(input: &Path, output: &Path) -> ConverterConfig {
        ConverterConfig {
            input_dir: input.to_path_buf(),
            output_dir: output.join("out"),
            ..ConverterConfig::default()
        }
    }

    #[test]
    fn test_converter_config_default() {
        let config = ConverterConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("parseIn"));
        assert_eq!(config.audio_extension, "ogg");
        assert!(config.copy_audio);
    }

    #[test]
    fn test_convert_directory() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("Batch Song.sm"), CHART).unwrap();
        std::fs::write(input.path().join("batch song.ogg"), b"OggS").unwrap();
        std::fs::write(input.path().join("No Audio.sm"), CHART).unwrap();

        let converter = Converter::new(config_for(input.path(), output.path()));
        let summary = converter.convert_directory().unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                converted: 1,
                failed: 0,
                unpaired: 1
            }
        );

        let out_dir = output.path().join("out");
        let text = std::fs::read_to_string(out_dir.join("batch_song.txt")).unwrap();
        assert_eq!(
            text,
            "TITLE Batch Song\nBPM 120\nDIFFICULTY Medium\nNOTES\n1000 0.0\n0010 1.0\n"
        );
        assert_eq!(std::fs::read(out_dir.join("batch_song.ogg")).unwrap(), b"OggS");
    }

    #[test]
    fn test_failing_chart_does_not_stop_batch() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let bad = CHART.replace("#STOPS:;", "#STOPS:1.000=0.500;");
        std::fs::write(input.path().join("bad.sm"), bad).unwrap();
        std::fs::write(input.path().join("bad.ogg"), b"").unwrap();
        std::fs::write(input.path().join("good.sm"), CHART).unwrap();
        std::fs::write(input.path().join("good.ogg"), b"").unwrap();

        let converter = Converter::new(config_for(input.path(), output.path()));
        let summary = converter.convert_directory().unwrap();

        assert_eq!(summary.converted, 1);
        assert_eq!(summary.failed, 1);
        assert!(output.path().join("out/good.txt").exists());
        assert!(!output.path().join("out/bad.txt").exists());
    }

    #[test]
    fn test_json_output_without_audio_copy() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("song.sm"), CHART).unwrap();
        std::fs::write(input.path().join("song.ogg"), b"").unwrap();

        let config = ConverterConfig {
            format: OutputFormat::Json,
            copy_audio: false,
            ..config_for(input.path(), output.path())
        };
        Converter::new(config).convert_directory().unwrap();

        let json = std::fs::read_to_string(output.path().join("out/song.json")).unwrap();
        assert!(json.contains("\"name\": \"Medium\""));
        assert!(!output.path().join("out/song.ogg").exists());
    }

    #[test]
    fn test_missing_input_directory() {
        let output = tempfile::tempdir().unwrap();
        let converter = Converter::new(config_for(&output.path().join("missing"), output.path()));
        assert!(converter.convert_directory().is_err());
    }

    #[test]
    fn test_read_chart_error_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("multi.sm");
        std::fs::write(&path, CHART.replace("0.000=120.000", "0.000=120.000,4.000=60.000")).unwrap();

        let err = read_chart(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChartError>(),
            Some(ChartError::UnsupportedTempoChange(_))
        ));
    }
}
