use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const CHART_EXTENSION: &str = "sm";

/// Lowercase ASCII name used to match a chart with its audio.
///
/// The last extension is removed (remaining dots are dropped), everything
/// outside `a-z`, `0-9`, `-`, `_` and space is discarded and spaces become
/// underscores. A name without any extension normalizes to an empty string.
pub fn normalize_name(file_name: &str) -> String {
    let stem: String = match file_name.rsplit_once('.') {
        Some((stem, _)) => stem.split('.').collect(),
        None => String::new(),
    };

    stem.to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '-' | '_' | ' '))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// A chart file and the audio file sharing its normalized name.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartPair {
    pub name: String,
    pub chart: PathBuf,
    pub audio: PathBuf,
}

/// Result of scanning an input tree.
#[derive(Clone, Debug, Default)]
pub struct Pairing {
    pub pairs: Vec<ChartPair>,
    /// Charts with no audio file in the same directory
    pub unpaired: Vec<PathBuf>,
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}

/// Pair the charts and audio files of a single directory.
pub fn pair_directory(files: &[PathBuf], audio_extension: &str, pairing: &mut Pairing) {
    let audio_by_name: HashMap<String, &PathBuf> = files
        .iter()
        .filter(|p| has_extension(p, audio_extension))
        .map(|p| (normalize_name(file_name(p)), p))
        .collect();

    for chart in files.iter().filter(|p| has_extension(p, CHART_EXTENSION)) {
        let name = normalize_name(file_name(chart));
        match audio_by_name.get(&name) {
            Some(audio) => pairing.pairs.push(ChartPair {
                name,
                chart: chart.clone(),
                audio: (*audio).clone(),
            }),
            None => pairing.unpaired.push(chart.clone()),
        }
    }
}

/// Walk `input_dir` recursively and pair charts with audio per directory.
pub fn collect_pairs(input_dir: &Path, audio_extension: &str) -> Result<Pairing> {
    let mut by_dir: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", input_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        by_dir.entry(parent).or_default().push(path);
    }

    let mut pairing = Pairing::default();
    for files in by_dir.values() {
        pair_directory(files, audio_extension, &mut pairing);
    }

    Ok(pairing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("My Song.sm"), "my_song");
        assert_eq!(normalize_name("Été (Remix)!.ogg"), "t_remix");
        assert_eq!(normalize_name("a.b.sm"), "ab");
        assert_eq!(normalize_name("Track-01_final.OGG"), "track-01_final");
        assert_eq!(normalize_name("README"), "");
    }

    #[test]
    fn test_pair_directory() {
        let files: Vec<PathBuf> = ["songs/My Song.sm", "songs/my song.ogg", "songs/Other.sm", "songs/cover.png"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let mut pairing = Pairing::default();
        pair_directory(&files, "ogg", &mut pairing);

        assert_eq!(
            pairing.pairs,
            vec![ChartPair {
                name: "my_song".to_string(),
                chart: PathBuf::from("songs/My Song.sm"),
                audio: PathBuf::from("songs/my song.ogg"),
            }]
        );
        assert_eq!(pairing.unpaired, vec![PathBuf::from("songs/Other.sm")]);
    }

    #[test]
    fn test_collect_pairs_only_within_directory() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(a.join("Song.sm"), "").unwrap();
        std::fs::write(a.join("song.ogg"), "").unwrap();
        std::fs::write(b.join("Lonely.sm"), "").unwrap();
        std::fs::write(dir.path().join("lonely.ogg"), "").unwrap();

        let pairing = collect_pairs(dir.path(), "ogg").unwrap();
        assert_eq!(pairing.pairs.len(), 1);
        assert_eq!(pairing.pairs[0].name, "song");
        assert_eq!(pairing.unpaired, vec![b.join("Lonely.sm")]);
    }
}
