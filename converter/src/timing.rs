use crate::chart::TimedNote;

/// Finest subdivision of a measure; every row length is scaled onto this grid.
pub const MEASURE_GRID: f64 = 256.0;

/// Beats in one measure.
pub const BEATS_PER_MEASURE: f64 = 4.0;

/// Converts measure/row positions to seconds for a chart with a single BPM.
#[derive(Clone, Copy, Debug)]
pub struct MeasureTiming {
    pub bpm: f64,
    pub offset: f64, // seconds, subtracted from every time
}

impl MeasureTiming {
    pub fn new(bpm: f64, offset: f64) -> Self {
        MeasureTiming { bpm, offset }
    }

    /// Length of one measure in seconds
    pub fn measure_seconds(&self) -> f64 {
        BEATS_PER_MEASURE * 60.0 / self.bpm
    }

    /// Time of row `row` out of `row_count` equal rows in measure `measure_index`
    pub fn row_time(&self, measure_index: usize, row: usize, row_count: usize) -> f64 {
        let measure_seconds = self.measure_seconds();
        let grid_seconds = measure_seconds / MEASURE_GRID;
        let measure_start = measure_seconds * measure_index as f64;
        let grid_per_row = MEASURE_GRID / row_count as f64;

        row as f64 * grid_seconds * grid_per_row + measure_start - self.offset
    }

    /// Time every occupied row of a measure. Empty rows keep their slot but produce nothing.
    pub fn time_measure(&self, rows: &[Option<String>], measure_index: usize) -> Vec<TimedNote> {
        rows.iter()
            .enumerate()
            .filter_map(|(i, row)| {
                row.as_ref().map(|pattern| {
                    TimedNote::new(pattern.clone(), self.row_time(measure_index, i, rows.len()))
                })
            })
            .collect()
    }
}

/// Shorthand for [`MeasureTiming::time_measure`].
pub fn calculate_timing(
    rows: &[Option<String>],
    measure_index: usize,
    bpm: f64,
    offset: f64,
) -> Vec<TimedNote> {
    MeasureTiming::new(bpm, offset).time_measure(rows, measure_index)
}
