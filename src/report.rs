//! Text and CSV views of an [`AggregationResult`] for terminals and files.

use std::io;

use anyhow::{Context, Result};

use crate::aggregate::{AggregateRow, AggregationResult, Metric};
use crate::data::model::FrequencyAxis;

/// Format the peak lists as a text table.
pub fn format_text(result: &AggregationResult, axis: Option<&FrequencyAxis>) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} rows, {} frequency bins\n",
        result.rows.len(),
        result.bin_count()
    ));
    match result.mean_sweep_duration_s {
        Some(secs) => output.push_str(&format!("mean sweep time {secs:.3} s\n")),
        None => output.push_str("no sweeps in range\n"),
    }

    let freq_header = match axis {
        Some(axis) => format!("Freq ({})", axis.unit_label()),
        None => "Freq".to_string(),
    };

    for metric in Metric::ALL {
        output.push('\n');
        output.push_str(&format!("Peaks by {}\n", metric.name()));
        output.push_str(&"═".repeat(44));
        output.push('\n');
        output.push_str(&format!(
            "{:>4}  {:>6}  {:>14}  {:>12}\n",
            "#", "Bin", freq_header, "Level (dB)"
        ));
        output.push_str(&"─".repeat(44));
        output.push('\n');

        let entries = result.aggregates.metric(metric);
        let mut any = false;
        for (rank, bin) in result.peaks.selected(metric).enumerate() {
            any = true;
            let value = entries
                .get(bin)
                .copied()
                .flatten()
                .map(|e| format!("{:.2}", e.value))
                .unwrap_or_else(|| "-".to_string());
            let freq = axis
                .map(|a| format!("{:.3}", a.frequency(bin)))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "{:>4}  {:>6}  {:>14}  {:>12}\n",
                rank + 1,
                bin,
                freq,
                value
            ));
        }
        if !any {
            output.push_str("  No peaks\n");
        }
    }

    output
}

/// Write waterfall rows as CSV: `timestamp,sweep_index,level_0,...`.
pub fn write_rows_csv<W: io::Write>(rows: &[AggregateRow], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    let bins = rows.first().map_or(0, |r| r.levels.len());

    let mut header = vec!["timestamp".to_string(), "sweep_index".to_string()];
    header.extend((0..bins).map(|i| format!("level_{i}")));
    csv.write_record(&header).context("writing CSV header")?;

    for row in rows {
        let mut record = Vec::with_capacity(bins + 2);
        record.push(row.timestamp.to_string());
        record.push(row.sweep_index.to_string());
        record.extend(row.levels.iter().map(|v| v.to_string()));
        csv.write_record(&record)
            .with_context(|| format!("writing row for sweep {}", row.sweep_index))?;
    }
    csv.flush().context("flushing CSV output")?;
    Ok(())
}

/// Serialize the whole result as pretty-printed JSON.
pub fn to_json(result: &AggregationResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("serializing aggregation result")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::config::AggregationConfig;
    use crate::data::model::SweepReading;

    fn sample() -> AggregationResult {
        let sweeps = vec![
            SweepReading::new(0, 1000, 200.0, vec![-70, -30, -60]),
            SweepReading::new(1, 2000, 200.0, vec![-72, -128, -58]),
        ];
        aggregate(&sweeps, &AggregationConfig::new(2, 2)).unwrap()
    }

    #[test]
    fn text_lists_peaks_with_frequencies() {
        let axis = FrequencyAxis {
            start: 100.0,
            stop: 102.0,
            step: 1.0,
            exp: 6,
        };
        let text = format_text(&sample(), Some(&axis));
        assert!(text.contains("Peaks by max"));
        assert!(text.contains("Freq (MHz)"));
        assert!(text.contains("101.000"));
        assert!(text.contains("mean sweep time 0.200 s"));
    }

    #[test]
    fn text_for_empty_result() {
        let text = format_text(&AggregationResult::empty(3), None);
        assert!(text.contains("no sweeps in range"));
        assert!(text.contains("No peaks"));
    }

    #[test]
    fn csv_has_one_line_per_row() {
        let mut out = Vec::new();
        write_rows_csv(&sample().rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,sweep_index,level_0,level_1,level_2");
        assert_eq!(lines[1], "1000,0,-70,-30,-60");
        assert_eq!(lines[2], "2000,1,-72,-128,-58");
    }

    #[test]
    fn json_round_trips() {
        let result = sample();
        let json = to_json(&result).unwrap();
        let back: AggregationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
