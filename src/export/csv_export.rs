//! CSV time-series export for compute responses.
//!
//! One row per grid point: minute, day and clock time, every signal, every
//! auxiliary pool, then one column per recorded compartment.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveTime};

use crate::baseline::{minute_of_day, MINUTES_PER_DAY};
use crate::compute::ComputeResponse;
use crate::config::ExportConfig;

/// `HH:MM` of a simulation minute
pub fn clock_label(minute: f64) -> String {
    let seconds = (minute_of_day(minute) * 60.0).round() as u32 % 86_400;
    match NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0) {
        Some(t) => t.format("%H:%M").to_string(),
        None => String::from("--:--"),
    }
}

/// CSV exporter for response time series
pub struct CsvExporter {
    directory: PathBuf,
}

impl CsvExporter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            directory: config.directory.clone(),
        }
    }

    /// Write `response` to a timestamped file in the export directory
    ///
    /// Creates the directory if it doesn't exist. Returns the file path.
    pub fn export(&self, response: &ComputeResponse) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.directory)?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self.directory.join(format!("timeseries_{}.csv", timestamp));
        let file = File::create(&path)?;
        Self::write_to(response, file)?;
        log::info!("CSV export completed: {}", path.display());
        Ok(path)
    }

    /// Write `response` as CSV to any writer
    pub fn write_to<W: Write>(response: &ComputeResponse, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = vec!["minute".to_string(), "day".to_string(), "clock".to_string()];
        header.extend(response.series.keys().map(|s| s.key().to_string()));
        header.extend(response.auxiliary_series.keys().map(|p| p.key().to_string()));
        for c in &response.compartment_series {
            header.push(format!("{}:{:?}", c.instance, c.compartment).to_lowercase());
        }
        writer.write_record(&header)?;

        for (i, &minute) in response.minutes.iter().enumerate() {
            let mut row = Vec::with_capacity(header.len());
            row.push(format!("{}", minute));
            row.push(format!("{}", (minute / MINUTES_PER_DAY).floor() as i64));
            row.push(clock_label(minute));
            let columns = response
                .series
                .values()
                .chain(response.auxiliary_series.values())
                .chain(response.compartment_series.iter().map(|c| &c.values));
            for values in columns {
                row.push(values.get(i).map_or_else(String::new, |v| format!("{:.6}", v)));
            }
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::Signal;

    #[test]
    fn test_clock_label() {
        assert_eq!(clock_label(0.0), "00:00");
        assert_eq!(clock_label(450.0), "07:30");
        assert_eq!(clock_label(1440.0 + 1380.0), "23:00");
    }

    #[test]
    fn test_rows_follow_grid() {
        let mut response = ComputeResponse {
            minutes: vec![0.0, 720.0],
            ..Default::default()
        };
        response.series.insert(Signal::Cortisol, vec![5.0, 8.0]);
        let mut out = Vec::new();
        CsvExporter::write_to(&response, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "minute,day,clock,cortisol");
        assert!(lines[2].starts_with("720,0,12:00,8.0"));
    }
}
