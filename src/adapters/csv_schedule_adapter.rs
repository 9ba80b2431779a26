//! CSV allocation schedule writer.

use crate::domain::error::WeekrotError;
use crate::domain::schedule::AllocationSchedule;
use crate::ports::schedule_port::SchedulePort;
use std::path::PathBuf;

/// Writes `date,<SYMBOL>,<BENCHMARK>` rows, one per calendar day.
pub struct CsvScheduleWriter {
    path: PathBuf,
}

impl CsvScheduleWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SchedulePort for CsvScheduleWriter {
    fn write_schedule(&self, schedule: &AllocationSchedule) -> Result<(), WeekrotError> {
        let mut wtr = csv::Writer::from_path(&self.path).map_err(|e| WeekrotError::Data {
            reason: format!("failed to open {}: {}", self.path.display(), e),
        })?;

        let mut header = vec!["date".to_string()];
        header.extend(schedule.assets().iter().cloned());
        wtr.write_record(&header).map_err(|e| WeekrotError::Data {
            reason: format!("failed to write header: {e}"),
        })?;

        for (i, date) in schedule.dates().iter().enumerate() {
            let mut record = vec![date.format("%Y-%m-%d").to_string()];
            record.extend(schedule.row(i).iter().map(|w| format!("{:.1}", w)));
            wtr.write_record(&record).map_err(|e| WeekrotError::Data {
                reason: format!("failed to write row for {date}: {e}"),
            })?;
        }

        wtr.flush().map_err(|e| WeekrotError::Data {
            reason: format!("failed to flush {}: {}", self.path.display(), e),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schedule.csv");

        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
        ];
        let mut schedule =
            AllocationSchedule::zeroed(dates, vec!["TQQQ".to_string(), "SPY".to_string()]);
        schedule.set_weight(1, 0, 1.0);

        CsvScheduleWriter::new(path.clone())
            .write_schedule(&schedule)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "date,TQQQ,SPY");
        assert_eq!(lines[1], "2024-01-15,0.0,0.0");
        assert_eq!(lines[2], "2024-01-16,1.0,0.0");
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let writer = CsvScheduleWriter::new(PathBuf::from("/nonexistent/dir/schedule.csv"));
        let schedule = AllocationSchedule::zeroed(vec![], vec!["TQQQ".to_string()]);
        let err = writer.write_schedule(&schedule).unwrap_err();
        assert!(matches!(err, WeekrotError::Data { .. }));
    }
}
