use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::shared::constants::HISTORY_CAPACITY;

pub const CSV_HEADER: &str = "time,count,labels";

/// One rendered batch, as kept for export.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRecord {
    pub time: DateTime<Utc>,
    pub count: usize,
    pub labels: Vec<String>,
}

impl HistoryRecord {
    pub fn new(time: DateTime<Utc>, labels: Vec<String>) -> Self {
        Self {
            time,
            count: labels.len(),
            labels,
        }
    }

    fn csv_row(&self) -> String {
        let labels = self.labels.join(", ").replace('"', "\"\"");
        format!(
            "{},{},\"{labels}\"",
            self.time.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.count
        )
    }
}

/// Client-side record of every rendered batch in this session.
#[derive(Clone, Debug)]
pub struct DetectionHistory {
    capacity: usize,
    records: VecDeque<HistoryRecord>,
}

impl DetectionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::new(),
        }
    }

    pub fn push(&mut self, record: HistoryRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        for record in &self.records {
            out.push_str(&record.csv_row());
            out.push('\n');
        }
        out
    }

    pub fn write_csv(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        file.write_all(self.to_csv().as_bytes())?;
        Ok(())
    }
}

impl Default for DetectionHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
