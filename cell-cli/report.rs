use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use cell_core::FeatureRecord;

use crate::error::{AnalysisError, AnalysisResult};

pub const CSV_HEADER: &str = "Cell_ID,Area,Perimeter,Circularity";

/// Per-cell measurements in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    records: Vec<FeatureRecord>,
}

impl ReportTable {
    pub fn new(records: Vec<FeatureRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn write_csv<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "{CSV_HEADER}")?;
        for r in &self.records {
            writeln!(w, "{},{},{},{}", r.cell_id, r.area, r.perimeter, r.circularity)?;
        }
        w.flush()
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> AnalysisResult<()> {
        let path = path.as_ref();
        let wrap = |source| AnalysisError::WriteReport {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(wrap)?;
        self.write_csv(BufWriter::new(file)).map_err(wrap)
    }

    /// Summary statistics for every numeric column.
    pub fn describe(&self) -> Describe {
        Describe {
            columns: vec![
                self.column("Cell_ID", |r| f64::from(r.cell_id)),
                self.column("Area", |r| r.area),
                self.column("Perimeter", |r| r.perimeter),
                self.column("Circularity", |r| r.circularity),
            ],
        }
    }

    fn column(&self, name: &'static str, value: fn(&FeatureRecord) -> f64) -> ColumnStats {
        let values: Vec<f64> = self.records.iter().map(value).collect();
        ColumnStats::from_values(name, &values)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: &'static str,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    pub fn from_values(name: &'static str, values: &[f64]) -> Self {
        let count = values.len();
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = if count == 0 {
            f64::NAN
        } else {
            sorted.iter().sum::<f64>() / count as f64
        };
        // Sample standard deviation; undefined below two observations
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        };

        Self {
            name,
            count,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.50),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Linear interpolation between the closest ranks of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Column statistics laid out as a text table with one row per statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub columns: Vec<ColumnStats>,
}

impl Describe {
    pub fn column(&self, name: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for Describe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WIDTH: usize = 13;
        write!(f, "{:<6}", "")?;
        for c in &self.columns {
            write!(f, "{:>width$}", c.name, width = WIDTH)?;
        }
        let rows: [(&str, fn(&ColumnStats) -> f64); 8] = [
            ("count", |c| c.count as f64),
            ("mean", |c| c.mean),
            ("std", |c| c.std),
            ("min", |c| c.min),
            ("25%", |c| c.q25),
            ("50%", |c| c.q50),
            ("75%", |c| c.q75),
            ("max", |c| c.max),
        ];
        for (label, get) in rows {
            write!(f, "\n{label:<6}")?;
            for c in &self.columns {
                write!(f, "{:>width$.6}", get(c), width = WIDTH)?;
            }
        }
        Ok(())
    }
}
