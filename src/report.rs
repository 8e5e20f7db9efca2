use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use crate::error::{ErrorCode, ErrorKind, Result, WlmError, WithContext};
use crate::notify::result_line;
use crate::output::Logger;
use crate::ranking::RankedSet;

/// File name of the latest result inside the output directory.
pub const RESULT_OUTPUT_FILENAME: &str = "log.txt";

/// Human-readable outcome of a run: the ranked list, then `key:\t\tvalue` result lines.
#[derive(Debug, Clone)]
pub struct Report {
    pub site_lines: Vec<String>,
    pub comparison_result: String,
    pub comparison_date: DateTime<Local>,
}

impl Report {
    pub fn new(ranked: &RankedSet, comparison_date: DateTime<Local>) -> Self {
        Self {
            site_lines: ranked.iter().map(|m| m.to_string()).collect(),
            comparison_result: result_line(ranked.benchmark_rank(), ranked.len()),
            comparison_date,
        }
    }

    pub fn result_data(&self) -> Vec<(&'static str, String)> {
        vec![
            ("comparison_result", self.comparison_result.clone()),
            ("comparison_date", self.comparison_date.format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
        ]
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.site_lines.clone();
        lines.extend(
            self.result_data()
                .into_iter()
                .map(|(key, value)| format!("{}:\t\t{}", key, value)),
        );
        lines
    }
}

/// Line-oriented writer for the result file. Opening it deletes the previous run's file.
pub struct ResultFile<'a> {
    path: PathBuf,
    logger: &'a Logger,
}

impl<'a> ResultFile<'a> {
    pub fn create(dir: &Path, logger: &'a Logger) -> Result<Self> {
        Self::create_named(dir, RESULT_OUTPUT_FILENAME, logger)
    }

    pub fn create_named(dir: &Path, file_name: &str, logger: &'a Logger) -> Result<Self> {
        fs::create_dir_all(dir)
            .map_err(|e| WlmError::with_source(
                ErrorCode::E103,
                ErrorKind::Io,
                format!("creating output directory {}", dir.display()),
                Box::new(e),
            ))?;

        let path = dir.join(file_name);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == IoErrorKind::NotFound => {}
            Err(e) => {
                return Err(WlmError::from(e).with_context(&format!("removing old result file {}", path.display())));
            }
        }
        Ok(Self { path, logger })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening result file {}", self.path.display()))?;
        writeln!(file, "{}", text)
            .map_err(|e| WlmError::file_write(format!("{}: {}", self.path.display(), e)))?;

        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.logger.result_appended(&name, text);
        Ok(())
    }

    pub fn write_report(&self, report: &Report) -> Result<()> {
        for line in report.lines() {
            self.append(&line)?;
        }
        Ok(())
    }
}
