use crate::error::SessionError;
use antr_core::{ConfigurationError, ResultRecord};
use serde_json::Value;
use std::io::Write;

/// Where finished records go. Records arrive in execution order, one call per
/// trial, as soon as the trial completes.
pub trait ResultSink {
    fn append(&mut self, record: &ResultRecord) -> Result<(), SessionError>;

    fn finish(&mut self) -> Result<(), SessionError> {
        Ok(())
    }
}

impl ResultSink for Vec<ResultRecord> {
    fn append(&mut self, record: &ResultRecord) -> Result<(), SessionError> {
        self.push(record.clone());
        Ok(())
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn append(&mut self, record: &ResultRecord) -> Result<(), SessionError> {
        (**self).append(record)
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        (**self).finish()
    }
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn append(&mut self, record: &ResultRecord) -> Result<(), SessionError> {
        (**self).append(record)
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        (**self).finish()
    }
}

/// One JSON object per line.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn append(&mut self, record: &ResultRecord) -> Result<(), SessionError> {
        serde_json::to_writer(&mut self.out, &record.to_row()?)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Delimited text with a header row taken from the first record. Later
/// records are written column by column under that header.
pub struct DelimitedSink<W: Write> {
    out: W,
    delimiter: char,
    header: Vec<String>,
}

impl<W: Write> DelimitedSink<W> {
    pub fn tab_separated(out: W) -> Self {
        Self {
            out,
            delimiter: '\t',
            header: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn cell(&self, value: &Value) -> String {
        let text = match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        text.replace([self.delimiter, '\n', '\r'], " ")
    }
}

impl<W: Write> ResultSink for DelimitedSink<W> {
    fn append(&mut self, record: &ResultRecord) -> Result<(), SessionError> {
        let row = record.to_row()?;
        let sep = self.delimiter.to_string();
        if self.header.is_empty() {
            self.header = row.keys().cloned().collect();
            writeln!(self.out, "{}", self.header.join(&sep))?;
        } else if row.keys().any(|k| !self.header.contains(k)) {
            return Err(ConfigurationError::ColumnMismatch {
                expected: self.header.clone(),
                found: row.keys().cloned().collect(),
            }
            .into());
        }
        let cells: Vec<String> = self
            .header
            .iter()
            .map(|column| row.get(column).map(|v| self.cell(v)).unwrap_or_default())
            .collect();
        writeln!(self.out, "{}", cells.join(&sep))?;
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        self.out.flush()?;
        Ok(())
    }
}
