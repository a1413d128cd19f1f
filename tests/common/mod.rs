#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tempfile::{TempDir, tempdir};

use choromap::engine::{QueryEngine, Row};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Scripted stand-in for the query engine: records every call and replays
/// canned responses in order.
pub struct MockEngine {
    pub queries: Vec<String>,
    pub registered: Vec<(String, Vec<u8>)>,
    pub closed: bool,
    responses: VecDeque<Result<Vec<Row>, String>>,
    reject_registration: bool,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            queries: Vec::new(),
            registered: Vec::new(),
            closed: false,
            responses: VecDeque::new(),
            reject_registration: false,
        }
    }

    /// Queues a successful response for the next executed query.
    pub fn respond_with(&mut self, rows: Vec<Row>) -> &mut Self {
        self.responses.push_back(Ok(rows));
        self
    }

    /// Queues a failure for the next executed query.
    pub fn fail_with(&mut self, message: &str) -> &mut Self {
        self.responses.push_back(Err(message.to_string()));
        self
    }

    /// Makes every registration attempt fail.
    pub fn reject_registrations(&mut self) -> &mut Self {
        self.reject_registration = true;
        self
    }
}

impl QueryEngine for MockEngine {
    fn execute_query(&mut self, query: &str) -> Result<Vec<Row>> {
        self.queries.push(query.to_string());
        match self.responses.pop_front() {
            Some(Ok(rows)) => Ok(rows),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(Vec::new()),
        }
    }

    fn register_dataset(&mut self, handle: &str, bytes: &[u8]) -> Result<()> {
        if self.reject_registration {
            return Err(anyhow!("registration rejected"));
        }
        self.registered.push((handle.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn close_connection(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Builds one engine row from `(column, value)` pairs.
pub fn row(cells: &[(&str, serde_json::Value)]) -> Row {
    cells
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}
