//! Shared fixtures for unit tests

use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Scratch directory under the system temp dir, removed on drop
pub struct TempDataDir {
    path: PathBuf,
}

impl TempDataDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("moonlander-{}", Uuid::new_v4()));
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, name: &str, contents: &str) {
        fs::write(self.path.join(name), contents).unwrap();
    }

    /// Write a trial file from (active_task, has_input) rows
    pub fn write_trial(&self, name: &str, rows: &[(bool, bool)]) {
        self.write(name, &trial_csv(rows));
    }
}

impl Drop for TempDataDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Render (active_task, has_input) rows as trial CSV text
pub fn trial_csv(rows: &[(bool, bool)]) -> String {
    let mut csv = String::from("timestamp,active_task,current_input\n");
    for (i, (active, input)) in rows.iter().enumerate() {
        let active = if *active { "True" } else { "False" };
        let input = if *input { "thrust" } else { "" };
        csv.push_str(&format!("{i},{active},{input}\n"));
    }
    csv
}

/// Rows with the requested number of inputs and active→inactive switches
///
/// The trial starts active; each switch is one inactive row followed by one
/// active row, and inputs are placed on leading active rows.
pub fn rows_with_counts(actions: usize, switches: usize) -> Vec<(bool, bool)> {
    let mut rows = vec![(true, false); actions.max(1)];
    for row in rows.iter_mut().take(actions) {
        row.1 = true;
    }
    for _ in 0..switches {
        rows.push((false, false));
        rows.push((true, false));
    }
    rows
}
