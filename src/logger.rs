use anyhow::Result;
use chrono::Local;
use colored::*;
use std::{
    fs::{self, File},
    io::Write,
    path::PathBuf,
};

/// Writes numbered, timestamped step files for the CLI's explain path.
/// The engine itself never logs; it hands back its step record and the
/// CLI decides what to persist.
pub struct DevLogger {
    dir: PathBuf,
    color: bool,
    max_logs: usize,
    counter: usize,
}

impl DevLogger {
    pub fn new(dir: impl Into<PathBuf>, color: bool, max_logs: usize) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, color, max_logs, counter: 0 })
    }

    /// Write one step file; `max_logs == 0` means unlimited.
    pub fn log(&mut self, title: &str, details: &str) -> Result<()> {
        if self.max_logs != 0 && self.counter >= self.max_logs {
            return Ok(());
        }
        self.counter += 1;
        let path = self.dir.join(format!("devlog({}).txt", self.counter));

        let ts = Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut f = File::create(&path)?;
        writeln!(f, "[{}] {}\n\n{}", ts, title, details)?;

        if self.color {
            println!("{} {}\n{}", "➤".blue().bold(), title.bold(), details);
        }
        Ok(())
    }
}
