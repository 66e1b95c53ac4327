use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};

use sudograde::bank::{self, BankEntry, DifficultyLabel, GradedRecord};
use sudograde::logger::DevLogger;
use sudograde::{grade_puzzle, Graded, Grid};

#[derive(Parser, Debug)]
#[command(name = "sudograde", version, about = "Grade Sudoku puzzles by human-solving difficulty")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grade a single puzzle from an argument, a file, or stdin
    Grade {
        /// 81-char puzzle string (0 or . for blanks); omit to read a file or stdin
        puzzle: Option<String>,

        /// Path to a puzzle file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print the placement steps the battery took
        #[arg(long)]
        explain: bool,

        /// Write per-step devlog files into this directory
        #[arg(long)]
        logs: Option<PathBuf>,

        /// Maximum devlogs to write (0 = unlimited)
        #[arg(long, default_value_t = 0)]
        max_logs: usize,

        /// Colored console output
        #[arg(long)]
        color: bool,
    },
    /// Grade bank files and partition them into per-label JSON
    Batch {
        /// Bank files: one 81-char puzzle per line, or `<id> <puzzle> <rating>`
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Output directory for the per-label JSON files
        #[arg(short, long)]
        output: PathBuf,

        /// Worker threads (defaults to all cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Compare internal grades against a rated bank file
    Verify {
        /// Bank file with `<id> <puzzle> <rating>` lines
        #[arg(short, long)]
        input: PathBuf,

        /// Number of leading entries to grade
        #[arg(long, default_value_t = 100)]
        sample: usize,
    },
}

fn read_puzzle(arg: Option<String>, input: &Option<PathBuf>) -> Result<String> {
    let s = match (arg, input) {
        (Some(p), _) => p,
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => {
            use std::io::Read;
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let filtered: String = s.chars().filter(|ch| matches!(ch, '0'..='9' | '.')).collect();
    if filtered.len() < 81 {
        bail!("expected at least 81 digits/dots in input (have {})", filtered.len())
    }
    Ok(filtered.chars().take(81).collect())
}

fn cmd_grade(
    puzzle: Option<String>,
    input: Option<PathBuf>,
    explain: bool,
    logs: Option<PathBuf>,
    max_logs: usize,
    color: bool,
) -> Result<()> {
    let compact = read_puzzle(puzzle, &input)?;
    let grid = Grid::from_compact(&compact).context("parse puzzle")?;
    let graded = grade_puzzle(&grid);

    if let Some(dir) = logs {
        let mut logger = DevLogger::new(dir, color, max_logs)?;
        for step in &graded.steps {
            logger.log(
                step.technique.name(),
                &format!("Placed {} at r{},c{}", step.value, step.row + 1, step.col + 1),
            )?;
        }
    }

    if explain {
        for (n, step) in graded.steps.iter().enumerate() {
            let line = format!(
                "{:>3}. {} places {} at r{},c{}",
                n + 1,
                step.technique,
                step.value,
                step.row + 1,
                step.col + 1
            );
            if color {
                println!("{}", line.cyan());
            } else {
                println!("{line}");
            }
        }
    }

    if !graded.is_solvable {
        println!("unsolvable");
        return Ok(());
    }

    let label = DifficultyLabel::from_score(graded.difficulty);
    println!("difficulty: {:.2} ({label})", graded.difficulty);
    let names: Vec<&str> = graded.techniques_used.iter().map(|t| t.name()).collect();
    println!("techniques: {}", if names.is_empty() { "none".to_string() } else { names.join(", ") });
    if let Some(solution) = &graded.solution {
        println!("\n{}", solution.to_pretty_string());
    }
    Ok(())
}

fn cmd_batch(inputs: Vec<PathBuf>, output: PathBuf, jobs: Option<usize>) -> Result<()> {
    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("configuring worker pool")?;
    }

    let mut entries: Vec<BankEntry> = Vec::new();
    for path in &inputs {
        let batch = bank::read_bank(path)?;
        println!("Loaded {} puzzles from {}", batch.len(), path.display());
        entries.extend(batch);
    }
    println!("Grading {} puzzles...", entries.len());

    // each grading call is independent; only the collection point is shared
    let graded: Vec<(BankEntry, Graded)> = entries
        .into_par_iter()
        .filter_map(|e| {
            let grid = Grid::from_compact(&e.puzzle).ok()?;
            let g = grade_puzzle(&grid);
            Some((e, g))
        })
        .collect();

    let mut buckets: BTreeMap<DifficultyLabel, BTreeMap<String, GradedRecord>> = BTreeMap::new();
    let mut unsolvables: BTreeMap<String, GradedRecord> = BTreeMap::new();
    for (entry, result) in &graded {
        let record = GradedRecord::new(entry, result);
        if result.is_solvable {
            let label = DifficultyLabel::from_score(result.difficulty);
            buckets.entry(label).or_default().insert(bank::puzzle_id(entry), record);
        } else {
            unsolvables.insert(bank::puzzle_id(entry), record);
        }
    }

    fs::create_dir_all(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    for label in DifficultyLabel::ALL {
        let records = buckets.remove(&label).unwrap_or_default();
        let path = output.join(format!("{label}.json"));
        fs::write(&path, serde_json::to_string_pretty(&records)?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("{label}: {} puzzles", records.len());
    }
    let path = output.join("unsolvables.json");
    fs::write(&path, serde_json::to_string_pretty(&unsolvables)?)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("unsolvable: {} puzzles", unsolvables.len());
    Ok(())
}

fn cmd_verify(input: PathBuf, sample: usize) -> Result<()> {
    let entries = bank::read_bank(&input)?;
    let rated: Vec<BankEntry> = entries
        .into_iter()
        .filter(|e| e.rating.is_some())
        .take(sample)
        .collect();
    if rated.is_empty() {
        bail!("no rated `<id> <puzzle> <rating>` lines in {}", input.display())
    }

    let results: Vec<(BankEntry, Graded)> = rated
        .into_par_iter()
        .filter_map(|e| {
            let grid = Grid::from_compact(&e.puzzle).ok()?;
            let g = grade_puzzle(&grid);
            Some((e, g))
        })
        .collect();

    let n = results.len();
    let solvable = results.iter().filter(|(_, g)| g.is_solvable).count();
    let bank_sum: f64 = results.iter().filter_map(|(e, _)| e.rating).sum();
    let internal_sum: f64 = results.iter().map(|(_, g)| g.difficulty).sum();
    let mut tech_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for (_, g) in &results {
        for t in &g.techniques_used {
            *tech_counts.entry(t.name()).or_default() += 1;
        }
    }

    println!("Results for {}:", input.display());
    println!("  Sample size: {n}");
    println!("  Solvable: {solvable}/{n}");
    println!("  Avg bank rating: {:.2}", bank_sum / n as f64);
    println!("  Avg internal rating: {:.2}", internal_sum / n as f64);
    if bank_sum > 0.0 {
        println!("  Correlation: {:.2}x", internal_sum / bank_sum);
    }
    let mut top: Vec<(&str, usize)> = tech_counts.into_iter().collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    println!("  Top techniques:");
    for (name, count) in top.into_iter().take(5) {
        println!("    - {name}: {count}");
    }
    Ok(())
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Grade { puzzle, input, explain, logs, max_logs, color } => {
            cmd_grade(puzzle, input, explain, logs, max_logs, color)
        }
        Command::Batch { input, output, jobs } => cmd_batch(input, output, jobs),
        Command::Verify { input, sample } => cmd_verify(input, sample),
    }
}
