//! Command-line interface for training the default-risk model and scoring
//! applications.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::pipeline;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}
fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}
fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "credit-scorer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Loan default probability scoring from applicant and credit-history data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a model from application_train.csv, bureau.csv and
    /// previous_application.csv
    Train {
        /// Directory holding the raw CSV tables
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Output model file
        #[arg(short, long, default_value = "model.json")]
        model: PathBuf,

        /// Random seed for the train/validation split and training
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Score application_test.csv with a trained model
    Predict {
        /// Directory holding the raw CSV tables
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Trained model file
        #[arg(short, long, default_value = "model.json")]
        model: PathBuf,

        /// Output predictions file
        #[arg(short, long, default_value = "submission.csv")]
        out: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(data_dir: &PathBuf, model_path: &PathBuf, seed: u64) -> anyhow::Result<()> {
    section("Train");

    step_run("Training model");
    let start = Instant::now();
    let model = pipeline::train_and_save(data_dir, model_path, seed)?;
    step_done(&format!(
        "{} trees, validation score {:.6} in {:?}",
        model.best_iteration(),
        model.best_score(),
        start.elapsed()
    ));

    println!("  {} model saved to {}", ok("✓"), model_path.display());
    Ok(())
}

pub fn cmd_predict(
    data_dir: &PathBuf,
    model_path: &PathBuf,
    out_path: &PathBuf,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Scoring applications");
    let start = Instant::now();
    let predictions = pipeline::predict_and_save(data_dir, model_path, out_path)?;
    step_done(&format!(
        "{} rows in {:?}",
        predictions.height(),
        start.elapsed()
    ));

    println!("  {} predictions written to {}", ok("✓"), out_path.display());
    Ok(())
}
