//! splatseg command-line interface.
//!
//! Inspects segmentation palettes and replays toggle sequences against the
//! in-memory reference engine, printing the engine commands each step emits.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use splatseg_core::{
    EngineCommand, MemoryEngine, PhantomConfig, RecordingEngine, SegmentationPalette,
    SegmentationSelectionController, SplatScene,
};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Core(#[from] splatseg_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid step {0:?}: expected LABEL=on|off, reset, hide-unselected or select-visible")]
    InvalidStep(String),
}

/// Segmentation visibility tools for volumetric splat scenes.
#[derive(Parser)]
#[command(name = "splatseg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the labels, colors and thresholds of a palette
    Palette {
        /// JSON palette file (defaults to the reference palette)
        #[arg(short, long)]
        palette: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay toggle steps and print the engine commands each one emits
    Replay {
        /// Steps: LABEL=on|off, reset, hide-unselected, select-visible
        #[arg(required = true)]
        steps: Vec<Step>,

        /// JSON palette file (defaults to the reference palette)
        #[arg(short, long)]
        palette: Option<PathBuf>,

        /// JSON scene file (defaults to a generated phantom)
        #[arg(short, long)]
        scene: Option<PathBuf>,

        /// Phantom grid resolution when no scene is given
        #[arg(long, default_value = "32")]
        resolution: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the synthetic phantom scene as JSON
    Phantom {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// JSON palette file (defaults to the reference palette)
        #[arg(short, long)]
        palette: Option<PathBuf>,

        /// Grid resolution per axis
        #[arg(long, default_value = "32")]
        resolution: usize,
    },
}

/// One replay step.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Toggle { label: String, active: bool },
    Reset,
    HideUnselected,
    SelectVisible,
}

impl FromStr for Step {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reset" => return Ok(Step::Reset),
            "hide-unselected" => return Ok(Step::HideUnselected),
            "select-visible" => return Ok(Step::SelectVisible),
            _ => {}
        }
        let (label, value) = s
            .rsplit_once('=')
            .ok_or_else(|| CliError::InvalidStep(s.to_string()))?;
        let active = match value.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => true,
            "off" | "false" | "0" => false,
            _ => return Err(CliError::InvalidStep(s.to_string())),
        };
        let label = label.trim();
        if label.is_empty() {
            return Err(CliError::InvalidStep(s.to_string()));
        }
        Ok(Step::Toggle {
            label: label.to_string(),
            active,
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Toggle { label, active } => {
                write!(f, "{}={}", label, if *active { "on" } else { "off" })
            }
            Step::Reset => write!(f, "reset"),
            Step::HideUnselected => write!(f, "hide-unselected"),
            Step::SelectVisible => write!(f, "select-visible"),
        }
    }
}

/// Outcome of one replayed step.
#[derive(Debug, Serialize)]
struct StepReport {
    step: String,
    commands: Vec<EngineCommand>,
    active: Vec<String>,
    visible: usize,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct PaletteRow<'a> {
    label: &'a str,
    color: [u8; 3],
    threshold: f32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Palette { palette, json } => {
            let palette = load_palette(palette.as_deref())?;
            print_palette(&palette, json)
        }
        Commands::Replay {
            steps,
            palette,
            scene,
            resolution,
            json,
        } => {
            let palette = load_palette(palette.as_deref())?;
            let scene = match scene {
                Some(path) => SplatScene::load_json(&path)?,
                None => SplatScene::phantom(
                    &palette,
                    &PhantomConfig::new().with_resolution(resolution),
                ),
            };
            let reports = replay(palette, scene, &steps);
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for (i, report) in reports.iter().enumerate() {
                    print_report(i + 1, report);
                }
            }
            Ok(())
        }
        Commands::Phantom {
            output,
            palette,
            resolution,
        } => {
            let palette = load_palette(palette.as_deref())?;
            let scene =
                SplatScene::phantom(&palette, &PhantomConfig::new().with_resolution(resolution));
            scene.save_json(&output)?;
            println!("Wrote {} points to {}", scene.len(), output.display());
            Ok(())
        }
    }
}

fn load_palette(path: Option<&Path>) -> Result<SegmentationPalette> {
    match path {
        Some(path) => Ok(SegmentationPalette::load_json(path)?),
        None => Ok(SegmentationPalette::reference()),
    }
}

fn print_palette(palette: &SegmentationPalette, json: bool) -> Result<()> {
    if json {
        let rows: Vec<PaletteRow<'_>> = palette
            .iter()
            .map(|e| PaletteRow {
                label: &e.label,
                color: e.color.into(),
                threshold: e.threshold,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let width = palette.labels().map(str::len).max().unwrap_or(0);
    for entry in palette.iter() {
        println!(
            "{:<width$}  {:<13}  {}",
            entry.label,
            entry.color.to_string(),
            entry.threshold,
            width = width
        );
    }
    Ok(())
}

/// Runs `steps` against a recording engine layered over a memory engine.
///
/// Step failures are captured in the report; replay continues with the
/// next step.
fn replay(palette: SegmentationPalette, scene: SplatScene, steps: &[Step]) -> Vec<StepReport> {
    let total = scene.len();
    let engine = RecordingEngine::wrapping(MemoryEngine::with_scene(scene));
    let mut controller = SegmentationSelectionController::new(palette, engine);

    steps
        .iter()
        .map(|step| {
            let outcome = match step {
                Step::Toggle { label, active } => controller.set_active(label, *active),
                Step::Reset => controller.reset(),
                Step::HideUnselected => controller.hide_unselected(),
                Step::SelectVisible => controller.select_visible_only(),
            };
            if let Err(e) = &outcome {
                log::warn!("step {step} failed: {e}");
            }
            StepReport {
                step: step.to_string(),
                commands: controller.engine_mut().take_commands(),
                active: controller
                    .active_labels()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                visible: controller.engine().inner().visible_count(),
                total,
                error: outcome.err().map(|e| e.to_string()),
            }
        })
        .collect()
}

fn print_report(index: usize, report: &StepReport) {
    println!("[{}] {}", index, report.step);
    for command in &report.commands {
        println!("    {}", command);
    }
    if let Some(error) = &report.error {
        println!("    error: {}", error);
    }
    let active = if report.active.is_empty() {
        "(none)".to_string()
    } else {
        report.active.join(", ")
    };
    let percent = if report.total == 0 {
        0.0
    } else {
        100.0 * report.visible as f64 / report.total as f64
    };
    println!("    active:  {}", active);
    println!(
        "    visible: {} / {} ({:.1}%)",
        report.visible, report.total, percent
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        assert_eq!(
            "Skull=on".parse::<Step>().unwrap(),
            Step::Toggle {
                label: "Skull".to_string(),
                active: true
            }
        );
        assert_eq!(
            "Muscle + Skin = OFF".parse::<Step>().unwrap(),
            Step::Toggle {
                label: "Muscle + Skin".to_string(),
                active: false
            }
        );
        assert_eq!("reset".parse::<Step>().unwrap(), Step::Reset);
        assert_eq!(
            "hide-unselected".parse::<Step>().unwrap(),
            Step::HideUnselected
        );
        assert!("Skull".parse::<Step>().is_err());
        assert!("Skull=maybe".parse::<Step>().is_err());
        assert!("=on".parse::<Step>().is_err());
    }

    #[test]
    fn test_replay_reports() {
        let palette = SegmentationPalette::reference();
        let scene = SplatScene::phantom(&palette, &PhantomConfig::new().with_resolution(12));
        let total = scene.len();
        let steps: Vec<Step> = ["Skull=on", "Bogus=on", "Skull=off"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();

        let reports = replay(palette, scene, &steps);
        assert_eq!(reports.len(), 3);

        assert_eq!(reports[0].commands.len(), 5);
        assert_eq!(reports[0].active, ["Skull"]);
        assert!(reports[0].visible < total);

        assert!(reports[1].error.is_some());
        assert!(reports[1].commands.is_empty());

        assert_eq!(reports[2].commands.len(), 2);
        assert_eq!(reports[2].visible, total);
        assert!(reports[2].error.is_none());
    }
}
