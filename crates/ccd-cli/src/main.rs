//! ccd-gen - Cognitive Conceptualization Diagrams from therapy transcripts
//!
//! Usage:
//!   ccd-gen [--transcript-file <FILE>] [--out-file <FILE>]
//!
//! Reads `$DATA_PATH/<transcript-file>`, asks Gemini for a CCD, and writes
//! the result to `$OUT_PATH/<out-file>`, retrying up to `$MAX_ATTEMPTS` times.

use anyhow::{Context, Result};
use ccd_agent::{CcdParser, GeminiClient};
use ccd_core::{load_dotenv, GenerationConfig, Transcript};
use ccd_generation::{GenerationDriver, GenerationReport, JsonFileSink};
use chrono::SecondsFormat;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "ccd-gen")]
#[command(version, about = "Generate a Cognitive Conceptualization Diagram from a therapy transcript")]
struct Cli {
    /// Transcript file name, relative to DATA_PATH
    #[arg(long, default_value = "example_transcript.txt")]
    transcript_file: String,

    /// Output file name, relative to OUT_PATH
    #[arg(long, default_value = "example_CCD_from_transcript.json")]
    out_file: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    load_dotenv();
    let config = GenerationConfig::from_env().context("Failed to load configuration")?;
    cmd_generate(&config, &cli.transcript_file, &cli.out_file).await
}

async fn cmd_generate(config: &GenerationConfig, transcript_file: &str, out_file: &str) -> Result<()> {
    let transcript_path = config.transcript_path(transcript_file);
    let output_path = config.output_path(out_file);

    let transcript = Transcript::load(&transcript_path)?;
    info!(
        "Loaded {} lines from {}",
        transcript.len(),
        transcript_path.display()
    );

    let driver = GenerationDriver::new(
        GeminiClient::from_config(config),
        CcdParser::new(),
        JsonFileSink::new(output_path),
        config.max_attempts,
    );

    let report = driver
        .run(&transcript)
        .await
        .with_context(|| format!("Failed to generate CCD from {}", transcript_path.display()))?;

    println!("{}", summary_line(&report));

    Ok(())
}

fn summary_line<D>(report: &GenerationReport<D>) -> String {
    format!(
        "Wrote {} ({} bytes, {} attempt(s)) at {}",
        report.location.display(),
        report.bytes_written,
        report.attempts,
        report.completed_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_names() {
        let cli = Cli::try_parse_from(["ccd-gen"]).unwrap();
        assert_eq!(cli.transcript_file, "example_transcript.txt");
        assert_eq!(cli.out_file, "example_CCD_from_transcript.json");
    }

    #[test]
    fn test_file_name_flags() {
        let cli = Cli::try_parse_from([
            "ccd-gen",
            "--transcript-file",
            "session_04.txt",
            "--out-file",
            "session_04_ccd.json",
        ])
        .unwrap();
        assert_eq!(cli.transcript_file, "session_04.txt");
        assert_eq!(cli.out_file, "session_04_ccd.json");
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["ccd-gen", "--verbose"]).is_err());
    }

    #[test]
    fn test_summary_line() {
        use chrono::TimeZone;

        let report = GenerationReport {
            document: (),
            attempts: 2,
            location: std::path::PathBuf::from("out/ccd.json"),
            bytes_written: 512,
            completed_at: chrono::Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap(),
        };

        assert_eq!(
            summary_line(&report),
            "Wrote out/ccd.json (512 bytes, 2 attempt(s)) at 2025-03-14T09:30:00Z"
        );
    }

    #[tokio::test]
    async fn test_missing_transcript_fails_before_generation() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        let config = GenerationConfig::from_lookup(|key| match key {
            "DATA_PATH" => Some(dir.join("data").display().to_string()),
            "OUT_PATH" => Some(dir.join("out").display().to_string()),
            "GOOGLE_API_KEY" => Some("unused".to_string()),
            "MAX_ATTEMPTS" => Some("1".to_string()),
            "GOOGLE_API_BASE" => Some("http://127.0.0.1:1".to_string()),
            _ => None,
        })
        .unwrap();

        let err = cmd_generate(&config, "missing.txt", "out.json")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
        assert!(!dir.join("out").exists());
    }
}
