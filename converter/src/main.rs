use anyhow::Result;
use clap::Parser;
use rhythm_pi_converter::exporter::OutputFormat;
use rhythm_pi_converter::{BatchSummary, Converter, ConverterConfig, read_chart};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "StepMania chart to timed notes converter for Rhythm Pi", long_about = None)]
struct Args {
    /// Input folder with .sm charts and their audio (default: $PARSE_IN or parseIn)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output folder (default: $PARSE_OUT or parseOut)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    format: String,

    /// Audio file extension used to pair charts
    #[arg(long, default_value = "ogg")]
    audio_ext: String,

    /// Do not copy the paired audio to the output folder
    #[arg(long)]
    no_copy_audio: bool,

    /// Convert a single chart and print it instead of processing a folder
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_default_env()
        .filter_level(level.parse()?)
        .init();

    // load .env if present (so env overrides work)
    let _ = dotenvy::dotenv();

    let format = OutputFormat::from_name(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Invalid format: {}", args.format))?;

    if let Some(chart) = &args.chart {
        let record = read_chart(chart)?;
        match format {
            OutputFormat::Text => print!("{}", record.to_text()),
            OutputFormat::Json => println!("{}", record.to_json()?),
        }
        return Ok(());
    }

    let env_config = ConverterConfig::from_env();
    let config = ConverterConfig {
        input_dir: args.input.unwrap_or(env_config.input_dir),
        output_dir: args.output.unwrap_or(env_config.output_dir),
        format,
        audio_extension: args.audio_ext.trim_start_matches('.').to_string(),
        copy_audio: !args.no_copy_audio,
    };

    log::info!(
        "Converting charts from {} to {}",
        config.input_dir.display(),
        config.output_dir.display()
    );

    let converter = Converter::new(config);
    let summary = converter.convert_directory()?;
    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    println!("\n=== Conversion Summary ===");
    println!("{:<10} | {}", "Converted", summary.converted);
    println!("{:<10} | {}", "Failed", summary.failed);
    println!("{:<10} | {}", "No audio", summary.unpaired);
    println!("=== End Summary ===\n");
}
