//! # memorybook CLI
//!
//! Command-line interface for the memorybook library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use memorybook::cli::Args;
use memorybook::format::{OutputFormat, write_to_format};
use memorybook::ingest::{Ingestion, ingest};
use memorybook::output::write_stats_json;
use memorybook::{MemoryBookError, ProcessorConfig};

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), MemoryBookError> {
    let total_start = Instant::now();
    let args = <Args as ClapParser>::parse();

    init_tracing(&args);

    let config = args.to_config()?;
    let output_path = args.output_path();
    let lib_format: OutputFormat = args.format.into();

    // Print header
    println!("📖 memorybook v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", args.data_path.display());
    println!("💾 Output:  {}", output_path.display());
    println!("📄 Format:  {}", lib_format);
    if config.group_chat {
        println!("👥 Mode:    Group chat");
    } else {
        println!("👤 Target:  {}", config.target_user);
    }
    if !config.my_name.is_empty() {
        println!("🙋 Me:      {}", config.my_name);
    }
    println!();

    println!("⏳ Ingesting conversation files...");
    let ingest_start = Instant::now();
    let result = ingest(&args.data_path, &config)?;
    println!(
        "   Found {} messages ({:.2}s)",
        result.messages.len(),
        ingest_start.elapsed().as_secs_f64()
    );

    println!("💾 Writing {}...", lib_format);
    write_to_format(&result.messages, &output_path, lib_format)?;

    if let Some(stats_path) = &args.stats {
        println!("📊 Writing statistics...");
        write_stats_json(&result.stats, stats_path)?;
    }

    println!();
    println!("✅ Done! Output saved to {}", output_path.display());

    print_summary(&result, &config);

    println!();
    println!("⚡ Total time: {:.2}s", total_start.elapsed().as_secs_f64());

    Ok(())
}

/// Logs go to stderr; `RUST_LOG` overrides the `-v` default.
fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(result: &Ingestion, config: &ProcessorConfig) {
    let stats = &result.stats;

    println!();
    println!("📊 Summary:");
    println!("   Messages:      {}", stats.total_messages);
    if let Some(group) = &stats.group {
        println!("   Participants:  {}", group.participants_count);
        for (name, count) in group.most_active_participants.iter().take(3) {
            println!("     {}: {}", name, count);
        }
    } else {
        let from_me = result.messages.iter().filter(|m| m.is_from_me).count();
        let from_target = result.messages.iter().filter(|m| m.is_from_target).count();
        println!("   From you:      {}", from_me);
        println!("   From {}: {}", config.target_user, from_target);
    }
    println!(
        "   Emojis:        {} ({} unique)",
        stats.total_emojis, stats.unique_emojis_count
    );
    println!("   Good mornings: {}", stats.good_morning_count);
    if let (Some(first), Some(last)) = (&stats.first_message_date, &stats.last_message_date) {
        println!(
            "   Span:          {} to {} ({} days)",
            first, last, stats.conversation_duration_days
        );
    }
    if let Some(day) = &stats.most_active_day {
        println!(
            "   Busiest day:   {} ({} messages)",
            day, stats.most_active_day_count
        );
    }

    if !result.skipped_files.is_empty() || !result.skipped_records.is_empty() {
        println!();
        println!("⚠️  Skipped:");
        println!("   Files:   {}", result.skipped_files.len());
        println!("   Records: {}", result.skipped_records.len());
    }
}
