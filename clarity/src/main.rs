use clap::ArgMatches;
use clarity_core::caption::{BlipCaptionClient, CaptionGenerator, VisionConfig};
use clarity_core::llm::{ChatCompletionsClient, LlmConfig};
use clarity_core::model::ReportEnvelope;
use clarity_core::pipeline::{AuditPipeline, CaptionPipeline};
use clarity_core::print_banner;
use clarity_core::report::{
    ReportGenerator, render_json_report, render_remediation_json, render_remediation_text,
    render_text_report, save_report,
};
use clarity_scanner::PageFetcher;
use colored::Colorize;
use commands::command_argument_builder;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use url::Url;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("audit", primary_command)) => handle_audit(primary_command).await,
        Some(("remediate", primary_command)) => handle_remediate(primary_command).await,
        None => {}
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

async fn handle_audit(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let url = sub_matches.get_one::<Url>("url").unwrap();
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap();
    let format = sub_matches.get_one::<String>("format").unwrap();
    let output = sub_matches.get_one::<String>("output");

    // Credentials are resolved here, at the edge, and handed down as an
    // explicit configuration object.
    let Ok(api_key) = std::env::var("GROQ_API_KEY") else {
        eprintln!("{} GROQ_API_KEY is not set", "✗".red());
        std::process::exit(1);
    };
    let mut config = LlmConfig::new(api_key);
    if let Some(model) = sub_matches.get_one::<String>("model") {
        config = config.with_model(model);
    }

    let spinner = working_spinner(format!("Auditing {}", url));

    let pipeline = AuditPipeline::new(
        PageFetcher::with_timeout(timeout),
        ReportGenerator::new(ChatCompletionsClient::new(config)),
    );

    match pipeline.run(url.as_str()).await {
        Ok(state) => {
            spinner.finish_and_clear();
            let envelope = state.report.expect("audit pipeline always writes a report");

            let rendered = if format == "json" {
                render_json_report(&envelope).expect("report serialization cannot fail")
            } else {
                match &envelope {
                    ReportEnvelope::Ready(report) => render_text_report(report),
                    ReportEnvelope::Degraded(degraded) => format!(
                        "{} Model output violated the report contract: {}\n\nRaw model output:\n{}\n",
                        "⚠".yellow(),
                        degraded.error,
                        degraded.report
                    ),
                }
            };

            deliver(&rendered, output);
        }
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} Audit failed: {}", "✗".red(), e);
            std::process::exit(1);
        }
    }
}

async fn handle_remediate(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let url = sub_matches.get_one::<Url>("url").unwrap();
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap();
    let format = sub_matches.get_one::<String>("format").unwrap();
    let output = sub_matches.get_one::<String>("output");

    let Ok(api_key) = std::env::var("HF_API_TOKEN") else {
        eprintln!("{} HF_API_TOKEN is not set", "✗".red());
        std::process::exit(1);
    };
    let mut config = VisionConfig::new(api_key);
    if let Some(model) = sub_matches.get_one::<String>("model") {
        config = config.with_model(model);
    }

    let spinner = working_spinner(format!("Remediating {}", url));

    let pipeline = CaptionPipeline::new(
        PageFetcher::with_timeout(timeout),
        CaptionGenerator::new(BlipCaptionClient::new(config)),
    );

    match pipeline.run(url.as_str()).await {
        Ok(remediation) => {
            spinner.finish_and_clear();

            let rendered = if format == "json" {
                render_remediation_json(&remediation)
                    .expect("remediation serialization cannot fail")
            } else {
                render_remediation_text(&remediation)
            };

            deliver(&rendered, output);
        }
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} Remediation failed: {}", "✗".red(), e);
            std::process::exit(1);
        }
    }
}

fn working_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    spinner
}

fn deliver(content: &str, output: Option<&String>) {
    match output {
        Some(raw_path) => {
            let expanded = shellexpand::tilde(raw_path);
            let path = Path::new(expanded.as_ref());
            if let Err(e) = save_report(content, path) {
                eprintln!(
                    "{} Could not write report to {}: {}",
                    "✗".red(),
                    path.display(),
                    e
                );
                std::process::exit(1);
            }
            println!("{} Report saved to {}", "✓".green(), path.display());
        }
        None => print!("{}", content),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
