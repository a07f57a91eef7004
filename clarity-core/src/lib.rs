pub mod caption;
pub mod error;
pub mod llm;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod report;

pub use caption::{BlipCaptionClient, CaptionGenerator, CaptionModel, VisionConfig};
pub use error::AuditError;
pub use llm::{ChatCompletionsClient, ChatModel, LlmConfig};
pub use model::{CaptionResult, Remediation, Report, ReportEnvelope};
pub use pipeline::{AuditPipeline, CaptionPipeline, PipelineState};
pub use report::ReportGenerator;

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
        _            _ _
    ___| | __ _ _ __(_) |_ _   _
   / __| |/ _` | '__| | __| | | |
  | (__| | (_| | |  | | |_| |_| |
   \___|_|\__,_|_|  |_|\__|\__, |
                           |___/
"#;
    println!("{}", banner.cyan());
    println!(
        "  {} v{} - web accessibility auditor\n",
        "clarity".bold(),
        env!("CARGO_PKG_VERSION")
    );
}
