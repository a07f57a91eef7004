use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("clarity")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("clarity")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("audit")
                .about(
                    "Audit a page for WCAG 2.1 accessibility issues and produce a scored \
                report.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The page URL to audit")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-m --"model" <NAME>)
                        .required(false)
                        .help("Chat model identifier (default: llama-3.3-70b-versatile)"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Page fetch timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)"),
                ),
        )
        .subcommand(
            command!("remediate")
                .about(
                    "Find images with no usable alt text and generate descriptive \
                captions for them.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The page URL to remediate")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-m --"model" <NAME>)
                        .required(false)
                        .help("Vision model identifier (default: Salesforce/blip-image-captioning-base)"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Page fetch timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save results to file (default: display to screen)"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definition_is_consistent() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn test_audit_requires_a_parseable_url() {
        let cmd = command_argument_builder();
        let result = cmd.try_get_matches_from(["clarity", "audit", "-u", "not a url"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_audit_defaults() {
        let cmd = command_argument_builder();
        let matches = cmd
            .try_get_matches_from(["clarity", "audit", "-u", "https://example.com"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();

        assert_eq!(sub.get_one::<u64>("timeout"), Some(&10));
        assert_eq!(sub.get_one::<String>("format").map(String::as_str), Some("text"));
    }
}
