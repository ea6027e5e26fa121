use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing::info;

use crate::config::Config;
use crate::demo;

#[derive(Parser, Debug)]
#[command(name = "field-wizard", version, about = "Field wizard engine tools")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Walk the bundled demo form with the given answers
    Demo {
        /// Answer for a field, e.g. `--answer age=17` (repeatable)
        #[arg(long = "answer", value_name = "ID=VALUE", value_parser = parse_answer)]
        answers: Vec<(String, String)>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

impl Cli {
    /// Execute the subcommand. `Ok(false)` means the demo form did not
    /// pass; the caller decides the exit status.
    pub async fn run(self, config: &Config) -> Result<bool> {
        match self.cmd {
            Cmd::Demo { answers, json } => {
                info!(answers = answers.len(), "running demo form");
                let report = demo::run(&answers, config.engine.clone()).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print!("{}", report.render());
                }
                Ok(report.passed())
            }
            Cmd::Config => {
                println!("{}", serde_json::to_string_pretty(config)?);
                Ok(true)
            }
        }
    }
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => {
            Ok((id.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected ID=VALUE, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn answers_are_collected_in_order() {
        let cli = Cli::try_parse_from([
            "field-wizard",
            "demo",
            "--answer",
            "name=Ada Lovelace",
            "--answer",
            "age=17",
            "--json",
        ])
        .unwrap();
        match cli.cmd {
            Cmd::Demo { answers, json } => {
                assert!(json);
                assert_eq!(
                    answers,
                    vec![
                        ("name".to_string(), "Ada Lovelace".to_string()),
                        ("age".to_string(), "17".to_string()),
                    ]
                );
            }
            Cmd::Config => panic!("expected demo"),
        }
    }

    #[test]
    fn malformed_answer_is_rejected() {
        assert!(Cli::try_parse_from(["field-wizard", "demo", "--answer", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["field-wizard", "demo", "--answer", "=x"]).is_err());
    }

    #[tokio::test]
    async fn failing_demo_reports_instead_of_exiting() {
        let cli = Cli::try_parse_from([
            "field-wizard",
            "demo",
            "--answer",
            "name=Tom",
            "--answer",
            "age=15",
        ])
        .unwrap();
        assert!(!cli.run(&Config::default()).await.unwrap());

        let cli = Cli::try_parse_from(["field-wizard", "config"]).unwrap();
        assert!(cli.run(&Config::default()).await.unwrap());
    }

    #[test]
    fn empty_value_is_allowed() {
        assert_eq!(parse_answer("name="), Ok(("name".to_string(), String::new())));
    }
}
