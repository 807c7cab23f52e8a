use std::env;
use std::fs;
use std::path::Path;

use crate::data::allocation::AllocationTable;
use crate::data::registry::{DataRegistry, DATA_DIR_ENV};
use crate::data::scoring_key::ScoringKey;
use crate::data::validate::{
    validate_allocation_rows, validate_data_dir, validate_scoring_key_rows, ValidationReport,
};
use crate::scoring::{assess, Answer};
use crate::server;
use crate::server::api::{questions_response, AssessResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Assess,
    Validate,
    Questions,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("assess") => Some(Command::Assess),
        Some("validate") => Some(Command::Validate),
        Some("questions") => Some(Command::Questions),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Assess) => handle_assess(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Questions) => handle_questions(),
        None => {
            eprintln!("usage: lytton <serve|assess|validate|questions>");
            2
        }
    }
}

fn handle_serve() -> i32 {
    let bind_addr = env::var("LYTTON_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    match server::run_server(&bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_assess(args: &[String]) -> i32 {
    let Some(path) = args.get(2).filter(|arg| arg.as_str() != "--table") else {
        eprintln!("usage: lytton assess <answers.json> [--table]");
        return 2;
    };
    let as_table = args.iter().any(|arg| arg == "--table");

    let registry = match DataRegistry::from_env() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("table load error: {err}");
            return 1;
        }
    };

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("unable to read '{path}': {err}");
            return 1;
        }
    };
    let answers: Vec<Answer> = match serde_json::from_str(&raw) {
        Ok(answers) => answers,
        Err(err) => {
            eprintln!("unable to parse json '{path}': {err}");
            return 1;
        }
    };

    let assessment = match assess(&answers, &registry) {
        Ok(assessment) => assessment,
        Err(err) => {
            eprintln!("assessment failed: {err}");
            return 1;
        }
    };

    if as_table {
        println!("raw_score\trisk_tier\tprofile\tmoney_market\tobligation\tstocks");
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            assessment.raw_score,
            assessment.tier,
            assessment.allocation.profile,
            assessment.allocation.money_market,
            assessment.allocation.obligation,
            assessment.allocation.stocks
        );
        return 0;
    }

    match serde_json::to_string_pretty(&AssessResponse::from_assessment(&assessment)) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize assessment: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let override_dir = args
        .get(2)
        .map(String::to_owned)
        .or_else(|| env::var(DATA_DIR_ENV).ok());

    let (report, label) = match override_dir {
        Some(dir) => match validate_data_dir(Path::new(&dir)) {
            Ok(report) => (report, dir),
            Err(err) => {
                eprintln!("validation failed: {err}");
                return 1;
            }
        },
        None => {
            let mut report = validate_scoring_key_rows(&ScoringKey::builtin().to_rows());
            report.merge(validate_allocation_rows(&AllocationTable::builtin().to_rows()));
            (report, "builtin tables".to_string())
        }
    };

    print_report(&report);
    if report.has_errors() {
        eprintln!("validation failed: {} issue(s)", report.diagnostics.len());
        1
    } else {
        println!("validation passed: {label}");
        0
    }
}

fn print_report(report: &ValidationReport) {
    for diagnostic in &report.diagnostics {
        eprintln!("- {diagnostic}");
    }
}

fn handle_questions() -> i32 {
    let registry = match DataRegistry::from_env() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("table load error: {err}");
            return 1;
        }
    };

    match serde_json::to_string_pretty(&questions_response(registry.scoring_key())) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize questions: {err}");
            1
        }
    }
}
