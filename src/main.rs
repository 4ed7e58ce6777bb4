//! tavle - Editorial markup codec and round-trip checker

use std::fs;
use std::process::ExitCode;

use clap::Parser;

use tavle::{ConvertContext, check_markup, normalize, read_document, write_document};

#[derive(Parser)]
#[command(name = "tavle")]
#[command(version, about = "Editorial markup codec", long_about = None)]
#[command(after_help = "EXAMPLES:
    tavle draft.html clean.html    Normalize a markup file
    tavle -c draft.html            Check that saving would lose nothing
    tavle -i draft.html            Show document statistics")]
struct Cli {
    /// Input markup file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output markup file
    #[arg(value_name = "OUTPUT", required_unless_present_any = ["check", "info"])]
    output: Option<String>,

    /// Round-trip the input and report whether content would be lost
    #[arg(short, long)]
    check: bool,

    /// Show document statistics without converting
    #[arg(short, long)]
    info: bool,

    /// Document language to stamp on the tree (e.g. "nb", "en")
    #[arg(short, long, value_name = "LANG")]
    language: Option<String>,

    /// Emit JSON instead of plain text (with --check or --info)
    #[arg(long)]
    json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

#[derive(serde::Serialize)]
struct CheckReport<'a> {
    warn: bool,
    annotated: &'a str,
}

#[derive(serde::Serialize)]
struct InfoReport<'a> {
    language: Option<&'a str>,
    sections: usize,
    nodes: usize,
    rounds: usize,
    repairs: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let ctx = match &cli.language {
        Some(lang) => ConvertContext::with_language(lang.clone()),
        None => ConvertContext::new(),
    };

    let run = if cli.check {
        check(&cli, &ctx)
    } else if cli.info {
        show_info(&cli, &ctx)
    } else {
        convert(&cli, &ctx)
    };
    match run {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn convert(cli: &Cli, ctx: &ConvertContext) -> tavle::Result<ExitCode> {
    let markup = fs::read_to_string(&cli.input)?;
    let doc = read_document(&markup, ctx)?;
    let output = cli.output.as_deref().expect("output required");
    fs::write(output, write_document(&doc, ctx))?;
    if !cli.quiet {
        println!("{} -> {output}", cli.input);
    }
    Ok(ExitCode::SUCCESS)
}

/// Exit code 2 flags a lossy round trip, distinct from hard failures.
fn check(cli: &Cli, ctx: &ConvertContext) -> tavle::Result<ExitCode> {
    let markup = fs::read_to_string(&cli.input)?;
    let outcome = check_markup(&markup, ctx)?;
    if cli.json {
        let report = CheckReport {
            warn: outcome.warn,
            annotated: &outcome.annotated,
        };
        let json = serde_json::to_string_pretty(&report).expect("report is serializable");
        println!("{json}");
    } else if outcome.warn {
        if !cli.quiet {
            println!("{}", outcome.annotated);
        }
        eprintln!("warning: saving {} would lose content", cli.input);
    } else if !cli.quiet {
        println!("{}: round trip is clean", cli.input);
    }
    if outcome.warn {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn show_info(cli: &Cli, ctx: &ConvertContext) -> tavle::Result<ExitCode> {
    let markup = fs::read_to_string(&cli.input)?;
    let mut doc = tavle::convert::deserialize(&markup, ctx);
    let report = normalize(&mut doc, ctx)?;

    if cli.json {
        let info = InfoReport {
            language: doc.language.as_deref(),
            sections: doc.children(doc.root()).len(),
            nodes: doc.live_count(),
            rounds: report.rounds,
            repairs: report.mutations,
        };
        let json = serde_json::to_string_pretty(&info).expect("report is serializable");
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    println!("File: {}", cli.input);
    if let Some(ref language) = doc.language {
        println!("Language: {language}");
    }
    println!("Sections: {}", doc.children(doc.root()).len());
    println!("Nodes: {}", doc.live_count());
    println!(
        "Normalized in: {} rounds, {} repairs",
        report.rounds, report.mutations
    );
    Ok(ExitCode::SUCCESS)
}
