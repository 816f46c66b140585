use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};

use netseg_core::config::{self, DefinitionFile};
use netseg_core::graph::ResourceGraph;
use netseg_core::resource::Value;
use netseg_provider_awscc::{render_template, validate_graph};

#[derive(Parser)]
#[command(name = "netseg")]
#[command(about = "Declare subnets, route tables and routes as a resource graph", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the definition file and the resources it declares
    Validate {
        /// Path to the definition file
        #[arg(default_value = "netseg.json")]
        file: PathBuf,
    },
    /// Render the CloudFormation template for all segments
    Synth {
        /// Path to the definition file
        #[arg(default_value = "netseg.json")]
        file: PathBuf,

        /// Write the template here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Check that the output file is up to date (don't modify)
        #[arg(long, short, requires = "output")]
        check: bool,

        /// Show diff against the existing output file
        #[arg(long, requires = "output")]
        diff: bool,
    },
    /// Show each segment's resources in dependency order
    Graph {
        /// Path to the definition file
        #[arg(default_value = "netseg.json")]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Commands::Validate { file } => run_validate(&file),
        Commands::Synth {
            file,
            output,
            check,
            diff,
        } => run_synth(&file, output.as_deref(), check, diff),
        Commands::Graph { file } => run_graph(&file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load(file: &Path) -> Result<DefinitionFile, String> {
    config::load_definitions(file).map_err(|e| e.to_string())
}

fn synthesize(definitions: &DefinitionFile) -> Result<ResourceGraph, String> {
    let graph = definitions
        .synthesize()
        .map_err(|e| format!("Definition error: {}", e))?;
    log::debug!(
        "synthesized {} resources from {} segments",
        graph.len(),
        definitions.segments.len()
    );
    Ok(graph)
}

/// Render the template for a definition file as pretty JSON
fn render(definitions: &DefinitionFile) -> Result<String, String> {
    let graph = synthesize(definitions)?;
    let template = render_template(&graph).map_err(|e| format!("Render error: {}", e))?;
    let mut rendered = serde_json::to_string_pretty(&template)
        .map_err(|e| format!("Failed to serialize template: {}", e))?;
    rendered.push('\n');
    Ok(rendered)
}

fn run_validate(file: &Path) -> Result<(), String> {
    let definitions = load(file)?;

    println!("{}", "Validating...".cyan());

    let graph = synthesize(&definitions)?;
    validate_graph(&graph).map_err(|errors| errors.join("\n"))?;

    println!(
        "{}",
        format!(
            "✓ {} segments ({} resources) validated successfully.",
            definitions.segments.len(),
            graph.len()
        )
        .green()
        .bold()
    );

    for resource in graph.resources() {
        println!("  • {}", resource.id);
    }

    Ok(())
}

fn run_synth(file: &Path, output: Option<&Path>, check: bool, show_diff: bool) -> Result<(), String> {
    let definitions = load(file)?;
    let rendered = render(&definitions)?;

    let Some(output) = output else {
        print!("{}", rendered);
        return Ok(());
    };

    let existing = if output.exists() {
        fs::read_to_string(output)
            .map_err(|e| format!("Failed to read {}: {}", output.display(), e))?
    } else {
        String::new()
    };

    if existing == rendered {
        println!("{}", "Template is up to date.".green());
        return Ok(());
    }

    if show_diff {
        print_diff(output, &existing, &rendered);
    }

    if check {
        println!("{} {}", "Template is out of date:".yellow(), output.display());
        return Err("Template does not match the definitions".to_string());
    }

    fs::write(output, &rendered)
        .map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;
    println!("{} {}", "Wrote:".green(), output.display());
    Ok(())
}

fn run_graph(file: &Path) -> Result<(), String> {
    let definitions = load(file)?;
    let segments = definitions
        .define_all()
        .map_err(|e| format!("Definition error: {}", e))?;

    for segment in &segments {
        println!(
            "{} {}",
            "Segment:".cyan().bold(),
            segment.name().white().bold()
        );
        println!("  subnet: {}", segment.subnet().name);
        println!("  route table: {}", segment.route_table().name);

        let graph = segment.graph();
        let ordered = graph
            .dependency_order()
            .map_err(|e| format!("Definition error: {}", e))?;
        for resource in ordered {
            println!("  {} {}", "+".green().bold(), resource.id);
            for dep in graph.dependencies().dependencies_of(&resource.id.name) {
                println!(
                    "      {} {} {}",
                    dep.used_in.dimmed(),
                    "->".dimmed(),
                    dep.target
                );
            }
            if let Some(Value::List(tags)) = resource.attribute("tags") {
                println!("      {} {}", "tags".dimmed(), tags.len());
            }
        }
        println!();
    }

    Ok(())
}

fn print_diff(file: &Path, original: &str, rendered: &str) {
    println!("\n{} {}:", "Diff for".cyan().bold(), file.display());

    let diff = TextDiff::from_lines(original, rendered);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-".red(),
            ChangeTag::Insert => "+".green(),
            ChangeTag::Equal => " ".normal(),
        };
        print!("{}{}", sign, change);
    }
}
