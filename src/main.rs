use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use switchyard_compiler::{CompileOptions, compile};
use switchyard_definition::{Diagnostics, WorkflowDefinition};
use switchyard_parser::parse;
use switchyard_runtime::{EchoProxy, Runtime, RuntimeConfig, WorkflowMachine};
use switchyard_validator::validate;

/// Switchyard - compile declarative workflows into state machines
#[derive(Parser)]
#[command(name = "switchyard")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Parse and validate a workflow, printing diagnostics
  Check {
    /// Path to the workflow file (YAML or JSON)
    workflow_file: PathBuf,
  },

  /// Compile a workflow to Rust source
  Compile {
    /// Path to the workflow file (YAML or JSON)
    workflow_file: PathBuf,

    /// Write the generated module here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Name of the generated entry function
    #[arg(long, default_value = "run")]
    entry: String,

    /// Do not generate trigger registration
    #[arg(long)]
    no_triggers: bool,
  },

  /// Run a workflow once with an echoing service proxy
  Run {
    /// Path to the workflow file (YAML or JSON)
    workflow_file: PathBuf,

    /// Fail the execution if it has not settled after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Check { workflow_file }) => {
      let workflow = load_checked(&workflow_file)?;
      eprintln!(
        "{}: workflow '{}' is valid ({} steps, {} triggers)",
        workflow_file.display(),
        workflow.id,
        workflow.steps.len(),
        workflow.triggers.len()
      );
    }
    Some(Commands::Compile {
      workflow_file,
      out,
      entry,
      no_triggers,
    }) => {
      let options = CompileOptions {
        entry_name: entry,
        emit_triggers: !no_triggers,
        ..Default::default()
      };
      compile_workflow(&workflow_file, out.as_deref(), &options)?;
    }
    Some(Commands::Run {
      workflow_file,
      timeout_ms,
    }) => {
      run_workflow(workflow_file, timeout_ms)?;
    }
    None => {
      println!("switchyard - use --help to see available commands");
    }
  }

  Ok(())
}

/// Read, parse and validate a workflow file, printing every diagnostic.
fn load_checked(workflow_file: &Path) -> Result<WorkflowDefinition> {
  let document = std::fs::read_to_string(workflow_file)
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  let parsed = parse(&document);
  report(workflow_file, &parsed.diagnostics);
  if !parsed.is_valid() {
    bail!(
      "{}: {} parse error(s)",
      workflow_file.display(),
      parsed.errors().len()
    );
  }

  let validated = validate(&parsed.workflow);
  report(workflow_file, &validated.diagnostics);
  if !validated.valid {
    bail!(
      "{}: {} validation error(s)",
      workflow_file.display(),
      validated.errors().len()
    );
  }

  Ok(parsed.workflow)
}

fn report(workflow_file: &Path, diagnostics: &Diagnostics) {
  for diagnostic in diagnostics {
    match &diagnostic.step_id {
      Some(step_id) => eprintln!(
        "{}: {} (step '{}')",
        workflow_file.display(),
        diagnostic,
        step_id
      ),
      None => eprintln!("{}: {}", workflow_file.display(), diagnostic),
    }
  }
}

fn compile_workflow(workflow_file: &Path, out: Option<&Path>, options: &CompileOptions) -> Result<()> {
  let workflow = load_checked(workflow_file)?;

  let compiled = compile(&workflow, options);
  report(workflow_file, &compiled.diagnostics);
  if !compiled.is_ok() {
    bail!(
      "{}: {} compile error(s)",
      workflow_file.display(),
      compiled.errors().len()
    );
  }

  match out {
    Some(path) => {
      std::fs::write(path, &compiled.source_code)
        .with_context(|| format!("failed to write generated source: {}", path.display()))?;
      eprintln!("Wrote {}", path.display());
    }
    None => print!("{}", compiled.source_code),
  }

  Ok(())
}

fn run_workflow(workflow_file: PathBuf, timeout_ms: Option<u64>) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_workflow_async(workflow_file, timeout_ms).await })
}

async fn run_workflow_async(workflow_file: PathBuf, timeout_ms: Option<u64>) -> Result<()> {
  let workflow = load_checked(&workflow_file)?;
  let name = workflow.id.clone();

  // Read payload from stdin
  let event = read_payload_from_stdin()?;

  let runtime = Runtime::new(RuntimeConfig { timeout_ms });
  runtime.register(name.clone(), WorkflowMachine::new(workflow));
  info!(workflow = %name, "workflow_loaded");

  let result = runtime
    .execute(&name, event, serde_json::json!({}), Arc::new(EchoProxy))
    .await;

  println!("{}", serde_json::to_string_pretty(&result)?);

  if !result.is_succeeded() {
    bail!("execution {} failed", result.execution_id);
  }

  Ok(())
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, use empty object
    Ok(serde_json::json!({}))
  } else {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read event from stdin")?;

    if input.trim().is_empty() {
      Ok(serde_json::json!({}))
    } else {
      serde_json::from_str(&input).context("failed to parse event JSON from stdin")
    }
  }
}
