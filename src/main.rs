// SPDX-License-Identifier: MIT

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use greenlight_rs::data::Roster;
use greenlight_rs::flow::engine::Engine;
use greenlight_rs::flow::nodes::RandomChooser;
use greenlight_rs::flow::state::{Decision, Modification, Proposal, WorkflowState};
use greenlight_rs::flow::store::MemoryStore;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one interactive review session in the terminal
    Run {
        /// Path to the roster YAML file
        #[arg(short, long)]
        roster: String,

        /// Department to review
        #[arg(short, long)]
        department: String,

        /// Thread id for the workflow (generated if omitted)
        #[arg(short, long)]
        thread: Option<String>,
    },
    /// Serve the review API over HTTP
    Serve {
        /// Path to the roster YAML file
        #[arg(short, long)]
        roster: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8088)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Run {
            roster,
            department,
            thread,
        } => {
            let engine = build_engine(&roster)?;
            let thread_id = thread.unwrap_or_else(|| Uuid::new_v4().to_string());
            run_interactive(&engine, &thread_id, &department)?;
        }
        Commands::Serve { roster, port } => {
            let engine = Arc::new(build_engine(&roster)?);
            greenlight_rs::server::serve(engine, port)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }

    Ok(())
}

fn build_engine(roster_path: &str) -> anyhow::Result<Engine> {
    let roster = Roster::load(roster_path)?;
    log::info!("Loaded roster with {} employees", roster.employees.len());
    Ok(Engine::new(
        Arc::new(MemoryStore::new()),
        Arc::new(roster),
        Arc::new(RandomChooser),
    ))
}

fn run_interactive(engine: &Engine, thread_id: &str, department: &str) -> anyhow::Result<()> {
    println!("Starting review for department: {}", department);
    println!("Thread id: {}", thread_id);

    let state = engine.start(thread_id, department)?;
    if state.is_completed() {
        print_result(&state);
        return Ok(());
    }

    print_proposal(&state);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let decision = loop {
        print!("Decision [approve/reject/modify]: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            anyhow::bail!("stdin closed before a decision was given");
        };
        match line?.trim().to_lowercase().as_str() {
            "approve" => break Decision::Approve,
            "reject" => break Decision::Reject,
            "modify" => break Decision::Modify,
            other => println!("Unrecognized decision '{}'", other),
        }
    };

    let modification = if decision == Decision::Modify {
        Some(prompt_modification(&state, &mut lines)?)
    } else {
        None
    };

    let final_state = engine.submit_decision(thread_id, decision, modification)?;
    print_result(&final_state);
    Ok(())
}

fn prompt_modification(
    state: &WorkflowState,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> anyhow::Result<Modification> {
    let mut modification = Modification::default();
    match &state.proposal {
        Some(Proposal::SalaryHike {
            proposed_salary, ..
        }) => {
            print!("New salary (proposed {}): ", proposed_salary);
            io::stdout().flush()?;
            if let Some(line) = lines.next() {
                modification.modified_salary = line?.trim().parse().ok();
            }
        }
        Some(Proposal::ManagerChange {
            proposed_manager, ..
        }) => {
            print!("New manager (proposed {}): ", proposed_manager);
            io::stdout().flush()?;
            if let Some(line) = lines.next() {
                let name = line?.trim().to_string();
                if !name.is_empty() {
                    modification.modified_manager = Some(name);
                }
            }
        }
        None => {}
    }
    Ok(modification)
}

fn print_proposal(state: &WorkflowState) {
    match &state.proposal {
        Some(Proposal::SalaryHike {
            employee_name,
            current_salary,
            proposed_salary,
            increase_percentage,
            reason,
            ..
        }) => {
            println!("\nProposal: salary hike");
            println!("  Employee:  {}", employee_name);
            println!("  Current:   {}", current_salary);
            println!(
                "  Proposed:  {} (+{}%)",
                proposed_salary, increase_percentage
            );
            println!("  Reason:    {}", reason);
        }
        Some(Proposal::ManagerChange {
            employee_name,
            current_manager,
            proposed_manager,
            reason,
            ..
        }) => {
            println!("\nProposal: manager change");
            println!("  Employee:  {}", employee_name);
            println!("  Current:   {}", current_manager);
            println!("  Proposed:  {}", proposed_manager);
            println!("  Reason:    {}", reason);
        }
        None => println!("\nNo proposal generated"),
    }
}

fn print_result(state: &WorkflowState) {
    if let Some(outcome) = &state.outcome {
        println!("\n{}", outcome.message);
    }
    println!("\nExecution log:");
    for entry in &state.execution_log {
        println!("  - {}", entry);
    }
}
