use std::collections::HashSet;
use std::fs::canonicalize;
use std::path::PathBuf;

use clap::Parser;

use crate::cli::args::Args;
use crate::cli::progress::StepContext;
use crate::config::parse_config;
use crate::plan::{execute_plan, generate_plan, ExecutePlanParams, TaskKey};
use crate::Result;

pub mod args;
pub mod progress;

pub const BANNER: &str = r"
 ___ _   _ _____ ____ ___ __  __
|_ _| \ | |_   _/ ___|_ _|  \/  |
 | ||  \| | | | \___ \| || |\/| |
 | || |\  | | |  ___) | || |  | |
|___|_| \_| |_| |____/___|_|  |_|

IntSim v0.1
";

pub fn run() -> Result<()> {
    let args = Args::parse();

    let config_path = canonicalize(&args.config)?;

    println!("{BANNER}");

    println!("Reading configuration file...\n");
    let config = parse_config(&config_path)?;

    println!("Configuration file: {:?}", &config_path);

    let enabled_tasks = vec![
        (true, TaskKey::GeneratePlan),
        (true, TaskKey::RunSynthesis),
        (true, TaskKey::WriteReport),
        (args.json, TaskKey::WriteJson),
    ]
    .into_iter()
    .filter_map(|(a, b)| if a { Some(b) } else { None });

    let tasks = HashSet::from_iter(enabled_tasks);

    let mut ctx = StepContext::new(&tasks);

    let plan = ctx.check(generate_plan(&config))?;
    ctx.finish(TaskKey::GeneratePlan);

    let design = &plan.params.design;
    println!("Design parameters:");
    println!("\tNode: {}", plan.params.node);
    println!("\tGates: {:.3e}", design.ngates);
    println!("\tDie area: {:.3e} m^2", design.die_area);
    println!("\tFrequency: {:.3} GHz", design.frequency / 1e9);
    println!("\tSupply voltage: {} V", plan.params.vdd);

    let work_dir = if let Some(output_dir) = args.output_dir {
        output_dir
    } else {
        PathBuf::from(plan.name.as_str())
    };
    std::fs::create_dir_all(&work_dir)?;
    let work_dir = canonicalize(work_dir)?;

    let res = execute_plan(ExecutePlanParams {
        work_dir: &work_dir,
        plan: &plan,
        tasks: &tasks,
        ctx: Some(&mut ctx),
        strict: args.strict,
    });

    let synth = ctx.check(res)?;
    let energy = synth.unit_energy();
    println!("Total power: {:.3} W ({:?})", synth.total_power(), synth.convergence);
    println!(
        "Energy per cycle: {:.3e} J dynamic, {:.3e} J leakage",
        energy.read, energy.leakage
    );
    println!("Artifacts saved to: {:?}\n", &work_dir);

    Ok(())
}
