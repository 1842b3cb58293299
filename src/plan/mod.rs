use crate::cli::progress::StepContext;
use crate::config::SimConfig;
use crate::params::TechParams;
use crate::paths::{out_json, out_report};
use crate::report::{save_json, save_report};
use crate::synth::Synthesis;
use crate::Result;
use anyhow::bail;
use std::collections::HashSet;
use std::path::Path;

/// A validated parameter set ready for synthesis.
pub struct SimPlan {
    pub name: String,
    pub params: TechParams,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKey {
    GeneratePlan,
    RunSynthesis,
    WriteReport,
    WriteJson,
}

pub struct ExecutePlanParams<'a> {
    pub work_dir: &'a Path,
    pub plan: &'a SimPlan,
    pub tasks: &'a HashSet<TaskKey>,
    pub ctx: Option<&'a mut StepContext>,
    /// Treat a non-converged result as an error.
    pub strict: bool,
}

pub fn generate_plan(config: &SimConfig) -> Result<SimPlan> {
    let (node, design) = config.resolve()?;
    let params = TechParams::setup(node, design)?;
    Ok(SimPlan {
        name: config.name(node),
        params,
    })
}

macro_rules! try_finish_task {
    ( $ctx:expr, $task:expr ) => {
        if let Some(ctx) = $ctx.as_mut() {
            ctx.finish($task);
        }
    };
}

macro_rules! try_execute_task {
    ( $tasks:expr, $task:expr, $body:expr, $ctx:expr) => {
        if $tasks.contains(&$task) {
            $body;
            try_finish_task!($ctx, $task);
        }
    };
}

pub fn execute_plan(params: ExecutePlanParams) -> Result<Synthesis> {
    let ExecutePlanParams {
        work_dir,
        plan,
        tasks,
        mut ctx,
        strict,
    } = params;

    std::fs::create_dir_all(work_dir)?;

    let synth = Synthesis::run(&plan.params)?;
    if strict && !synth.converged() {
        bail!(
            "interconnect synthesis did not converge: {:?} after {} iterations",
            synth.convergence,
            synth.iterations
        );
    }
    try_finish_task!(ctx, TaskKey::RunSynthesis);

    let report = synth.report();
    save_report(out_report(work_dir, &plan.name), &report)?;
    try_finish_task!(ctx, TaskKey::WriteReport);

    try_execute_task!(
        tasks,
        TaskKey::WriteJson,
        save_json(out_json(work_dir, &plan.name), &report)?,
        ctx
    );

    Ok(synth)
}
