//! Human-readable rendering of round, run, check and triage reports.
//!
//! Rendering is a thin layer over the structured report values; nothing here
//! feeds back into the round loop.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::check::{CheckReport, progress_bar, progress_tier};
use crate::core::triage::{Owner, TriageReport};
use crate::core::types::{RoundSummary, TaskStatus};
use crate::orchestrator::RunReport;

const ROUND_TEMPLATE: &str = include_str!("templates/round.txt");
const FINAL_TEMPLATE: &str = include_str!("templates/final.txt");
const CHECK_TEMPLATE: &str = include_str!("templates/check.txt");
const TRIAGE_TEMPLATE: &str = include_str!("templates/triage.txt");

/// Task row with a padded display label.
#[derive(Debug, Clone, Serialize)]
struct TaskRow {
    label: String,
    state: String,
}

#[derive(Debug, Clone, Serialize)]
struct OwnerGroup<'a> {
    owner: &'static str,
    issues: &'a [String],
}

/// Template engine wrapper around minijinja.
pub struct ReportRenderer {
    env: Environment<'static>,
}

impl ReportRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_template("round", ROUND_TEMPLATE)
            .context("load round template")?;
        env.add_template("final", FINAL_TEMPLATE)
            .context("load final template")?;
        env.add_template("check", CHECK_TEMPLATE)
            .context("load check template")?;
        env.add_template("triage", TRIAGE_TEMPLATE)
            .context("load triage template")?;
        Ok(Self { env })
    }

    pub fn render_round(&self, summary: &RoundSummary, max_rounds: u32) -> Result<String> {
        let template = self.env.get_template("round")?;
        let rendered = template.render(context! {
            index => summary.index,
            max_rounds => max_rounds,
            phase => summary.phase.as_str(),
            tasks => task_rows(&summary.tasks),
            passed => summary.gate.all_complete,
            incomplete => &summary.gate.incomplete_tasks,
        })?;
        Ok(rendered)
    }

    pub fn render_final(&self, report: &RunReport) -> Result<String> {
        let template = self.env.get_template("final")?;
        let rendered = template.render(context! {
            forced => report.forced(),
            rounds_executed => report.rounds_executed,
            max_rounds => report.max_rounds,
            strategy => &report.strategy,
            tasks => task_rows(&report.tasks),
            audit => &report.audit,
        })?;
        Ok(rendered)
    }

    pub fn render_check(&self, report: &CheckReport) -> Result<String> {
        let template = self.env.get_template("check")?;
        let percent = report.percent();
        let rendered = template.render(context! {
            run_id => &report.run_id,
            goal => &report.goal,
            categories => &report.categories,
            present => report.present,
            expected => report.expected,
            percent => format!("{percent:.1}"),
            bar => progress_bar(report.present, report.expected),
            tier => progress_tier(percent),
            acceptance => &report.acceptance,
        })?;
        Ok(rendered)
    }

    pub fn render_triage(&self, report: &TriageReport, fallback: Owner) -> Result<String> {
        let template = self.env.get_template("triage")?;
        let groups: Vec<OwnerGroup<'_>> = Owner::ALL
            .iter()
            .map(|owner| OwnerGroup {
                owner: owner.as_str(),
                issues: report.issues_for(*owner),
            })
            .filter(|group| !group.issues.is_empty())
            .collect();
        let rendered = template.render(context! {
            total => report.total(),
            groups => groups,
            fallback => &report.fallback,
            fallback_owner => fallback.as_str(),
        })?;
        Ok(rendered)
    }
}

/// `gear_module_styling` → `Gear Module Styling`.
pub fn display_name(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn task_state(task: &TaskStatus) -> String {
    match (task.complete, task.forced) {
        (true, true) => format!("FORCED ({}%)", task.progress),
        (true, false) => "COMPLETE".to_string(),
        (false, _) => format!("{}% / {}%", task.progress, task.required),
    }
}

fn task_rows(tasks: &[TaskStatus]) -> Vec<TaskRow> {
    let labels: Vec<String> = tasks.iter().map(|task| display_name(&task.name)).collect();
    let width = labels.iter().map(|label| label.chars().count()).max().unwrap_or(0);
    labels
        .into_iter()
        .zip(tasks)
        .map(|(label, task)| TaskRow {
            label: format!("{label:<width$}"),
            state: task_state(task),
        })
        .collect()
}
