use std::io::Write;

use color_eyre::Result;
use color_eyre::eyre::eyre;

use crate::format::{cpu_label, memory_label, truncate_unicode};
use crate::system::refresh::{RefreshReport, Refresher};
use crate::system::sampler::ProcessTable;
use crate::system::utilization::SystemCounters;

const NAME_WIDTH: usize = 24;

/// One refresh written to `out`. Fails when the process list could not be read.
///
/// This is the estimator's first sample, so CPU usage always reads 0.00%.
pub fn run_once<T: ProcessTable, C: SystemCounters>(
    refresher: &mut Refresher<T, C>,
    out: &mut impl Write,
    json: bool,
) -> Result<()> {
    let report = refresher.refresh();

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        write_text_report(out, &report)?;
    }

    match &report.process_error {
        Some(err) => Err(eyre!("{err}")),
        None => Ok(()),
    }
}

pub fn write_text_report(out: &mut impl Write, report: &RefreshReport) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>8}  {:<NAME_WIDTH$}  {:>17}  {:>10}  {:>13}",
        "PID", "Name", "Memory Usage (KB)", "Memory (%)", "CPU Usage (%)"
    )?;
    for p in &report.processes {
        writeln!(
            out,
            "{:>8}  {:<NAME_WIDTH$}  {:>17}  {:>10.1}  {:>13.2}",
            p.process_id,
            truncate_unicode(&p.name, NAME_WIDTH),
            p.memory_usage_kb,
            p.memory_percent,
            p.cpu_usage_percent
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Sorted by: {}", report.sort_mode.label())?;
    writeln!(out, "{}", cpu_label(report.utilization.cpu_percent))?;
    writeln!(out, "{}", memory_label(report.utilization.memory_load_percent))?;
    if let Some(err) = &report.process_error {
        writeln!(out, "error: {err}")?;
    }
    if let Some(err) = &report.utilization_error {
        writeln!(out, "warning: {err}")?;
    }
    Ok(())
}
