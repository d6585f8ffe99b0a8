//! Formatted terminal output for fits and curves.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::Session;
use crate::domain::{AppConfig, CurveFrame, DataSource};

/// Format the run summary (dataset stats + fit diagnostics + coefficients).
pub fn format_fit_summary(session: &Session, config: &AppConfig) -> String {
    let stats = &session.stats;
    let fit = &session.fit;
    let model = &fit.model;

    let mut out = String::new();
    out.push_str("=== emul - logistic fit: P(no emulsion) ===\n");
    match &config.source {
        DataSource::Csv(path) => out.push_str(&format!("Data: {}\n", path.display())),
        DataSource::Synthetic { seed } => out.push_str(&format!("Data: synthetic (seed={seed})\n")),
    }
    out.push_str(&format!(
        "Rows: {} | observations: {} | no emulsion: {} ({:.1}%)\n",
        stats.n_rows,
        stats.n_obs,
        stats.n_success,
        100.0 * stats.n_success as f64 / stats.n_obs.max(1) as f64,
    ));
    out.push_str(&format!(
        "K3PO4: [{:.3}, {:.3}] | buffer: [{:.3}, {:.3}]\n",
        stats.stoichiometry_min, stats.stoichiometry_max, stats.buffer_min, stats.buffer_max,
    ));

    out.push_str("\nCoefficients (log-odds of no emulsion):\n");
    out.push_str(&format!("  {:<12} {:>12.6}\n", "intercept", model.intercept()));
    out.push_str(&format!("  {:<12} {:>12.6}\n", "K3PO4", model.stoichiometry_weight()));
    out.push_str(&format!("  {:<12} {:>12.6}\n", "buffer", model.buffer_weight()));

    out.push_str("\nDiagnostics:\n");
    out.push_str(&format!("  iterations    {}\n", fit.iterations));
    out.push_str(&format!("  log-lik       {:.4}\n", fit.log_likelihood));
    out.push_str(&format!("  null log-lik  {:.4}\n", fit.null_log_likelihood));
    out.push_str(&format!("  pseudo R²     {:.4}\n", fit.pseudo_r2()));

    out.push_str(&format!(
        "\nGrid: [{:.3}, {:.3}] x {} points\n",
        session.grid.lo(),
        session.grid.hi(),
        session.grid.count()
    ));

    out
}

/// Format a curve as `stoichiometry,probability` lines with a header.
pub fn format_curve_table(frame: &CurveFrame) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {} (buffer={})\n", frame.title, frame.curve.buffer));
    out.push_str("stoichiometry,probability\n");
    for p in &frame.curve.points {
        out.push_str(&format!("{:.6},{:.6}\n", p.stoichiometry, p.probability));
    }
    out
}
