//! Reporting utilities: rankings and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{TermFit, TrendFit};

/// Rising/declining rankings (top-N each side) plus the null-marked terms.
#[derive(Debug, Clone)]
pub struct Rankings {
    pub rising: Vec<(String, TrendFit)>,
    pub declining: Vec<(String, TrendFit)>,
    pub failed: Vec<String>,
}

/// Rank terms by fitted time coefficient.
pub fn rank_trends(fits: &[TermFit], top_n: usize) -> Rankings {
    let mut fitted: Vec<(String, TrendFit)> = fits
        .iter()
        .filter_map(|tf| tf.fit.map(|f| (tf.headline_term.clone(), f)))
        .collect();

    fitted.sort_by(|a, b| {
        b.1.coef_time
            .partial_cmp(&a.1.coef_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let rising: Vec<(String, TrendFit)> = fitted.iter().take(top_n).cloned().collect();

    let mut ascending = fitted.clone();
    ascending.reverse();
    let declining: Vec<(String, TrendFit)> = ascending.iter().take(top_n).cloned().collect();

    let failed = fits
        .iter()
        .filter(|tf| tf.fit.is_none())
        .map(|tf| tf.headline_term.clone())
        .collect();

    Rankings {
        rising,
        declining,
        failed,
    }
}

/// Format the full per-term table. Null-marked terms print dashes.
pub fn format_fit_table(fits: &[TermFit]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<28} {:>14} {:>12} {:>10} {:>12}\n",
        "headline_term", "coef_intercept", "coef_time", "rse_time", "p_value_time"
    ));
    for tf in fits {
        match &tf.fit {
            Some(f) => out.push_str(&format!(
                "{:<28} {:>14.6} {:>12.6} {:>10.4} {:>12.2e}\n",
                tf.headline_term, f.coef_intercept, f.coef_time, f.rse_time, f.p_value_time
            )),
            None => out.push_str(&format!(
                "{:<28} {:>14} {:>12} {:>10} {:>12}\n",
                tf.headline_term, "-", "-", "-", "-"
            )),
        }
    }
    out
}

/// Format the rising/declining rankings.
pub fn format_rankings(rankings: &Rankings) -> String {
    let mut out = String::new();

    out.push_str("\nTop rising terms (by coef_time):\n");
    for (term, fit) in &rankings.rising {
        out.push_str(&format!("  {:<28} {:>+10.6}\n", term, fit.coef_time));
    }

    out.push_str("\nTop declining terms (by coef_time):\n");
    for (term, fit) in &rankings.declining {
        out.push_str(&format!("  {:<28} {:>+10.6}\n", term, fit.coef_time));
    }

    if !rankings.failed.is_empty() {
        out.push_str(&format!(
            "\n{} term(s) null-marked (fit failed): {}\n",
            rankings.failed.len(),
            rankings.failed.join(", ")
        ));
    }

    out
}
