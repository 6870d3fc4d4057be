//! `expd stats`: dashboard statistics for an optional date range.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use expd_client::statistics::{DashboardStats, Period};

use crate::context::AppContext;

/// Arguments for `expd stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// First day included (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day included (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Print raw JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute `expd stats`.
pub async fn run_stats(ctx: &AppContext, args: &StatsArgs) -> Result<u8> {
    if let Some(code) = ctx.require_session("/dashboard/statistics").await {
        return Ok(code);
    }

    let period = Period {
        start: args.from,
        end: args.to,
    };
    let stats = ctx
        .session
        .client()
        .statistics()
        .dashboard(period)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", render(&stats));
    }
    Ok(0)
}

fn render(stats: &DashboardStats) -> String {
    let mut out = String::new();
    let t = &stats.totals;
    out.push_str(&format!(
        "assignments {}\nvehicles    {}\ninvoices    {}\npayments    {}\n",
        t.assignments, t.vehicles, t.invoices, t.payments
    ));
    for (label, amount) in [
        ("invoiced", &stats.amounts.invoiced),
        ("paid", &stats.amounts.paid),
        ("outstanding", &stats.amounts.outstanding),
    ] {
        if let Some(amount) = amount {
            out.push_str(&format!("{label:<11} {amount}\n"));
        }
    }
    for entry in &stats.assignments_by_status {
        let name = entry
            .status
            .label
            .as_deref()
            .or(entry.status.code.as_deref())
            .unwrap_or("?");
        out.push_str(&format!("  {name:<20} {}\n", entry.count));
    }
    out
}
