use tracing::debug;

use crate::error::CustodyResult;
use crate::models::DashboardSummary;
use crate::store::Records;

/// Read-only roll-up of blocks, staff counters and weekly visitor counts.
pub async fn summarize(records: &Records) -> CustodyResult<DashboardSummary> {
    let blocks = records.cell_blocks.all().await?;
    let staff_status = records.staff_status.all().await?;
    let activity = records.weekly_activity.all().await?;

    let summary = DashboardSummary {
        total_inmates: blocks.iter().map(|b| u64::from(b.current)).sum(),
        active_staff: staff_status.iter().map(|s| u64::from(s.value)).sum(),
        daily_visitors: activity.iter().map(|a| u64::from(a.visitors)).sum(),
        available_cells: blocks
            .iter()
            .map(|b| i64::from(b.capacity) - i64::from(b.current))
            .sum(),
    };

    debug!(
        "Dashboard summary over {} blocks, {} staff counters, {} activity days",
        blocks.len(),
        staff_status.len(),
        activity.len()
    );
    Ok(summary)
}
