//! Background maintenance loop.
//!
//! One periodic task cancels unpaid orders past their payment deadline
//! (returning their stock) and moves technicians whose busy window has
//! ended back to standby. Reads run the same expiry lazily, so the sweeper
//! only bounds how stale an untouched order can get.

use crate::handlers::AppServices;
use std::time::Duration;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, error, info};

/// Counts from one sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub expired_transaksi: u64,
    pub released_pekerja: u64,
}

/// Runs a single sweep. Each half runs even when the other fails.
pub async fn sweep_once(services: &AppServices) -> SweepReport {
    let mut report = SweepReport::default();

    match services.transaksi.expire_overdue().await {
        Ok(count) => report.expired_transaksi = count,
        Err(e) => error!(error = %e, "expiry sweep failed"),
    }
    match services.pekerja.release_finished().await {
        Ok(count) => report.released_pekerja = count,
        Err(e) => error!(error = %e, "pekerja release failed"),
    }

    if report != SweepReport::default() {
        info!(
            expired = report.expired_transaksi,
            released = report.released_pekerja,
            "sweep completed"
        );
    } else {
        debug!("sweep found nothing to do");
    }
    report
}

/// Spawns the sweeper. Returns `None` when `interval` is `None`.
pub fn spawn_expiry_sweeper(
    services: AppServices,
    interval: Option<Duration>,
) -> Option<JoinHandle<()>> {
    let Some(period) = interval else {
        info!("expiry sweeper disabled");
        return None;
    };

    info!(period_secs = period.as_secs(), "starting expiry sweeper");
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&services).await;
        }
    }))
}
