//! # Portfolio Reporting
//!
//! Read-only aggregation over the directory for dashboards and the stats
//! endpoint. Integer arithmetic only; revenue sums saturate instead of
//! overflowing. This module has no write access to anything.

use crate::directory::Directory;
use crate::types::{CradleError, Money, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate portfolio counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Startups on record, any status.
    pub total: usize,
    pub active: usize,
    pub onboarded: usize,
    pub graduated: usize,
    pub rejected: usize,
    /// Pipeline distribution of active startups, keyed by stage label.
    /// Stage is meaningful only while Active, so other statuses are not
    /// counted here.
    pub by_stage: BTreeMap<String, usize>,
    /// Sector distribution across all startups.
    pub by_sector: BTreeMap<String, usize>,
    /// Sum of achievement revenue across the portfolio, in minor units.
    pub total_revenue: Money,
    /// Completed mentorship sessions across the portfolio.
    pub sessions_completed: usize,
}

impl PortfolioStats {
    /// Stats for an empty portfolio.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total: 0,
            active: 0,
            onboarded: 0,
            graduated: 0,
            rejected: 0,
            by_stage: BTreeMap::new(),
            by_sector: BTreeMap::new(),
            total_revenue: Money::default(),
            sessions_completed: 0,
        }
    }

    /// Compute stats from the directory.
    pub fn from_directory(directory: &Directory) -> Result<Self, CradleError> {
        let mut stats = Self::empty();

        for startup in directory.list()? {
            stats.total = stats.total.saturating_add(1);
            match startup.status {
                Status::Active => {
                    stats.active = stats.active.saturating_add(1);
                    let key = startup.stage.to_string();
                    *stats.by_stage.entry(key).or_insert(0) += 1;
                }
                Status::Onboarded => stats.onboarded = stats.onboarded.saturating_add(1),
                Status::Graduated => stats.graduated = stats.graduated.saturating_add(1),
                Status::Rejected => stats.rejected = stats.rejected.saturating_add(1),
            }

            *stats
                .by_sector
                .entry(startup.profile.sector.clone())
                .or_insert(0) += 1;

            stats.total_revenue = stats.total_revenue.saturating_add(startup.total_revenue());
            stats.sessions_completed = stats
                .sessions_completed
                .saturating_add(startup.session_history.iter().filter(|s| s.completed).count());
        }

        Ok(stats)
    }
}

// =============================================================================
// TESTS
// =============================================================================
