use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ReconError;
use crate::model::{Category, ClassifiedRecord, JoinedRecord, Presence};

/// Largest absolute gap still counted as a match. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tolerance(Decimal);

impl Tolerance {
    pub fn new(value: Decimal) -> Result<Self, ReconError> {
        if value < Decimal::ZERO {
            return Err(ReconError::InvalidTolerance(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Default for Tolerance {
    /// 0.25 monetary units.
    fn default() -> Self {
        Self(Decimal::new(25, 2))
    }
}

/// Category of one joined record. Inclusive at the tolerance boundary.
pub fn classify(record: &JoinedRecord, tolerance: Tolerance) -> Category {
    match record.presence {
        Presence::Both if record.commission_gap.abs() <= tolerance.value() => Category::PerfectMatch,
        Presence::Both => Category::CommissionGap,
        Presence::OrderOnly => Category::OrdersMissingCommission,
        Presence::CommissionOnly => Category::CommissionsMissingOrder,
    }
}

pub fn classify_all(joined: Vec<JoinedRecord>, tolerance: Tolerance) -> Vec<ClassifiedRecord> {
    joined
        .into_iter()
        .map(|record| ClassifiedRecord {
            category: classify(&record, tolerance),
            record,
        })
        .collect()
}

/// The four disjoint category partitions, each in join order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Partitions {
    pub matches: Vec<JoinedRecord>,
    pub commission_gap: Vec<JoinedRecord>,
    pub orders_missing_commission: Vec<JoinedRecord>,
    pub commissions_missing_order: Vec<JoinedRecord>,
}

impl Partitions {
    pub fn from_classified(classified: &[ClassifiedRecord]) -> Self {
        let mut parts = Self::default();
        for c in classified {
            parts.bucket_mut(c.category).push(c.record.clone());
        }
        parts
    }

    pub fn get(&self, category: Category) -> &[JoinedRecord] {
        match category {
            Category::PerfectMatch => &self.matches,
            Category::CommissionGap => &self.commission_gap,
            Category::OrdersMissingCommission => &self.orders_missing_commission,
            Category::CommissionsMissingOrder => &self.commissions_missing_order,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<JoinedRecord> {
        match category {
            Category::PerfectMatch => &mut self.matches,
            Category::CommissionGap => &mut self.commission_gap,
            Category::OrdersMissingCommission => &mut self.orders_missing_commission,
            Category::CommissionsMissingOrder => &mut self.commissions_missing_order,
        }
    }

    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }
}
