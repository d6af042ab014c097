use rust_decimal::Decimal;
use serde::Serialize;

/// Provider label used when neither side names one.
pub const UNASSIGNED: &str = "Unassigned";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which input table a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Orders,
    Commissions,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Orders => write!(f, "orders"),
            Self::Commissions => write!(f, "commissions"),
        }
    }
}

/// One expected-commission row, key already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub key: String,
    pub provider: Option<String>,
    pub expected_commission: Decimal,
    /// Row index in the source orders table.
    pub source_row: usize,
}

/// One billed-commission row, key already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct CommissionRecord {
    pub key: String,
    pub provider: Option<String>,
    pub billed_commission: Decimal,
    /// Row index in the source commissions table.
    pub source_row: usize,
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Presence {
    Both,
    OrderOnly,
    CommissionOnly,
}

impl std::fmt::Display for Presence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Both => write!(f, "BOTH"),
            Self::OrderOnly => write!(f, "ORDER_ONLY"),
            Self::CommissionOnly => write!(f, "COMMISSION_ONLY"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRecord {
    pub key: String,
    pub expected_commission: Decimal,
    pub billed_commission: Decimal,
    pub commission_gap: Decimal,
    pub provider: String,
    pub presence: Presence,
    #[serde(skip)]
    pub order_row: Option<usize>,
    #[serde(skip)]
    pub commission_row: Option<usize>,
}

impl JoinedRecord {
    pub fn both(order: &OrderRecord, commission: &CommissionRecord) -> Self {
        Self::build(order.key.clone(), Some(order), Some(commission), Presence::Both)
    }

    pub fn order_only(order: &OrderRecord) -> Self {
        Self::build(order.key.clone(), Some(order), None, Presence::OrderOnly)
    }

    pub fn commission_only(commission: &CommissionRecord) -> Self {
        Self::build(commission.key.clone(), None, Some(commission), Presence::CommissionOnly)
    }

    /// Missing sides contribute zero; the gap is always recomputed from the
    /// filled amounts.
    fn build(
        key: String,
        order: Option<&OrderRecord>,
        commission: Option<&CommissionRecord>,
        presence: Presence,
    ) -> Self {
        let expected_commission = order.map(|o| o.expected_commission).unwrap_or(Decimal::ZERO);
        let billed_commission = commission.map(|c| c.billed_commission).unwrap_or(Decimal::ZERO);
        let provider = order
            .and_then(|o| o.provider.clone())
            .or_else(|| commission.and_then(|c| c.provider.clone()))
            .unwrap_or_else(|| UNASSIGNED.to_string());

        Self {
            key,
            expected_commission,
            billed_commission,
            commission_gap: expected_commission - billed_commission,
            provider,
            presence,
            order_row: order.map(|o| o.source_row),
            commission_row: commission.map(|c| c.source_row),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Variant order is the fixed reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    #[serde(rename = "Perfect Match")]
    PerfectMatch,
    #[serde(rename = "Commission Gap")]
    CommissionGap,
    #[serde(rename = "Orders Missing Commission")]
    OrdersMissingCommission,
    #[serde(rename = "Commissions Missing Order")]
    CommissionsMissingOrder,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::PerfectMatch,
        Category::CommissionGap,
        Category::OrdersMissingCommission,
        Category::CommissionsMissingOrder,
    ];

    /// Label shown in summary tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PerfectMatch => "Perfect Match",
            Self::CommissionGap => "Commission Gap",
            Self::OrdersMissingCommission => "Orders Missing Commission",
            Self::CommissionsMissingOrder => "Commissions Missing Order",
        }
    }

    /// Name of the partition table / workbook sheet.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::PerfectMatch => "matches",
            Self::CommissionGap => "commission_gap",
            Self::OrdersMissingCommission => "orders_missing_commission",
            Self::CommissionsMissingOrder => "commissions_missing_order",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRecord {
    pub category: Category,
    #[serde(flatten)]
    pub record: JoinedRecord,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Record count plus the three monetary sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub records: usize,
    pub expected_commission: Decimal,
    pub billed_commission: Decimal,
    pub commission_gap: Decimal,
}

impl Totals {
    pub fn add(&mut self, record: &JoinedRecord) {
        self.records += 1;
        self.expected_commission += record.expected_commission;
        self.billed_commission += record.billed_commission;
        self.commission_gap += record.commission_gap;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub category: Category,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSummaryRow {
    pub category: Category,
    pub provider: String,
    #[serde(flatten)]
    pub totals: Totals,
}

// ---------------------------------------------------------------------------
// Run bookkeeping
// ---------------------------------------------------------------------------

/// Non-fatal counters collected while extracting records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub order_rows: usize,
    pub commission_rows: usize,
    /// Rows dropped because the locator cell was empty.
    pub skipped_missing_key: usize,
    /// Non-empty amount cells that could not be parsed and were read as 0.
    pub coerced_amounts: usize,
}
