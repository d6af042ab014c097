use std::collections::BTreeMap;

use crate::model::{Category, ClassifiedRecord, ProviderSummaryRow, SummaryRow, Totals};

/// Category totals (always four rows, fixed order) and the
/// category x provider breakdown (only combinations that have records).
pub fn summarize(classified: &[ClassifiedRecord]) -> (Vec<SummaryRow>, Vec<ProviderSummaryRow>) {
    let mut by_category: BTreeMap<Category, Totals> =
        Category::ALL.iter().map(|c| (*c, Totals::default())).collect();
    let mut by_provider: BTreeMap<(Category, &str), Totals> = BTreeMap::new();

    for c in classified {
        by_category.entry(c.category).or_default().add(&c.record);
        by_provider
            .entry((c.category, c.record.provider.as_str()))
            .or_default()
            .add(&c.record);
    }

    let summary = by_category
        .into_iter()
        .map(|(category, totals)| SummaryRow { category, totals })
        .collect();

    let providers = by_provider
        .into_iter()
        .map(|((category, provider), totals)| ProviderSummaryRow {
            category,
            provider: provider.to_string(),
            totals,
        })
        .collect();

    (summary, providers)
}
