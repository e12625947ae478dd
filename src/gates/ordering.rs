//! Fixed gate execution order

use crate::plan::schema::QualityGateConfig;

/// Gates in execution order: by kind priority, required before optional,
/// then by identifier. Input order never matters.
pub fn execution_order(gates: &[QualityGateConfig]) -> Vec<&QualityGateConfig> {
    let mut ordered: Vec<&QualityGateConfig> = gates.iter().collect();
    ordered.sort_by(|a, b| {
        a.kind
            .priority()
            .cmp(&b.kind.priority())
            .then_with(|| b.required.cmp(&a.required))
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered
}
