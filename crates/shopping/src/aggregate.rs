use std::collections::HashMap;

/// One recipe-ingredient row as read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub ingredient_id: i64,
    pub name: String,
    pub unit: String,
    pub quantity: i64,
}

/// Per-ingredient running total. Transient, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedLine {
    pub ingredient_id: i64,
    pub name: String,
    pub unit: String,
    pub total: i64,
}

/// Two lines for the same ingredient disagreed on the unit of measure.
///
/// The first-seen unit wins; the discrepancy is reported instead of
/// silently overwritten so the caller can log or surface it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitConflict {
    pub ingredient_id: i64,
    pub name: String,
    pub kept: String,
    pub ignored: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingSummary {
    pub lines: Vec<AggregatedLine>,
    pub conflicts: Vec<UnitConflict>,
}

impl ShoppingSummary {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Merge ingredient lines into one total per ingredient.
///
/// Buckets are keyed by the ingredient's durable id, not its display
/// name, so identically-named but distinct ingredients never merge.
/// Quantities sum as exact integers. The result is sorted by display
/// name (id as tie-break) so output is deterministic regardless of
/// input order. An empty input yields an empty summary.
pub fn aggregate(lines: impl IntoIterator<Item = IngredientLine>) -> ShoppingSummary {
    let mut buckets: HashMap<i64, AggregatedLine> = HashMap::new();
    let mut conflicts = Vec::new();

    for line in lines {
        match buckets.get_mut(&line.ingredient_id) {
            Some(bucket) => {
                if bucket.unit != line.unit {
                    conflicts.push(UnitConflict {
                        ingredient_id: line.ingredient_id,
                        name: bucket.name.clone(),
                        kept: bucket.unit.clone(),
                        ignored: line.unit,
                    });
                }
                bucket.total += line.quantity;
            }
            None => {
                buckets.insert(
                    line.ingredient_id,
                    AggregatedLine {
                        ingredient_id: line.ingredient_id,
                        name: line.name,
                        unit: line.unit,
                        total: line.quantity,
                    },
                );
            }
        }
    }

    let mut lines: Vec<AggregatedLine> = buckets.into_values().collect();
    lines.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then(a.ingredient_id.cmp(&b.ingredient_id))
    });

    ShoppingSummary { lines, conflicts }
}
