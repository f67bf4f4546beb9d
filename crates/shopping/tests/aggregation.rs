use tastebook_shopping::{IngredientLine, aggregate};

fn line(ingredient_id: i64, name: &str, unit: &str, quantity: i64) -> IngredientLine {
    IngredientLine {
        ingredient_id,
        name: name.to_string(),
        unit: unit.to_string(),
        quantity,
    }
}

#[test]
fn empty_input_yields_empty_summary() {
    let summary = aggregate(vec![]);
    assert!(summary.is_empty());
    assert!(summary.lines.is_empty());
    assert!(summary.conflicts.is_empty());
}

#[test]
fn sums_shared_ingredients_across_recipes() {
    // Recipe A: Flour 200g, Egg 2pcs. Recipe B: Flour 100g.
    let summary = aggregate(vec![
        line(1, "Flour", "g", 200),
        line(2, "Egg", "pcs", 2),
        line(1, "Flour", "g", 100),
    ]);

    assert!(summary.conflicts.is_empty());
    assert_eq!(summary.lines.len(), 2);

    // Sorted by name: Egg before Flour.
    assert_eq!(summary.lines[0].name, "Egg");
    assert_eq!(summary.lines[0].unit, "pcs");
    assert_eq!(summary.lines[0].total, 2);
    assert_eq!(summary.lines[1].name, "Flour");
    assert_eq!(summary.lines[1].unit, "g");
    assert_eq!(summary.lines[1].total, 300);
}

#[test]
fn totals_are_exact_integer_sums() {
    let lines: Vec<_> = (0..1000).map(|_| line(7, "Sugar", "g", 3)).collect();
    let summary = aggregate(lines);

    assert_eq!(summary.lines.len(), 1);
    assert_eq!(summary.lines[0].total, 3000);
}

#[test]
fn aggregation_is_idempotent() {
    let input = vec![
        line(3, "Milk", "ml", 250),
        line(1, "Flour", "g", 200),
        line(3, "Milk", "ml", 100),
    ];

    let first = aggregate(input.clone());
    let second = aggregate(input);
    assert_eq!(first, second);
}

#[test]
fn output_order_is_independent_of_input_order() {
    let forward = aggregate(vec![
        line(1, "Flour", "g", 200),
        line(2, "Egg", "pcs", 2),
        line(3, "Milk", "ml", 250),
    ]);
    let backward = aggregate(vec![
        line(3, "Milk", "ml", 250),
        line(2, "Egg", "pcs", 2),
        line(1, "Flour", "g", 200),
    ]);

    assert_eq!(forward, backward);
    let names: Vec<_> = forward.lines.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["Egg", "Flour", "Milk"]);
}

#[test]
fn identically_named_ingredients_with_distinct_ids_do_not_merge() {
    let summary = aggregate(vec![
        line(1, "Pepper", "g", 10),
        line(2, "Pepper", "pcs", 1),
    ]);

    assert_eq!(summary.lines.len(), 2);
    assert!(summary.conflicts.is_empty());
    // Same name, ordered by id.
    assert_eq!(summary.lines[0].ingredient_id, 1);
    assert_eq!(summary.lines[1].ingredient_id, 2);
}

#[test]
fn unit_mismatch_is_reported_and_first_unit_kept() {
    let summary = aggregate(vec![
        line(5, "Butter", "g", 100),
        line(5, "Butter", "ml", 50),
    ]);

    assert_eq!(summary.lines.len(), 1);
    assert_eq!(summary.lines[0].unit, "g");
    // Quantities still sum even when the unit disagrees.
    assert_eq!(summary.lines[0].total, 150);

    assert_eq!(summary.conflicts.len(), 1);
    let conflict = &summary.conflicts[0];
    assert_eq!(conflict.ingredient_id, 5);
    assert_eq!(conflict.kept, "g");
    assert_eq!(conflict.ignored, "ml");
}
