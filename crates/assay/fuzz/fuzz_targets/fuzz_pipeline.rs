//! Fuzz target for the full prepare-and-assess pipeline.
//!
//! Arbitrary cell contents go through inference, cleaning, derivations,
//! rules, profiling and outlier detection. None of it may panic.

#![no_main]

use arbitrary::Arbitrary;
use assay::{Assay, Parser, ReferenceKeys};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    table: u8,
    cells: Vec<(String, String, String)>,
}

const TABLES: &[(&str, &str)] = &[
    ("orders", "order_quantity,order_cost,expected_delivery_date"),
    ("inventory", "quantity_on_hand,quantity_reserved,product_id"),
    ("sales", "quantity_sold,revenue,product_id"),
    ("suppliers", "supplier_id,reliability_score,name"),
];

fuzz_target!(|input: Input| {
    if input.cells.len() > 500 {
        return;
    }

    let (table, header) = TABLES[input.table as usize % TABLES.len()];
    let mut text = format!("{}\n", header);
    for (a, b, c) in &input.cells {
        let clean = |s: &str| s.replace([',', '\n', '\r', '"'], " ");
        text.push_str(&format!("{},{},{}\n", clean(a), clean(b), clean(c)));
    }

    let Ok(dataset) = Parser::new().parse_str(&text) else {
        return;
    };
    if let Ok(mut assay) = Assay::new() {
        let outcome = assay.run([(table, &dataset)], &ReferenceKeys::new());
        let _ = outcome.bundle().to_json_pretty();
    }
});
