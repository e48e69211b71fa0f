//! End-to-end integration tests: CSV/JSON -> build -> tree JSON -> read back -> predict.

use std::fs;
use std::path::{Path, PathBuf};

use arbor_io::{CsvReader, IoError, RequestReader, TreeReader, TreeWriter};
use arbor_tree::{
    Algorithm, TreeConfig, TreeNode, Value, build_classification_tree, build_tree, predict_batch,
};
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn csv_to_tree_round_trip() {
    // 1. Read CSV; the last column is the target
    let table = CsvReader::new(&fixture_path("play_tennis.csv"))
        .read()
        .expect("fixture should parse");
    assert_eq!(table.rows().len(), 14);
    assert_eq!(table.default_target(), "PlayTennis");

    // 2. Build
    let attributes = table.default_attributes();
    let tree = build_classification_tree(table.rows(), table.default_target(), &attributes)
        .unwrap();

    // 3. Write JSON
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("models").join("tennis.json");
    TreeWriter::new(&path).unwrap().write(&tree).unwrap();

    // 4. Inspect the raw wire shape
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["type"], "decision");
    assert_eq!(raw["attribute"], "Outlook");
    assert_eq!(raw["dataCount"], 14);
    assert_eq!(raw["subtrees"]["Overcast"]["type"], "leaf");
    assert_eq!(raw["subtrees"]["Overcast"]["prediction"], "Yes");

    // 5. Read back and predict every training row
    let restored = TreeReader::new(&path).read().unwrap();
    assert_eq!(restored, tree);
    for (row, prediction) in table.rows().iter().zip(predict_batch(&restored, table.rows())) {
        assert_eq!(prediction.unwrap(), row["PlayTennis"]);
    }
}

#[test]
fn request_file_builds_tree() {
    let request = RequestReader::new(&fixture_path("request.json"))
        .read()
        .unwrap();
    let tree =
        build_classification_tree(&request.dataset, &request.target_attribute, &request.attributes)
            .unwrap();
    assert_eq!(tree.n_samples(), 5);
    let TreeNode::Decision { split, .. } = &tree else {
        panic!("expected a decision root");
    };
    assert_eq!(split.attribute(), "windy");
}

#[test]
fn numeric_csv_regression_round_trip() {
    let table = CsvReader::new(&fixture_path("house_prices.csv")).read().unwrap();
    assert_eq!(table.rows()[0]["price"], Value::Int(10));

    let config = TreeConfig::new(Algorithm::Regression);
    let tree = build_tree(
        table.rows(),
        table.default_target(),
        &table.default_attributes(),
        &config,
    )
    .unwrap();
    assert!(tree.depth() <= config.max_depth());

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prices.json");
    TreeWriter::new(&path).unwrap().write(&tree).unwrap();
    let restored = TreeReader::new(&path).read().unwrap();
    assert_eq!(restored, tree);

    for row in table.rows().iter().filter(|r| r["rooms"] != Value::Int(5)) {
        let expected = row["price"].as_f64().unwrap();
        assert_eq!(restored.predict(row).unwrap(), &Value::Float(expected));
    }
}

#[test]
fn ragged_csv_rejected() {
    let err = CsvReader::new(&fixture_path("ragged.csv")).read().unwrap_err();
    assert!(matches!(err, IoError::InconsistentRowLength { row_index: 1, .. }));
}

#[test]
fn header_only_csv_rejected() {
    let err = CsvReader::new(&fixture_path("header_only.csv")).read().unwrap_err();
    assert!(matches!(err, IoError::EmptyDataset { .. }));
}
