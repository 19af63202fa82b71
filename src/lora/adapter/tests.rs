//! Tests for adapter save/load

use super::*;
use crate::lora::LoRALinearLayer;
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

fn trained_layer() -> LoRALinearLayer {
    let mut layer = LoRALinearLayer::with_seed(4, 6, 2, 4.0, 42).unwrap();
    let b_len = layer.lora_b().len();
    // Give B non-zero values so the round trip is observable in forward output
    *layer.lora_b_mut().data_mut() =
        ndarray::Array1::from_vec((0..b_len).map(|i| (i as f32 * 0.3).sin() * 0.1).collect());
    layer
}

#[test]
fn test_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adapter.json");

    let layer = trained_layer();
    save_adapter(&layer, &path).unwrap();

    let loaded = load_adapter(&path).unwrap();

    assert_eq!(loaded.in_features(), layer.in_features());
    assert_eq!(loaded.out_features(), layer.out_features());
    assert_eq!(loaded.rank(), layer.rank());
    assert_abs_diff_eq!(loaded.scale(), layer.scale(), epsilon = 1e-6);

    for i in 0..layer.lora_a().len() {
        assert_eq!(loaded.lora_a().data()[i], layer.lora_a().data()[i]);
    }
    for i in 0..layer.lora_b().len() {
        assert_eq!(loaded.lora_b().data()[i], layer.lora_b().data()[i]);
    }
}

#[test]
fn test_round_trip_preserves_forward_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adapter.json");

    let layer = trained_layer();
    save_adapter(&layer, &path).unwrap();
    let loaded = load_adapter(&path).unwrap();

    let x = Tensor::from_vec(vec![3, 4], (0..12).map(|i| i as f32 * 0.25).collect(), false).unwrap();
    let expected = layer.forward(&x).unwrap();
    let actual = loaded.forward(&x).unwrap();

    assert_eq!(actual.shape(), expected.shape());
    for i in 0..expected.len() {
        assert_eq!(actual.data()[i], expected.data()[i]);
    }
}

#[test]
fn test_metadata() {
    let layer = trained_layer();
    let adapter = LoRAAdapter::from_layer(&layer);
    let meta = adapter.metadata();

    assert_eq!(meta.version, "1.0");
    assert_eq!(meta.rank, 2);
    assert_abs_diff_eq!(meta.alpha, 4.0, epsilon = 1e-6);
    assert_eq!(meta.in_features, 4);
    assert_eq!(meta.out_features, 6);
    assert_abs_diff_eq!(meta.scale, 2.0, epsilon = 1e-6);
    assert_eq!(meta.num_params, 2 * 4 + 6 * 2);
}

#[test]
fn test_load_rejects_wrong_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adapter.json");

    let adapter = LoRAAdapter::from_layer(&trained_layer());
    let mut value = serde_json::to_value(&adapter).unwrap();
    value["version"] = serde_json::json!("0.9");
    std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

    let err = LoRAAdapter::load(&path).unwrap_err();
    assert!(matches!(err, AdapterError::Validation(_)));
    assert!(err.to_string().contains("0.9"));
}

#[test]
fn test_to_layer_rejects_mismatched_weights() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adapter.json");

    let adapter = LoRAAdapter::from_layer(&trained_layer());
    let mut value = serde_json::to_value(&adapter).unwrap();
    // Truncate lora_a so its length no longer matches rank * in_features
    value["lora_a"] = serde_json::json!([1.0, 2.0]);
    std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

    let err = load_adapter(&path).unwrap_err();
    assert!(matches!(err, AdapterError::DimensionMismatch { .. }));
}

#[test]
fn test_load_missing_file() {
    let err = LoRAAdapter::load("/nonexistent/adapter.json").unwrap_err();
    assert!(matches!(err, AdapterError::Io(_)));
}

#[test]
fn test_load_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adapter.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = LoRAAdapter::load(&path).unwrap_err();
    assert!(matches!(err, AdapterError::Serialization(_)));
}
