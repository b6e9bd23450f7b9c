//! Layer matrix sources.
//!
//! The engine never parses raw assay files; it receives finished
//! [`LayerMatrix`] values through this seam. Implementations can use:
//! - matrices already held in memory (tests, embedding callers)
//! - JSON matrix files on disk (the `omyx` CLI)

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use omyx_common::{LayerMatrix, LayerType, OmyxError, Result};

/// Anything that can produce the layer matrices of one run.
pub trait LayerSource: Send + Sync {
    /// Produce every matrix, in the order the source holds them.
    fn load_layers(&self) -> Result<Vec<LayerMatrix>>;
}

// ── In-memory source ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemoryLayerSource {
    layers: Vec<LayerMatrix>,
}

impl InMemoryLayerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, matrix: LayerMatrix) -> Self {
        self.layers.push(matrix);
        self
    }
}

impl LayerSource for InMemoryLayerSource {
    fn load_layers(&self) -> Result<Vec<LayerMatrix>> {
        Ok(self.layers.clone())
    }
}

// ── JSON file source ────────────────────────────────────────────────────────

/// Reads matrices from JSON files in the `LayerMatrix` wire form.
///
/// The layer type comes from, in order: an explicit override, the file's own
/// `layer_type` field, then the file name.
#[derive(Debug, Clone, Default)]
pub struct JsonFileLayerSource {
    files: Vec<(PathBuf, Option<LayerType>)>,
}

impl JsonFileLayerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, layer_type: Option<LayerType>) -> Self {
        self.files.push((path.into(), layer_type));
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn load_file(path: &Path, layer_type: Option<LayerType>) -> Result<LayerMatrix> {
        let text = fs::read_to_string(path)?;
        let mut value: Value = serde_json::from_str(&text)?;
        let obj = value.as_object_mut().ok_or_else(|| {
            OmyxError::InvalidMatrix(format!("{}: expected a JSON object", path.display()))
        })?;

        let resolved = match (layer_type, obj.get("layer_type")) {
            (Some(t), _) => t,
            (None, Some(Value::String(label))) => LayerType::parse(label)?,
            (None, _) => {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                LayerType::detect_from_filename(name)
            }
        };
        obj.insert("layer_type".to_string(), Value::String(resolved.as_str().to_string()));

        let matrix: LayerMatrix = serde_json::from_value(value)?;
        debug!(path = %path.display(), layer = %resolved, shape = ?matrix.shape(), "Loaded layer matrix");
        Ok(matrix)
    }
}

impl LayerSource for JsonFileLayerSource {
    fn load_layers(&self) -> Result<Vec<LayerMatrix>> {
        self.files
            .iter()
            .map(|(path, layer_type)| Self::load_file(path, *layer_type))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omyx_test_utils::matrix;
    use std::io::Write;

    fn write_json(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_in_memory_source() {
        let source = InMemoryLayerSource::new()
            .with(matrix(LayerType::Expression, &[("A", &[1.0])]))
            .with(matrix(LayerType::Cnv, &[("B", &[0.5])]));
        let layers = source.load_layers().unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1].layer_type(), LayerType::Cnv);
    }

    #[test]
    fn test_json_source_type_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"{"genes": ["TP53"], "samples": ["s1", "s2"], "values": [[1.0, null]]}"#;
        let tagged = r#"{"layer_type": "cnv", "genes": ["ERBB2"], "samples": ["s1"], "values": [[0.8]]}"#;

        let by_name = write_json(dir.path(), "brca_mutation.json", body);
        let by_field = write_json(dir.path(), "expression_like_name.json", tagged);
        let by_override = write_json(dir.path(), "data.json", body);

        let layers = JsonFileLayerSource::new()
            .with_file(&by_name, None)
            .with_file(&by_field, None)
            .with_file(&by_override, Some(LayerType::Methylation))
            .load_layers()
            .unwrap();

        let types: Vec<LayerType> = layers.iter().map(|m| m.layer_type()).collect();
        assert_eq!(types, vec![LayerType::Mutation, LayerType::Cnv, LayerType::Methylation]);
        assert!(layers[0].row(0).unwrap()[1].is_nan());
    }

    #[test]
    fn test_json_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let not_object = write_json(dir.path(), "a.json", "[1, 2]");
        let bad_label = write_json(
            dir.path(),
            "b.json",
            r#"{"layer_type": "rnaseq", "genes": [], "samples": [], "values": []}"#,
        );

        let err = JsonFileLayerSource::new().with_file(&not_object, None).load_layers().unwrap_err();
        assert!(matches!(err, OmyxError::InvalidMatrix(_)));

        let err = JsonFileLayerSource::new().with_file(&bad_label, None).load_layers().unwrap_err();
        assert!(matches!(err, OmyxError::UnknownLayerType(_)));

        let err = JsonFileLayerSource::new()
            .with_file(dir.path().join("missing.json"), None)
            .load_layers()
            .unwrap_err();
        assert!(matches!(err, OmyxError::Io(_)));
    }
}
