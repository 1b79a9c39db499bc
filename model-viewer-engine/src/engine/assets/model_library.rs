use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// One selectable model in the viewer library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub url: String,
}

/// Viewer configuration as a Bevy asset. Mirrors the JSON structure exactly.
#[derive(Asset, Debug, Clone, Serialize, Deserialize, TypePath, Resource)]
pub struct ViewerManifest {
    pub models: Vec<ModelEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_url: Option<String>,
    #[serde(default)]
    pub default_model: usize,
}

impl ViewerManifest {
    /// Entry the viewer displays on startup, if the library has any.
    /// An out-of-range default index falls back to the first entry.
    pub fn default_entry(&self) -> Option<&ModelEntry> {
        self.models
            .get(self.default_model)
            .or_else(|| self.models.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialises_manifest_json() {
        let manifest: ViewerManifest = serde_json::from_str(
            r#"{
                "models": [
                    { "name": "Helmet", "url": "models/helmet.glb" },
                    { "name": "Chair", "url": "models/chair.gltf" }
                ],
                "environment_url": "environments/studio.ktx2",
                "default_model": 1
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.models.len(), 2);
        assert_eq!(manifest.default_entry().unwrap().name, "Chair");
        assert_eq!(
            manifest.environment_url.as_deref(),
            Some("environments/studio.ktx2")
        );
    }

    #[test]
    fn default_model_index_is_optional_and_clamped() {
        let manifest: ViewerManifest = serde_json::from_str(
            r#"{ "models": [{ "name": "Helmet", "url": "models/helmet.glb" }] }"#,
        )
        .unwrap();
        assert_eq!(manifest.default_model, 0);
        assert_eq!(manifest.default_entry().unwrap().name, "Helmet");

        let out_of_range: ViewerManifest = serde_json::from_str(
            r#"{ "models": [{ "name": "Helmet", "url": "models/helmet.glb" }], "default_model": 9 }"#,
        )
        .unwrap();
        assert_eq!(out_of_range.default_entry().unwrap().name, "Helmet");
    }

    #[test]
    fn empty_library_has_no_default_entry() {
        let manifest: ViewerManifest = serde_json::from_str(r#"{ "models": [] }"#).unwrap();
        assert!(manifest.default_entry().is_none());
    }
}
