/// Viewer configuration manifest, relative to the asset root.
pub const VIEWER_MANIFEST_PATH: &str = "viewer_manifest.json";
