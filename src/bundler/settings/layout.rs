//! Naming conventions of the installable bundle.

/// Directory and file names the installer expects.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BundleLayout {
    /// Directory the source archive must extract to.
    pub payload_dir: String,
    /// Name the payload directory is renamed to.
    pub bundle_root: String,
    /// File inside the bundle recording the engine name.
    pub marker_file: String,
    /// Extension of the compressed artifact, after `.tar`.
    pub compressed_ext: String,
}

impl Default for BundleLayout {
    fn default() -> Self {
        Self {
            payload_dir: "usr".to_string(),
            bundle_root: "wswine.bundle".to_string(),
            marker_file: "version".to_string(),
            compressed_ext: "7z".to_string(),
        }
    }
}

impl BundleLayout {
    /// File name of the uncompressed container for `engine`.
    pub fn container_name(&self, engine: &str) -> String {
        format!("{engine}.tar")
    }

    /// File name of the delivered artifact for `engine`.
    pub fn artifact_name(&self, engine: &str) -> String {
        format!("{engine}.tar.{}", self.compressed_ext)
    }
}
