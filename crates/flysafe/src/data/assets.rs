//! Aircraft image lookup.

use std::path::{Path, PathBuf};

use tracing::trace;

/// URL prefix the server mounts the assets directory under.
pub const ASSET_URL_PREFIX: &str = "assets";

/// Placeholder used when a type has no image.
pub const UNKNOWN_IMAGE: &str = "aircraft/Unknown.svg";

/// Maps aircraft types to image URLs under the assets directory.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    root: PathBuf,
}

impl AssetResolver {
    /// Resolve images inside `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The assets directory on disk.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Image URL for `aircraft_type`, or the placeholder when the file is
    /// missing.
    #[must_use]
    pub fn image_for(&self, aircraft_type: &str) -> String {
        let relative = format!("aircraft/{}.svg", image_stem(aircraft_type));
        if !relative.ends_with("/.svg") && self.root.join(&relative).is_file() {
            format!("{ASSET_URL_PREFIX}/{relative}")
        } else {
            trace!(aircraft_type, "no image, using placeholder");
            format!("{ASSET_URL_PREFIX}/{UNKNOWN_IMAGE}")
        }
    }
}

/// `"B737 MAX-8"` becomes `"B737MAX8"`.
#[must_use]
pub fn image_stem(aircraft_type: &str) -> String {
    aircraft_type
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_stem() {
        assert_eq!(image_stem("B737 MAX-8"), "B737MAX8");
        assert_eq!(image_stem("md-82"), "MD82");
        assert_eq!(image_stem("ATR 72"), "ATR72");
        assert_eq!(image_stem(""), "");
    }

    #[test]
    fn test_missing_image_falls_back() {
        let assets = AssetResolver::new("/nonexistent/assets");
        assert_eq!(assets.image_for("A320"), "assets/aircraft/Unknown.svg");
        assert_eq!(assets.image_for(""), "assets/aircraft/Unknown.svg");
    }

    #[test]
    fn test_existing_image_is_used() {
        let root = std::env::temp_dir().join(format!("flysafe-assets-{}", std::process::id()));
        std::fs::create_dir_all(root.join("aircraft")).unwrap();
        std::fs::write(root.join("aircraft/B737MAX.svg"), "<svg/>").unwrap();

        let assets = AssetResolver::new(&root);
        assert_eq!(assets.image_for("B737 MAX"), "assets/aircraft/B737MAX.svg");
        assert_eq!(assets.image_for("A380"), "assets/aircraft/Unknown.svg");

        std::fs::remove_dir_all(&root).unwrap();
    }
}
