//! Profile filename grammar: `<Brand><Model>-<Scene>.<ext>`.

use std::path::Path;

use crate::types::Brand;

/// Extensions recognized as color profiles.
pub const PROFILE_EXTENSIONS: &[&str] = &["icm", "icc"];

/// Pseudo-brand for profiles that are not tied to a camera.
pub const FILESYSTEM_BRAND: &str = "FileSystem";

/// Scene used when a `FileSystem` profile names none.
const DEFAULT_FILESYSTEM_SCENE: &str = "Neutral";

/// Canonical scene names keyed by their lowercase spelling.
const SCENE_ALIASES: &[(&str, &str)] = &[
    ("neutral", "Neutral"),
    ("standard", "Standard"),
    ("vivid", "Vivid"),
    ("portrait", "Portrait"),
    ("landscape", "Landscape"),
    ("monochrome", "Monochrome"),
    ("flat", "Flat"),
    ("generic", "Generic"),
    ("prostandard", "ProStandard"),
    ("apple", "Apple"),
    ("daylight", "Daylight"),
    ("flash", "Flash"),
    ("sunset", "Sunset"),
    ("tungsten", "Tungsten"),
];

/// The (brand, model, scene) triple a profile file describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileKey {
    pub brand: String,
    pub model: String,
    pub scene: String,
}

impl ProfileKey {
    pub fn new(brand: impl Into<String>, model: impl Into<String>, scene: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
            scene: scene.into(),
        }
    }
}

/// Whether `path` carries a profile extension (any case).
pub fn is_profile_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            PROFILE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Parse a profile file name into its triple.
///
/// Returns `None` for names that start with no known brand, lack the
/// `-<Scene>` suffix, or have an empty model.
pub fn parse_profile_name(path: &Path) -> Option<ProfileKey> {
    let stem = path.file_stem()?.to_str()?.trim();

    if let Some(rest) = stem.strip_prefix(FILESYSTEM_BRAND) {
        let (name, scene) = match rest.rsplit_once('-') {
            Some((name, scene)) => (name, normalize_scene(scene)),
            None => (rest, DEFAULT_FILESYSTEM_SCENE.to_string()),
        };
        let name = strip_whitespace(name);
        if name.is_empty() || scene.is_empty() {
            return None;
        }
        return Some(ProfileKey::new(FILESYSTEM_BRAND, name, scene));
    }

    let brand = Brand::KNOWN.iter().find(|brand| {
        stem.get(..brand.as_str().len())
            .map(|prefix| prefix.eq_ignore_ascii_case(brand.as_str()))
            .unwrap_or(false)
    })?;

    let rest = &stem[brand.as_str().len()..];
    let (model, scene) = rest.rsplit_once('-')?;
    let model = strip_whitespace(model);
    let scene = normalize_scene(scene);
    if model.is_empty() || scene.is_empty() {
        return None;
    }

    Some(ProfileKey::new(brand.as_str(), model, scene))
}

/// Map a scene token to its canonical name.
///
/// Trailing version markers (`"Vivid V2"`) are dropped; unknown scenes are
/// title-cased.
pub fn normalize_scene(scene: &str) -> String {
    let scene = strip_version_suffix(scene.trim());
    let lower = scene.to_lowercase();

    SCENE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| title_case(scene))
}

fn strip_version_suffix(scene: &str) -> &str {
    let Some((head, tail)) = scene.rsplit_once(char::is_whitespace) else {
        return scene;
    };
    let is_version = tail.len() > 1
        && tail.starts_with('V')
        && tail[1..].chars().all(|c| c.is_ascii_digit());
    if is_version {
        head.trim_end()
    } else {
        scene
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphabetic();
    }
    out
}
