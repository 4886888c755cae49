//! Camera identification from embedded metadata.
//!
//! Normalization maps raw make/model strings to a canonical
//! [`NormalizedCamera`] used for profile lookup:
//!
//! 1. Resolve the brand from the make (exact, then substring match).
//! 2. Infer the brand from model prefixes when the make gave nothing.
//! 3. Run the generic model cleanup rules in a fixed order.
//! 4. Run the brand's own rewrite rules.
//!
//! Every step is written so that normalizing an already-normalized pair is
//! a no-op.

mod rules;

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

use crate::error::ConversionError;
use crate::pipeline::ImageCodec;
use crate::types::{Brand, CameraInfo, NormalizedCamera, UNKNOWN_MODEL};

use rules::{RewriteRule, BRAND_ALIASES, BRAND_INFERENCE, FAMILY_PREFIXES, MANUFACTURER_TOKENS};

/// Extracts and normalizes camera identity from image files.
///
/// Constructed once per engine and shared read-only by all workers.
pub struct CameraIdentifier {
    inference: Vec<(Regex, Brand)>,
    manufacturer_tokens: Regex,
    cleanup: Vec<RewriteRule>,
    whitespace: Regex,
    brand_rules: HashMap<Brand, Vec<RewriteRule>>,
}

impl Default for CameraIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraIdentifier {
    pub fn new() -> Self {
        let inference = BRAND_INFERENCE
            .iter()
            .map(|(pattern, brand)| (rules::compile(pattern), *brand))
            .collect();

        let cleanup = vec![
            RewriteRule::new(MANUFACTURER_TOKENS, ""),
            RewriteRule::new(FAMILY_PREFIXES, ""),
            RewriteRule::new(r"[()]", ""),
            RewriteRule::new(r"\s*-\s*", "-"),
        ];

        Self {
            inference,
            manufacturer_tokens: rules::compile(MANUFACTURER_TOKENS),
            cleanup,
            whitespace: rules::compile(r"\s+"),
            brand_rules: rules::brand_rules(),
        }
    }

    /// Read and normalize the camera that produced `path`.
    ///
    /// Returns `None` (with a warning) when the file has no usable make or
    /// model. Never fails a batch.
    pub fn identify(&self, codec: &dyn ImageCodec, path: &Path) -> Option<NormalizedCamera> {
        let info = match codec.read_camera_metadata(path) {
            Some(info) if !info.is_empty() => info,
            _ => {
                let err = ConversionError::MetadataUnavailable {
                    path: path.to_path_buf(),
                };
                tracing::warn!("{err}");
                return None;
            }
        };

        let camera = self.normalize(&info);
        tracing::debug!(
            "Identified {:?} as {} (make={:?}, model={:?})",
            path,
            camera,
            info.make,
            info.model
        );
        Some(camera)
    }

    /// Normalize a raw make/model pair.
    pub fn normalize(&self, info: &CameraInfo) -> NormalizedCamera {
        let mut brand = self.normalize_brand(&info.make);
        if !brand.is_known() {
            brand = self.infer_brand(&info.model);
        }

        NormalizedCamera {
            brand,
            model: self.normalize_model(&info.model, brand),
        }
    }

    /// Map a manufacturer string to a canonical brand.
    pub fn normalize_brand(&self, make: &str) -> Brand {
        let make = make.trim().to_lowercase();
        if make.is_empty() {
            return Brand::Unknown;
        }

        if let Some((_, brand)) = BRAND_ALIASES.iter().find(|(alias, _)| *alias == make) {
            return *brand;
        }
        if let Some(brand) = Brand::KNOWN
            .iter()
            .find(|brand| brand.as_str().to_lowercase() == make)
        {
            return *brand;
        }

        if let Some((_, brand)) = BRAND_ALIASES.iter().find(|(alias, _)| make.contains(alias)) {
            return *brand;
        }

        // Truncated makes ("fuji") only match brand names, never the
        // corporate suffixes of longer aliases
        if make.len() < 4 {
            return Brand::Unknown;
        }
        Brand::KNOWN
            .iter()
            .find(|brand| brand.as_str().to_lowercase().contains(&make))
            .copied()
            .unwrap_or(Brand::Unknown)
    }

    /// Guess the brand from the model string alone.
    fn infer_brand(&self, model: &str) -> Brand {
        let model = model.trim();
        if model.is_empty() {
            return Brand::Unknown;
        }

        // "Canon EOS R5" with an empty make still names its manufacturer
        if let Some(token) = self.manufacturer_tokens.captures(model).and_then(|c| c.get(1)) {
            let brand = self.normalize_brand(token.as_str());
            if brand.is_known() {
                return brand;
            }
        }

        self.inference
            .iter()
            .find(|(pattern, _)| pattern.is_match(model))
            .map(|(_, brand)| *brand)
            .unwrap_or(Brand::Unknown)
    }

    fn normalize_model(&self, model: &str, brand: Brand) -> String {
        let mut cleaned = self.collapse(model);
        for rule in &self.cleanup {
            cleaned = self.collapse(&rule.apply(&cleaned));
        }

        if let Some(rules) = self.brand_rules.get(&brand) {
            for rule in rules {
                cleaned = self.collapse(&rule.apply(&cleaned));
            }
        }

        if cleaned.is_empty() {
            UNKNOWN_MODEL.to_string()
        } else {
            cleaned
        }
    }

    fn collapse(&self, s: &str) -> String {
        self.whitespace.replace_all(s.trim(), " ").into_owned()
    }
}
