//! Built-in brand aliases and model rewrite rules.

use regex::Regex;
use std::collections::HashMap;

use crate::types::Brand;

/// Manufacturer strings as cameras write them, lowercased, mapped to the
/// canonical brand. Order matters for substring matching.
pub(super) const BRAND_ALIASES: &[(&str, Brand)] = &[
    ("canon", Brand::Canon),
    ("canon inc.", Brand::Canon),
    ("nikon", Brand::Nikon),
    ("nikon corporation", Brand::Nikon),
    ("sony", Brand::Sony),
    ("sony corporation", Brand::Sony),
    ("fujifilm", Brand::Fujifilm),
    ("fujifilm corporation", Brand::Fujifilm),
    ("fuji photo film co., ltd.", Brand::Fujifilm),
    ("olympus", Brand::Olympus),
    ("olympus corporation", Brand::Olympus),
    ("olympus imaging corp.", Brand::Olympus),
    ("om digital solutions", Brand::Olympus),
    ("panasonic", Brand::Panasonic),
    ("leica", Brand::Leica),
    ("leica camera ag", Brand::Leica),
    ("pentax", Brand::Pentax),
    ("pentax corporation", Brand::Pentax),
    ("ricoh imaging company, ltd.", Brand::Pentax),
    ("ricoh", Brand::Pentax),
    ("samsung", Brand::Samsung),
    ("samsung techwin", Brand::Samsung),
    ("apple", Brand::Apple),
    ("hasselblad", Brand::Hasselblad),
    ("phase one", Brand::PhaseOne),
    ("phaseone", Brand::PhaseOne),
    ("mamiya", Brand::Mamiya),
    ("leaf", Brand::Leaf),
    ("contax", Brand::Contax),
    ("kodak", Brand::Kodak),
    ("eastman kodak company", Brand::Kodak),
];

/// Model prefixes that identify a brand when the make is missing.
pub(super) const BRAND_INFERENCE: &[(&str, Brand)] = &[
    (r"(?i)^EOS\b", Brand::Canon),
    (r"(?i)^PowerShot", Brand::Canon),
    (r"(?i)^IXUS", Brand::Canon),
    (r"(?i)^D\d+", Brand::Nikon),
    (r"(?i)^Z\s*\d+", Brand::Nikon),
    (r"(?i)^COOLPIX", Brand::Nikon),
    (r"(?i)^ILCE-", Brand::Sony),
    (r"(?i)^ILCA-", Brand::Sony),
    (r"(?i)^DSC", Brand::Sony),
    (r"^α", Brand::Sony),
    (r"(?i)^X-", Brand::Fujifilm),
    (r"(?i)^GFX", Brand::Fujifilm),
    (r"(?i)^FinePix", Brand::Fujifilm),
    (r"(?i)^E-", Brand::Olympus),
    (r"(?i)^STYLUS", Brand::Olympus),
    (r"(?i)^TOUGH", Brand::Olympus),
    (r"(?i)^DMC-", Brand::Panasonic),
    (r"(?i)^LUMIX", Brand::Panasonic),
    (r"(?i)^M\d+", Brand::Leica),
    (r"(?i)^SL\d+", Brand::Leica),
    (r"(?i)^Q\d+", Brand::Leica),
    (r"(?i)^CL\b", Brand::Leica),
    (r"(?i)^K-\d+", Brand::Pentax),
    (r"(?i)^KP\b", Brand::Pentax),
    (r"(?i)^645[DZ]", Brand::Pentax),
    (r"(?i)^NX\d+", Brand::Samsung),
    (r"(?i)^Galaxy", Brand::Samsung),
    (r"(?i)^iPhone", Brand::Apple),
    (r"(?i)^iPad", Brand::Apple),
];

/// Manufacturer names repeated inside model strings ("NIKON D850").
pub(super) const MANUFACTURER_TOKENS: &str =
    r"(?i)\b(canon|nikon|sony|fujifilm|olympus|panasonic|leica|pentax|samsung|apple|hasselblad|phase\s*one)\b\s*";

/// Product-family prefixes dropped before brand rules run.
pub(super) const FAMILY_PREFIXES: &str = r"(?i)^(eos|dsc|ilce|ilca|dmc)(?:[-\s]+|$)";

/// A regex substitution applied to a model string.
#[derive(Debug, Clone)]
pub(super) struct RewriteRule {
    pattern: Regex,
    replacement: &'static str,
}

impl RewriteRule {
    pub(super) fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: compile(pattern),
            replacement,
        }
    }

    pub(super) fn apply(&self, model: &str) -> String {
        self.pattern.replace_all(model, self.replacement).into_owned()
    }
}

/// Compile a built-in pattern.
pub(super) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in camera pattern must compile")
}

/// Brand-specific model rewrites, applied in order after generic cleanup.
pub(super) fn brand_rules() -> HashMap<Brand, Vec<RewriteRule>> {
    let mut rules = HashMap::new();

    rules.insert(
        Brand::Canon,
        vec![
            RewriteRule::new(r"(?i)^rebel\s+", ""),
            RewriteRule::new(
                r"^(\d{1,4}D[sS]?R?|R\d*P?|M\d*|T\d+i?|SL\d+)(\s.*)?$",
                "EOS ${1}${2}",
            ),
        ],
    );
    rules.insert(
        Brand::Nikon,
        vec![RewriteRule::new(r"(?i)^([DZ])\s+(\d)", "${1}${2}")],
    );
    rules.insert(
        Brand::Sony,
        vec![RewriteRule::new(r"^α?\s*(\d\S*)", "α${1}")],
    );
    rules.insert(
        Brand::Fujifilm,
        vec![
            RewriteRule::new(r"(?i)^x[-\s]*(\w+)", "X-${1}"),
            RewriteRule::new(r"(?i)^gfx\s*(\d\w*)", "GFX${1}"),
        ],
    );
    rules.insert(
        Brand::Panasonic,
        vec![RewriteRule::new(r"(?i)^lumix\s+", "")],
    );
    rules.insert(
        Brand::Olympus,
        vec![RewriteRule::new(r"(?i)^om-?d\s+", "")],
    );

    rules
}
