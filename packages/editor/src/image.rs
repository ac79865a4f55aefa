//! Cloudinary delivery URL rewriting for image components.
//!
//! Pure function over the URL: non-Cloudinary URLs come back unchanged.

use serde::{Deserialize, Serialize};
use url::Url;

const CLOUDINARY_HOST: &str = "res.cloudinary.com";
const UPLOAD_MARKER: &str = "/upload/";

/// Transformation parameters embedded into the delivery URL
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
}

impl ImageSettings {
    /// Automatic quality and format negotiation
    pub fn auto() -> Self {
        Self {
            quality: Some("auto".to_string()),
            format: Some("auto".to_string()),
            ..Self::default()
        }
    }

    /// Cloudinary transformation segment, e.g. `q_auto,f_auto,w_400,c_fill`
    pub fn transformation(&self) -> String {
        let mut params = Vec::new();

        if let Some(quality) = &self.quality {
            params.push(format!("q_{}", quality));
        }
        if let Some(format) = &self.format {
            params.push(format!("f_{}", format));
        }
        if let Some(width) = self.width {
            params.push(format!("w_{}", width));
        }
        if let Some(height) = self.height {
            params.push(format!("h_{}", height));
        }
        if let Some(crop) = &self.crop {
            params.push(format!("c_{}", crop));
        }

        params.join(",")
    }
}

/// Rewrite a Cloudinary delivery URL so it carries `settings`.
///
/// An existing transformation segment right after `/upload/` is replaced;
/// otherwise the new segment is inserted there. Anything that is not a
/// Cloudinary upload URL is returned as given.
pub fn optimize_image_url(url: &str, settings: &ImageSettings) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    if parsed.host_str() != Some(CLOUDINARY_HOST) {
        return url.to_string();
    }

    let transformation = settings.transformation();
    if transformation.is_empty() {
        return url.to_string();
    }

    let path = parsed.path().to_string();
    let Some(marker) = path.find(UPLOAD_MARKER) else {
        return url.to_string();
    };

    let (head, rest) = path.split_at(marker + UPLOAD_MARKER.len());
    let rest = match rest.split_once('/') {
        Some((first, tail)) if is_transformation(first, tail) => tail,
        _ => rest,
    };

    parsed.set_path(&format!("{}{}/{}", head, transformation, rest));
    parsed.to_string()
}

/// Cloudinary transformation parameter keys
const PARAM_KEYS: &[&str] = &[
    "a", "ac", "af", "ar", "b", "bo", "br", "c", "co", "cs", "d", "dl", "dn", "dpr", "du", "e",
    "eo", "f", "fl", "fn", "fps", "g", "h", "if", "ki", "l", "o", "p", "pg", "q", "r", "so", "sp",
    "t", "u", "vc", "vs", "w", "x", "y", "z",
];

const FORMATS: &[&str] = &["auto", "avif", "gif", "jpg", "jpeg", "png", "webp", "svg"];

const CROP_MODES: &[&str] = &[
    "crop", "fill", "fill_pad", "fit", "imagga_crop", "imagga_scale", "lfill", "limit", "lpad",
    "mfit", "mpad", "pad", "scale", "thumb",
];

/// Whether the first segment after `/upload/` is a transformation rather
/// than a folder of the asset's public id.
///
/// Every parameter must use a known key. Keys with free-form values (`e_`,
/// `g_`, `l_` ...) are only trusted when a version segment follows, since
/// `e_shop/look.jpg` is just as likely a folder.
fn is_transformation(segment: &str, tail: &str) -> bool {
    let Some(params) = segment
        .split(',')
        .map(|param| param.split_once('_'))
        .collect::<Option<Vec<_>>>()
    else {
        return false;
    };

    if !params
        .iter()
        .all(|(key, value)| PARAM_KEYS.contains(key) && !value.is_empty())
    {
        return false;
    }

    let followed_by_version = tail.split('/').next().map(is_version).unwrap_or(false);
    followed_by_version || params.iter().all(|(key, value)| has_checked_value(key, value))
}

/// `v1744911572`
fn is_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

fn has_checked_value(key: &str, value: &str) -> bool {
    let numeric = || value == "auto" || value.starts_with("auto:") || value.parse::<f64>().is_ok();
    match key {
        "q" | "w" | "h" | "dpr" => numeric(),
        "ar" => value.split_once(':').map_or(value.parse::<f64>().is_ok(), |(w, h)| {
            w.parse::<f64>().is_ok() && h.parse::<f64>().is_ok()
        }),
        "f" => FORMATS.contains(&value),
        "c" => CROP_MODES.contains(&value),
        _ => false,
    }
}
