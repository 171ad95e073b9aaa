//! Launch configuration rewriting
//!
//! Image references are handled as colon-delimited segments: the last segment
//! is the tag and the one before it is the repository. When both an image and
//! a tag are requested they are applied one after the other, tag first, and
//! the reference is re-split between the two steps.

use service_api::LaunchConfig;
use tracing::debug;

use crate::errors::UpgradeError;
use crate::models::request::DeploymentRequest;

const SEGMENT_SEPARATOR: char = ':';

/// Replace (or append) the tag segment of `reference`
pub fn apply_tag(reference: &str, tag: &str) -> String {
    let mut segments: Vec<&str> = reference.split(SEGMENT_SEPARATOR).collect();
    if segments.len() == 1 {
        return format!("{}{}{}", segments[0], SEGMENT_SEPARATOR, tag);
    }
    let last = segments.len() - 1;
    segments[last] = tag;
    segments.join(":")
}

/// Replace the repository segment of `reference`, keeping its tag.
/// A reference without a tag is replaced outright.
pub fn apply_image(reference: &str, image: &str) -> String {
    let mut segments: Vec<&str> = reference.split(SEGMENT_SEPARATOR).collect();
    if segments.len() == 1 {
        return image.to_string();
    }
    let repo = segments.len() - 2;
    segments[repo] = image;
    segments.join(":")
}

/// Apply the requested tag and image rewrites in order
pub fn rewrite_reference(reference: &str, image: Option<&str>, tag: Option<&str>) -> String {
    let mut rewritten = reference.to_string();
    if let Some(tag) = non_blank(tag) {
        rewritten = apply_tag(&rewritten, tag);
    }
    if let Some(image) = non_blank(image) {
        rewritten = apply_image(&rewritten, image);
    }
    rewritten
}

/// Parse `KEY=VALUE` overrides, splitting on the first `=` only.
/// An entry without `=` becomes a key with an empty value.
pub fn parse_environment(vars: &[String]) -> Vec<(String, String)> {
    vars.iter()
        .map(|var| match var.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (var.clone(), String::new()),
        })
        .collect()
}

/// Apply the image/tag rewrite and environment replacement a request asks for.
/// Fields the request does not touch are left as the server sent them.
pub fn mutate_launch_config(
    config: &mut LaunchConfig,
    request: &DeploymentRequest,
) -> Result<(), UpgradeError> {
    let image = non_blank(request.new_image());
    let tag = non_blank(request.new_tag());

    if image.is_some() || tag.is_some() {
        let current = config.image_reference().ok_or_else(|| {
            UpgradeError::Payload("launchConfig has no image reference".to_string())
        })?;
        let rewritten = rewrite_reference(current, image, tag);
        debug!("Image reference {} -> {}", current, rewritten);
        config.set_image_reference(rewritten);
    }

    if request.update_environment() {
        let vars = parse_environment(request.environment_overrides());
        debug!("Replacing environment with {} variables", vars.len());
        config.replace_environment(vars);
    }

    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
