use crate::config::CardField;

use super::model::PreviewItem;

/// Build the line shown under a preview card's title according to `fields`
/// and `sep`.
///
/// `duration` is the already formatted duration label (or its placeholder).
/// Falls back to the category when no parts were produced.
pub fn card_line(item: &PreviewItem, duration: &str, fields: &[CardField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in fields {
        match f {
            CardField::Category => {
                if !item.category.trim().is_empty() {
                    parts.push(item.category.trim().to_string());
                }
            }
            CardField::Client => parts.push(item.client_label().to_string()),
            CardField::Kind => parts.push(item.kind_label().to_string()),
            CardField::Duration => {
                if !duration.is_empty() {
                    parts.push(duration.to_string());
                }
            }
            CardField::Path => {
                if let Some(name) = item.audio.file_name().and_then(|s| s.to_str()) {
                    parts.push(name.to_string());
                }
            }
        }
    }

    if parts.is_empty() {
        item.category.clone()
    } else {
        parts.join(sep)
    }
}
