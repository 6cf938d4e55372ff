use url::Url;

use crate::{ConversationId, HighlightSets};

/// Builds the standalone graph view URL carrying the current highlight sets.
///
/// Name lists travel as JSON arrays and are left out when empty.
pub fn full_view_url(
    base: &Url,
    conversation_id: &ConversationId,
    highlights: &HighlightSets,
    node_count: Option<usize>,
) -> Result<Url, url::ParseError> {
    // Without a trailing slash `join` would replace the last segment.
    let mut url = if base.path().ends_with('/') {
        base.join("graph-view")?
    } else {
        let mut dir = base.clone();
        dir.set_path(&format!("{}/", base.path()));
        dir.join("graph-view")?
    };
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair("brainId", conversation_id.as_str());
        if !highlights.referenced.names.is_empty() {
            query.append_pair("referencedNodes", &names_json(&highlights.referenced.names));
        }
        if !highlights.focus.names.is_empty() {
            query.append_pair("focusNodeNames", &names_json(&highlights.focus.names));
        }
        if let Some(count) = node_count {
            query.append_pair("nodeCount", &count.to_string());
        }
    }
    Ok(url)
}

fn names_json(names: &[String]) -> String {
    serde_json::Value::from(names.to_vec()).to_string()
}
