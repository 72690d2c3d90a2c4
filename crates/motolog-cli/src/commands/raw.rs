use motolog_core::codec::{classify, label_of};
use nostr_sdk::prelude::Event;
use serde::Serialize;

use crate::commands::common::{open_context, Load};
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListItem {
    pub event_id: String,
    pub d_tag: Option<String>,
    pub label: Option<String>,
    pub kind: Option<String>,
    pub created_at: u64,
    pub content: String,
}

pub async fn run_raw(relays: &[String], id: Option<&str>, as_json: bool) -> Result<(), CliError> {
    let mut context = open_context(relays, Load::Nothing).await?;
    let entries = context.service.refetch_raw(&mut context.session).await?;
    let items = entries
        .iter()
        .map(raw_to_list_item)
        .filter(|item| id.is_none_or(|id| item.d_tag.as_deref() == Some(id)))
        .collect::<Vec<_>>();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No entries found.");
    }
    for item in &items {
        println!(
            "{}  {:<10}  {}  {}",
            item.created_at,
            item.kind.as_deref().unwrap_or("?"),
            item.d_tag.as_deref().unwrap_or("-"),
            item.event_id
        );
    }
    Ok(())
}

pub fn raw_to_list_item(event: &Event) -> RawListItem {
    let d_tag = event.tags.identifier().map(ToString::to_string);
    let label = label_of(event);
    let kind = d_tag
        .as_deref()
        .and_then(|d_tag| classify(d_tag, label.as_deref()).kind())
        .map(|kind| kind.to_string());
    RawListItem {
        event_id: event.id.to_hex(),
        d_tag,
        label,
        kind,
        created_at: event.created_at.as_u64(),
        content: event.content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use motolog_core::codec::encode;
    use nostr_sdk::prelude::{Keys, Timestamp};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn raw_item_reports_identifier_and_kind() {
        let keys = Keys::generate();
        let event = encode(
            "refuel:0190",
            motolog_core::RecordKind::Refuel,
            &json!({"vehicleId": "cb400"}),
            Timestamp::from(42),
        )
        .sign_with_keys(&keys)
        .unwrap();

        let item = raw_to_list_item(&event);
        assert_eq!(item.d_tag.as_deref(), Some("refuel:0190"));
        assert_eq!(item.label.as_deref(), Some("refuel"));
        assert_eq!(item.kind.as_deref(), Some("refuel"));
        assert_eq!(item.created_at, 42);
    }
}
