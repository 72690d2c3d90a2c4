use crate::commands::common::{
    format_timeline_lines, open_context, resolve_vehicle, timeline_to_list_item, Load,
    TimelineListItem,
};
use crate::error::CliError;

pub async fn run_timeline(
    relays: &[String],
    selector: Option<&str>,
    limit: usize,
    all: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let load = if all { Load::All } else { Load::Newest };
    let mut context = open_context(relays, load).await?;
    context
        .load_until(|session| resolve_vehicle(session, selector).is_ok())
        .await?;

    let session = &context.session;
    let vehicle = resolve_vehicle(session, selector)?;
    let mut items = session.store.timeline(&vehicle.id);
    items.truncate(limit);

    if as_json {
        let json_items = items
            .iter()
            .map(timeline_to_list_item)
            .collect::<Vec<TimelineListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No records for {} yet.", vehicle.name);
    }
    for line in format_timeline_lines(&items) {
        println!("{line}");
    }
    if session.pagination.has_more {
        println!("(older history not loaded; pass --all to page through it)");
    }
    Ok(())
}
