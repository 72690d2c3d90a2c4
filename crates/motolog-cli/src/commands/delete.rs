use crate::commands::common::{open_context, print_report, Load};
use crate::error::CliError;

pub async fn run_delete(relays: &[String], id: &str) -> Result<(), CliError> {
    let id = normalize_record_id(id)?;
    let mut context = open_context(relays, Load::Newest).await?;
    context
        .load_until(|session| {
            session.store.find_by_id(&id).is_some() || session.raw.get(&id).is_some()
        })
        .await?;

    let report = context
        .service
        .delete_record(&mut context.session, &id)
        .await?;
    print_report(&id, &report);
    Ok(())
}

/// Record ids look like `<kind>:<uuid>`; vehicles are deleted by name instead.
pub fn normalize_record_id(id: &str) -> Result<String, CliError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CliError::InvalidInput("record id is required".to_string()));
    }
    if id.starts_with("vehicle:") {
        return Err(CliError::InvalidInput(
            "use `motolog vehicle delete` to delete a vehicle".to_string(),
        ));
    }
    Ok(id.to_string())
}
