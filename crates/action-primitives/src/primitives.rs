//! Single-element interactions executed against a page driver

use crate::errors::ActionError;
use crate::types::Interaction;
use page_adapter::PageDriver;
use std::time::Duration;
use tokio::time::timeout;

/// Execute `interaction` on the element matched by `selector`, bounded by
/// `budget`.
pub async fn perform(
    page: &dyn PageDriver,
    selector: &str,
    interaction: &Interaction,
    budget: Duration,
) -> Result<(), ActionError> {
    let attempt = async {
        match interaction {
            Interaction::Click => page.click(selector, budget).await,
            Interaction::Fill(text) => page.fill(selector, text).await,
            Interaction::SelectOption(value) => page.select_option(selector, value).await,
        }
    };

    match timeout(budget, attempt).await {
        Ok(result) => result.map_err(ActionError::from),
        Err(_) => Err(ActionError::Timeout(format!(
            "{} on '{}' exceeded {}ms",
            interaction.name(),
            selector,
            budget.as_millis()
        ))),
    }
}
