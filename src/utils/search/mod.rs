pub mod errors;

use crate::modules::store::Store;
use crate::routes::search::models::EventSearchItem;
use crate::utils::auth::models::{Actor, User};
use crate::utils::invitations::models::InvitationStatus;
use crate::utils::search::errors::SearchError;
use tracing::trace;

pub const RESULT_LIMIT: usize = 10;
pub const MIN_QUERY_LEN: usize = 2;

/// Trimmed query, or `None` when it is too short to search with.
pub fn search_text(raw: &str) -> Option<&str> {
    let text = raw.trim();
    (text.chars().count() >= MIN_QUERY_LEN).then_some(text)
}

pub async fn search_events(
    store: &dyn Store,
    actor: &Actor,
    query: &str,
) -> Result<Vec<EventSearchItem>, SearchError> {
    let Some(text) = search_text(query) else {
        trace!("Event search query {query:?} is too short");
        return Ok(Vec::new());
    };

    let statuses = [
        InvitationStatus::Pending,
        InvitationStatus::Accepted,
        InvitationStatus::Tentative,
    ];
    let mut items = Vec::new();
    for event in store
        .search_events(actor.id, text, &statuses, RESULT_LIMIT)
        .await?
    {
        let earliest_time = store
            .list_time_options(event.id)
            .await?
            .first()
            .map(|option| option.start_time);
        items.push(EventSearchItem {
            id: event.id,
            status_label: event.status.label().to_string(),
            title: event.title,
            description: event.description,
            status: event.status,
            created_at: event.created_at,
            earliest_time,
        });
    }

    trace!("Found {} events matching {text}", items.len());
    Ok(items)
}

pub async fn search_users(
    store: &dyn Store,
    actor: &Actor,
    query: &str,
) -> Result<Vec<User>, SearchError> {
    let Some(text) = search_text(query) else {
        trace!("User search query {query:?} is too short");
        return Ok(Vec::new());
    };

    let users = store.search_users(text, actor.id, RESULT_LIMIT).await?;
    if users.is_empty() {
        trace!("Found no users matching {text}");
    } else {
        trace!("Found {} users matching {text}", users.len());
    }
    Ok(users)
}

#[cfg(test)]
mod search_tests {
    use super::*;

    #[test]
    fn short_queries_are_skipped() {
        assert_eq!(search_text(""), None);
        assert_eq!(search_text("  a  "), None);
        assert_eq!(search_text(" ab "), Some("ab"));
        assert_eq!(search_text("ół"), Some("ół"));
    }
}
