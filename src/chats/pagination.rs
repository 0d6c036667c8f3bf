//! Page-number pagination for message listings.

use serde::{Deserialize, Serialize};

use crate::chats::models::Message;
use crate::chats::ChatError;
use crate::config::ChatsConfig;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePage {
    pub total_messages: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub messages: Vec<Message>,
}

/// Slice `items` into the requested page.
///
/// A zero or missing `page_size` uses the configured default and oversized
/// requests are capped. An empty listing still has one (empty) page.
pub fn paginate(
    items: Vec<Message>,
    params: PageParams,
    config: &ChatsConfig,
) -> Result<MessagePage, ChatError> {
    let page_size = match params.page_size {
        Some(0) | None => config.page_size,
        Some(n) => n.min(config.max_page_size),
    }
    .max(1);

    let total_messages = items.len();
    let total_pages = total_messages.div_ceil(page_size).max(1);
    let current_page = params.page.unwrap_or(1);
    if current_page == 0 || current_page > total_pages {
        return Err(ChatError::InvalidPage);
    }

    let messages = items
        .into_iter()
        .skip((current_page - 1) * page_size)
        .take(page_size)
        .collect();

    Ok(MessagePage {
        total_messages,
        total_pages,
        current_page,
        messages,
    })
}
