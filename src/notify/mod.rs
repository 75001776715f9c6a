pub mod telegram;

use async_trait::async_trait;

/// Longest text the messaging API accepts in one message, in UTF-16 code units.
pub const MAX_MESSAGE_UNITS: usize = 4096;

/// Delivers a text message to the configured destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// `true` when the destination accepted the message. Failures are
    /// reported through logs and never raised.
    async fn notify(&self, message: &str) -> bool;
}

pub fn new_episode_message(title: &str, page_url: &str) -> String {
    fit_message(format!(
        "New episode available: {}\nWatch it here: {}",
        title, page_url
    ))
}

/// One-off listing of everything currently on the page.
pub fn inventory_message(titles: &[String], page_url: &str) -> String {
    let mut out = format!("Episodes currently listed ({}):\n", titles.len());
    for title in titles {
        out.push_str("- ");
        out.push_str(title);
        out.push('\n');
    }
    out.push_str(page_url);
    fit_message(out)
}

/// Cut on a char boundary so the API does not reject the whole message.
/// Length is measured the way Telegram measures it, in UTF-16 units.
fn fit_message(message: String) -> String {
    if utf16_len(&message) <= MAX_MESSAGE_UNITS {
        return message;
    }
    let budget = MAX_MESSAGE_UNITS - '…'.len_utf16();
    let mut used = 0;
    let mut cut = String::new();
    for c in message.chars() {
        used += c.len_utf16();
        if used > budget {
            break;
        }
        cut.push(c);
    }
    cut.push('…');
    cut
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}
