//! Outbound document delivery.
//!
//! The assistant hands finished menus to a messaging surface through the
//! [`DocumentSink`] trait. Short menus go inline; long ones are written to
//! a transient HTML file that is removed again once the send finishes,
//! successfully or not.

use std::path::Path;

use async_trait::async_trait;

use crate::document;
use crate::error::AssistantResult;
use crate::pipeline::MenuDocument;

/// Longest rendered text delivered inline; anything longer goes as a file.
pub const INLINE_LIMIT_CHARS: usize = 4000;

const FILE_CAPTION: &str =
    "The menu is too long for one message. Open the attached file in a browser.";

/// Outbound side of the assistant. Production implementations talk to a
/// chat surface; tests record what would have been sent.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn send_text(&self, user_id: i64, text: &str) -> AssistantResult<()>;

    async fn send_document(
        &self,
        user_id: i64,
        path: &Path,
        caption: &str,
    ) -> AssistantResult<()>;
}

/// Delivers a menu either inline or as a transient file.
///
/// The inline check runs on the rendered text, while the file keeps the
/// raw HTML so it opens in a browser. The file `menu_{user_id}.html` lives
/// in the OS temp dir only for the duration of the send.
pub async fn deliver_menu(
    sink: &dyn DocumentSink,
    user_id: i64,
    doc: &MenuDocument,
) -> AssistantResult<()> {
    let text = document::render_text(doc);
    let text_len = text.chars().count();

    if text_len <= INLINE_LIMIT_CHARS {
        sink.send_text(user_id, &text).await?;
        tracing::info!("menu delivered inline to user {}, {} chars", user_id, text_len);
        return Ok(());
    }

    let path = std::env::temp_dir().join(format!("menu_{}.html", user_id));
    let outcome = async {
        tokio::fs::write(&path, &doc.html).await?;
        sink.send_document(user_id, &path, FILE_CAPTION).await
    }
    .await;

    // The file is transient even when the send fails; only then is the
    // send error reported.
    if let Err(e) = tokio::fs::remove_file(&path).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!("failed to remove temporary menu file {}: {}", path.display(), e);
    }

    match &outcome {
        Ok(()) => {
            tracing::info!("menu delivered as file to user {}, text {} chars", user_id, text_len);
        }
        Err(e) => tracing::error!("menu file delivery failed for user {}: {}", user_id, e),
    }
    outcome
}
