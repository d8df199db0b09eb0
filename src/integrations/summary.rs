use std::fmt::Write as _;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::Utc;

use crate::model::config::{NotifyConfig, SummaryConfig};
use crate::model::{Record, format_duration};
use crate::store::RecordStore;

use super::IntegrationError;
use super::llm::{ChatClient, ChatMessage};
use super::webhook::{Embed, WebhookNotifier};

const SYSTEM_PROMPT: &str = "You summarise a personal work log. Reply with a short, plain-text \
paragraph of at most five sentences: what was worked on, which projects took the most time, \
and anything notable in the notes.";

/// Accent color of the summary embed
const EMBED_COLOR: u32 = 0xFB4196;

/// Prompt text for the first `max` records (already most recent first)
pub fn build_prompt(records: &[Record], max: usize) -> String {
    let shown = records.len().min(max);
    let mut prompt = format!("My {shown} most recent activities, newest first:\n");
    for record in records.iter().take(max) {
        let _ = write!(
            prompt,
            "\n- {} | {}",
            record.started_at.format("%Y-%m-%d %H:%M"),
            record.name
        );
        if !record.project.is_empty() {
            let _ = write!(prompt, " | project: {}", record.project);
        }
        let _ = write!(prompt, " | {}", format_duration(record.duration_secs));
        for (label, text) in [("description", &record.description), ("notes", &record.notes)] {
            let text = text.trim();
            if !text.is_empty() {
                let _ = write!(prompt, "\n  {label}: {}", text.replace('\n', " "));
            }
        }
    }
    let total: u64 = records.iter().take(max).map(|r| r.duration_secs).sum();
    let _ = write!(prompt, "\n\nTotal logged time: {}.", format_duration(total));
    prompt
}

/// List, prompt and complete. `Ok(None)` when there is nothing to summarise.
pub fn summarize(
    store: &dyn RecordStore,
    client: &ChatClient,
    max: usize,
) -> Result<Option<String>, IntegrationError> {
    let records = store.list()?;
    if records.is_empty() || max == 0 {
        return Ok(None);
    }
    let prompt = build_prompt(&records, max);
    let reply = client.complete(vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)])?;
    Ok(Some(reply))
}

/// Run the summary job on its own thread. Returns `None` when the job
/// cannot start; every outcome is logged.
pub fn spawn_startup_summary(
    store: Arc<dyn RecordStore>,
    summary: SummaryConfig,
    notify: NotifyConfig,
) -> Option<JoinHandle<()>> {
    let notifier = match WebhookNotifier::from_config(&notify) {
        Ok(Some(n)) => n,
        Ok(None) => {
            tracing::warn!("summary requested but no [notify] webhook_url is configured");
            return None;
        }
        Err(e) => {
            tracing::error!(error = %e, "could not build webhook client");
            return None;
        }
    };
    let client = match ChatClient::from_config(&summary) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "summary disabled");
            return None;
        }
    };

    let spawned = thread::Builder::new()
        .name("summary".into())
        .spawn(move || {
            tracing::info!(model = client.model(), "summary job started");
            match summarize(store.as_ref(), &client, summary.max_records) {
                Ok(Some(text)) => {
                    let payload = notifier.payload(&text).with_embed(
                        Embed::new()
                            .title("Activity summary")
                            .description(format!("Generated by {}", client.model()))
                            .timestamp(Utc::now())
                            .color(EMBED_COLOR),
                    );
                    notifier.notify(&payload);
                }
                Ok(None) => tracing::info!("no activities to summarise"),
                Err(e) => tracing::warn!(error = %e, "summary job failed"),
            }
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::error!(error = %e, "could not spawn summary thread");
            None
        }
    }
}
