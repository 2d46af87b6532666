use parcoord_core::models::NzbInfo;
use parcoord_logging::LogLevel;

/// Logs `text` and appends it to the collection's own message list.
///
/// Events carry `nzb_id` so the log buffer can attribute them.
pub(crate) fn post_message(nzb: &mut NzbInfo, kind: LogLevel, text: impl Into<String>) {
    let text = text.into();
    match kind {
        LogLevel::Debug => tracing::trace!(nzb_id = nzb.id, "{text}"),
        LogLevel::Detail => tracing::debug!(nzb_id = nzb.id, "{text}"),
        LogLevel::Info => tracing::info!(nzb_id = nzb.id, "{text}"),
        LogLevel::Warning => tracing::warn!(nzb_id = nzb.id, "{text}"),
        LogLevel::Error => tracing::error!(nzb_id = nzb.id, "{text}"),
    }
    nzb.add_message(kind, text);
}
