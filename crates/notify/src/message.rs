use pirouette_domain::{NotificationKind, Workshop};
use serde_json::{json, Value};

/// Builds the (title, body) pair for one notification. Plain, untranslated
/// strings; templating and localization are not the engine's concern.
pub fn notification_content(workshop: &Workshop, kind: NotificationKind) -> (String, String) {
    match kind {
        NotificationKind::NewWorkshop => (
            "New workshop".into(),
            format!("{} was just announced", workshop.title),
        ),
        NotificationKind::ScheduleChange => (
            "Schedule changed".into(),
            format!("{} has an updated schedule", workshop.title),
        ),
        NotificationKind::PriceDrop => (
            "Price drop".into(),
            format!("{} just got cheaper", workshop.title),
        ),
        NotificationKind::Reopened => (
            "Spots opened up".into(),
            format!("{} has open spots again", workshop.title),
        ),
        NotificationKind::Reminder24h => (
            "Starting soon".into(),
            format!("{} starts in 24 hours", workshop.title),
        ),
    }
}

/// Data payload attached to every push so the app can deep link to the
/// workshop.
pub fn notification_payload(workshop: &Workshop, kind: NotificationKind) -> Value {
    json!({
        "workshop_slug": workshop.slug,
        "kind": kind.as_str(),
    })
}
