use nadthai_schema::{CandidateSpan, Entity, EntityCategory, Event, ResolvedTemporal};

/// Builds the event for one span, or `None` when the span has neither an
/// activity nor any resolved date or time.
pub fn assemble(span: &CandidateSpan, entities: &[Entity], temporal: ResolvedTemporal) -> Option<Event> {
    let activity = entities
        .iter()
        .filter(|e| e.category == EntityCategory::Activity)
        .map(|e| e.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let activity = (!activity.is_empty()).then_some(activity);

    if activity.is_none() && temporal.is_unresolved() {
        return None;
    }

    Some(Event {
        activity,
        temporal,
        participants: collect_unique(entities, EntityCategory::Person),
        locations: collect_unique(entities, EntityCategory::Location),
        source: span.clone(),
    })
}

/// Entity texts of one category in message order. Duplicates are detected
/// ignoring case and runs of whitespace; the first spelling is kept.
fn collect_unique(entities: &[Entity], category: EntityCategory) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut values = Vec::new();
    for entity in entities.iter().filter(|e| e.category == category) {
        let display = entity.text.split_whitespace().collect::<Vec<_>>().join(" ");
        if display.is_empty() {
            continue;
        }
        let key = display.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            values.push(display);
        }
    }
    values
}
