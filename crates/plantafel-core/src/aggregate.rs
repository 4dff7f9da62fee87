//! Project-view aggregator: one bar per project, day and phase.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{assignment::Phase, event::Event};

type GroupKey = (Uuid, NaiveDate, Phase);

/// Merge assignment events sharing a project, start date (UTC) and phase.
///
/// The first event of a group is its seed and keeps its span and title; the
/// rest only contribute employees and source ids. Output keeps the order in
/// which each group (or pass-through event) first appeared.
pub fn aggregate_project_view(events: Vec<Event>) -> Vec<Event> {
  let mut out: Vec<Event> = Vec::with_capacity(events.len());
  let mut groups: HashMap<GroupKey, usize> = HashMap::new();

  for event in events {
    let key = match event.project_id {
      Some(project) if event.is_assignment() => {
        (project, event.start.date_naive(), event.phase)
      }
      _ => {
        out.push(event);
        continue;
      }
    };

    match groups.get(&key) {
      Some(&slot) => merge_into(&mut out[slot], &event),
      None => {
        groups.insert(key, out.len());
        out.push(seed(event));
      }
    }
  }

  for event in &mut out {
    if event.is_assignment() && event.employee_ids.len() > 1 {
      let project = event.project_name.as_deref().unwrap_or_default();
      let mut title = format!("{project} · {} employees", event.employee_ids.len());
      if let Some(suffix) = event.phase.suffix() {
        title.push_str(&format!(" ({suffix})"));
      }
      event.title = title;
    }
  }
  out
}

fn seed(mut event: Event) -> Event {
  event.employee_ids.clear();
  event.employee_names.clear();
  if let Some(id) = event.employee_id {
    event.employee_ids.push(id);
    event
      .employee_names
      .push(event.employee_name.clone().unwrap_or_default());
  }
  event.source_ids = vec![event.source_id];
  event
}

fn merge_into(group: &mut Event, event: &Event) {
  if let Some(id) = event.employee_id
    && !group.employee_ids.contains(&id)
  {
    group.employee_ids.push(id);
    group
      .employee_names
      .push(event.employee_name.clone().unwrap_or_default());
  }
  if !group.source_ids.contains(&event.source_id) {
    group.source_ids.push(event.source_id);
  }
  if event.has_conflict {
    group.has_conflict = true;
    if group.conflict_reason.is_none() {
      group.conflict_reason = event.conflict_reason.clone();
    }
  }
}
