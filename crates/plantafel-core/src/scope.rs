//! Resource-scoped event filter. Events outside the resolved rows are
//! dropped before conflict detection, so conflicts only ever involve
//! displayed resources.

use std::collections::HashSet;

use crate::{event::Event, event::View, resource::Resource};

pub fn scope_events(
  events: Vec<Event>,
  resources: &[Resource],
  view: View,
) -> Vec<Event> {
  let ids: HashSet<&str> = resources.iter().map(|r| r.id.as_str()).collect();

  events
    .into_iter()
    .filter(|e| match view {
      View::Team if e.is_absence() => e
        .employee_id
        .is_some_and(|id| ids.contains(id.to_string().as_str())),
      View::Team => ids.contains(e.resource_id.as_str()),
      View::Project if e.is_absence() => false,
      View::Project => e
        .project_id
        .is_some_and(|id| ids.contains(id.to_string().as_str())),
    })
    .collect()
}
