//! Test entity graph: a project with an optional lead contact and a list
//! of tasks.

use redline_tracking::{Member, Trackable, TrackableList};
use redline_types::{EntityId, TrackId};
use serde_json::{Value, json};
use std::any::Any;

#[derive(Clone, Debug)]
pub struct Contact {
    pub id: EntityId,
    pub track: TrackId,
    pub name: String,
    pub email: String,
}

impl Contact {
    pub fn new(name: &str, email: &str) -> Self {
        Self::with_id(EntityId::new(), name, email)
    }

    pub fn with_id(id: EntityId, name: &str, email: &str) -> Self {
        Self {
            id,
            track: TrackId::new(),
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Trackable for Contact {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn track_id(&self) -> TrackId {
        self.track
    }

    fn members(&self) -> &'static [Member] {
        const MEMBERS: &[Member] = &[Member::scalar("name"), Member::scalar("email")];
        MEMBERS
    }

    fn scalar(&self, member: &str) -> Value {
        match member {
            "name" => json!(self.name),
            "email" => json!(self.email),
            _ => Value::Null,
        }
    }

    fn set_scalar(&mut self, member: &str, value: Value) {
        match member {
            "name" => self.name = value.as_str().unwrap_or_default().into(),
            "email" => self.email = value.as_str().unwrap_or_default().into(),
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug)]
pub struct Task {
    pub id: EntityId,
    pub track: TrackId,
    pub title: String,
    pub hours: i64,
    /// Computed display cache; never persisted, never tracked.
    pub summary: String,
}

impl Task {
    pub fn new(title: &str, hours: i64) -> Self {
        Self::with_id(EntityId::new(), title, hours)
    }

    pub fn with_id(id: EntityId, title: &str, hours: i64) -> Self {
        Self {
            id,
            track: TrackId::new(),
            title: title.into(),
            hours,
            summary: String::new(),
        }
    }
}

impl Trackable for Task {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn track_id(&self) -> TrackId {
        self.track
    }

    fn members(&self) -> &'static [Member] {
        const MEMBERS: &[Member] = &[
            Member::scalar("title"),
            Member::scalar("hours"),
            Member::scalar("summary").not_persisted(),
        ];
        MEMBERS
    }

    fn scalar(&self, member: &str) -> Value {
        match member {
            "title" => json!(self.title),
            "hours" => json!(self.hours),
            "summary" => json!(self.summary),
            _ => Value::Null,
        }
    }

    fn set_scalar(&mut self, member: &str, value: Value) {
        match member {
            "title" => self.title = value.as_str().unwrap_or_default().into(),
            "hours" => self.hours = value.as_i64().unwrap_or_default(),
            "summary" => self.summary = value.as_str().unwrap_or_default().into(),
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug)]
pub struct Project {
    pub id: EntityId,
    pub track: TrackId,
    pub name: String,
    pub code: String,
    /// Editor scratchpad, excluded from tracking by policy.
    pub scratch_note: String,
    pub lead: Option<Contact>,
    pub tasks: Vec<Task>,
}

impl Project {
    pub fn new(name: &str, code: &str) -> Self {
        Self::with_id(EntityId::new(), name, code)
    }

    pub fn with_id(id: EntityId, name: &str, code: &str) -> Self {
        Self {
            id,
            track: TrackId::new(),
            name: name.into(),
            code: code.into(),
            scratch_note: String::new(),
            lead: None,
            tasks: Vec::new(),
        }
    }
}

impl Trackable for Project {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn track_id(&self) -> TrackId {
        self.track
    }

    fn members(&self) -> &'static [Member] {
        const MEMBERS: &[Member] = &[
            Member::scalar("name"),
            Member::scalar("code"),
            Member::scalar("scratch_note").ignore(),
            Member::nested("lead"),
            Member::collection("tasks"),
        ];
        MEMBERS
    }

    fn scalar(&self, member: &str) -> Value {
        match member {
            "name" => json!(self.name),
            "code" => json!(self.code),
            "scratch_note" => json!(self.scratch_note),
            _ => Value::Null,
        }
    }

    fn set_scalar(&mut self, member: &str, value: Value) {
        match member {
            "name" => self.name = value.as_str().unwrap_or_default().into(),
            "code" => self.code = value.as_str().unwrap_or_default().into(),
            "scratch_note" => self.scratch_note = value.as_str().unwrap_or_default().into(),
            _ => {}
        }
    }

    fn nested(&self, member: &str) -> Option<&dyn Trackable> {
        match member {
            "lead" => self.lead.as_ref().map(|c| c as &dyn Trackable),
            _ => None,
        }
    }

    fn nested_mut(&mut self, member: &str) -> Option<&mut dyn Trackable> {
        match member {
            "lead" => self.lead.as_mut().map(|c| c as &mut dyn Trackable),
            _ => None,
        }
    }

    fn adopt_nested(&mut self, member: &str, source: &dyn Trackable) -> bool {
        match member {
            "lead" => match source.as_any().downcast_ref::<Contact>() {
                Some(contact) => {
                    self.lead = Some(contact.clone());
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    fn collection(&self, member: &str) -> Option<&dyn TrackableList> {
        match member {
            "tasks" => Some(&self.tasks),
            _ => None,
        }
    }

    fn collection_mut(&mut self, member: &str) -> Option<&mut dyn TrackableList> {
        match member {
            "tasks" => Some(&mut self.tasks),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A project with two tasks and a lead, for graph-walk tests.
pub fn sample_project(n: usize) -> Project {
    let mut project = Project::new(&format!("Project {n}"), &format!("P-{n:04}"));
    project.lead = Some(Contact::new("Dana Reeve", "dana@example.org"));
    project.tasks.push(Task::new("Design", 8));
    project.tasks.push(Task::new("Build", 16));
    project
}
