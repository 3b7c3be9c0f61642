//! Test entities and an in-memory store for commit tests.

use redline_sync::{EntityStore, StoreError, StoreResult};
use redline_tracking::{Member, Trackable, TrackableList};
use redline_types::{EntityId, TrackId};
use serde_json::{Value, json};
use std::any::Any;
use std::cell::{Cell, RefCell};

/// Opt-in log output for debugging: `RUST_LOG=debug cargo test`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[derive(Clone, Debug)]
pub struct Ticket {
    pub id: EntityId,
    pub track: TrackId,
    pub title: String,
    pub hours: i64,
}

impl Ticket {
    pub fn new(title: &str, hours: i64) -> Self {
        Self {
            id: EntityId::new(),
            track: TrackId::new(),
            title: title.into(),
            hours,
        }
    }
}

impl Trackable for Ticket {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn track_id(&self) -> TrackId {
        self.track
    }

    fn members(&self) -> &'static [Member] {
        const MEMBERS: &[Member] = &[Member::scalar("title"), Member::scalar("hours")];
        MEMBERS
    }

    fn scalar(&self, member: &str) -> Value {
        match member {
            "title" => json!(self.title),
            "hours" => json!(self.hours),
            _ => Value::Null,
        }
    }

    fn set_scalar(&mut self, member: &str, value: Value) {
        match member {
            "title" => self.title = value.as_str().unwrap_or_default().into(),
            "hours" => self.hours = value.as_i64().unwrap_or_default(),
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug)]
pub struct Board {
    pub id: EntityId,
    pub track: TrackId,
    pub name: String,
    pub tickets: Vec<Ticket>,
}

impl Board {
    pub fn new(name: &str) -> Self {
        Self {
            id: EntityId::new(),
            track: TrackId::new(),
            name: name.into(),
            tickets: Vec::new(),
        }
    }
}

impl Trackable for Board {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn track_id(&self) -> TrackId {
        self.track
    }

    fn members(&self) -> &'static [Member] {
        const MEMBERS: &[Member] = &[Member::scalar("name"), Member::collection("tickets")];
        MEMBERS
    }

    fn scalar(&self, member: &str) -> Value {
        match member {
            "name" => json!(self.name),
            _ => Value::Null,
        }
    }

    fn set_scalar(&mut self, member: &str, value: Value) {
        if member == "name" {
            self.name = value.as_str().unwrap_or_default().into();
        }
    }

    fn collection(&self, member: &str) -> Option<&dyn TrackableList> {
        match member {
            "tickets" => Some(&self.tickets),
            _ => None,
        }
    }

    fn collection_mut(&mut self, member: &str) -> Option<&mut dyn TrackableList> {
        match member {
            "tickets" => Some(&mut self.tickets),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// In-memory store that records every call and can be told to fail each
/// operation kind.
#[derive(Default)]
pub struct MemoryStore {
    pub created: RefCell<Vec<EntityId>>,
    pub updated: RefCell<Vec<EntityId>>,
    pub deleted: RefCell<Vec<EntityId>>,
    pub fail_create: Cell<bool>,
    pub fail_update: Cell<bool>,
    pub fail_delete: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait(?Send)]
impl<T: Trackable> EntityStore<T> for MemoryStore {
    async fn create(&self, items: &[T]) -> StoreResult<()> {
        if self.fail_create.get() {
            return Err(StoreError::Rejected("create refused".into()));
        }
        self.created
            .borrow_mut()
            .extend(items.iter().map(|i| i.entity_id()));
        Ok(())
    }

    async fn update(&self, items: &[T]) -> StoreResult<()> {
        if self.fail_update.get() {
            return Err(StoreError::Rejected("update refused".into()));
        }
        self.updated
            .borrow_mut()
            .extend(items.iter().map(|i| i.entity_id()));
        Ok(())
    }

    async fn delete(&self, id: EntityId) -> StoreResult<()> {
        if self.fail_delete.get() {
            return Err(StoreError::Transport("store unreachable".into()));
        }
        self.deleted.borrow_mut().push(id);
        Ok(())
    }
}
