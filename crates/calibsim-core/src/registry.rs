//! Entity registry and interaction surface.
//!
//! The registry owns every entity of a scene, publishes their markers to
//! observers and routes interaction events back into the owning entity.
//! It has an explicit lifecycle: [`Registry::open`] creates it and
//! [`Registry::close`] drops every entity, after which nothing is delivered.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::entity::{Entity, EntityId};
use crate::error::{Result, SceneError};
use crate::interaction::{InteractionEvent, Outcome};
use crate::observer::{SceneObserver, SceneUpdate};

/// Registry for managing all entities of a scene.
///
/// Entities are stored in an arena keyed by [`EntityId`] and indexed by their
/// `(frame_id, name)` identity.
pub struct Registry {
    open: bool,
    next_id: u64,
    /// Arena of live entities, in registration order.
    entities: BTreeMap<EntityId, Box<dyn Entity>>,
    /// Map from (frame id, name) -> entity id
    index: HashMap<(String, String), EntityId>,
    pending: Vec<SceneUpdate>,
    events: VecDeque<InteractionEvent>,
    observers: Vec<Box<dyn SceneObserver>>,
    commits: usize,
}

impl Registry {
    /// Opens a new empty registry.
    pub fn open() -> Self {
        log::info!("registry opened");
        Self {
            open: true,
            next_id: 0,
            entities: BTreeMap::new(),
            index: HashMap::new(),
            pending: Vec::new(),
            events: VecDeque::new(),
            observers: Vec::new(),
            commits: 0,
        }
    }

    /// Returns whether the registry is still open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(SceneError::RegistryClosed)
        }
    }

    /// Adds an observer that receives every subsequent commit.
    pub fn add_observer(&mut self, observer: Box<dyn SceneObserver>) {
        self.observers.push(observer);
    }

    /// Registers an entity and queues its marker for publication.
    ///
    /// Returns an error if an entity with the same frame and name already
    /// exists; the registry is left unchanged in that case.
    pub fn register(&mut self, entity: Box<dyn Entity>) -> Result<EntityId> {
        self.ensure_open()?;

        let key = (entity.frame_id().to_string(), entity.name().to_string());
        if self.index.contains_key(&key) {
            return Err(SceneError::DuplicateEntityName {
                frame_id: key.0,
                name: key.1,
            });
        }

        let id = EntityId(self.next_id);
        self.next_id += 1;

        log::debug!("registered {} '{}' as {id}", entity.type_name(), key.1);
        self.pending.push(SceneUpdate::Upsert(entity.marker()));
        self.index.insert(key, id);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Looks up an entity id by frame and name.
    pub fn lookup(&self, frame_id: &str, name: &str) -> Option<EntityId> {
        self.index
            .get(&(frame_id.to_string(), name.to_string()))
            .copied()
    }

    /// Looks up an entity id by name in any frame.
    ///
    /// If several frames hold the name, the earliest registration wins.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, e)| e.name() == name)
            .map(|(id, _)| *id)
    }

    /// Checks if an entity with the given frame and name exists.
    pub fn contains(&self, frame_id: &str, name: &str) -> bool {
        self.lookup(frame_id, name).is_some()
    }

    /// Gets a reference to an entity.
    pub fn get(&self, id: EntityId) -> Option<&dyn Entity> {
        self.entities.get(&id).map(|e| e.as_ref())
    }

    /// Gets a reference to an entity downcast to its concrete type.
    pub fn get_as<T: Entity>(&self, id: EntityId) -> Option<&T> {
        self.get(id).and_then(|e| e.as_any().downcast_ref::<T>())
    }

    /// Removes an entity and queues its erasure.
    pub fn remove(&mut self, id: EntityId) -> Result<Box<dyn Entity>> {
        self.ensure_open()?;
        let entity = self
            .entities
            .remove(&id)
            .ok_or_else(|| SceneError::EntityNotFound(id.to_string()))?;
        let key = (entity.frame_id().to_string(), entity.name().to_string());
        self.index.remove(&key);
        self.pending.push(SceneUpdate::Erased {
            frame_id: key.0,
            name: key.1,
        });
        Ok(entity)
    }

    /// Returns an iterator over all entities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &dyn Entity)> {
        self.entities.iter().map(|(id, e)| (*id, e.as_ref()))
    }

    /// Returns all entities of a given type in registration order.
    pub fn iter_of_type<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = (EntityId, &'a dyn Entity)> + 'a {
        self.iter().filter(move |(_, e)| e.type_name() == type_name)
    }

    /// Returns the number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if no entity is registered.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the number of updates waiting for the next commit.
    pub fn num_pending_updates(&self) -> usize {
        self.pending.len()
    }

    /// Returns how many batches have been committed.
    pub fn num_commits(&self) -> usize {
        self.commits
    }

    /// Publishes every pending update to the observers as one batch.
    ///
    /// Returns the number of updates delivered. An empty batch is not
    /// delivered.
    pub fn apply_changes(&mut self) -> Result<usize> {
        self.ensure_open()?;
        if self.pending.is_empty() {
            return Ok(0);
        }
        let batch = std::mem::take(&mut self.pending);
        for observer in &mut self.observers {
            observer.on_commit(&batch);
        }
        self.commits += 1;
        Ok(batch.len())
    }

    /// Queues an interaction event for [`Registry::process_events`].
    pub fn submit(&mut self, event: InteractionEvent) -> Result<()> {
        self.ensure_open()?;
        self.events.push_back(event);
        Ok(())
    }

    /// Returns the number of queued interaction events.
    pub fn num_queued_events(&self) -> usize {
        self.events.len()
    }

    /// Takes the oldest queued event without applying it.
    pub fn next_event(&mut self) -> Option<InteractionEvent> {
        self.events.pop_front()
    }

    /// Applies a single interaction event and republishes the result.
    ///
    /// A pose change or trigger is committed before returning, so observers
    /// and the entity never disagree for longer than one event.
    pub fn dispatch(&mut self, event: &InteractionEvent) -> Result<Outcome> {
        self.ensure_open()?;
        let entity = self
            .entities
            .get_mut(&event.entity)
            .ok_or_else(|| SceneError::EntityNotFound(event.entity.to_string()))?;

        let outcome = entity.handle(&event.interaction)?;
        log::debug!(
            "{} on '{}' -> {outcome:?}",
            event.interaction.label(),
            entity.name()
        );

        match outcome {
            Outcome::PoseChanged(_) => {
                self.pending.push(SceneUpdate::Upsert(entity.marker()));
            }
            Outcome::Triggered => {
                self.pending.push(SceneUpdate::Triggered {
                    frame_id: entity.frame_id().to_string(),
                    name: entity.name().to_string(),
                });
            }
            Outcome::Ignored => {}
        }
        self.apply_changes()?;
        Ok(outcome)
    }

    /// Drains the event queue in arrival order.
    ///
    /// Rejected events are logged and skipped. Returns the outcome of every
    /// event that was applied.
    pub fn process_events(&mut self) -> Result<Vec<(EntityId, Outcome)>> {
        self.ensure_open()?;
        let mut applied = Vec::with_capacity(self.events.len());
        while let Some(event) = self.next_event() {
            match self.dispatch(&event) {
                Ok(outcome) => applied.push((event.entity, outcome)),
                Err(err) => log::warn!("dropping {} event: {err}", event.interaction.label()),
            }
        }
        Ok(applied)
    }

    /// Closes the registry.
    ///
    /// Every entity, queued event, pending update and observer is dropped.
    /// Closing twice is a no-op.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        log::info!(
            "registry closed ({} entities, {} dropped events)",
            self.entities.len(),
            self.events.len()
        );
        self.open = false;
        self.entities.clear();
        self.index.clear();
        self.pending.clear();
        self.events.clear();
        self.observers.clear();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::open()
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::DVec3;

    use super::*;
    use crate::entity::{ControlMode, EntityState};
    use crate::geometry::{Color, Pose};
    use crate::interaction::Interaction;

    struct Marker {
        state: EntityState,
    }

    impl Marker {
        fn boxed(frame: &str, name: &str, mode: ControlMode) -> Box<dyn Entity> {
            Box::new(Marker {
                state: EntityState::new(frame, name, Pose::identity(), Color::WHITE, 0.1, mode)
                    .unwrap(),
            })
        }
    }

    impl Entity for Marker {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn type_name(&self) -> &'static str {
            "Marker"
        }

        fn state(&self) -> &EntityState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut EntityState {
            &mut self.state
        }
    }

    fn recorder(registry: &mut Registry) -> Rc<RefCell<Vec<Vec<SceneUpdate>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        registry.add_observer(Box::new(move |updates: &[SceneUpdate]| {
            sink.borrow_mut().push(updates.to_vec());
        }));
        log
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::open();
        let a = registry
            .register(Marker::boxed("world", "a", ControlMode::Move3D))
            .unwrap();
        let b = registry
            .register(Marker::boxed("world", "b", ControlMode::Move3D))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("world", "b"), Some(b));
        assert_eq!(registry.find_by_name("a"), Some(a));
        assert!(registry.get_as::<Marker>(a).is_some());
        assert_eq!(registry.num_pending_updates(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = Registry::open();
        registry
            .register(Marker::boxed("world", "tag0", ControlMode::Move3D))
            .unwrap();
        let err = registry
            .register(Marker::boxed("world", "tag0", ControlMode::Move3D))
            .unwrap_err();
        assert!(matches!(err, SceneError::DuplicateEntityName { .. }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.num_pending_updates(), 1);

        // same name in another frame is a different identity
        assert!(registry
            .register(Marker::boxed("map", "tag0", ControlMode::Move3D))
            .is_ok());
    }

    #[test]
    fn test_commit_batches_updates() {
        let mut registry = Registry::open();
        let log = recorder(&mut registry);
        for name in ["a", "b", "c"] {
            registry
                .register(Marker::boxed("world", name, ControlMode::Move3D))
                .unwrap();
        }
        assert!(log.borrow().is_empty());
        assert_eq!(registry.apply_changes().unwrap(), 3);
        assert_eq!(registry.apply_changes().unwrap(), 0);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].len(), 3);
        assert_eq!(registry.num_commits(), 1);
    }

    #[test]
    fn test_events_write_back_and_republish() {
        let mut registry = Registry::open();
        let log = recorder(&mut registry);
        let id = registry
            .register(Marker::boxed("world", "a", ControlMode::Move3D))
            .unwrap();
        registry.apply_changes().unwrap();

        let pose = Pose::from_position(DVec3::new(0.0, 1.0, 0.0));
        registry
            .submit(InteractionEvent::new(id, Interaction::MoveTo(pose)))
            .unwrap();
        registry
            .submit(InteractionEvent::new(EntityId(99), Interaction::Click))
            .unwrap();
        let applied = registry.process_events().unwrap();

        assert_eq!(applied, vec![(id, Outcome::PoseChanged(pose))]);
        assert_eq!(registry.get(id).unwrap().pose(), pose);
        let commits = log.borrow();
        assert_eq!(commits.len(), 2);
        match &commits[1][..] {
            [SceneUpdate::Upsert(m)] => assert_eq!(m.pose, pose),
            other => panic!("unexpected commit {other:?}"),
        }
    }

    #[test]
    fn test_button_rejects_drag() {
        let mut registry = Registry::open();
        let id = registry
            .register(Marker::boxed("world", "cam", ControlMode::Button))
            .unwrap();
        let drag = InteractionEvent::new(id, Interaction::MoveTo(Pose::from_position(DVec3::X)));
        assert!(matches!(
            registry.dispatch(&drag),
            Err(SceneError::UnsupportedInteraction { .. })
        ));
        assert_eq!(registry.get(id).unwrap().pose(), Pose::identity());

        let click = InteractionEvent::new(id, Interaction::Click);
        assert_eq!(registry.dispatch(&click).unwrap(), Outcome::Triggered);
    }

    #[test]
    fn test_remove_queues_erase() {
        let mut registry = Registry::open();
        let id = registry
            .register(Marker::boxed("world", "a", ControlMode::Move3D))
            .unwrap();
        registry.apply_changes().unwrap();
        let removed = registry.remove(id).unwrap();
        assert_eq!(removed.name(), "a");
        assert!(!registry.contains("world", "a"));
        assert!(registry.is_empty());
        assert_eq!(registry.num_pending_updates(), 1);
    }

    #[test]
    fn test_closed_registry_delivers_nothing() {
        let mut registry = Registry::open();
        let log = recorder(&mut registry);
        let id = registry
            .register(Marker::boxed("world", "a", ControlMode::Move3D))
            .unwrap();
        registry
            .submit(InteractionEvent::new(id, Interaction::Click))
            .unwrap();

        registry.close();
        registry.close();

        assert!(!registry.is_open());
        assert!(registry.is_empty());
        assert_eq!(registry.num_queued_events(), 0);
        assert!(matches!(registry.apply_changes(), Err(SceneError::RegistryClosed)));
        assert!(matches!(
            registry.register(Marker::boxed("world", "b", ControlMode::Move3D)),
            Err(SceneError::RegistryClosed)
        ));
        assert!(matches!(
            registry.submit(InteractionEvent::new(id, Interaction::Click)),
            Err(SceneError::RegistryClosed)
        ));
        assert!(log.borrow().is_empty());
    }
}
