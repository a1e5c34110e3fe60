//! Store - the in-memory entity store.
//!
//! Records are keyed by their scope: animals by `(owner, id)`, events and
//! vaccines by `(owner, animal, id)`. Nothing is ever looked up by identifier
//! alone, so two owners can use the same identifier without touching each
//! other's records.
//!
//! The conditional upserts take `&mut self`, which makes the read-decide-write
//! sequence a single indivisible step.

use crate::{
    arbiter::{changed_since, decide, Decision},
    error::Result,
    Animal, Error, Event, OwnerId, PetTree, RecordId, Timestamp, UpdateCounts, Vaccine,
};
use std::collections::BTreeMap;

type AnimalKey = (OwnerId, RecordId);
type ChildKey = (OwnerId, RecordId, RecordId);

/// Common accessors of records owned by an animal.
trait ChildRecord: Clone {
    fn id(&self) -> RecordId;
    fn animal(&self) -> RecordId;
    fn updated_at(&self) -> Timestamp;
}

impl ChildRecord for Event {
    fn id(&self) -> RecordId {
        self.id
    }

    fn animal(&self) -> RecordId {
        self.animal
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

impl ChildRecord for Vaccine {
    fn id(&self) -> RecordId {
        self.id
    }

    fn animal(&self) -> RecordId {
        self.animal
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

/// The in-memory entity store.
#[derive(Debug, Clone, Default)]
pub struct Store {
    animals: BTreeMap<AnimalKey, Animal>,
    events: BTreeMap<ChildKey, Event>,
    vaccines: BTreeMap<ChildKey, Vaccine>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Conditional upserts
    // ------------------------------------------------------------------

    /// Insert or overwrite an animal if the arbiter lets it through.
    ///
    /// The scope is the animal's `owner_id`.
    pub fn upsert_animal(&mut self, animal: Animal) -> Decision {
        let key = (animal.owner_id.clone(), animal.id);
        let decision = decide(self.animals.get(&key).map(|a| a.updated_at), animal.updated_at);
        if decision.writes() {
            self.animals.insert(key, animal);
        }
        decision
    }

    /// Insert or overwrite an event of one of `owner`'s animals.
    pub fn upsert_event(&mut self, owner: &str, event: Event) -> Result<Decision> {
        upsert_child(&self.animals, &mut self.events, owner, event)
    }

    /// Insert or overwrite a vaccine of one of `owner`'s animals.
    pub fn upsert_vaccine(&mut self, owner: &str, vaccine: Vaccine) -> Result<Decision> {
        upsert_child(&self.animals, &mut self.vaccines, owner, vaccine)
    }

    // ------------------------------------------------------------------
    // Animals
    // ------------------------------------------------------------------

    /// Get an animal.
    pub fn get_animal(&self, owner: &str, id: RecordId) -> Option<&Animal> {
        self.animals.get(&(owner.to_owned(), id))
    }

    /// Get an animal with its complete children.
    pub fn get_pet(&self, owner: &str, id: RecordId) -> Option<PetTree> {
        self.get_animal(owner, id).map(|animal| self.tree(animal))
    }

    /// Insert a new animal; fails if the identifier is taken in scope.
    pub fn insert_animal(&mut self, animal: Animal) -> Result<()> {
        let key = (animal.owner_id.clone(), animal.id);
        if self.animals.contains_key(&key) {
            return Err(Error::RecordAlreadyExists(animal.id));
        }
        self.animals.insert(key, animal);
        Ok(())
    }

    /// Unconditionally overwrite an existing animal.
    pub fn replace_animal(&mut self, animal: Animal) -> Result<()> {
        match self.animals.get_mut(&(animal.owner_id.clone(), animal.id)) {
            Some(stored) => {
                *stored = animal;
                Ok(())
            }
            None => Err(Error::AnimalNotFound(animal.id)),
        }
    }

    /// Delete an animal together with its events and vaccines.
    pub fn delete_animal(&mut self, owner: &str, id: RecordId) -> Result<()> {
        if self.animals.remove(&(owner.to_owned(), id)).is_none() {
            return Err(Error::AnimalNotFound(id));
        }
        self.events.retain(|(o, a, _), _| !(o == owner && *a == id));
        self.vaccines.retain(|(o, a, _), _| !(o == owner && *a == id));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// List the events of an animal.
    pub fn list_events(&self, owner: &str, animal: RecordId) -> Result<Vec<Event>> {
        self.require_animal(owner, animal)?;
        Ok(children_of(&self.events, owner, animal).cloned().collect())
    }

    /// Get one event of an animal.
    pub fn get_event(&self, owner: &str, animal: RecordId, id: RecordId) -> Option<&Event> {
        self.events.get(&(owner.to_owned(), animal, id))
    }

    /// Insert a new event; fails if the identifier is taken in scope.
    pub fn insert_event(&mut self, owner: &str, event: Event) -> Result<()> {
        insert_child(&self.animals, &mut self.events, owner, event)
    }

    /// Unconditionally overwrite an existing event.
    pub fn replace_event(&mut self, owner: &str, event: Event) -> Result<()> {
        replace_child(&mut self.events, owner, event)
    }

    /// Delete one event.
    pub fn delete_event(&mut self, owner: &str, animal: RecordId, id: RecordId) -> Result<()> {
        self.events
            .remove(&(owner.to_owned(), animal, id))
            .map(|_| ())
            .ok_or(Error::RecordNotFound(id))
    }

    // ------------------------------------------------------------------
    // Vaccines
    // ------------------------------------------------------------------

    /// List the vaccines of an animal.
    pub fn list_vaccines(&self, owner: &str, animal: RecordId) -> Result<Vec<Vaccine>> {
        self.require_animal(owner, animal)?;
        Ok(children_of(&self.vaccines, owner, animal).cloned().collect())
    }

    /// Get one vaccine of an animal.
    pub fn get_vaccine(&self, owner: &str, animal: RecordId, id: RecordId) -> Option<&Vaccine> {
        self.vaccines.get(&(owner.to_owned(), animal, id))
    }

    /// Insert a new vaccine; fails if the identifier is taken in scope.
    pub fn insert_vaccine(&mut self, owner: &str, vaccine: Vaccine) -> Result<()> {
        insert_child(&self.animals, &mut self.vaccines, owner, vaccine)
    }

    /// Unconditionally overwrite an existing vaccine.
    pub fn replace_vaccine(&mut self, owner: &str, vaccine: Vaccine) -> Result<()> {
        replace_child(&mut self.vaccines, owner, vaccine)
    }

    /// Delete one vaccine.
    pub fn delete_vaccine(&mut self, owner: &str, animal: RecordId, id: RecordId) -> Result<()> {
        self.vaccines
            .remove(&(owner.to_owned(), animal, id))
            .map(|_| ())
            .ok_or(Error::RecordNotFound(id))
    }

    // ------------------------------------------------------------------
    // Sync reads
    // ------------------------------------------------------------------

    /// Pets whose subtree changed after `since`, each with all its children.
    ///
    /// A pet matches if the animal itself, any of its events or any of its
    /// vaccines is newer than the checkpoint. Without a checkpoint every pet
    /// of the owner matches.
    pub fn changed_pets(&self, owner: &str, since: Option<Timestamp>) -> Vec<PetTree> {
        self.animals_of(owner)
            .filter(|animal| {
                changed_since(animal.updated_at, since)
                    || children_of(&self.events, owner, animal.id)
                        .any(|e| changed_since(e.updated_at, since))
                    || children_of(&self.vaccines, owner, animal.id)
                        .any(|v| changed_since(v.updated_at, since))
            })
            .map(|animal| self.tree(animal))
            .collect()
    }

    /// Number of records of each kind changed after `since`.
    ///
    /// Kinds are counted independently: a changed event does not count its
    /// animal.
    pub fn change_counts(&self, owner: &str, since: Option<Timestamp>) -> UpdateCounts {
        UpdateCounts {
            animals: self
                .animals_of(owner)
                .filter(|a| changed_since(a.updated_at, since))
                .count() as u64,
            events: count_changed(&self.events, owner, since),
            vaccines: count_changed(&self.vaccines, owner, since),
        }
    }

    fn animals_of<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Animal> + 'a {
        self.animals
            .range((owner.to_owned(), RecordId::nil())..)
            .take_while(move |((o, _), _)| o == owner)
            .map(|(_, animal)| animal)
    }

    fn tree(&self, animal: &Animal) -> PetTree {
        PetTree {
            animal: animal.clone(),
            events: children_of(&self.events, &animal.owner_id, animal.id)
                .cloned()
                .collect(),
            vaccines: children_of(&self.vaccines, &animal.owner_id, animal.id)
                .cloned()
                .collect(),
        }
    }

    fn require_animal(&self, owner: &str, animal: RecordId) -> Result<()> {
        if self.animals.contains_key(&(owner.to_owned(), animal)) {
            Ok(())
        } else {
            Err(Error::AnimalNotFound(animal))
        }
    }
}

fn children_of<'a, C>(
    map: &'a BTreeMap<ChildKey, C>,
    owner: &'a str,
    animal: RecordId,
) -> impl Iterator<Item = &'a C> + 'a {
    map.range((owner.to_owned(), animal, RecordId::nil())..)
        .take_while(move |((o, a, _), _)| o == owner && *a == animal)
        .map(|(_, child)| child)
}

fn count_changed<C: ChildRecord>(
    map: &BTreeMap<ChildKey, C>,
    owner: &str,
    since: Option<Timestamp>,
) -> u64 {
    map.iter()
        .filter(|((o, _, _), child)| o == owner && changed_since(child.updated_at(), since))
        .count() as u64
}

fn upsert_child<C: ChildRecord>(
    animals: &BTreeMap<AnimalKey, Animal>,
    children: &mut BTreeMap<ChildKey, C>,
    owner: &str,
    child: C,
) -> Result<Decision> {
    if !animals.contains_key(&(owner.to_owned(), child.animal())) {
        return Err(Error::AnimalNotFound(child.animal()));
    }
    let key = (owner.to_owned(), child.animal(), child.id());
    let decision = decide(children.get(&key).map(C::updated_at), child.updated_at());
    if decision.writes() {
        children.insert(key, child);
    }
    Ok(decision)
}

fn insert_child<C: ChildRecord>(
    animals: &BTreeMap<AnimalKey, Animal>,
    children: &mut BTreeMap<ChildKey, C>,
    owner: &str,
    child: C,
) -> Result<()> {
    if !animals.contains_key(&(owner.to_owned(), child.animal())) {
        return Err(Error::AnimalNotFound(child.animal()));
    }
    let key = (owner.to_owned(), child.animal(), child.id());
    if children.contains_key(&key) {
        return Err(Error::RecordAlreadyExists(child.id()));
    }
    children.insert(key, child);
    Ok(())
}

fn replace_child<C: ChildRecord>(
    children: &mut BTreeMap<ChildKey, C>,
    owner: &str,
    child: C,
) -> Result<()> {
    match children.get_mut(&(owner.to_owned(), child.animal(), child.id())) {
        Some(stored) => {
            *stored = child;
            Ok(())
        }
        None => Err(Error::RecordNotFound(child.id())),
    }
}
