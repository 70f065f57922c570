//! Test fixtures: the family domain.
//!
//! `family::Person` has scalars (`name`, `age`), a self-referencing
//! `spouse`, `children` (sequence), `addresses` (set), `friends` (mapping
//! keyed by nickname) and two single `family::Address` relations.

use std::sync::Arc;

use domainiser_core::{
    DeclaredType, DescriptorCache, Domain, EntityRef, NamespaceResolver, Registry, Schema,
    TypeName, Value,
};

use crate::{GraphSpec, GraphSpecBuilder};

pub const PERSON: &str = "family::Person";
pub const ADDRESS: &str = "family::Address";

pub fn person_type() -> TypeName {
    TypeName::new(PERSON)
}

pub fn address_type() -> TypeName {
    TypeName::new(ADDRESS)
}

pub fn family_registry() -> Registry {
    let person = || DeclaredType::named(PERSON);
    let address = || DeclaredType::named(ADDRESS);
    let string = || DeclaredType::named("String");

    Registry::new()
        .with(
            Schema::new(PERSON)
                .property("name", string())
                .property("age", DeclaredType::named("Int"))
                .property("spouse", person())
                .property("children", DeclaredType::sequence_of(person()))
                .property("addresses", DeclaredType::set_of(address()))
                .property("friends", DeclaredType::mapping_of(string(), person()))
                .property("home", address())
                .property("office", address()),
        )
        .with(
            Schema::new(ADDRESS)
                .property("street", string())
                .property("city", string()),
        )
}

/// Family domain with a private descriptor cache.
pub fn family_domain() -> Domain {
    Domain::new(family_registry(), NamespaceResolver::new("family::"))
        .with_cache(Arc::new(DescriptorCache::new()))
}

pub fn person(domain: &Domain, name: &str, age: i64) -> EntityRef {
    let person = domain.introspector().new_instance(&person_type()).unwrap();
    person.set("name", name);
    person.set("age", age);
    person
}

pub fn address(domain: &Domain, street: &str, city: &str) -> EntityRef {
    let address = domain.introspector().new_instance(&address_type()).unwrap();
    address.set("street", street);
    address.set("city", city);
    address
}

/// Wire `a` and `b` as each other's spouse.
pub fn marry(a: &EntityRef, b: &EntityRef) {
    a.set("spouse", b);
    b.set("spouse", a);
}

pub fn add_child(parent: &EntityRef, child: &EntityRef) {
    parent.update("children", |children| match children {
        Value::Sequence(items) => items.push(Value::from(child)),
        other => panic!("children is {}", other.kind_name()),
    });
}

pub fn add_friend(person: &EntityRef, nickname: &str, friend: &EntityRef) {
    person.update("friends", |friends| match friends {
        Value::Mapping(entries) => {
            entries.insert(Value::from(nickname), Value::from(friend));
        }
        other => panic!("friends is {}", other.kind_name()),
    });
}

pub fn add_address(person: &EntityRef, address: &EntityRef) {
    person.update("addresses", |addresses| match addresses {
        Value::Set(items) => {
            items.insert(Value::from(address));
        }
        other => panic!("addresses is {}", other.kind_name()),
    });
}

/// Spec for `family::Person` including the given dot paths.
pub fn person_spec(domain: &Domain, paths: &[&str]) -> GraphSpec {
    GraphSpecBuilder::new(domain, PERSON)
        .with_paths_dot_notation(paths)
        .build()
        .unwrap()
}

pub fn field(entity: &EntityRef, name: &str) -> Value {
    entity.get(name).unwrap_or_default()
}

pub fn entity_field(entity: &EntityRef, name: &str) -> Option<EntityRef> {
    field(entity, name).as_entity().cloned()
}

pub fn sequence_field(entity: &EntityRef, name: &str) -> Vec<Value> {
    field(entity, name).as_sequence().map(<[Value]>::to_vec).unwrap_or_default()
}

/// The family used across walker tests:
///
/// - GrandDad (70) married to GrandMom (68), one child Dad (45)
/// - GrandDad's friends: "buddy" -> Fred, "neighbour" -> Dad
/// - GrandDad lives at two addresses; Dad's home is the first one
pub struct Family {
    pub grand_dad: EntityRef,
    pub grand_mom: EntityRef,
    pub dad: EntityRef,
    pub fred: EntityRef,
    pub farm: EntityRef,
    pub flat: EntityRef,
}

impl Family {
    pub fn new(domain: &Domain) -> Self {
        let grand_dad = person(domain, "GrandDad", 70);
        let grand_mom = person(domain, "GrandMom", 68);
        let dad = person(domain, "Dad", 45);
        let fred = person(domain, "Fred", 71);
        let farm = address(domain, "1 Farm Lane", "Shire");
        let flat = address(domain, "2 High Street", "Town");

        marry(&grand_dad, &grand_mom);
        add_child(&grand_dad, &dad);
        add_child(&grand_mom, &dad);
        add_friend(&grand_dad, "buddy", &fred);
        add_friend(&grand_dad, "neighbour", &dad);
        add_address(&grand_dad, &farm);
        add_address(&grand_dad, &flat);
        dad.set("home", &farm);

        Self {
            grand_dad,
            grand_mom,
            dad,
            fred,
            farm,
            flat,
        }
    }
}
