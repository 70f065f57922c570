use std::sync::Arc;

use domainiser_core::{
    Access, DeclaredType, DescriptorCache, Domain, EntityRef, Error, Introspector,
    NamespaceResolver, PropertyInfo, Record, Registry, Result, Schema, TypeName, Value,
};

use super::{CloneOptions, CloningWalker, GraphWalker};
use crate::GraphSpec;
use crate::test_utils::{
    Family, add_child, add_friend, address_type, entity_field, family_domain, family_registry,
    field, person, person_spec, person_type, sequence_field,
};

fn name_of(entity: &EntityRef) -> String {
    field(entity, "name").as_text().unwrap_or_default().to_owned()
}

#[test]
fn clone_copies_scalars_into_new_instance() {
    let domain = family_domain();
    let family = Family::new(&domain);

    let clone = CloningWalker::new(&domain).walk(&family.grand_dad).unwrap();

    assert!(!Arc::ptr_eq(&clone, &family.grand_dad));
    assert_eq!(clone.type_name(), &person_type());
    assert_eq!(field(&clone, "name"), Value::from("GrandDad"));
    assert_eq!(field(&clone, "age"), Value::from(70));
}

#[test]
fn excluded_relations_stay_empty() {
    let domain = family_domain();
    let family = Family::new(&domain);

    let clone = CloningWalker::new(&domain).walk(&family.grand_dad).unwrap();

    assert_eq!(field(&clone, "spouse"), Value::Null);
    assert_eq!(field(&clone, "children"), Value::empty_sequence());
    assert_eq!(field(&clone, "addresses"), Value::empty_set());
    assert_eq!(field(&clone, "friends"), Value::empty_mapping());
    assert_eq!(field(&clone, "home"), Value::Null);
}

#[test]
fn keep_references_shares_excluded_relations() {
    let domain = family_domain();
    let family = Family::new(&domain);

    let clone = CloningWalker::new(&domain)
        .keep_references(true)
        .walk(&family.grand_dad)
        .unwrap();

    let spouse = entity_field(&clone, "spouse").unwrap();
    assert!(Arc::ptr_eq(&spouse, &family.grand_mom));
    for property in ["children", "addresses", "friends"] {
        assert_eq!(field(&clone, property), field(&family.grand_dad, property), "{property}");
    }
}

#[test]
fn options_round_trip() {
    let domain = family_domain();

    let walker = CloningWalker::new(&domain).with_options(CloneOptions {
        keep_references: true,
    });

    assert!(walker.options().keep_references);
    assert_eq!(CloneOptions::default(), CloneOptions { keep_references: false });
}

#[test]
fn included_relation_is_cloned() {
    let domain = family_domain();
    let family = Family::new(&domain);
    let spec = person_spec(&domain, &["children"]);

    let clone = CloningWalker::new(&domain)
        .walk_with(&family.grand_dad, &spec)
        .unwrap();

    let children = sequence_field(&clone, "children");
    assert_eq!(children.len(), 1);
    let dad = children[0].as_entity().unwrap();
    assert!(!Arc::ptr_eq(dad, &family.dad));
    assert_eq!(name_of(dad), "Dad");
    // Dad's own relations are outside the spec.
    assert_eq!(field(dad, "home"), Value::Null);
    assert_eq!(field(&clone, "spouse"), Value::Null);
}

#[test]
fn included_relation_with_keep_references() {
    let domain = family_domain();
    let family = Family::new(&domain);
    let spec = person_spec(&domain, &["children"]);

    let clone = CloningWalker::new(&domain)
        .keep_references(true)
        .walk_with(&family.grand_dad, &spec)
        .unwrap();

    let dad = sequence_field(&clone, "children")[0].as_entity().cloned().unwrap();
    assert!(!Arc::ptr_eq(&dad, &family.dad));
    assert!(entity_field(&dad, "home").is_some_and(|home| Arc::ptr_eq(&home, &family.farm)));
    assert!(entity_field(&clone, "spouse").is_some_and(|s| Arc::ptr_eq(&s, &family.grand_mom)));
}

#[test]
fn shared_entity_is_cloned_once_per_call() {
    let domain = family_domain();
    let family = Family::new(&domain);
    let spec = person_spec(&domain, &["children", "friends"]);

    let clone = CloningWalker::new(&domain)
        .walk_with(&family.grand_dad, &spec)
        .unwrap();

    let child = sequence_field(&clone, "children")[0].as_entity().cloned().unwrap();
    let friends = field(&clone, "friends");
    let friends = friends.as_mapping().unwrap();
    let neighbour = friends[&Value::from("neighbour")].as_entity().unwrap();
    let buddy = friends[&Value::from("buddy")].as_entity().unwrap();

    assert!(Arc::ptr_eq(&child, neighbour));
    assert!(!Arc::ptr_eq(buddy, &family.fred));
    assert_eq!(name_of(buddy), "Fred");
}

#[test]
fn shared_entity_across_shapes() {
    let domain = family_domain();
    let family = Family::new(&domain);
    let spec = person_spec(&domain, &["children.home", "addresses"]);

    let clone = CloningWalker::new(&domain)
        .walk_with(&family.grand_dad, &spec)
        .unwrap();

    let dad = sequence_field(&clone, "children")[0].as_entity().cloned().unwrap();
    let home = entity_field(&dad, "home").unwrap();
    let addresses = field(&clone, "addresses");
    let addresses = addresses.as_set().unwrap();

    assert_eq!(addresses.len(), 2);
    assert!(addresses.contains(&Value::from(&home)));
    assert!(!addresses.contains(&Value::from(&family.farm)));
    assert!(!addresses.contains(&Value::from(&family.flat)));
}

#[test]
fn mapping_keys_are_preserved() {
    let domain = family_domain();
    let family = Family::new(&domain);
    let spec = person_spec(&domain, &["friends"]);

    let clone = CloningWalker::new(&domain)
        .walk_with(&family.grand_dad, &spec)
        .unwrap();

    let source = field(&family.grand_dad, "friends");
    let cloned = field(&clone, "friends");
    let source_keys: Vec<_> = source.as_mapping().unwrap().keys().collect();
    let cloned_keys: Vec<_> = cloned.as_mapping().unwrap().keys().collect();

    assert_eq!(source_keys, cloned_keys);
    assert_eq!(cloned_keys, [&Value::from("buddy"), &Value::from("neighbour")]);
    assert_ne!(source, cloned);
}

#[test]
fn separate_calls_do_not_share_clones() {
    let domain = family_domain();
    let family = Family::new(&domain);
    let walker = CloningWalker::new(&domain);

    let first = walker.walk(&family.dad).unwrap();
    let second = walker.walk(&family.dad).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn back_reference_to_ancestor_gets_own_clone() {
    let domain = family_domain();
    let family = Family::new(&domain);
    let spec = person_spec(&domain, &["spouse.spouse"]);

    let clone = CloningWalker::new(&domain)
        .walk_with(&family.grand_dad, &spec)
        .unwrap();

    let grand_mom = entity_field(&clone, "spouse").unwrap();
    let grand_dad_again = entity_field(&grand_mom, "spouse").unwrap();

    assert_eq!(name_of(&grand_mom), "GrandMom");
    assert_eq!(name_of(&grand_dad_again), "GrandDad");
    assert!(!Arc::ptr_eq(&grand_dad_again, &clone));
    assert!(!Arc::ptr_eq(&grand_dad_again, &family.grand_dad));
    assert_eq!(field(&grand_dad_again, "spouse"), Value::Null);
}

#[test]
fn grand_dad_end_to_end() {
    let domain = family_domain();
    let family = Family::new(&domain);
    let walker = CloningWalker::new(&domain);

    let bare = walker.walk(&family.grand_dad).unwrap();
    assert_eq!(name_of(&bare), "GrandDad");
    assert_eq!(field(&bare, "age"), Value::from(70));
    assert_eq!(field(&bare, "spouse"), Value::Null);
    assert!(sequence_field(&bare, "children").is_empty());
    assert_eq!(field(&bare, "friends"), Value::empty_mapping());
    assert_eq!(field(&bare, "addresses"), Value::empty_set());

    let spec = person_spec(&domain, &["children"]);
    let with_children = walker.walk_with(&family.grand_dad, &spec).unwrap();
    let children = sequence_field(&with_children, "children");
    assert_eq!(children.len(), 1);
    assert!(!Arc::ptr_eq(children[0].as_entity().unwrap(), &family.dad));
}

#[test]
fn null_relations_and_elements_pass_through() {
    let domain = family_domain();
    let lonely = person(&domain, "Lonely", 30);
    let kid = person(&domain, "Kid", 3);
    lonely.set("children", vec![Value::Null, Value::from(&kid)]);
    let spec = person_spec(&domain, &["spouse", "children"]);

    let clone = CloningWalker::new(&domain).walk_with(&lonely, &spec).unwrap();

    assert_eq!(field(&clone, "spouse"), Value::Null);
    let children = sequence_field(&clone, "children");
    assert_eq!(children.len(), 2);
    assert!(children[0].is_null());
    assert_eq!(children[1].as_entity().map(name_of).as_deref(), Some("Kid"));
}

#[test]
fn spec_for_other_type_is_rejected() {
    let domain = family_domain();
    let family = Family::new(&domain);
    let spec = person_spec(&domain, &[]);

    let err = CloningWalker::new(&domain)
        .walk_with(&family.farm, &spec)
        .unwrap_err();

    insta::assert_snapshot!(err, @"graph spec was built for `family::Person` but the value is `family::Address`");
}

#[test]
fn mistyped_child_spec_fails_at_walk() {
    let domain = family_domain();
    let family = Family::new(&domain);
    let person_leaf = GraphSpec::for_type(&domain, &person_type()).unwrap();
    let spec = GraphSpec::for_type(&domain, &person_type())
        .unwrap()
        .with_child("home", person_leaf)
        .unwrap();

    let err = CloningWalker::new(&domain)
        .walk_with(&family.dad, &spec)
        .unwrap_err();

    assert_eq!(
        err,
        Error::SpecMismatch {
            expected: person_type(),
            found: "family::Address".into(),
        }
    );
}

#[test]
fn mistyped_child_spec_fails_for_already_cloned_entity() {
    let domain = family_domain();
    let parent = person(&domain, "Parent", 40);
    let kid = person(&domain, "Kid", 8);
    add_child(&parent, &kid);
    add_friend(&parent, "little one", &kid);
    let person_leaf = GraphSpec::for_type(&domain, &person_type()).unwrap();
    let address_leaf = GraphSpec::for_type(&domain, &address_type()).unwrap();
    let spec = GraphSpec::for_type(&domain, &person_type())
        .unwrap()
        .with_child("children", person_leaf)
        .unwrap()
        .with_child("friends", address_leaf)
        .unwrap();

    let err = CloningWalker::new(&domain)
        .walk_with(&parent, &spec)
        .unwrap_err();

    assert_eq!(
        err,
        Error::SpecMismatch {
            expected: address_type(),
            found: "family::Person".into(),
        }
    );
}

#[test]
fn value_of_wrong_shape_is_rejected() {
    let domain = family_domain();
    let odd = person(&domain, "Odd", 1);
    odd.set("children", "not a list");
    let spec = person_spec(&domain, &["children"]);

    let err = CloningWalker::new(&domain).walk_with(&odd, &spec).unwrap_err();

    insta::assert_snapshot!(err, @"property `children` on `family::Person` is declared as a sequence but holds text");
}

#[test]
fn non_entity_element_is_rejected() {
    let domain = family_domain();
    let odd = person(&domain, "Odd", 1);
    odd.set("children", vec![Value::from(42)]);
    let spec = person_spec(&domain, &["children"]);

    let err = CloningWalker::new(&domain).walk_with(&odd, &spec).unwrap_err();

    assert_eq!(
        err,
        Error::SpecMismatch {
            expected: person_type(),
            found: "int".into(),
        }
    );
}

#[test]
fn untracked_values_are_copied_verbatim() {
    let domain = family_domain();
    let tagged = person(&domain, "Tagged", 9);
    tagged.set("name", vec![Value::from("a"), Value::from("b")]);

    let clone = CloningWalker::new(&domain).walk(&tagged).unwrap();

    assert_eq!(field(&clone, "name"), field(&tagged, "name"));
}

#[test]
fn abstract_type_is_not_constructible() {
    let registry = Registry::new().with(
        Schema::new("zoo::Animal")
            .abstract_type()
            .property("name", DeclaredType::named("String")),
    );
    let domain = Domain::new(registry, NamespaceResolver::new("zoo::"))
        .with_cache(Arc::new(DescriptorCache::new()));
    let animal = Record::new("zoo::Animal").with("name", "Rex").into_ref();

    let err = CloningWalker::new(&domain).walk(&animal).unwrap_err();

    assert_eq!(err, Error::NotConstructible(TypeName::new("zoo::Animal")));
}

/// Refuses to write `age`.
struct AgeLocked(Registry);

impl Introspector for AgeLocked {
    fn describe_properties(&self, ty: &TypeName) -> Result<Vec<PropertyInfo>> {
        self.0.describe_properties(ty)
    }

    fn new_instance(&self, ty: &TypeName) -> Result<EntityRef> {
        self.0.new_instance(ty)
    }

    fn get_property(&self, entity: &EntityRef, property: &str) -> Result<Value> {
        self.0.get_property(entity, property)
    }

    fn set_property(&self, entity: &EntityRef, property: &str, value: Value) -> Result<()> {
        if property == "age" {
            return Err(Error::PropertyAccessDenied {
                owner: entity.type_name().clone(),
                property: property.to_owned(),
                access: Access::Write,
            });
        }
        self.0.set_property(entity, property, value)
    }
}

#[test]
fn inaccessible_property_aborts_clone() {
    let domain = Domain::new(AgeLocked(family_registry()), NamespaceResolver::new("family::"))
        .with_cache(Arc::new(DescriptorCache::new()));
    let family = Family::new(&domain);

    let err = CloningWalker::new(&domain).walk(&family.dad).unwrap_err();

    insta::assert_snapshot!(err, @"property `age` on `family::Person` is not accessible for writing");
}

#[test]
fn concurrent_walks_are_independent() {
    let domain = family_domain();
    let family = Family::new(&domain);
    let spec = person_spec(&domain, &["children", "friends"]);
    let walker = CloningWalker::new(&domain);

    let clones: Vec<EntityRef> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| walker.walk_with(&family.grand_dad, &spec).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, clone) in clones.iter().enumerate() {
        let child = sequence_field(clone, "children")[0].as_entity().cloned().unwrap();
        let friends = field(clone, "friends");
        let neighbour = friends.as_mapping().unwrap()[&Value::from("neighbour")]
            .as_entity()
            .cloned()
            .unwrap();
        assert!(Arc::ptr_eq(&child, &neighbour));

        for other in &clones[i + 1..] {
            assert!(!Arc::ptr_eq(clone, other));
        }
    }
}
