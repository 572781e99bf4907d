use commentsim::{IdMap, SimError};

#[test]
fn build_assigns_first_appearance_order() {
    let map = IdMap::build(["v2", "v0", "v1"]).unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map.index_of("v2"), Some(0));
    assert_eq!(map.index_of("v0"), Some(1));
    assert_eq!(map.index_of("v1"), Some(2));
    assert_eq!(map.index_of("missing"), None);
    assert_eq!(map.id_at(1), Some("v0"));
    assert_eq!(map.invert(), &["v2", "v0", "v1"]);
}

#[test]
fn build_rejects_duplicates() {
    let err = IdMap::build(["a", "b", "a"]).unwrap_err();
    assert!(matches!(err, SimError::DuplicateIdentifier(id) if id == "a"));
}

#[test]
fn empty_map() {
    let map = IdMap::build(Vec::<String>::new()).unwrap();
    assert!(map.is_empty());
    assert_eq!(map.id_at(0), None);
}

#[test]
fn from_entries_round_trips() {
    let map = IdMap::from_entries([
        ("b".to_string(), 1),
        ("a".to_string(), 0),
        ("c".to_string(), 2),
    ])
    .unwrap();
    assert_eq!(map.invert(), &["a", "b", "c"]);
    assert_eq!(map.index_of("c"), Some(2));
}

#[test]
fn from_entries_rejects_out_of_range_index() {
    let err = IdMap::from_entries([("a".to_string(), 0), ("b".to_string(), 5)]).unwrap_err();
    assert!(matches!(err, SimError::NotBijective(_)));
}

#[test]
fn from_entries_rejects_reused_index() {
    let err = IdMap::from_entries([("a".to_string(), 0), ("b".to_string(), 0)]).unwrap_err();
    assert!(matches!(err, SimError::NotBijective(_)));
}

#[test]
fn from_entries_rejects_reused_identifier() {
    let err = IdMap::from_entries([("a".to_string(), 0), ("a".to_string(), 1)]).unwrap_err();
    assert!(matches!(err, SimError::NotBijective(_)));
}
