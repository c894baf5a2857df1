use super::*;
use crate::network::state::Server;
use pretty_assertions::assert_eq;

fn test_config() -> NetworkConfig {
    json5::from_str(
        r#"{
            server_name: "hub.local.example",
            server_id: "0HB",
            server_info: "Local Hub",
        }"#,
    )
    .unwrap()
}

fn node(name: &str, id: Option<&str>, parent: &str, hop: u32) -> Server {
    Server {
        name: ServerName::from_str(name).unwrap(),
        id: id.map(|i| ServerId::from_str(i).unwrap()),
        parent: Some(ServerName::from_str(parent).unwrap()),
        children: Vec::new(),
        hop_count: hop,
        info: "test server".to_string(),
        flags: ServerFlags::empty(),
        capabilities: ServerCapabilitySet::new(),
        introduced_at: 0,
    }
}

#[test]
fn local_node_is_present() {
    let net = Network::new(&test_config());

    assert_eq!(net.len(), 1);
    assert_eq!(net.local().hop_count, 0);
    assert_eq!(net.local_name().value(), "hub.local.example");
    assert!(net.server_by_name("HUB.LOCAL.EXAMPLE").is_ok());
    assert!(net.server_by_id(net.local_id()).is_ok());
}

#[test]
fn insert_and_lookup() {
    let mut net = Network::new(&test_config());
    net.insert_server(node("one.example", Some("1AB"), "hub.local.example", 1))
        .unwrap();

    let by_name = net.server_by_name("one.example").unwrap();
    assert_eq!(by_name.hop_count, 1);

    let id = ServerId::from_str("1AB").unwrap();
    let by_id = net.server_by_id(&id).unwrap();
    assert_eq!(by_id.name.value(), "one.example");

    assert_eq!(
        net.local().children,
        vec![ServerName::from_str("one.example").unwrap()]
    );
}

#[test]
fn name_lookup_folds_case() {
    let mut net = Network::new(&test_config());
    net.insert_server(node("One.Example", None, "hub.local.example", 1))
        .unwrap();

    assert!(net.server_by_name("ONE.EXAMPLE").is_ok());
    assert!(net.server_by_name("one.example").is_ok());
    assert!(net.server_by_name("two.example").is_err());
}

#[test]
fn duplicate_name_is_rejected_without_mutation() {
    let mut net = Network::new(&test_config());
    net.insert_server(node("one.example", Some("1AB"), "hub.local.example", 1))
        .unwrap();

    let before = serde_json::to_value(&net).unwrap();

    let result = net.insert_server(node("ONE.example", Some("2CD"), "hub.local.example", 1));
    assert!(matches!(result, Err(InsertError::NameInUse(_))));
    assert_eq!(before, serde_json::to_value(&net).unwrap());
}

#[test]
fn duplicate_id_is_rejected_without_mutation() {
    let mut net = Network::new(&test_config());
    net.insert_server(node("one.example", Some("1AB"), "hub.local.example", 1))
        .unwrap();

    let before = serde_json::to_value(&net).unwrap();

    let result = net.insert_server(node("two.example", Some("1AB"), "hub.local.example", 1));
    match result {
        Err(InsertError::IdInUse { id, holder }) => {
            assert_eq!(id.value(), "1AB");
            assert_eq!(holder.value(), "one.example");
        }
        other => panic!("expected IdInUse, got {:?}", other),
    }
    assert_eq!(before, serde_json::to_value(&net).unwrap());
}

#[test]
fn insert_requires_known_parent() {
    let mut net = Network::new(&test_config());
    let result = net.insert_server(node("one.example", None, "missing.example", 1));
    assert!(matches!(result, Err(InsertError::NoSuchParent(_))));
}

#[test]
fn remove_server_takes_subtree() {
    let mut net = Network::new(&test_config());
    net.insert_server(node("one.example", Some("1AB"), "hub.local.example", 1))
        .unwrap();
    net.insert_server(node("two.example", Some("2AB"), "one.example", 2))
        .unwrap();
    net.insert_server(node("three.example", None, "two.example", 3))
        .unwrap();
    net.insert_server(node("other.example", None, "hub.local.example", 1))
        .unwrap();

    let removed = net.remove_server("one.example").unwrap();
    assert_eq!(removed.len(), 3);

    assert!(net.server_by_name("one.example").is_err());
    assert!(net.server_by_name("two.example").is_err());
    assert!(net.server_by_name("three.example").is_err());
    assert!(net.server_by_id(&ServerId::from_str("2AB").unwrap()).is_err());
    assert!(net.server_by_name("other.example").is_ok());
    assert_eq!(
        net.local().children,
        vec![ServerName::from_str("other.example").unwrap()]
    );
}

#[test]
fn remove_unknown_server_fails() {
    let mut net = Network::new(&test_config());
    assert!(net.remove_server("missing.example").is_err());
}

#[test]
fn local_node_is_not_removable() {
    let mut net = Network::new(&test_config());
    let removed = net.remove_server("hub.local.example").unwrap();
    assert!(removed.is_empty());
    assert_eq!(net.len(), 1);
}

#[test]
fn resolves_name_or_id_tokens() {
    let mut net = Network::new(&test_config());
    net.insert_server(node("one.example", Some("1AB"), "hub.local.example", 1))
        .unwrap();

    assert_eq!(net.server_by_name_or_id("1AB").unwrap().name.value(), "one.example");
    assert_eq!(
        net.server_by_name_or_id("one.example").unwrap().name.value(),
        "one.example"
    );
    assert!(net.server_by_name_or_id("9ZZ").is_err());
}
