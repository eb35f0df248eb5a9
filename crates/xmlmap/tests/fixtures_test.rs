use std::fs;
use xmlmap::{decode, encode, format, Node};

#[test]
fn test_valid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let valid_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/valid");
    for entry in fs::read_dir(valid_dir)? {
        let path = entry?.path();
        let content = fs::read_to_string(&path)?;
        if decode(&content).is_err() || format(&content).is_err() {
            return Err(
                std::io::Error::other(format!("Failed to decode valid file: {path:?}")).into(),
            );
        }
    }
    Ok(())
}

#[test]
fn test_invalid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let invalid_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/invalid");
    for entry in fs::read_dir(invalid_dir)? {
        let path = entry?.path();
        let content = fs::read_to_string(&path)?;
        if decode(&content).is_ok() || format(&content).is_ok() {
            return Err(std::io::Error::other(format!(
                "Should fail to decode invalid file: {path:?}"
            ))
            .into());
        }
    }
    Ok(())
}

#[test]
fn test_soap_envelope_golden() -> Result<(), Box<dyn std::error::Error>> {
    let fixtures = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");
    let input = fs::read_to_string(format!("{fixtures}/valid/soap_envelope.xml"))?;
    let expected = fs::read_to_string(format!("{fixtures}/expected/soap_envelope.xml"))?;

    let tree = decode(&input)?;
    assert_eq!(
        tree.pointer("/soapenv:Header/Esb/Route/Time"),
        Some(&Node::from("2018/02/08 19:24:48.048"))
    );
    assert_eq!(
        tree.pointer("/soapenv:Body/ns1:querySiteResourceForPMS/info/root/type"),
        Some(&Node::from("RES"))
    );

    let encoded = encode(&tree, false);
    assert_eq!(encoded, expected);
    assert_eq!(decode(&encoded)?, tree);
    Ok(())
}

#[test]
fn test_order_fixture() -> Result<(), Box<dyn std::error::Error>> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/valid/order.xml");
    let tree = decode(&fs::read_to_string(path)?)?;

    assert_eq!(tree.get("id"), Some(&Node::from("A-1001")));
    assert_eq!(tree.pointer("/customer/name"), Some(&Node::from("Tom & Jerry")));
    assert_eq!(tree.pointer("/customer/email"), Some(&Node::default()));
    assert_eq!(
        tree.get("notes"),
        Some(&Node::from("Deliver <before> noon & ring twice"))
    );

    let keys: Vec<_> = tree.as_branch().into_iter().flat_map(|b| b.keys()).collect();
    assert_eq!(keys, vec!["id", "customer", "notes"]);
    Ok(())
}
