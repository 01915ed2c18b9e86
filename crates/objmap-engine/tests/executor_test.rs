//! Execution behavior over dynamic records: precedence, sequences,
//! update-in-place, and concurrent mapping.

use std::sync::Arc;
use std::thread;

use objmap_engine::{Error, Mapper, MapperConfig, MemberSpec, TypePair, ValueTransform};
use objmap_model::{MemberDescriptor, Record, TypeDescriptor, TypeTag, Value};

fn item() -> Arc<TypeDescriptor> {
    Arc::new(TypeDescriptor::new(
        "Item",
        vec![
            MemberDescriptor::new("sku", TypeTag::String),
            MemberDescriptor::new("quantity", TypeTag::Integer),
        ],
    ))
}

fn item_row() -> Arc<TypeDescriptor> {
    Arc::new(TypeDescriptor::new(
        "ItemRow",
        vec![
            MemberDescriptor::new("sku", TypeTag::String),
            MemberDescriptor::new("quantity", TypeTag::Decimal),
        ],
    ))
}

fn order() -> Arc<TypeDescriptor> {
    Arc::new(TypeDescriptor::new(
        "Order",
        vec![
            MemberDescriptor::new("number", TypeTag::String),
            MemberDescriptor::new(
                "items",
                TypeTag::List(Box::new(TypeTag::Record("Item".to_string()))),
            ),
        ],
    ))
}

fn order_row() -> Arc<TypeDescriptor> {
    Arc::new(TypeDescriptor::new(
        "OrderRow",
        vec![
            MemberDescriptor::new("number", TypeTag::String),
            MemberDescriptor::new(
                "items",
                TypeTag::List(Box::new(TypeTag::Record("ItemRow".to_string()))),
            ),
        ],
    ))
}

fn sample_order() -> Record {
    let first = Record::new("Item")
        .with_field("sku", Value::String("ABC123".to_string()))
        .with_field("quantity", Value::Integer(10));
    let second = Record::new("Item")
        .with_field("sku", Value::String("DEF456".to_string()))
        .with_field("quantity", Value::Integer(5));

    Record::new("Order")
        .with_field("number", Value::String("ORD-1".to_string()))
        .with_field(
            "items",
            Value::List(vec![Value::Record(first), Value::Record(second)]),
        )
}

fn order_mapper() -> Mapper {
    let mut config = MapperConfig::new();
    config.register(order(), order_row()).unwrap();
    config.register(item(), item_row()).unwrap();
    Mapper::new(config.seal().unwrap())
}

#[test]
fn sequences_of_nested_records_map_elementwise() {
    let result = order_mapper().map_record(&sample_order(), "OrderRow").unwrap();

    assert_eq!(
        result.get("number"),
        Some(&Value::String("ORD-1".to_string()))
    );
    let Some(Value::List(items)) = result.get("items") else {
        panic!("expected mapped item list");
    };
    assert_eq!(items.len(), 2);

    let Value::Record(first) = &items[0] else {
        panic!("expected record element");
    };
    assert_eq!(first.type_name(), "ItemRow");
    assert_eq!(first.get("sku"), Some(&Value::String("ABC123".to_string())));
    // Integer quantity widened into the decimal destination member
    assert_eq!(first.get("quantity"), Some(&Value::Decimal(10.0)));
}

#[test]
fn empty_sequence_maps_to_empty_sequence() {
    let source = Record::new("Order")
        .with_field("number", Value::String("ORD-2".to_string()))
        .with_field("items", Value::List(Vec::new()));

    let result = order_mapper().map_record(&source, "OrderRow").unwrap();
    assert_eq!(result.get("items"), Some(&Value::List(Vec::new())));
}

#[test]
fn overrides_take_precedence_over_convention() {
    // "sku" matches by name on both sides; the override must still win.
    let mut config = MapperConfig::new();
    config
        .register(item(), item_row())
        .unwrap()
        .member("sku", MemberSpec::convert("sku", ValueTransform::Lowercase));
    let mapper = Mapper::new(config.seal().unwrap());

    let source = Record::new("Item")
        .with_field("sku", Value::String("ABC123".to_string()))
        .with_field("quantity", Value::Integer(1));

    let result = mapper.map_record(&source, "ItemRow").unwrap();
    assert_eq!(result.get("sku"), Some(&Value::String("abc123".to_string())));
}

#[test]
fn ignored_members_keep_their_defaults() {
    let mut config = MapperConfig::new();
    config
        .register(item(), item_row())
        .unwrap()
        .member("quantity", MemberSpec::Ignore);
    let mapper = Mapper::new(config.seal().unwrap());

    let source = Record::new("Item")
        .with_field("sku", Value::String("ABC123".to_string()))
        .with_field("quantity", Value::Integer(10));

    let result = mapper.map_record(&source, "ItemRow").unwrap();
    assert_eq!(result.get("quantity"), Some(&Value::Decimal(0.0)));
}

#[test]
fn map_into_updates_only_bound_members() {
    let mut config = MapperConfig::new();
    config
        .register(item(), item_row())
        .unwrap()
        .member("quantity", MemberSpec::Ignore);
    let mapper = Mapper::new(config.seal().unwrap());

    let source = Record::new("Item")
        .with_field("sku", Value::String("NEW".to_string()))
        .with_field("quantity", Value::Integer(10));
    let mut destination = Record::new("ItemRow")
        .with_field("sku", Value::String("OLD".to_string()))
        .with_field("quantity", Value::Decimal(42.0));

    mapper.map_into(&source, &mut destination).unwrap();

    assert_eq!(
        destination.get("sku"),
        Some(&Value::String("NEW".to_string()))
    );
    // Ignored member untouched in place
    assert_eq!(destination.get("quantity"), Some(&Value::Decimal(42.0)));
}

#[test]
fn unregistered_pair_fails_with_unmapped_type() {
    let result = order_mapper().map_record(&sample_order(), "Invoice");
    let Err(Error::UnmappedType(pair)) = result else {
        panic!("expected UnmappedType");
    };
    assert_eq!(pair, TypePair::new("Order", "Invoice"));
}

#[test]
fn custom_transform_runs_at_map_time() {
    let mut config = MapperConfig::new();
    config
        .register(item(), item_row())
        .unwrap()
        .member(
            "quantity",
            MemberSpec::convert(
                "quantity",
                ValueTransform::custom(
                    "double",
                    TypeTag::Integer,
                    TypeTag::Integer,
                    |value| match value {
                        Value::Integer(i) => Ok(Value::Integer(i * 2)),
                        other => Err(Error::Transform(format!(
                            "double expects integer, found {}",
                            other.kind_name()
                        ))),
                    },
                ),
            ),
        );
    let mapper = Mapper::new(config.seal().unwrap());

    let source = Record::new("Item")
        .with_field("sku", Value::String("ABC".to_string()))
        .with_field("quantity", Value::Integer(21));

    let result = mapper.map_record(&source, "ItemRow").unwrap();
    assert_eq!(result.get("quantity"), Some(&Value::Decimal(42.0)));
}

#[test]
fn mapping_runs_concurrently_over_a_shared_mapper() {
    let mapper = Arc::new(order_mapper());
    let source = sample_order();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let mapper = Arc::clone(&mapper);
            let source = source.clone();
            thread::spawn(move || mapper.map_record(&source, "OrderRow").unwrap())
        })
        .collect();

    for handle in handles {
        let result = handle.join().unwrap();
        assert_eq!(
            result.get("number"),
            Some(&Value::String("ORD-1".to_string()))
        );
    }
}

#[test]
fn deep_type_recursion_fails_deterministically() {
    let node = Arc::new(TypeDescriptor::new(
        "Node",
        vec![
            MemberDescriptor::new("label", TypeTag::String),
            MemberDescriptor::new("next", TypeTag::Record("Node".to_string())),
        ],
    ));

    let mut config = MapperConfig::new();
    config.register(Arc::clone(&node), node).unwrap();
    let mapper = Mapper::new(config.seal().unwrap());

    // Deeper than the default recursion bound
    let mut chain = Record::new("Node")
        .with_field("label", Value::String("tail".to_string()))
        .with_field("next", Value::Null);
    for i in 0..200 {
        chain = Record::new("Node")
            .with_field("label", Value::String(format!("n{i}")))
            .with_field("next", Value::Record(chain));
    }

    let first = mapper.map_record(&chain, "Node");
    let second = mapper.map_record(&chain, "Node");
    assert!(matches!(first, Err(Error::MaxDepthExceeded { .. })));
    assert!(matches!(second, Err(Error::MaxDepthExceeded { .. })));
}
