
use ros1msg_core::{
    FieldDefinition, MessageDefinition, NumericArray, Record, Time, TypedArray, Value, ValueError,
};
use ros1msg_reader::{DecodeError, MessageReader, ReaderOptions};
use test_helpers::*;

// ── helpers ──────────────────────────────────────────────────────────────────

fn record(fields: Vec<(&str, Value)>) -> Record {
    Record::from_iter(fields)
}

// ── scalars and strings ──────────────────────────────────────────────────────

#[test]
fn decodes_header_message() {
    let reader = MessageReader::new(&header_schema()).unwrap();
    let bytes = Wire::new().u32(0).time(0, 0).string("frame id").build();

    let decoded = reader.read_message(bytes).unwrap();
    assert_eq!(
        decoded,
        record(vec![
            ("seq", Value::U32(0)),
            ("stamp", Value::Time(Time::new(0, 0))),
            ("frame_id", Value::string("frame id")),
        ])
    );
}

#[test]
fn decodes_every_builtin_scalar() {
    let fields = [
        ("b", "bool"),
        ("i8", "int8"),
        ("u8", "uint8"),
        ("i16", "int16"),
        ("u16", "uint16"),
        ("i32", "int32"),
        ("u32", "uint32"),
        ("i64", "int64"),
        ("u64", "uint64"),
        ("f32", "float32"),
        ("f64", "float64"),
        ("t", "time"),
        ("d", "duration"),
        ("legacy_byte", "byte"),
        ("legacy_char", "char"),
    ];
    let schema = vec![MessageDefinition::root(
        fields
            .iter()
            .map(|(name, ty)| FieldDefinition::new(*name, *ty))
            .collect(),
    )];
    let bytes = Wire::new()
        .bool(true)
        .i8(-5)
        .u8(250)
        .i16(-300)
        .u16(60_000)
        .i32(-70_000)
        .u32(4_000_000_000)
        .i64(-9_000_000_000)
        .u64(18_000_000_000_000_000_000)
        .f32(1.5)
        .f64(-2.25)
        .time(10, 20)
        .time(30, 40)
        .i8(-1)
        .u8(b'A')
        .build();

    let decoded = MessageReader::new(&schema)
        .unwrap()
        .read_message(bytes)
        .unwrap();
    let values: Vec<&Value> = decoded.values().collect();
    assert_eq!(
        values,
        vec![
            &Value::Bool(true),
            &Value::I8(-5),
            &Value::U8(250),
            &Value::I16(-300),
            &Value::U16(60_000),
            &Value::I32(-70_000),
            &Value::U32(4_000_000_000),
            &Value::I64(-9_000_000_000),
            &Value::U64(18_000_000_000_000_000_000),
            &Value::F32(1.5),
            &Value::F64(-2.25),
            &Value::Time(Time::new(10, 20)),
            &Value::Duration(Time::new(30, 40)),
            &Value::I8(-1),
            &Value::U8(65),
        ]
    );
}

#[test]
fn nonzero_bool_byte_is_true() {
    let schema = vec![MessageDefinition::root(vec![FieldDefinition::new(
        "flag", "bool",
    )])];
    let decoded = MessageReader::new(&schema)
        .unwrap()
        .read_message(vec![2u8])
        .unwrap();
    assert_eq!(decoded.get("flag"), Some(&Value::Bool(true)));
}

#[test]
fn decodes_utf8_strings() {
    let reader = MessageReader::new(&header_schema()).unwrap();
    let bytes = Wire::new().u32(1).time(0, 0).string("café ✓ 日本").build();
    let decoded = reader.read_message(bytes).unwrap();
    assert_eq!(
        decoded.get("frame_id").unwrap().try_str().unwrap(),
        "café ✓ 日本"
    );
}

#[test]
fn invalid_utf8_is_rejected_with_path() {
    let reader = MessageReader::new(&header_schema()).unwrap();
    let bytes = Wire::new()
        .u32(1)
        .time(0, 0)
        .i32(2)
        .raw(&[0xc3, 0x28])
        .build();
    let err = reader.read_message(bytes).unwrap_err();
    let DecodeError::InvalidUtf8 { offset, path, .. } = err else {
        panic!("expected invalid UTF-8, got {err:?}");
    };
    assert_eq!(offset, 12);
    assert_eq!(path, "frame_id");
}

// ── arrays and nesting ───────────────────────────────────────────────────────

#[test]
fn decodes_fixed_array_of_complex_type() {
    let schema = vec![
        MessageDefinition::root(vec![
            FieldDefinition::complex("custom", "CustomType").fixed_array(3),
        ]),
        MessageDefinition::named(
            "custom_msgs/CustomType",
            vec![FieldDefinition::new("first", "uint8")],
        ),
    ];
    let decoded = MessageReader::new(&schema)
        .unwrap()
        .read_message(vec![2u8, 3, 4])
        .unwrap();

    let items = decoded.get("custom").unwrap().try_array().unwrap();
    let firsts: Vec<u8> = items
        .iter()
        .map(|item| {
            item.try_record()
                .unwrap()
                .get("first")
                .unwrap()
                .try_u8()
                .unwrap()
        })
        .collect();
    assert_eq!(firsts, vec![2, 3, 4]);
}

#[test]
fn decodes_mixed_message() {
    let reader = MessageReader::new(&mixed_schema()).unwrap();
    let decoded = reader
        .read_message(mixed_message(&["a", "bc"], 2))
        .unwrap();

    assert_eq!(
        decoded.field_names().collect::<Vec<_>>(),
        vec![
            "header",
            "covariance",
            "labels",
            "points",
            "data",
            "flags",
            "elapsed",
            "tail"
        ]
    );

    let header = decoded.get("header").unwrap().try_record().unwrap();
    assert_eq!(header.get("seq"), Some(&Value::U32(42)));
    assert_eq!(header.get("frame_id"), Some(&Value::string("base_link")));

    let covariance = decoded.get("covariance").unwrap().try_numeric_array().unwrap();
    assert_eq!(
        covariance,
        &NumericArray::F64(TypedArray::from(vec![1.0, 0.0, 0.0, 1.0]))
    );

    assert_eq!(
        decoded.get("labels"),
        Some(&Value::Array(vec![Value::string("a"), Value::string("bc")]))
    );

    let points = decoded.get("points").unwrap().try_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(
        points[1],
        Value::Struct(record(vec![
            ("x", Value::F64(1.0)),
            ("y", Value::F64(2.0)),
            ("z", Value::F64(-1.0)),
        ]))
    );

    assert_eq!(
        decoded.get("data"),
        Some(&Value::NumericArray(NumericArray::U8(TypedArray::from(
            vec![7u8, 8, 9]
        ))))
    );
    assert_eq!(
        decoded.get("flags"),
        Some(&Value::Array(vec![Value::Bool(true), Value::Bool(false)]))
    );
    assert_eq!(
        decoded.get("elapsed"),
        Some(&Value::Duration(Time::new(5, 6)))
    );
    assert_eq!(decoded.get("tail"), Some(&Value::I16(-12)));
}

#[test]
fn constants_are_not_decoded() {
    let reader = MessageReader::new(&mixed_schema()).unwrap();
    let decoded = reader.read_message(mixed_message(&[], 0)).unwrap();
    assert_eq!(decoded.get("VERSION"), None);
}

#[test]
fn empty_dynamic_arrays() {
    let reader = MessageReader::new(&mixed_schema()).unwrap();
    let decoded = reader.read_message(mixed_message(&[], 0)).unwrap();
    assert_eq!(decoded.get("labels"), Some(&Value::Array(vec![])));
    assert_eq!(decoded.get("points"), Some(&Value::Array(vec![])));
}

#[test]
fn empty_root_decodes_to_empty_record() {
    let reader = MessageReader::new(&[MessageDefinition::root(vec![])]).unwrap();
    let (decoded, consumed) = reader.read_message_with_len(Vec::<u8>::new()).unwrap();
    assert!(decoded.is_empty());
    assert_eq!(consumed, 0);
}

#[test]
fn trailing_bytes_are_ignored() {
    let reader = MessageReader::new(&mixed_schema()).unwrap();
    let message = mixed_message(&["x"], 1);
    let mut padded = message.clone();
    padded.extend([0xde, 0xad, 0xbe, 0xef]);

    let (decoded, consumed) = reader.read_message_with_len(padded).unwrap();
    assert_eq!(consumed, message.len());
    assert_eq!(decoded, reader.read_message(message).unwrap());
}

// ── bounds ───────────────────────────────────────────────────────────────────

#[test]
fn negative_string_length_is_a_bounds_error() {
    let reader = MessageReader::new(&header_schema()).unwrap();
    let bytes = Wire::new().u32(1).time(0, 0).i32(-4).raw(b"abcd").build();
    let DecodeError::Bounds(err) = reader.read_message(bytes).unwrap_err() else {
        panic!("expected bounds error");
    };
    assert_eq!(err.requested, -4);
    assert_eq!(err.path, "frame_id");
}

#[test]
fn oversized_array_count_is_a_bounds_error() {
    let reader = MessageReader::new(&mixed_schema()).unwrap();
    let mut bytes = Wire::new()
        .u32(1)
        .time(0, 0)
        .string("")
        .f64(0.0)
        .f64(0.0)
        .f64(0.0)
        .f64(0.0)
        .u32(0)
        .u32(u32::MAX)
        .build();
    bytes.extend([0u8; 64]);

    let DecodeError::Bounds(err) = reader.read_message(bytes).unwrap_err() else {
        panic!("expected bounds error");
    };
    assert_eq!(err.path, "points");
    assert_eq!(err.available, 64);
}

#[test]
fn empty_element_count_is_bounded_by_buffer() {
    let reader = MessageReader::new(&empty_items_schema()).unwrap();

    // Each empty element is charged one of the bytes that follow the count.
    let decoded = reader
        .read_message(Wire::new().u32(3).u8(9).raw(&[0, 0]).build())
        .unwrap();
    let items = decoded.get("items").unwrap().try_array().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item.try_record().unwrap().is_empty()));
    assert_eq!(decoded.get("tail"), Some(&Value::U8(9)));

    let bytes = Wire::new().u32(u32::MAX).raw(&[0; 4]).build();
    let DecodeError::Bounds(err) = reader.read_message(bytes).unwrap_err() else {
        panic!("expected bounds error");
    };
    assert_eq!(err.path, "items");
    assert_eq!(err.offset, 4);
    assert_eq!(err.available, 4);
}

#[test]
fn nested_error_path_includes_index() {
    let reader = MessageReader::new(&mixed_schema()).unwrap();
    let mut bytes = mixed_message(&["ok", "bad"], 0);
    // Corrupt the second label's length prefix.
    let second = 4 + 8 + 4 + "base_link".len() + 32 + 4 + 4 + 2;
    bytes[second..second + 4].copy_from_slice(&1000i32.to_le_bytes());

    let DecodeError::Bounds(err) = reader.read_message(bytes).unwrap_err() else {
        panic!("expected bounds error");
    };
    assert_eq!(err.path, "labels[1]");
    assert_eq!(err.offset, second);
    assert_eq!(err.requested, 1000);
}

#[test]
fn every_truncation_fails() {
    let reader = MessageReader::new(&mixed_schema()).unwrap();
    let message = mixed_message(&["a", "bcd"], 2);
    for len in 0..message.len() {
        let err = reader.read_message(message[..len].to_vec()).unwrap_err();
        assert!(err.is_bounds(), "truncated to {len}: {err}");
    }
}

// ── freeze ───────────────────────────────────────────────────────────────────

#[test]
fn frozen_output_rejects_mutation() {
    let reader = MessageReader::with_options(&mixed_schema(), ReaderOptions { freeze: true })
        .unwrap();
    let mut decoded = reader.read_message(mixed_message(&["a"], 1)).unwrap();
    assert!(decoded.is_frozen());
    assert!(matches!(
        decoded.set("tail", Value::I16(0)),
        Err(ValueError::Frozen { .. })
    ));

    let points = decoded.get("points").unwrap().try_array().unwrap();
    assert!(points[0].try_record().unwrap().is_frozen());
    assert!(decoded.get("header").unwrap().try_record().unwrap().is_frozen());
}

#[test]
fn unfrozen_output_is_mutable() {
    let reader = MessageReader::new(&header_schema()).unwrap();
    let mut decoded = reader
        .read_message(Wire::new().u32(1).time(0, 0).string("").build())
        .unwrap();
    assert!(!decoded.is_frozen());
    decoded.set("seq", Value::U32(2)).unwrap();
    assert_eq!(decoded.get("seq"), Some(&Value::U32(2)));
}
