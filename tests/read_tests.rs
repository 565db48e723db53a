mod common;

use common::{compound, list, strings, write_named};
use na_bookscan::{
    Error, LittleEndian, List, MAX_DEPTH, TagID, TreeError, Value, read, read_be,
};

// ==================== Helper Functions ====================

fn roundtrip(value: Value) {
    let data = write_named("root", &value);
    let decoded = read_be(&data).unwrap();
    assert_eq!(decoded.name, "root");
    assert_eq!(decoded.value, value);
}

fn expect_tree_error(data: &[u8], expected: TreeError) {
    match read_be(data) {
        Err(Error::MalformedTree(e)) => assert_eq!(e, expected),
        other => panic!("Expected {expected:?}, got {other:?}"),
    }
}

fn create_list_header(tag: u8, count: u32) -> Vec<u8> {
    let mut data = vec![0x09, 0x00, 0x00]; // Root list
    data.push(tag);
    data.extend_from_slice(&count.to_be_bytes());
    data
}

fn create_compound_start() -> Vec<u8> {
    vec![0x0A, 0x00, 0x00]
}

// ==================== Round Trips ====================

#[test]
fn test_roundtrip_primitives() {
    roundtrip(Value::Byte(-5));
    roundtrip(Value::Short(-1234));
    roundtrip(Value::Int(i32::MIN));
    roundtrip(Value::Long(i64::MAX));
    roundtrip(Value::Float(1.5));
    roundtrip(Value::Double(-0.125));
}

#[test]
fn test_roundtrip_arrays() {
    roundtrip(Value::ByteArray(vec![-1, 0, 1, 127]));
    roundtrip(Value::IntArray(vec![1, -2, 3]));
    roundtrip(Value::LongArray(vec![i64::MIN, 0, i64::MAX]));
    roundtrip(Value::ByteArray(Vec::new()));
    roundtrip(Value::IntArray(Vec::new()));
    roundtrip(Value::LongArray(Vec::new()));
}

#[test]
fn test_roundtrip_strings() {
    roundtrip(Value::from(""));
    roundtrip(Value::from("hello"));
    roundtrip(Value::from("Привет, мир"));
}

#[test]
fn test_roundtrip_empty_list_and_compound() {
    roundtrip(Value::List(List::empty()));
    roundtrip(Value::Compound(Default::default()));
}

#[test]
fn test_roundtrip_every_variant_nested() {
    let tree = compound([
        ("byte", Value::Byte(1)),
        ("short", Value::Short(2)),
        ("int", Value::Int(3)),
        ("long", Value::Long(4)),
        ("float", Value::Float(5.0)),
        ("double", Value::Double(6.0)),
        ("bytes", Value::ByteArray(vec![7])),
        ("string", "eight".into()),
        ("strings", strings(&["a", "b"])),
        ("empty_list", Value::List(List::empty())),
        ("empty_compound", compound([])),
        (
            "lists",
            list(
                TagID::List,
                vec![strings(&["x"]), list(TagID::Int, vec![Value::Int(9)])],
            ),
        ),
        (
            "compounds",
            list(
                TagID::Compound,
                vec![compound([("k", Value::Long(10))]), compound([])],
            ),
        ),
        ("ints", Value::IntArray(vec![11])),
        ("longs", Value::LongArray(vec![12])),
    ]);
    roundtrip(tree);
}

#[test]
fn test_compound_preserves_insertion_order() {
    let tree = compound([
        ("zeta", Value::Byte(1)),
        ("alpha", Value::Byte(2)),
        ("mid", Value::Byte(3)),
    ]);
    let decoded = read_be(&write_named("", &tree)).unwrap();
    let names: Vec<&str> = decoded
        .value
        .as_compound()
        .unwrap()
        .iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, ["zeta", "alpha", "mid"]);
}

// ==================== Decoder Behaviour ====================

#[test]
fn test_root_end_tag() {
    let root = read_be(&[0x00]).unwrap();
    assert_eq!(root.name, "");
    assert_eq!(root.value, Value::End);
}

#[test]
fn test_trailing_data_is_ignored() {
    let mut data = vec![0x01, 0x00, 0x00, 42];
    data.extend_from_slice(&[0xAA, 0xBB]);
    assert_eq!(read_be(&data).unwrap().value, Value::Byte(42));
}

#[test]
fn test_little_endian() {
    let data = [0x03, 0x01, 0x00, b'n', 0x07, 0x00, 0x00, 0x00];
    let root = read::<LittleEndian>(&data).unwrap();
    assert_eq!(root.name, "n");
    assert_eq!(root.value, Value::Int(7));
}

#[test]
fn test_invalid_utf8_is_replaced() {
    // String "a\xFFb"
    let data = [0x08, 0x00, 0x00, 0x00, 0x03, b'a', 0xFF, b'b'];
    let root = read_be(&data).unwrap();
    let text = root.value.as_str().unwrap();
    assert!(text.starts_with('a'));
    assert!(text.ends_with('b'));
    assert!(text.contains('\u{FFFD}'));
}

#[test]
fn test_modified_utf8_null() {
    // Java writes U+0000 as C0 80
    let data = [0x08, 0x00, 0x00, 0x00, 0x03, b'a', 0xC0, 0x80];
    let root = read_be(&data).unwrap();
    assert_eq!(root.value.as_str(), Some("a\0"));
}

#[test]
fn test_duplicate_name_keeps_first_position_last_value() {
    let mut data = create_compound_start();
    for (name, value) in [(b'a', 1u8), (b'b', 2), (b'a', 3)] {
        data.extend_from_slice(&[0x01, 0x00, 0x01, name, value]);
    }
    data.push(0x00);
    let root = read_be(&data).unwrap();
    let compound = root.value.as_compound().unwrap();
    assert_eq!(compound.len(), 2);
    let entries: Vec<(&str, &Value)> = compound.iter().collect();
    assert_eq!(entries[0], ("a", &Value::Byte(3)));
    assert_eq!(entries[1], ("b", &Value::Byte(2)));
}

#[test]
fn test_end_typed_list_with_count_is_empty() {
    let data = create_list_header(0, 3);
    let root = read_be(&data).unwrap();
    let list = root.value.as_list().unwrap();
    assert!(list.is_empty());
    assert_eq!(list.element(), TagID::End);
}

// ==================== Malformed Input ====================

#[test]
fn test_empty_slice() {
    expect_tree_error(&[], TreeError::EndOfFile);
}

#[test]
fn test_eof_in_root_header() {
    expect_tree_error(&[0x01, 0x00], TreeError::EndOfFile);
}

#[test]
fn test_invalid_root_tag() {
    expect_tree_error(&[0xFF, 0x00, 0x00], TreeError::InvalidTagType(0xFF));
}

#[test]
fn test_eof_in_list_header() {
    expect_tree_error(&[0x09, 0x00, 0x00, 0x01, 0x00], TreeError::EndOfFile);
}

#[test]
fn test_eof_in_list_body_primitive() {
    let mut data = create_list_header(1, 2);
    data.push(0xFF);
    expect_tree_error(&data, TreeError::EndOfFile);
}

#[test]
fn test_huge_list_count_fails_without_allocating() {
    let data = create_list_header(10, u32::MAX);
    expect_tree_error(&data, TreeError::EndOfFile);
}

#[test]
fn test_huge_array_count() {
    let mut data = vec![0x0B, 0x00, 0x00];
    data.extend_from_slice(&u32::MAX.to_be_bytes());
    expect_tree_error(&data, TreeError::EndOfFile);
}

#[test]
fn test_string_length_past_end() {
    let data = [0x08, 0x00, 0x00, 0x00, 0x10, b'a'];
    expect_tree_error(&data, TreeError::EndOfFile);
}

#[test]
fn test_invalid_element_type_in_list() {
    let data = create_list_header(0xFF, 1);
    expect_tree_error(&data, TreeError::InvalidTagType(0xFF));
}

#[test]
fn test_invalid_tag_in_compound() {
    let mut data = create_compound_start();
    data.push(0x20);
    data.extend_from_slice(&0u16.to_be_bytes());
    expect_tree_error(&data, TreeError::InvalidTagType(0x20));
}

#[test]
fn test_unterminated_compound() {
    let mut data = create_compound_start();
    data.extend_from_slice(&[0x01, 0x00, 0x01, b'a', 0x05]);
    expect_tree_error(&data, TreeError::EndOfFile);
}

#[test]
fn test_depth_limit() {
    // Lists nested one level deeper than allowed
    let mut data = vec![0x09, 0x00, 0x00];
    for _ in 0..MAX_DEPTH {
        data.push(0x09);
        data.extend_from_slice(&1u32.to_be_bytes());
    }
    data.push(0x00);
    data.extend_from_slice(&0u32.to_be_bytes());
    expect_tree_error(&data, TreeError::DepthLimitExceeded(MAX_DEPTH));
}

#[test]
fn test_depth_at_limit_is_accepted() {
    let mut data = vec![0x09, 0x00, 0x00];
    for _ in 0..MAX_DEPTH - 1 {
        data.push(0x09);
        data.extend_from_slice(&1u32.to_be_bytes());
    }
    data.push(0x00);
    data.extend_from_slice(&0u32.to_be_bytes());
    assert!(read_be(&data).is_ok());
}

// ==================== Value Construction ====================

#[test]
fn test_list_new_rejects_mixed_items() {
    let err = List::new(TagID::Int, vec![Value::Int(1), Value::Byte(2)]).unwrap_err();
    assert_eq!(
        err,
        TreeError::TagMismatch {
            expected: TagID::Int,
            actual: TagID::Byte,
        }
    );
}

#[test]
fn test_list_new_empty_is_end_typed() {
    let list = List::new(TagID::String, Vec::new()).unwrap();
    assert_eq!(list.element(), TagID::End);
}

#[test]
fn test_numeric_widening() {
    assert_eq!(Value::Byte(-1).as_i64(), Some(-1));
    assert_eq!(Value::Short(300).as_i64(), Some(300));
    assert_eq!(Value::Long(5).as_f64(), Some(5.0));
    assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
    assert_eq!(Value::Float(0.5).as_i64(), None);
    assert_eq!(Value::from("1").as_i64(), None);
}
