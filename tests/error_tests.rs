use std::{error::Error as _, io, path::PathBuf};

use na_bookscan::{Error, TagID, TreeError};

#[test]
fn test_tree_error_converts() {
    let error: Error = TreeError::InvalidTagType(0x20).into();
    assert!(matches!(error, Error::MalformedTree(TreeError::InvalidTagType(0x20))));
    assert_eq!(error.to_string(), "malformed tree: invalid NBT tag type: 0x20");
}

#[test]
fn test_messages_name_the_slot() {
    let error = Error::TruncatedChunkPayload {
        slot: 500,
        expected: 99,
        found: 10,
    };
    assert_eq!(
        error.to_string(),
        "chunk payload truncated in slot 500: expected 99 bytes, found 10"
    );
    assert_eq!(
        Error::TruncatedChunkHeader { slot: 7 }.to_string(),
        "chunk header truncated in slot 7"
    );
}

#[test]
fn test_tag_mismatch_message() {
    let error = TreeError::TagMismatch {
        expected: TagID::String,
        actual: TagID::Int,
    };
    assert_eq!(
        error.to_string(),
        "tag in list mismatch: expected String, got Int"
    );
}

#[test]
fn test_unreadable_file_keeps_source() {
    let error = Error::UnreadableSourceFile {
        path: PathBuf::from("world/level.dat"),
        source: io::Error::new(io::ErrorKind::NotFound, "gone"),
    };
    assert!(error.to_string().starts_with("cannot read world/level.dat"));
    assert_eq!(error.source().unwrap().to_string(), "gone");
}
