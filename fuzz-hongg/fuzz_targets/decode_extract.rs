use honggfuzz::fuzz;
use na_bookscan::{BigEndian, LittleEndian, extract_books, read, read_be};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            if let Ok(root) = read_be(data) {
                for book in extract_books(&root.value, "fuzz") {
                    assert_eq!(book.location, "fuzz");
                }
            }
            let _ = read::<LittleEndian>(data);
            assert_eq!(read::<BigEndian>(data).is_ok(), read_be(data).is_ok());
        });
    }
}
