use std::io::Cursor;

use honggfuzz::fuzz;
use na_bookscan::{RegionFile, RegionPos, Scanner};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            if let Ok(mut region) = RegionFile::new(Cursor::new(data)) {
                let slots: Vec<usize> = region.index().populated().map(|(slot, _)| slot).collect();
                for slot in slots {
                    let _ = region.read_chunk(slot);
                }
            }

            let mut scanner = Scanner::new(Vec::new());
            let _ = scanner.scan_region(Cursor::new(data), RegionPos::default(), "fuzz", "fuzz");
        });
    }
}
