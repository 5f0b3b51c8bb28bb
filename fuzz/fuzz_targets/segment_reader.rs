#![no_main]

use std::io::Cursor;

use blocksig::handoff::{Handoff, Next, Signal};
use blocksig::{Crc32, Digester, Segmenter, StageOutcome};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u8, Vec<u8>)| {
    let (size, data) = input;
    let block_size = usize::from(size).max(1);

    let blocks = Handoff::new();
    let checksums = Handoff::new();

    let outcome = Segmenter::new("fuzz.bin", block_size)
        .run_reader(Cursor::new(&data), &blocks)
        .unwrap();
    let expected = data.len().div_ceil(block_size) as u64;
    assert_eq!(
        outcome,
        StageOutcome::Completed {
            items: expected,
            bytes: data.len() as u64,
        }
    );

    Digester::new(Crc32).run(&blocks, &checksums).unwrap();
    assert!(checksums.is_finished());

    // Verify: one checksum per block, in file order
    for block in data.chunks(block_size) {
        assert_eq!(checksums.pop(), Next::Item(Crc32::hash(block)));
    }
    assert_eq!(checksums.pop(), Next::Finished);

    // Verify: a failed run yields nothing
    checksums.fail();
    assert_eq!(checksums.pop(), Next::Failed);
});
