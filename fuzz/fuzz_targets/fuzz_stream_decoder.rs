//! Fuzz target: `StreamDecoder::feed`
//!
//! Drives arbitrary byte sequences, split at a fuzzer-chosen point, into
//! the event-stream decoder and folds every event into a watch mailbox.
//! Asserts that nothing panics and that the decoder accepts a clean event
//! after a reset.
//!
//! cargo fuzz run fuzz_stream_decoder

#![no_main]

use gasguard::adapters::firebase::WatchSlot;
use gasguard::rtdb::stream::{StreamDecoder, StreamEvent};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let cut = usize::from(split).min(rest.len());

    let mut decoder = StreamDecoder::new();
    let mut slot = WatchSlot::default();
    decoder.feed(&rest[..cut], |e| {
        slot.apply(e);
    });
    decoder.feed(&rest[cut..], |e| {
        slot.apply(e);
    });
    let _ = slot.take();

    decoder.reset();
    let mut events = Vec::new();
    decoder.feed(b"event: keep-alive\ndata: null\n\n", |e| events.push(e));
    assert_eq!(events, vec![StreamEvent::KeepAlive]);
});
