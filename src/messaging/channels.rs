// Communication channels lock-free

use crate::audio::click::ClickRequest;
use crate::messaging::command::BeatEvent;
use ringbuf::{HeapRb, traits::Split};

/// Pending beat slot: a new event is dropped while the previous one is unread
pub const BEAT_CHANNEL_CAPACITY: usize = 1;

pub type BeatProducer = ringbuf::HeapProd<BeatEvent>;
pub type BeatConsumer = ringbuf::HeapCons<BeatEvent>;

pub fn create_beat_channel() -> (BeatProducer, BeatConsumer) {
    let rb = HeapRb::<BeatEvent>::new(BEAT_CHANNEL_CAPACITY);
    rb.split()
}

pub type ClickProducer = ringbuf::HeapProd<ClickRequest>;
pub type ClickConsumer = ringbuf::HeapCons<ClickRequest>;

pub fn create_click_channel(capacity: usize) -> (ClickProducer, ClickConsumer) {
    let rb = HeapRb::<ClickRequest>::new(capacity);
    rb.split()
}
