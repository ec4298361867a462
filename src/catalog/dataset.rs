//! Built-in sample images of empty rooms.
//!
//! Bump [`DATASET_VERSION`] whenever the list below changes.

use super::ImageRecord;

pub const DATASET_VERSION: u32 = 1;

pub(super) const EMPTY_ROOM_DATASET: &[(&str, &str, &str)] = &[
    (
        "living-1",
        "https://images.unsplash.com/photo-1513694203232-719a280e022f?q=80&w=1200",
        "Bright empty living room with a large window",
    ),
    (
        "minimal-1",
        "https://images.unsplash.com/photo-1494438639946-1ebd1d20bf85?q=80&w=1200",
        "Minimalist empty space with a wooden floor",
    ),
    (
        "bedroom-1",
        "https://images.unsplash.com/photo-1505691938895-1758d7feb511?q=80&w=1200",
        "Empty bedroom with a carpet",
    ),
    (
        "apartment-1",
        "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?q=80&w=1200",
        "Modern empty apartment, corner view",
    ),
    (
        "loft-1",
        "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?q=80&w=1200",
        "Empty loft space with a high ceiling",
    ),
    (
        "attic-1",
        "https://images.unsplash.com/photo-1536376074432-cd4258d6c2fe?q=80&w=1200",
        "Empty attic with exposed beams",
    ),
    (
        "modern-1",
        "https://images.unsplash.com/photo-1484154218962-a197022b5858?q=80&w=1200",
        "Empty modern kitchen open to the living room",
    ),
    (
        "luxury-1",
        "https://images.unsplash.com/photo-1512918728675-ed5a9ecdebfd?q=80&w=1200",
        "Luxurious empty space with a view",
    ),
    (
        "bright-1",
        "https://images.unsplash.com/photo-1493809842364-78817add7ffb?q=80&w=1200",
        "Bright empty apartment with parquet flooring",
    ),
];

pub(super) fn records() -> Vec<ImageRecord> {
    EMPTY_ROOM_DATASET
        .iter()
        .map(|(id, locator, description)| ImageRecord::new(*id, *locator, *description))
        .collect()
}
