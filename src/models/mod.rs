//! Data models for extracted marketplace listings.

mod card;

pub use card::CardRecord;
