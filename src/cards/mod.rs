//! Card system: printed data, runtime instances, and sample definitions.
//!
//! ## Key Types
//!
//! - `CardTemplate`: printed card data, the unit a deck list is made of
//! - `CardInstance`: one copy of a card in a match (damage, attachments,
//!   modifiers)
//! - `normalize_card_id`: strips rarity and sequence suffixes for lookups
//! - `library`: a small set of declarative effect definitions

pub mod attributes;
pub mod definition;
pub mod instance;
pub mod library;

pub use attributes::{AttachmentKind, BloomLevel, CardCategory, Color};
pub use definition::{normalize_card_id, CardTemplate};
pub use instance::{Attachment, CardInstance, Expiry, Modifier};
