pub mod archive;
pub mod buffs;
pub mod catalog;
pub mod event;
pub mod loader;
pub mod loose;
pub mod roster;

pub use buffs::{BuffCatalog, BuffCatalogEntry, MatchMode};
pub use catalog::{CatalogEntry, HeroCatalog};
pub use event::{AttackerRecord, EventDataset, MatchRecord, PlayerSummaryRecord};
pub use loose::OrderedMap;
pub use roster::{ClanMember, Roster};
