//! External id strategy and triggers

mod strategy;

pub use strategy::{
    insert_trigger, select_strategy, update_trigger, ExternalIdStrategy, ExternalIdTrigger,
    TriggerEvent, HASH_ALGORITHM, HASH_HEX_LEN,
};
