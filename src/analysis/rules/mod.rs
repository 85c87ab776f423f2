pub mod internal_initializers;
pub mod order_weight;
pub mod ordering;
pub mod storage_slot;
