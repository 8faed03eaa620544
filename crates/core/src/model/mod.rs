pub mod metadata;
pub mod record;
