pub mod mapping;
pub mod participant;
pub mod settings;
