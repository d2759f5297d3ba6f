pub mod relationship_service;
pub mod side_effects;
pub mod user_service;

pub use relationship_service::RelationshipMutator;
pub use side_effects::SideEffects;
pub use user_service::AccountService;
