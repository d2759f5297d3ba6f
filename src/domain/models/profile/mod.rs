pub mod profile_update;

pub use profile_update::ProfileUpdate;
