pub mod pending_update;
pub mod track;

pub mod prelude {
    pub use super::pending_update::Entity as PendingUpdate;
    pub use super::track::Entity as Track;
}
