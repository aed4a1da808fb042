pub use sea_orm_migration::prelude::*;

mod m20250901_090000_create_tracks_table;
mod m20250901_091500_create_pending_updates_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_090000_create_tracks_table::Migration),
            Box::new(m20250901_091500_create_pending_updates_table::Migration),
        ]
    }
}
