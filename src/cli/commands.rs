pub mod initdb;
pub mod seed_admin;
pub mod serve;

pub use initdb::init_database;
pub use seed_admin::seed_admins;
pub use serve::serve;
