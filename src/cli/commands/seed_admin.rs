use anyhow::Result;
use chrono::NaiveDate;
use model::entities::user::{self, UserRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, Database, EntityTrait, QueryFilter, Set};
use tracing::{info, trace};

use crate::auth::hash_password;

struct AdminSeed {
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    password: &'static str,
    address: &'static str,
    dob: (i32, u32, u32),
}

const ADMINS: &[AdminSeed] = &[
    AdminSeed {
        name: "Admin One",
        email: "admin1@example.com",
        phone: "9999999999",
        password: "adminpassword1",
        address: "Admin Address 1",
        dob: (1990, 1, 1),
    },
    AdminSeed {
        name: "Admin Two",
        email: "admin2@example.com",
        phone: "8888888888",
        password: "adminpassword2",
        address: "Admin Address 2",
        dob: (1992, 2, 2),
    },
];

/// Inserts the well-known admin accounts. Admins cannot self-register, so
/// this is the only way they come into existence. Safe to re-run; existing
/// emails are left alone.
pub async fn seed_admins(database_url: &str) -> Result<()> {
    trace!("Entering seed_admins function");
    info!("Seeding admin accounts");

    let db = Database::connect(database_url).await?;

    for admin in ADMINS {
        let exists = user::Entity::find()
            .filter(user::Column::Email.eq(admin.email))
            .one(&db)
            .await?;
        if exists.is_some() {
            info!("Admin {} already exists", admin.email);
            continue;
        }

        let (year, month, day) = admin.dob;
        let dob = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| anyhow::anyhow!("invalid seed date for {}", admin.email))?;
        let password_hash = hash_password(admin.password)
            .map_err(|e| anyhow::anyhow!("failed to hash password for {}: {}", admin.email, e))?;

        user::ActiveModel {
            role: Set(UserRole::Admin),
            name: Set(admin.name.to_string()),
            email: Set(admin.email.to_string()),
            phone: Set(admin.phone.to_string()),
            password_hash: Set(password_hash),
            address: Set(admin.address.to_string()),
            dob: Set(dob),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        info!("Admin {} created", admin.email);
    }

    info!("Admin seeding completed");
    Ok(())
}
