#[cfg(test)]
pub mod test_utils {
    use crate::auth;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use model::entities::user::UserRole;
    use model::entities::{faculty, student, subject, user};
    use model::SubjectCodes;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Secret used to sign tokens in tests.
    pub const TEST_JWT_SECRET: &str = "test-secret";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        AppState {
            db,
            jwt_secret: TEST_JWT_SECRET.to_string(),
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing, returning the state alongside so tests
    /// can seed data directly.
    pub async fn setup_test_app() -> (Router, AppState) {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        let router = create_router(state.clone());
        (router, state)
    }

    /// Mint a session token for a user with the test secret.
    pub fn token_for(user: &user::Model) -> String {
        auth::create_token(user, TEST_JWT_SECRET).expect("Failed to create test token")
    }

    /// Insert a user with a hashed password.
    pub async fn insert_user(
        db: &DatabaseConnection,
        role: UserRole,
        name: &str,
        email: &str,
        password: &str,
    ) -> user::Model {
        user::ActiveModel {
            role: Set(role),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            phone: Set("9000000000".to_string()),
            password_hash: Set(auth::hash_password(password).expect("Failed to hash password")),
            address: Set("Campus Rd".to_string()),
            dob: Set(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()),
            department: Set(None),
            semester: Set(None),
            roll_no: Set(None),
            designation: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert test user")
    }

    /// Insert a faculty record, optionally linked to a user.
    pub async fn insert_faculty(
        db: &DatabaseConnection,
        user_id: Option<i32>,
        name: &str,
        email: &str,
        department: &str,
        subjects: &[&str],
    ) -> faculty::Model {
        faculty::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            department: Set(department.to_string()),
            semester: Set("3".to_string()),
            phone: Set(Some("9000000000".to_string())),
            status: Set(faculty::FacultyStatus::Active),
            address: Set("Campus Rd".to_string()),
            designation: Set("Professor".to_string()),
            dob: Set(NaiveDate::from_ymd_opt(1985, 2, 11).unwrap()),
            subjects: Set(SubjectCodes::from(
                subjects.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            )),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert test faculty")
    }

    /// Insert a student record linked to a user.
    pub async fn insert_student(
        db: &DatabaseConnection,
        user_id: i32,
        roll_no: &str,
        name: &str,
        email: &str,
        department: &str,
    ) -> student::Model {
        student::ActiveModel {
            roll_no: Set(Some(roll_no.to_string())),
            roll_number: Set(None),
            name: Set(name.to_string()),
            department: Set(department.to_string()),
            semester: Set(3),
            email: Set(email.to_string()),
            phone: Set("9000000001".to_string()),
            status: Set(student::StudentStatus::Active),
            address: Set("Hostel A".to_string()),
            dob: Set(NaiveDate::from_ymd_opt(2004, 6, 1).unwrap()),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert test student")
    }

    /// Insert a subject taught by the named faculty.
    pub async fn insert_subject(
        db: &DatabaseConnection,
        code: &str,
        name: &str,
        department: &str,
        faculty: &str,
    ) -> subject::Model {
        subject::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            department: Set(department.to_string()),
            semester: Set(3),
            faculty: Set(faculty.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert test subject")
    }
}
