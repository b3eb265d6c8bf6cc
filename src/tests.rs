#[cfg(test)]
mod integration_tests {
    use crate::handlers::auth::LoginRequest;
    use crate::schemas::{ApiResponse, ErrorResponse};
    use crate::test_utils::test_utils::{
        insert_faculty, insert_student, insert_subject, insert_user, setup_test_app, token_for,
    };
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use model::entities::prelude::{Marksheet, PendingRegistration, User};
    use model::entities::user::UserRole;
    use model::entities::{marksheet, pending_registration};
    use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
    use serde_json::json;

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_success() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let user = insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;

        let response = server
            .post("/api/auth/login")
            .json(&LoginRequest {
                email: "ravi@example.com".to_string(),
                password: "studentpass1".to_string(),
                role: "student".to_string(),
            })
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        assert_eq!(body.message, "Login successful");
        assert_eq!(body.data["user"]["id"], user.id);
        assert!(!body.data["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_failure_messages() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;

        // Unknown email
        let response = server
            .post("/api/auth/login")
            .json(&json!({
                "email": "nobody@example.com",
                "password": "studentpass1",
                "role": "student"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(
            body.error,
            "User not found or not approved wait please for admin approval ."
        );

        // Wrong role for a known account
        let response = server
            .post("/api/auth/login")
            .json(&json!({
                "email": "ravi@example.com",
                "password": "studentpass1",
                "role": "faculty"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Invalid credentials");

        // Wrong password
        let response = server
            .post("/api/auth/login")
            .json(&json!({
                "email": "ravi@example.com",
                "password": "wrong",
                "role": "student"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Password is incorrect");
    }

    #[tokio::test]
    async fn test_save_marks_happy_path() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let faculty_user = insert_user(
            &state.db,
            UserRole::Faculty,
            "Asha Rao",
            "asha@example.com",
            "facultypass1",
        )
        .await;
        insert_faculty(
            &state.db,
            Some(faculty_user.id),
            "Asha Rao",
            "asha@example.com",
            "Computer Science",
            &["CS201"],
        )
        .await;
        let student_user = insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;
        // Department stored as a synonym; the normalizer must still match it
        // against the faculty's department.
        insert_student(
            &state.db,
            student_user.id,
            "CS101",
            "Ravi Kumar",
            "ravi@example.com",
            "cse",
        )
        .await;
        insert_subject(&state.db, "CS201", "Algorithms", "Computer Science", "Asha Rao").await;

        let token = token_for(&faculty_user);
        let response = server
            .post("/api/marksheets")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({
                "rollNo": "CS101",
                "subjectCode": "CS201",
                "mid1": 18,
                "mid2": 15,
                "assignment": 9,
                "attendance": 80,
                "external": 55
            }))
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        assert_eq!(body.message, "Marks saved successfully");
        assert_eq!(body.data["bestOfTwo"], 18);
        assert_eq!(body.data["subjectCode"], "CS201");
        assert_eq!(body.data["rollNo"], "CS101");

        assert_eq!(Marksheet::find().count(&state.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_marks_requires_token() {
        let (app, _state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/marksheets")
            .json(&json!({"rollNo": "CS101", "subjectCode": "CS201"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Access token required");

        let response = server
            .post("/api/marksheets")
            .add_header(header::AUTHORIZATION, bearer("not-a-token"))
            .json(&json!({"rollNo": "CS101", "subjectCode": "CS201"}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_save_marks_rejects_unassigned_faculty() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let faculty_user = insert_user(
            &state.db,
            UserRole::Faculty,
            "Asha Rao",
            "asha@example.com",
            "facultypass1",
        )
        .await;
        // No CS201 in the assignment list.
        insert_faculty(
            &state.db,
            Some(faculty_user.id),
            "Asha Rao",
            "asha@example.com",
            "Computer Science",
            &[],
        )
        .await;
        let student_user = insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;
        insert_student(
            &state.db,
            student_user.id,
            "CS101",
            "Ravi Kumar",
            "ravi@example.com",
            "cse",
        )
        .await;
        insert_subject(&state.db, "CS201", "Algorithms", "Computer Science", "Asha Rao").await;

        let token = token_for(&faculty_user);
        let response = server
            .post("/api/marksheets")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({"rollNo": "CS101", "subjectCode": "CS201", "mid1": 18}))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorResponse = response.json();
        assert!(body.error.contains("not assigned to teach this subject"));
        assert_eq!(Marksheet::find().count(&state.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_marks_rejects_cross_department() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let faculty_user = insert_user(
            &state.db,
            UserRole::Faculty,
            "Asha Rao",
            "asha@example.com",
            "facultypass1",
        )
        .await;
        insert_faculty(
            &state.db,
            Some(faculty_user.id),
            "Asha Rao",
            "asha@example.com",
            "Computer Science",
            &["CS201"],
        )
        .await;
        let student_user = insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;
        // Mechanical, not a synonym of Computer Science.
        insert_student(
            &state.db,
            student_user.id,
            "ME101",
            "Ravi Kumar",
            "ravi@example.com",
            "me",
        )
        .await;
        insert_subject(&state.db, "CS201", "Algorithms", "Computer Science", "Asha Rao").await;

        let token = token_for(&faculty_user);
        let response = server
            .post("/api/marksheets")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({"rollNo": "ME101", "subjectCode": "CS201", "mid1": 18}))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorResponse = response.json();
        assert!(body.error.contains("own department"));
        assert_eq!(Marksheet::find().count(&state.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_marks_upserts_single_row() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let faculty_user = insert_user(
            &state.db,
            UserRole::Faculty,
            "Asha Rao",
            "asha@example.com",
            "facultypass1",
        )
        .await;
        insert_faculty(
            &state.db,
            Some(faculty_user.id),
            "Asha Rao",
            "asha@example.com",
            "Computer Science",
            &["CS201"],
        )
        .await;
        let student_user = insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;
        insert_student(
            &state.db,
            student_user.id,
            "CS101",
            "Ravi Kumar",
            "ravi@example.com",
            "cse",
        )
        .await;
        insert_subject(&state.db, "CS201", "Algorithms", "Computer Science", "Asha Rao").await;

        let token = token_for(&faculty_user);
        let first = server
            .post("/api/marksheets")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({"rollNo": "CS101", "subjectCode": "CS201", "mid1": 10, "mid2": 12}))
            .await;
        first.assert_status(StatusCode::OK);

        let second = server
            .post("/api/marksheets")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({"rollNo": "CS101", "subjectCode": "CS201", "mid1": 19, "mid2": 12}))
            .await;
        second.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = second.json();
        assert_eq!(body.data["mid1"], 19);
        assert_eq!(body.data["bestOfTwo"], 19);

        assert_eq!(Marksheet::find().count(&state.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_subject_create_requires_resolvable_faculty() {
        let (app, _state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/subjects")
            .json(&json!({
                "code": "CS201",
                "name": "Algorithms",
                "department": "Computer Science",
                "semester": 3,
                "faculty": "Nobody"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(
            body.error,
            "Faculty not found. Please enter a valid faculty name or email."
        );
    }

    #[tokio::test]
    async fn test_subject_create_assigns_faculty() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        insert_faculty(
            &state.db,
            None,
            "Asha Rao",
            "asha@example.com",
            "Computer Science",
            &[],
        )
        .await;

        let response = server
            .post("/api/subjects")
            .json(&json!({
                "code": "CS201",
                "name": "Algorithms",
                "department": "Computer Science",
                "semester": "3",
                "faculty": "Asha Rao"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let faculty_list = server.get("/api/faculty").await;
        faculty_list.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = faculty_list.json();
        let subjects = body.data[0]["subjects"].as_array().unwrap();
        assert!(subjects.iter().any(|s| s == "CS201"));
    }

    #[tokio::test]
    async fn test_subject_update_moves_assignment() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        insert_faculty(
            &state.db,
            None,
            "Asha Rao",
            "asha@example.com",
            "Computer Science",
            &[],
        )
        .await;
        insert_faculty(
            &state.db,
            None,
            "Vikram Shah",
            "vikram@example.com",
            "Computer Science",
            &[],
        )
        .await;

        let created = server
            .post("/api/subjects")
            .json(&json!({
                "code": "CS201",
                "name": "Algorithms",
                "department": "Computer Science",
                "semester": 3,
                "faculty": "Asha Rao"
            }))
            .await;
        created.assert_status(StatusCode::CREATED);
        let created_body: ApiResponse<serde_json::Value> = created.json();
        let subject_id = created_body.data["id"].as_i64().unwrap();

        let updated = server
            .put(&format!("/api/subjects/{subject_id}"))
            .json(&json!({
                "code": "CS201",
                "name": "Algorithms",
                "department": "Computer Science",
                "semester": 3,
                "faculty": "Vikram Shah"
            }))
            .await;
        updated.assert_status(StatusCode::OK);

        let faculty_list = server.get("/api/faculty").await;
        let body: ApiResponse<serde_json::Value> = faculty_list.json();
        for member in body.data.as_array().unwrap() {
            let subjects = member["subjects"].as_array().unwrap();
            let teaches = subjects.iter().any(|s| s == "CS201");
            if member["name"] == "Vikram Shah" {
                assert!(teaches, "new faculty should carry the assignment");
            } else {
                assert!(!teaches, "previous faculty should be unassigned");
            }
        }
    }

    #[tokio::test]
    async fn test_dashboard_counts_follow_mutations() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let student_user = insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;
        let created = server
            .post("/api/students")
            .json(&json!({
                "roll_no": "CS101",
                "name": "Ravi Kumar",
                "department": "cse",
                "semester": "3",
                "email": "ravi@example.com",
                "phone": "9000000001",
                "address": "Hostel A",
                "dob": "2004-06-01",
                "user_id": student_user.id
            }))
            .await;
        created.assert_status(StatusCode::CREATED);

        let dept = server
            .post("/api/departments")
            .json(&json!({
                "dept_id": "CSE",
                "name": "Computer Science",
                "hod": "Asha Rao"
            }))
            .await;
        dept.assert_status(StatusCode::CREATED);

        let live = server.get("/api/dashboard/stats").await;
        live.assert_status(StatusCode::OK);
        let live_body: ApiResponse<serde_json::Value> = live.json();
        assert_eq!(live_body.data["totalStudents"], 1);
        assert_eq!(live_body.data["totalFaculty"], 0);
        assert_eq!(live_body.data["departments"], 1);
        assert_eq!(live_body.data["subjects"], 0);

        // The cached row was refreshed by the mutations above and must agree
        // with the live counts.
        let cached = server.get("/api/dashboard-stats").await;
        cached.assert_status(StatusCode::OK);
        let cached_body: ApiResponse<serde_json::Value> = cached.json();
        assert_eq!(cached_body.data["totalStudents"], 1);
        assert_eq!(cached_body.data["departments"], 1);
    }

    #[tokio::test]
    async fn test_registration_flow() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let submitted = server
            .post("/api/pending-registrations")
            .json(&json!({
                "name": "Ravi Kumar",
                "email": "ravi@example.com",
                "password": "studentpass1",
                "role": "student",
                "department": "cse",
                "semester": "3",
                "rollNo": "CS101",
                "phoneNumber": "9000000001",
                "address": "Hostel A",
                "dateOfBirth": "2004-06-01"
            }))
            .await;
        submitted.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = submitted.json();
        assert_eq!(body.message, "Registration request submitted.");
        let registration_id = body.data["id"].as_i64().unwrap();

        // No user until the admin approves.
        assert_eq!(User::find().count(&state.db).await.unwrap(), 0);

        let pending = server.get("/api/pending-registrations").await;
        pending.assert_status(StatusCode::OK);
        let pending_body: ApiResponse<serde_json::Value> = pending.json();
        assert_eq!(pending_body.data.as_array().unwrap().len(), 1);

        let approved = server
            .post(&format!("/api/pending-registrations/{registration_id}/approve"))
            .await;
        approved.assert_status(StatusCode::OK);
        let approved_body: ApiResponse<serde_json::Value> = approved.json();
        assert_eq!(approved_body.message, "Registration approved.");

        // The approved user can log in.
        let login = server
            .post("/api/auth/login")
            .json(&json!({
                "email": "ravi@example.com",
                "password": "studentpass1",
                "role": "student"
            }))
            .await;
        login.assert_status(StatusCode::OK);

        // Approval is single shot.
        let again = server
            .post(&format!("/api/pending-registrations/{registration_id}/approve"))
            .await;
        again.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_approve_with_missing_fields_creates_nothing() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let submitted = server
            .post("/api/pending-registrations")
            .json(&json!({
                "name": "Ravi Kumar",
                "email": "ravi@example.com",
                "password": "studentpass1",
                "role": "student",
                "department": "cse",
                "semester": "3",
                "rollNo": "CS101",
                "phoneNumber": "9000000001",
                "address": "Hostel A",
                "dateOfBirth": "2004-06-01"
            }))
            .await;
        submitted.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = submitted.json();
        let registration_id = body.data["id"].as_i64().unwrap() as i32;

        // Simulate a request that slipped in without a roll number.
        let row = PendingRegistration::find_by_id(registration_id)
            .one(&state.db)
            .await
            .unwrap()
            .unwrap();
        let mut active: pending_registration::ActiveModel = row.into();
        active.roll_no = Set(None);
        active.update(&state.db).await.unwrap();

        let approved = server
            .post(&format!("/api/pending-registrations/{registration_id}/approve"))
            .await;
        approved.assert_status(StatusCode::BAD_REQUEST);
        let error: ErrorResponse = approved.json();
        assert_eq!(error.error, "Missing required student fields: rollNo");

        assert_eq!(User::find().count(&state.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_registration_rejects_admin_role() {
        let (app, _state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/pending-registrations")
            .json(&json!({
                "name": "Mallory",
                "email": "mallory@example.com",
                "password": "adminpass1",
                "role": "admin",
                "department": "cse",
                "designation": "Root"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Role must be student or faculty");
    }

    #[tokio::test]
    async fn test_reject_only_flips_status() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let submitted = server
            .post("/api/pending-registrations")
            .json(&json!({
                "name": "Asha Rao",
                "email": "asha@example.com",
                "password": "facultypass1",
                "role": "faculty",
                "department": "Computer Science",
                "semester": "3",
                "designation": "Professor",
                "phoneNumber": "9000000000",
                "address": "Campus Rd",
                "dateOfBirth": "1985-02-11"
            }))
            .await;
        submitted.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = submitted.json();
        let registration_id = body.data["id"].as_i64().unwrap();

        let rejected = server
            .post(&format!("/api/pending-registrations/{registration_id}/reject"))
            .await;
        rejected.assert_status(StatusCode::OK);
        let rejected_body: ApiResponse<serde_json::Value> = rejected.json();
        assert_eq!(rejected_body.message, "Registration rejected.");
        assert_eq!(rejected_body.data["status"], "rejected");

        assert_eq!(User::find().count(&state.db).await.unwrap(), 0);

        let pending = server.get("/api/pending-registrations").await;
        let pending_body: ApiResponse<serde_json::Value> = pending.json();
        assert!(pending_body.data.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_users_role_filter_validation() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;

        let response = server.get("/api/users").add_query_param("role", "alien").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Role must be student or faculty");

        let response = server.get("/api/users").add_query_param("role", "student").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_student_search() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let student_user = insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;
        insert_student(
            &state.db,
            student_user.id,
            "CS101",
            "Ravi Kumar",
            "ravi@example.com",
            "Computer Science",
        )
        .await;

        // Missing query parameter
        let response = server.get("/api/students/search").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Query parameter is required");

        // Case-insensitive fragment match on the roll number
        let response = server
            .get("/api/students/search")
            .add_query_param("query", "cs10")
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["student"]["roll_no"], "CS101");
        assert!(body.data["marks"].as_array().unwrap().is_empty());

        // No match
        let response = server
            .get("/api/students/search")
            .add_query_param("query", "zz999")
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_faculty_profile_lazy_creation() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let faculty_user = insert_user(
            &state.db,
            UserRole::Faculty,
            "Asha Rao",
            "asha@example.com",
            "facultypass1",
        )
        .await;

        // No faculty record exists yet; the read materializes one.
        let response = server
            .get(&format!("/api/faculty-profile/user/{}", faculty_user.id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["email"], "asha@example.com");
        assert_eq!(body.data["department"], "Unknown");
        let faculty_id = body.data["faculty_id"].as_i64().unwrap();

        // A second read resolves to the same record.
        let again = server
            .get(&format!("/api/faculty-profile/user/{}", faculty_user.id))
            .await;
        again.assert_status(StatusCode::OK);
        let again_body: ApiResponse<serde_json::Value> = again.json();
        assert_eq!(again_body.data["faculty_id"].as_i64().unwrap(), faculty_id);
    }

    #[tokio::test]
    async fn test_faculty_profile_denies_students() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let student_user = insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;

        let response = server
            .get(&format!("/api/faculty-profile/user/{}", student_user.id))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorResponse = response.json();
        assert_eq!(
            body.error,
            "Access denied. Only faculty members can view this page."
        );
    }

    #[tokio::test]
    async fn test_profile_update_syncs_subjects() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let faculty_user = insert_user(
            &state.db,
            UserRole::Faculty,
            "Asha Rao",
            "asha@example.com",
            "facultypass1",
        )
        .await;
        let faculty = insert_faculty(
            &state.db,
            Some(faculty_user.id),
            "Asha Rao",
            "asha@example.com",
            "Computer Science",
            &["CS201"],
        )
        .await;

        let response = server
            .put(&format!("/api/faculty-profile/{}", faculty.id))
            .json(&json!({
                "qualification": "PhD",
                "experience": "10 years",
                "subjects": ["CS201", "CS301"]
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.message, "Profile updated successfully");
        assert_eq!(body.data["qualification"], "PhD");
        let subjects = body.data["subjects"].as_array().unwrap();
        assert_eq!(subjects.len(), 2);
        let profile_subjects = body.data["profile_subjects"].as_array().unwrap();
        assert_eq!(profile_subjects.len(), 2);
    }

    #[tokio::test]
    async fn test_student_dashboard_me() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let student_user = insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;
        let student = insert_student(
            &state.db,
            student_user.id,
            "CS101",
            "Ravi Kumar",
            "ravi@example.com",
            "Computer Science",
        )
        .await;
        let subject =
            insert_subject(&state.db, "CS201", "Algorithms", "Computer Science", "Asha Rao").await;
        // A stored row with a stale best-of-two; the dashboard recomputes it.
        marksheet::ActiveModel {
            student_id: Set(student.id),
            subject_id: Set(subject.id),
            student_name: Set("Ravi Kumar".to_string()),
            roll_no: Set(Some("CS101".to_string())),
            subject_name: Set("Algorithms".to_string()),
            subject_code: Set("CS201".to_string()),
            mid1: Set(12),
            mid2: Set(17),
            assignment: Set(8),
            attendance: Set(75),
            external: Set(50),
            best_of_two: Set(0),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .unwrap();

        let token = token_for(&student_user);
        let response = server
            .get("/api/student-dashboard/me")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["studentInfo"]["rollNo"], "CS101");
        assert_eq!(body.data["studentInfo"]["department"], "Computer Science");
        let subjects = body.data["subjects"].as_array().unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0]["bestOfTwo"], 17);
        assert_eq!(subjects[0]["code"], "CS201");
    }

    #[tokio::test]
    async fn test_student_dashboard_falls_back_to_email() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let student_user = insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;
        // Student row linked to a different user id but sharing the email;
        // the email fallback must still find it.
        let other_user = insert_user(
            &state.db,
            UserRole::Student,
            "Placeholder",
            "placeholder@example.com",
            "placeholderpass",
        )
        .await;
        model::entities::student::ActiveModel {
            roll_no: Set(Some("CS102".to_string())),
            roll_number: Set(None),
            name: Set("Ravi Kumar".to_string()),
            department: Set("Computer Science".to_string()),
            semester: Set(3),
            email: Set("ravi@example.com".to_string()),
            phone: Set("9000000001".to_string()),
            status: Set(model::entities::student::StudentStatus::Active),
            address: Set("Hostel A".to_string()),
            dob: Set(chrono::NaiveDate::from_ymd_opt(2004, 6, 1).unwrap()),
            user_id: Set(other_user.id),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .unwrap();

        let token = token_for(&student_user);
        let response = server
            .get("/api/student-dashboard/me")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["studentInfo"]["rollNo"], "CS102");
    }

    #[tokio::test]
    async fn test_students_crud_returns_full_list() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let user_a = insert_user(
            &state.db,
            UserRole::Student,
            "Ravi Kumar",
            "ravi@example.com",
            "studentpass1",
        )
        .await;
        let user_b = insert_user(
            &state.db,
            UserRole::Student,
            "Meera Iyer",
            "meera@example.com",
            "studentpass2",
        )
        .await;

        let first = server
            .post("/api/students")
            .json(&json!({
                "roll_no": "CS101",
                "name": "Ravi Kumar",
                "department": "cse",
                "semester": 3,
                "email": "ravi@example.com",
                "phone": "9000000001",
                "address": "Hostel A",
                "dob": "2004-06-01",
                "user_id": user_a.id
            }))
            .await;
        first.assert_status(StatusCode::CREATED);
        let first_body: ApiResponse<serde_json::Value> = first.json();
        assert_eq!(first_body.data.as_array().unwrap().len(), 1);
        // The normalizer canonicalizes the department on write.
        assert_eq!(first_body.data[0]["department"], "Computer Science");

        let second = server
            .post("/api/students")
            .json(&json!({
                "roll_no": "CS102",
                "name": "Meera Iyer",
                "department": "Computer Science",
                "semester": 3,
                "email": "meera@example.com",
                "phone": "9000000002",
                "address": "Hostel B",
                "dob": "2004-03-12",
                "user_id": user_b.id
            }))
            .await;
        second.assert_status(StatusCode::CREATED);
        let second_body: ApiResponse<serde_json::Value> = second.json();
        assert_eq!(second_body.data.as_array().unwrap().len(), 2);

        let student_id = second_body.data[1]["id"].as_i64().unwrap();
        let deleted = server.delete(&format!("/api/students/{student_id}")).await;
        deleted.assert_status(StatusCode::OK);
        let deleted_body: ApiResponse<serde_json::Value> = deleted.json();
        assert_eq!(deleted_body.data.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_delete_cascades_to_faculty() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let faculty_user = insert_user(
            &state.db,
            UserRole::Faculty,
            "Asha Rao",
            "asha@example.com",
            "facultypass1",
        )
        .await;
        insert_faculty(
            &state.db,
            Some(faculty_user.id),
            "Asha Rao",
            "asha@example.com",
            "Computer Science",
            &[],
        )
        .await;

        let token = token_for(&faculty_user);
        let response = server
            .delete(&format!("/api/users/{}", faculty_user.id))
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);

        assert_eq!(User::find().count(&state.db).await.unwrap(), 0);
        assert_eq!(
            model::entities::prelude::Faculty::find()
                .filter(model::entities::faculty::Column::Email.eq("asha@example.com"))
                .count(&state.db)
                .await
                .unwrap(),
            0
        );
    }
}
