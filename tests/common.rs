use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::http::{
    HeaderName, HeaderValue, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use axum_test::TestServer;
use chrono::NaiveDate;
use coursehub::{
    Config, build_server_with_store,
    model::{
        ConsultationRepository, CourseRepository, DatabaseError, DatabaseResult,
        EnrollmentRepository, MemoryStore, ModelManager, UserRepository,
        entity::{
            Account, AccountCreate, BookingCreate, Consultation, ConsultationSlot,
            ConsultationWithSlot, Course, CourseCreate, CourseFilter, CourseModule, CourseUpdate,
            Enrollment, EnrollmentWithCourse, ModuleCreate, Profile, ProfileUpdate,
            ProgressUpdate, SlotCreate,
        },
    },
    web::UserRole,
};
use serde_json::{Value, json};
use tower_cookies::Cookie;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@coursehub.local";
pub const ADMIN_PASSWORD: &str = "admin123";

pub fn test_config() -> Config {
    Config::from_toml_str(&format!(
        r#"
        [host]
        bindto = "127.0.0.1:0"

        [app]
        jwt = "integration-test-secret"
        storage = "memory"
        docs = true
        admin_email = "{ADMIN_EMAIL}"
        admin_password = "{ADMIN_PASSWORD}"
        "#
    ))
    .expect("test config is valid")
}

/// Fresh app over an empty in-memory store with the admin account bootstrapped.
pub async fn setup_server() -> TestServer {
    setup_server_with(ModelManager::in_memory()).await
}

#[allow(unused)]
pub async fn setup_server_with(mm: ModelManager) -> TestServer {
    let server = build_server_with_store(mm, test_config())
        .await
        .unwrap()
        .1;
    TestServer::new(server).unwrap()
}

/// In-memory store whose profile reads can be made to fail after a number
/// of successful ones, to exercise store outages mid-request.
#[allow(unused)]
#[derive(Debug)]
pub struct FailingProfileStore {
    inner: MemoryStore,
    reads_before_failure: AtomicUsize,
}

#[allow(unused)]
impl FailingProfileStore {
    const DISARMED: usize = usize::MAX;

    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            reads_before_failure: AtomicUsize::new(Self::DISARMED),
        }
    }

    /// Lets `reads` more profile reads through, then fails every one after.
    pub fn fail_after(&self, reads: usize) {
        self.reads_before_failure.store(reads, Ordering::SeqCst);
    }

    fn next_read_fails(&self) -> bool {
        let previous =
            self.reads_before_failure
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                    Self::DISARMED => None,
                    0 => Some(0),
                    left => Some(left - 1),
                });
        matches!(previous, Ok(0))
    }
}

#[async_trait::async_trait]
impl UserRepository for FailingProfileStore {
    async fn create_account(&self, data: AccountCreate) -> DatabaseResult<(Account, Profile)> {
        self.inner.create_account(data).await
    }

    async fn find_account_by_email(&self, email: &str) -> DatabaseResult<Option<Account>> {
        self.inner.find_account_by_email(email).await
    }

    async fn find_profile(&self, id: Uuid) -> DatabaseResult<Option<Profile>> {
        if self.next_read_fails() {
            return Err(DatabaseError::SqlxError(sqlx::Error::PoolTimedOut));
        }
        self.inner.find_profile(id).await
    }

    async fn update_profile(&self, id: Uuid, data: ProfileUpdate) -> DatabaseResult<Profile> {
        self.inner.update_profile(id, data).await
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> DatabaseResult<Profile> {
        self.inner.set_role(id, role).await
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> DatabaseResult<Profile> {
        self.inner.set_active(id, is_active).await
    }

    async fn list_profiles(&self, limit: i64, offset: i64) -> DatabaseResult<Vec<Profile>> {
        self.inner.list_profiles(limit, offset).await
    }

    async fn count_profiles(&self) -> DatabaseResult<i64> {
        self.inner.count_profiles().await
    }
}

#[async_trait::async_trait]
impl CourseRepository for FailingProfileStore {
    async fn create_course(&self, data: CourseCreate) -> DatabaseResult<Course> {
        self.inner.create_course(data).await
    }

    async fn update_course(&self, id: Uuid, data: CourseUpdate) -> DatabaseResult<Course> {
        self.inner.update_course(id, data).await
    }

    async fn delete_course(&self, id: Uuid) -> DatabaseResult<()> {
        self.inner.delete_course(id).await
    }

    async fn find_course(&self, id: Uuid) -> DatabaseResult<Option<Course>> {
        self.inner.find_course(id).await
    }

    async fn list_courses(&self, filter: CourseFilter) -> DatabaseResult<Vec<Course>> {
        self.inner.list_courses(filter).await
    }

    async fn create_module(&self, data: ModuleCreate) -> DatabaseResult<CourseModule> {
        self.inner.create_module(data).await
    }

    async fn list_modules(&self, course_id: Uuid) -> DatabaseResult<Vec<CourseModule>> {
        self.inner.list_modules(course_id).await
    }
}

#[async_trait::async_trait]
impl EnrollmentRepository for FailingProfileStore {
    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> DatabaseResult<Enrollment> {
        self.inner.enroll(user_id, course_id).await
    }

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Enrollment>> {
        self.inner.find_enrollment(user_id, course_id).await
    }

    async fn list_enrollments(&self, user_id: Uuid) -> DatabaseResult<Vec<EnrollmentWithCourse>> {
        self.inner.list_enrollments(user_id).await
    }

    async fn update_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        data: ProgressUpdate,
    ) -> DatabaseResult<Enrollment> {
        self.inner.update_progress(user_id, course_id, data).await
    }
}

#[async_trait::async_trait]
impl ConsultationRepository for FailingProfileStore {
    async fn create_slot(&self, data: SlotCreate) -> DatabaseResult<ConsultationSlot> {
        self.inner.create_slot(data).await
    }

    async fn list_available_slots(&self, today: NaiveDate) -> DatabaseResult<Vec<ConsultationSlot>> {
        self.inner.list_available_slots(today).await
    }

    async fn book(&self, data: BookingCreate, today: NaiveDate) -> DatabaseResult<Consultation> {
        self.inner.book(data, today).await
    }

    async fn find_consultation(&self, id: Uuid) -> DatabaseResult<Option<Consultation>> {
        self.inner.find_consultation(id).await
    }

    async fn cancel(&self, id: Uuid) -> DatabaseResult<Consultation> {
        self.inner.cancel(id).await
    }

    async fn list_consultations(
        &self,
        user_id: Option<Uuid>,
    ) -> DatabaseResult<Vec<ConsultationWithSlot>> {
        self.inner.list_consultations(user_id).await
    }
}

/// Server over a `FailingProfileStore`, with a handle to arm it.
#[allow(unused)]
pub async fn setup_failing_server() -> (TestServer, Arc<FailingProfileStore>) {
    let store = Arc::new(FailingProfileStore::new());
    let server = setup_server_with(ModelManager::new(store.clone())).await;
    (server, store)
}

#[derive(Debug)]
pub struct FlowContext {
    pub store: HashMap<&'static str, Value>, // a way to pass data between steps
}

impl FlowContext {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
        }
    }

    pub fn store(&mut self, key: &'static str, val: Value) {
        self.store.insert(key, val);
    }

    pub fn get(&self, key: &str) -> &Value {
        self.store.get(key).expect("missing store key")
    }

    /// String at a JSON pointer inside a saved body, e.g. `("course", "/course/id")`.
    pub fn str_at(&self, key: &str, pointer: &str) -> String {
        self.get(key)
            .pointer(pointer)
            .and_then(Value::as_str)
            .unwrap_or_else(|| panic!("no string at {pointer} in `{key}`"))
            .to_string()
    }

    /// Access token of a saved signup or login response.
    pub fn token(&self, key: &str) -> String {
        self.str_at(key, "/session/access_token")
    }
}

pub struct Action {
    #[allow(unused)]
    pub name: &'static str,
    pub method: &'static str,
    pub path: String,
    pub dyn_path: Option<Box<dyn Fn(&FlowContext) -> String + Send + Sync>>,
    pub body: Option<Value>,
    pub raw_body: Option<(String, Option<&'static str>)>,
    pub dyn_body: Option<Box<dyn Fn(&FlowContext) -> Value + Send + Sync>>,
    pub headers: Vec<(HeaderName, String)>,
    pub dyn_bearer: Option<Box<dyn Fn(&FlowContext) -> String + Send + Sync>>,
    pub expect: StatusCode,
    pub clear_cookies: bool,
    pub save_cookies: bool,
    pub query_params: Vec<(String, String)>,
    pub cookie_asserts: Vec<(&'static str, Box<dyn Fn(&Cookie) + Send + Sync>)>,
    pub body_asserts: Vec<Box<dyn Fn(&Value) + Send + Sync>>,
    pub save_as: Option<&'static str>,
}

impl Action {
    pub fn new(name: &'static str, method: &'static str, path: &'static str) -> Self {
        Self {
            name,
            method,
            path: path.to_string(),
            dyn_path: None,
            body: None,
            raw_body: None,
            dyn_body: None,
            headers: vec![],
            dyn_bearer: None,
            expect: StatusCode::OK,
            clear_cookies: false,
            save_cookies: true,
            query_params: vec![],
            cookie_asserts: vec![],
            body_asserts: vec![],
            save_as: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sends `body` as is, with the given `Content-Type` if any.
    #[allow(unused)]
    pub fn with_raw_body(mut self, body: &str, content_type: Option<&'static str>) -> Self {
        self.raw_body = Some((String::from(body), content_type));
        self
    }

    pub fn with_expect(mut self, expect: StatusCode) -> Self {
        self.expect = expect;
        self
    }

    pub fn with_save_cookies(mut self, save_cookies: bool) -> Self {
        self.save_cookies = save_cookies;
        self
    }

    pub fn with_clear_cookies(mut self, clear_cookies: bool) -> Self {
        self.clear_cookies = clear_cookies;
        self
    }

    #[allow(unused)]
    pub fn with_param(mut self, key: &str, val: &str) -> Self {
        self.query_params
            .push((String::from(key), String::from(val)));
        self
    }

    #[allow(unused)]
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        self.headers.push((name, String::from(value)));
        self
    }

    /// Sends `Authorization: Bearer` with the token of a saved session.
    #[allow(unused)]
    pub fn with_bearer_of(mut self, key: &'static str) -> Self {
        self.dyn_bearer = Some(Box::new(move |ctx| ctx.token(key)));
        self
    }

    #[allow(unused)]
    pub fn with_dyn_path<F>(mut self, f: F) -> Self
    where
        F: Fn(&FlowContext) -> String + Send + Sync + 'static,
    {
        self.dyn_path = Some(Box::new(f));
        self
    }

    #[allow(unused)]
    pub fn with_dyn_body<F>(mut self, f: F) -> Self
    where
        F: Fn(&FlowContext) -> Value + Send + Sync + 'static,
    {
        self.dyn_body = Some(Box::new(f));
        self
    }

    pub fn with_save_as(mut self, key: &'static str) -> Self {
        self.save_as = Some(key);
        self
    }

    #[allow(unused)]
    pub fn assert_cookie<F>(mut self, name: &'static str, check: F) -> Self
    where
        F: Fn(&Cookie) + Send + Sync + 'static,
    {
        self.cookie_asserts.push((name, Box::new(check)));
        self
    }

    pub fn assert_body<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.body_asserts.push(Box::new(check));
        self
    }

    /// Shorthand for the `error` field of a failure body.
    pub fn assert_error(self, message: &'static str) -> Self {
        self.assert_body(move |body| assert_eq!(body["error"], message))
    }
}

pub struct Flow {
    actions: Vec<Action>,
}

impl Flow {
    pub fn new() -> Self {
        Self { actions: vec![] }
    }

    pub fn step(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub async fn run(self, server: &mut TestServer) {
        let mut ctx = FlowContext::new(); // create new context for this flow
        for action in self.actions {
            println!("==> Running test action `{}`", action.name);
            if action.clear_cookies {
                server.clear_cookies();
            }

            if action.save_cookies {
                server.save_cookies();
            } else {
                server.do_not_save_cookies();
            }

            let path = if let Some(dyn_path_fn) = action.dyn_path {
                dyn_path_fn(&ctx)
            } else {
                action.path.clone()
            };

            let mut req = match action.method {
                "GET" => server.get(&path),
                "POST" => server.post(&path),
                "PUT" => server.put(&path),
                "DELETE" => server.delete(&path),
                _ => panic!("unsupported method {}", action.method),
            };

            match (action.dyn_body, action.body) {
                (Some(f), _) => {
                    req = req.json(&f(&ctx));
                }
                (_, Some(json)) => req = req.json(&json),
                _ => {}
            }

            if let Some((raw, content_type)) = action.raw_body {
                req = req.bytes(raw.into());
                if let Some(content_type) = content_type {
                    req = req.add_header(CONTENT_TYPE, HeaderValue::from_static(content_type));
                }
            }

            for (name, value) in action.headers {
                req = req.add_header(name, HeaderValue::from_str(&value).unwrap());
            }

            if let Some(bearer) = action.dyn_bearer {
                let value = format!("Bearer {}", bearer(&ctx));
                req = req.add_header(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
            }

            if !action.query_params.is_empty() {
                for (k, v) in action.query_params {
                    req = req.add_query_param(&k, v);
                }
            }

            let resp = req.await;
            resp.assert_status(action.expect);
            let cookies = resp.cookies();

            if !action.cookie_asserts.is_empty() {
                for (cookie_name, check) in action.cookie_asserts {
                    let cookie = cookies
                        .get(cookie_name)
                        .unwrap_or_else(|| panic!("Cookie {} is not set", cookie_name));
                    check(cookie);
                }
            }

            if !action.body_asserts.is_empty() {
                let body = resp.json::<Value>();
                for check in action.body_asserts {
                    check(&body);
                }
            }

            if let Some(save_key) = action.save_as {
                let body = resp.json::<Value>();
                ctx.store(save_key, body);
            }
        }
    }
}

// Common actions builders

#[allow(unused)]
pub fn signup_action(email: &str, password: &str) -> Action {
    Action::new("signup", "POST", "/api/auth/signup")
        .with_body(json!({
            "email": email,
            "password": password,
            "first_name": "Test",
            "last_name": "User",
        }))
        .with_expect(StatusCode::CREATED)
}

#[allow(unused)]
pub fn login_action(email: &str, password: &str) -> Action {
    Action::new("login", "POST", "/api/auth/login").with_body(json!({
        "email": email,
        "password": password,
    }))
}

#[allow(unused)]
pub fn login_admin_action() -> Action {
    login_action(ADMIN_EMAIL, ADMIN_PASSWORD)
}

/// Admin creates a published course, saved under `key`.
#[allow(unused)]
pub fn create_course_action(admin_key: &'static str, title: &str, key: &'static str) -> Action {
    Action::new("create_course", "POST", "/api/courses")
        .with_body(json!({
            "title": title,
            "description": "Learn by doing",
            "difficulty": "beginner",
            "category": "programming",
            "price": 49.0,
            "is_published": true,
        }))
        .with_bearer_of(admin_key)
        .with_save_cookies(false)
        .with_expect(StatusCode::CREATED)
        .with_save_as(key)
}
