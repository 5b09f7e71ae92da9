//! Mock portal server for testing.
//!
//! Wraps a mockito server and registers the portal endpoints the client
//! talks to. Mocks are kept alive for the lifetime of the builder.

use crate::portal::{DAY_DATA_PATH, HISTORY_PAGE_PATH, LOGIN_PATH, MONTH_DATA_PATH};
use crate::test_utils::fixtures::{
    pages, COUNTER_ID, CSRF_TOKEN, LOGIN_PAGE_COOKIE, RAW_CSRF_TOKEN, SESSION_ID,
};
use crate::test_utils::{TEST_PASSWORD, TEST_USER};
use mockito::{Matcher, Mock, Server, ServerGuard};

const DASHBOARD_PATH: &str = "/mon-compte-en-ligne/tableau-de-bord";

fn session_cookie() -> String {
    format!("eZSESSID={}", SESSION_ID)
}

/// Builder for a mockito server standing in for the portal.
pub struct MockPortalBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
    login_form: Option<Mock>,
    login_submit: Option<Mock>,
    monthly: Option<Mock>,
    data_guard: Option<Mock>,
}

impl MockPortalBuilder {
    pub fn new() -> Self {
        Self {
            server: Server::new(),
            mocks: Vec::new(),
            login_form: None,
            login_submit: None,
            monthly: None,
            data_guard: None,
        }
    }

    /// Gets the server URL.
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Host and port of the server, as the client resolves it after login.
    pub fn host(&self) -> String {
        self.server.host_with_port()
    }

    /// Adds the login page carrying the CSRF token and a first cookie.
    pub fn mock_login(mut self) -> Self {
        let mock = self
            .server
            .mock("GET", LOGIN_PATH)
            .with_status(200)
            .with_header("set-cookie", &format!("{}; path=/", LOGIN_PAGE_COOKIE))
            .with_body(pages::login_page(RAW_CSRF_TOKEN))
            .create();
        self.mocks.push(mock);
        self
    }

    /// Adds a login submission that issues `eZSESSID` and redirects to the
    /// dashboard.
    pub fn mock_login_success(mut self) -> Self {
        let mock = self
            .server
            .mock("POST", LOGIN_PATH)
            .with_status(302)
            .with_header("location", DASHBOARD_PATH)
            .with_header("set-cookie", &format!("{}; path=/; HttpOnly", session_cookie()))
            .create();
        self.login_submit = Some(mock);
        self.mock_dashboard()
    }

    /// Same as [`mock_login_success`](Self::mock_login_success), but only
    /// answers a form carrying the token, the login page cookie and every
    /// credential field name.
    pub fn mock_login_success_expecting_form(mut self) -> Self {
        let mock = self
            .server
            .mock("POST", LOGIN_PATH)
            .match_header("cookie", LOGIN_PAGE_COOKIE)
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("_username".into(), TEST_USER.into()),
                Matcher::UrlEncoded("_password".into(), TEST_PASSWORD.into()),
                Matcher::UrlEncoded("_csrf_token".into(), CSRF_TOKEN.into()),
                Matcher::UrlEncoded("signin[username]".into(), TEST_USER.into()),
                Matcher::UrlEncoded("tsme_user_login[_username]".into(), TEST_USER.into()),
                Matcher::UrlEncoded("tsme_user_login[_password]".into(), TEST_PASSWORD.into()),
            ]))
            .with_status(302)
            .with_header("location", DASHBOARD_PATH)
            .with_header("set-cookie", &format!("{}; path=/", session_cookie()))
            .expect(1)
            .create();
        self.login_form = Some(mock);
        self.mock_dashboard()
    }

    /// Adds a login submission that lands back on the login form without a
    /// session cookie.
    pub fn mock_login_rejected(mut self) -> Self {
        self.replace_login_rejected();
        self
    }

    /// Swaps the login submission for one that issues no session cookie.
    pub fn replace_login_rejected(&mut self) {
        if let Some(previous) = self.login_submit.take() {
            previous.remove();
        }
        let mock = self
            .server
            .mock("POST", LOGIN_PATH)
            .with_status(200)
            .with_body("<html><body>Identifiant ou mot de passe incorrect</body></html>")
            .create();
        self.login_submit = Some(mock);
    }

    /// Adds a daily series for `year`/`month` of the test counter.
    pub fn mock_daily(mut self, year: &str, month: &str, body: &str) -> Self {
        let path = format!("{}{}/{}/{}", DAY_DATA_PATH, year, month, COUNTER_ID);
        let mock = self
            .server
            .mock("GET", path.as_str())
            .match_header("cookie", session_cookie().as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create();
        self.mocks.push(mock);
        self
    }

    /// Adds the monthly totals of the test counter.
    pub fn mock_monthly(mut self, body: &str) -> Self {
        self.replace_monthly(body);
        self
    }

    /// Swaps the monthly totals body served from now on.
    pub fn replace_monthly(&mut self, body: &str) {
        if let Some(previous) = self.monthly.take() {
            previous.remove();
        }
        let path = format!("{}{}", MONTH_DATA_PATH, COUNTER_ID);
        let mock = self
            .server
            .mock("GET", path.as_str())
            .match_header("cookie", session_cookie().as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create();
        self.monthly = Some(mock);
    }

    /// Adds the consumption history page referencing `counter_id`.
    pub fn mock_history_page(mut self, counter_id: u64) -> Self {
        let mock = self
            .server
            .mock("GET", HISTORY_PAGE_PATH)
            .match_header("cookie", session_cookie().as_str())
            .with_status(200)
            .with_body(pages::history_page(counter_id))
            .create();
        self.mocks.push(mock);
        self
    }

    /// Adds an endpoint answering only requests whose cookie header is
    /// exactly the session cookie.
    pub fn mock_requiring_session(mut self, path: &str, body: &str) -> Self {
        let mock = self
            .server
            .mock("GET", path)
            .match_header("cookie", Matcher::Exact(session_cookie()))
            .with_status(200)
            .with_body(body)
            .create();
        self.mocks.push(mock);
        self
    }

    /// Adds a mock with a fixed body and status 200.
    pub fn mock_raw(mut self, method: &str, path: &str, body: &str) -> Self {
        let mock = self
            .server
            .mock(method, path)
            .with_status(200)
            .with_body(body)
            .create();
        self.mocks.push(mock);
        self
    }

    /// Adds a mock answering with an error status.
    pub fn mock_status(mut self, method: &str, path: &str, status: usize) -> Self {
        let mock = self
            .server
            .mock(method, path)
            .with_status(status)
            .with_body("error")
            .create();
        self.mocks.push(mock);
        self
    }

    /// Registers a catch-all on the data endpoints that must never be hit.
    pub fn expect_no_data_request(mut self) -> Self {
        let mock = self
            .server
            .mock(
                "GET",
                Matcher::Regex(r"^/mon-compte-en-ligne/stat[JM]Data/".to_string()),
            )
            .with_status(200)
            .with_body("[]")
            .expect(0)
            .create();
        self.data_guard = Some(mock);
        self
    }

    pub fn assert_login_form_submitted(&self) {
        if let Some(mock) = &self.login_form {
            mock.assert();
        }
    }

    pub fn assert_no_data_request(&self) {
        if let Some(mock) = &self.data_guard {
            mock.assert();
        }
    }

    fn mock_dashboard(mut self) -> Self {
        let mock = self
            .server
            .mock("GET", DASHBOARD_PATH)
            .with_status(200)
            .with_body("<html><body>Tableau de bord</body></html>")
            .create();
        self.mocks.push(mock);
        self
    }
}
