use crate::config::PortalConfig;
use crate::error::{Error, Result};
use crate::model::{Attributes, FetchStage, ATTRIBUTION};
use crate::portal::consumption::{self, MonthlyTotals};
use crate::portal::helper::{previous_month, yesterday};
use crate::portal::scrape::{self, PortalOrigin};
use crate::portal::session::{self, HttpSession};
use chrono::{DateTime, Datelike, Local};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value;

pub const LOGIN_PATH: &str = "/mon-compte-en-ligne/je-me-connecte";
pub const DAY_DATA_PATH: &str = "/mon-compte-en-ligne/statJData/";
pub const MONTH_DATA_PATH: &str = "/mon-compte-en-ligne/statMData/";
pub const HISTORY_PAGE_PATH: &str = "/mon-compte-en-ligne/historique-de-consommation-tr";

pub const SESSION_COOKIE: &str = "eZSESSID";

/// Client for the toutsurmoneau.fr consumer portal.
///
/// Logs in through the HTML login form, keeps the `eZSESSID` session cookie
/// and pulls daily and monthly water consumption figures.
///
/// All operations take `&mut self`: a fetch spans several round trips that
/// update the session state, so calls on one client are serialized.
pub struct PortalClient {
    config: PortalConfig,
    http_client: HttpClient,
    session: Option<HttpSession>,
    counter_id: Option<u64>,
    token: String,
    login_cookie: String,
    cookie_header: String,
    origin: Option<PortalOrigin>,
    connected: bool,
    success: bool,
    state: i64,
    attributes: Attributes,
}

impl PortalClient {
    pub fn new(config: PortalConfig) -> Result<Self> {
        let http_client = session::build_http_client(config.timeout(), None)?;
        Ok(Self {
            counter_id: config.counter_id,
            config,
            http_client,
            session: None,
            token: String::new(),
            login_cookie: String::new(),
            cookie_header: String::new(),
            origin: None,
            connected: false,
            success: false,
            state: 0,
            attributes: Attributes::default(),
        })
    }

    /// Submits the login form once and reports whether the portal issued a
    /// session cookie.
    ///
    /// Wrong credentials yield `Ok(false)`; only transport and page scraping
    /// failures are errors.
    pub fn check_credentials(&mut self) -> Result<bool> {
        Ok(self.submit_login()?.is_some())
    }

    /// Discovers the meter identifier from the consumption history page and
    /// remembers it for later data requests.
    pub fn find_counter_id(&mut self) -> Result<u64> {
        let page = self.get(HISTORY_PAGE_PATH, false, true, &[])?;
        let counter_id = scrape::extract_counter_id(&page)?;
        tracing::debug!("Found counter {}", counter_id);
        self.counter_id = Some(counter_id);
        Ok(counter_id)
    }

    /// Fetches the latest consumption figures.
    ///
    /// On error the previously fetched attributes are left untouched, but
    /// [`success`](Self::success) is false until the next complete fetch.
    pub fn fetch_data(&mut self) -> Result<()> {
        self.fetch_data_at(Local::now())
    }

    /// Same as [`fetch_data`](Self::fetch_data) with `now` as the reference
    /// time for "yesterday", "this month" and "previous month".
    pub fn fetch_data_at(&mut self, now: DateTime<Local>) -> Result<()> {
        self.success = false;

        if !self.connected {
            self.login()?;
        }
        let counter_id = match self.counter_id {
            Some(counter_id) => counter_id,
            None => self.find_counter_id()?,
        };

        match self.collect(now, counter_id) {
            Ok((state, attributes)) => {
                tracing::info!("Fetched consumption data, yesterday: {} L", state);
                self.state = state;
                self.attributes = attributes;
                self.success = true;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Consumption fetch failed: {}", e);
                // an expired session surfaces as an unparseable payload
                self.connected = false;
                Err(e)
            }
        }
    }

    /// Fetches the latest figures and returns them when the fetch
    /// completed.
    ///
    /// A failed fetch is returned as `Err` rather than `Ok(None)`, so an
    /// `Ok` always carries the attributes. The `Option` mirrors
    /// [`attributes`](Self::attributes).
    pub fn update(&mut self) -> Result<Option<Attributes>> {
        self.update_at(Local::now())
    }

    pub fn update_at(&mut self, now: DateTime<Local>) -> Result<Option<Attributes>> {
        self.fetch_data_at(now)?;
        Ok(self.attributes().cloned())
    }

    /// Drops the login session; the next request logs in again.
    pub fn close_session(&mut self) {
        self.session = None;
        self.connected = false;
        self.cookie_header.clear();
    }

    /// Authenticated GET against the resolved portal host.
    ///
    /// With `with_counter_id` the meter identifier is appended to `path`.
    /// With `need_connection` the login flow runs first if the client is
    /// not connected yet.
    pub fn get(
        &mut self,
        path: &str,
        with_counter_id: bool,
        need_connection: bool,
        params: &[(&str, &str)],
    ) -> Result<String> {
        if need_connection && !self.connected {
            self.login()?;
        }
        let path = if with_counter_id {
            let counter_id = match self.counter_id {
                Some(counter_id) => counter_id,
                None => self.find_counter_id()?,
            };
            format!("{}{}", path, counter_id)
        } else {
            path.to_string()
        };
        self.request(&path, params)
    }

    pub fn state(&self) -> i64 {
        self.state
    }

    /// Attributes of the last fetch, only when it succeeded.
    pub fn attributes(&self) -> Option<&Attributes> {
        self.success.then_some(&self.attributes)
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn counter_id(&self) -> Option<u64> {
        self.counter_id
    }

    /// Host the portal answered from after login, if resolved yet.
    pub fn hostname(&self) -> Option<&str> {
        self.origin.as_ref().map(|origin| origin.hostname.as_str())
    }

    pub fn attribution(&self) -> &'static str {
        ATTRIBUTION
    }

    fn login_url(&self) -> String {
        format!("{}{}", self.config.base_url, LOGIN_PATH)
    }

    fn login_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("fr,fr-FR;q=0.8,en;q=0.6"),
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/7.54.0"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        if let Ok(cookie) = HeaderValue::from_str(&self.login_cookie) {
            if !cookie.is_empty() {
                headers.insert(header::COOKIE, cookie);
            }
        }
        headers
    }

    /// Loads the login page for its cookies and CSRF token.
    fn fetch_token(&mut self) -> Result<()> {
        self.login_cookie.clear();
        let response =
            session::send(self.http_client.get(self.login_url()).headers(self.login_headers()))?;

        self.login_cookie = response.cookie_header();
        self.token = scrape::extract_csrf_token(&response.body)?;
        tracing::debug!("Fetched login token");
        Ok(())
    }

    /// Runs the login form submission and returns the session cookie value
    /// when the portal issued one.
    fn submit_login(&mut self) -> Result<Option<String>> {
        self.fetch_token()?;
        // a fresh jar per attempt, so a rejected login cannot reuse an
        // earlier session cookie
        self.session = None;
        let session = HttpSession::open(self.config.timeout())?;

        let login_url = self.login_url();
        // the portal accepted several field naming schemes over time
        let form = [
            ("_username", self.config.username.as_str()),
            ("_password", self.config.password.as_str()),
            ("_csrf_token", self.token.as_str()),
            ("signin[username]", self.config.username.as_str()),
            ("tsme_user_login[_username]", self.config.username.as_str()),
            ("tsme_user_login[_password]", self.config.password.as_str()),
        ];
        let response = session.post_form(&login_url, self.login_headers(), &form);
        let session = self.session.insert(session);

        let origin = scrape::resolve_origin(&response?.url)?;
        tracing::debug!("Portal resolved to {}", origin.hostname);

        let session_id = session
            .cookie(SESSION_COOKIE, &origin.url("/"))
            .or_else(|| session.cookie(SESSION_COOKIE, &login_url));
        self.origin = Some(origin);

        match &session_id {
            Some(_) => tracing::info!("Logged in to the portal"),
            None => tracing::warn!("Login rejected: no {} cookie issued", SESSION_COOKIE),
        }
        Ok(session_id)
    }

    /// Logs in and keeps `eZSESSID=<value>` as the cookie header for every
    /// later request.
    fn login(&mut self) -> Result<()> {
        match self.submit_login()? {
            Some(session_id) => {
                self.cookie_header = format!("{}={}", SESSION_COOKIE, session_id);
                self.connected = true;
                Ok(())
            }
            None => {
                self.cookie_header.clear();
                self.connected = false;
                Err(Error::Authentication)
            }
        }
    }

    fn base(&self) -> String {
        match &self.origin {
            Some(origin) => origin.url(""),
            None => self.config.base_url.clone(),
        }
    }

    fn request(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}{}", self.base(), path);
        tracing::debug!("GET {}", url);

        let mut request = self.http_client.get(&url);
        if !params.is_empty() {
            request = request.query(params);
        }
        if !self.cookie_header.is_empty() {
            request = request.header(header::COOKIE, self.cookie_header.as_str());
        }
        Ok(session::send(request)?.into_success_body()?)
    }

    fn series(&self, path: &str, stage: FetchStage) -> Result<Vec<Value>> {
        let body = self.request(path, &[])?;
        consumption::parse_series(&body).map_err(|e| Error::data_parse(stage, e))
    }

    fn daily_series(
        &self,
        year: i32,
        month: &str,
        counter_id: u64,
        stage: FetchStage,
    ) -> Result<Vec<Value>> {
        let path = format!("{}{}/{}/{}", DAY_DATA_PATH, year, month, counter_id);
        self.series(&path, stage)
    }

    /// Runs every data stage; nothing is stored unless all of them succeed.
    fn collect(&self, now: DateTime<Local>, counter_id: u64) -> Result<(i64, Attributes)> {
        let yesterday = yesterday(&now);

        let yesterday_series = self.daily_series(
            yesterday.year(),
            &format!("{:02}", yesterday.month()),
            counter_id,
            FetchStage::Yesterday,
        )?;
        let state = consumption::yesterday_liters(&yesterday_series, yesterday.day())
            .map_err(|e| Error::data_parse(FetchStage::Yesterday, e))?;

        // the first day of a month, yesterday belongs to the previous one
        let this_month_series = if yesterday.month() != now.month() {
            self.daily_series(
                now.year(),
                &format!("{:02}", now.month()),
                counter_id,
                FetchStage::ThisMonth,
            )?
        } else {
            yesterday_series
        };
        let this_month_consumption = consumption::daily_consumption(&this_month_series)
            .map_err(|e| Error::data_parse(FetchStage::ThisMonth, e))?;

        let (last_month_year, last_month) = previous_month(now.year(), now.month());
        let previous_series = self.daily_series(
            last_month_year,
            &last_month.to_string(),
            counter_id,
            FetchStage::PreviousMonth,
        )?;
        let previous_month_consumption = consumption::daily_consumption(&previous_series)
            .map_err(|e| Error::data_parse(FetchStage::PreviousMonth, e))?;

        let totals_series = self.series(
            &format!("{}{}", MONTH_DATA_PATH, counter_id),
            FetchStage::History,
        )?;
        let MonthlyTotals {
            highest_monthly_consumption,
            last_year_over_all,
            this_year_over_all,
            history,
        } = consumption::monthly_totals(&totals_series)
            .map_err(|e| Error::data_parse(FetchStage::History, e))?;

        Ok((
            state,
            Attributes {
                attribution: ATTRIBUTION.to_string(),
                this_month_consumption,
                previous_month_consumption,
                highest_monthly_consumption,
                last_year_over_all,
                this_year_over_all,
                history,
            },
        ))
    }
}
