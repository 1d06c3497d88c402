//! Authenticated whatthemovie session and the random-shot acquisition loop.
//!
//! `login` stores the site's CSRF token in a header map that every later
//! request carries. It takes `&mut self`; shot acquisition only needs `&self`,
//! so the headers cannot change while shots are being fetched.
//!
//! Acquisition is an infinite stream ([`Session::shots`]): each pull fetches
//! `/shot/random` until a page passes the [`ShotFilter`], resolves the solution
//! when the page links one, downloads the image and yields the [`Shot`]. There
//! is no retry ceiling and no backoff; callers that need bounded latency use
//! [`Session::get_random_shot_within`] or their own timeout.

use std::time::Duration;

use futures::{Stream, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use tracing::{debug, info, warn};
use url::Url;
use wtm_core::markup::{self, ShotPage};
use wtm_core::{
    decode_solution, Difficulty, Shot, ShotFilter, SolutionLink, Verdict, WtmError, WtmResult,
};

use crate::config::ClientConfig;
use crate::transport::{HttpClient, Transport};

pub const LOGIN_PATH: &str = "/user/login";
pub const RANDOM_OPTIONS_PATH: &str = "/shot/setrandomoptions";
pub const RANDOM_SHOT_PATH: &str = "/shot/random";

const CSRF_HEADER: &str = "x-csrf-token";
const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// A whatthemovie account session.
pub struct Session<T = HttpClient> {
    transport: T,
    config: ClientConfig,
    auth_headers: HeaderMap,
    authenticated: bool,
}

impl Session<HttpClient> {
    /// Create a session backed by a fresh reqwest client.
    pub fn new(config: ClientConfig) -> WtmResult<Self> {
        let transport = HttpClient::new(&config)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> Session<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            auth_headers: HeaderMap::new(),
            authenticated: false,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether `login` completed.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Log in with the site's form flow.
    ///
    /// 1. GET the login page and read its `authenticity_token` field.
    /// 2. POST the credentials with that token.
    /// 3. Read the `csrf-token` meta tag of the page we land on and keep it
    ///    as `X-CSRF-Token` for every later request.
    ///
    /// A missing token fails with `AuthExtraction`; when the first one is
    /// missing, no credentials are posted.
    pub async fn login(&mut self, username: &str, password: &str) -> WtmResult<()> {
        let login_url = self.config.url(LOGIN_PATH)?;
        let no_headers = HeaderMap::new();

        let login_page = self.transport.get(&login_url, &no_headers).await?;
        let token = markup::authenticity_token(&login_page.text())?.ok_or(
            WtmError::AuthExtraction {
                selector: markup::AUTHENTICITY_TOKEN,
            },
        )?;

        let form = [
            ("name", username),
            ("upassword", password),
            ("authenticity_token", token.as_str()),
            ("utf8", "✓"),
        ];
        let landing = self
            .transport
            .post_form(&login_url, &form, &no_headers)
            .await?;

        let csrf = markup::csrf_token(&landing.text())?.ok_or(WtmError::AuthExtraction {
            selector: markup::CSRF_META,
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CSRF_HEADER, header_value(&csrf)?);
        self.auth_headers = headers;
        self.authenticated = true;

        info!(user = username, "logged in");
        Ok(())
    }

    /// Set the server-side random shot options for this session.
    ///
    /// Always sends an empty keyword and includes archived and already
    /// solved shots.
    pub async fn configure(&self, difficulty: Difficulty) -> WtmResult<()> {
        let url = self.config.url(RANDOM_OPTIONS_PATH)?;
        let form = [
            ("difficulty", difficulty.as_str()),
            ("keyword", ""),
            ("include_archive", "1"),
            ("include_solved", "1"),
        ];
        self.transport
            .post_form(&url, &form, &self.auth_headers)
            .await?;

        info!(%difficulty, "random shot options set");
        Ok(())
    }

    /// Fetch a random shot passing the default content filter.
    ///
    /// With `require_solution`, unsolved shots are skipped until one with a
    /// movie name comes up. Retries are unbounded.
    pub async fn get_random_shot(&self, require_solution: bool) -> WtmResult<Shot> {
        let filter = ShotFilter::default();
        let shots = self.shots(&filter);
        futures::pin_mut!(shots);

        while let Some(shot) = shots.try_next().await? {
            if require_solution && !shot.is_solved() {
                debug!(image = shot.image_url(), "unsolved shot skipped");
                continue;
            }
            return Ok(shot);
        }

        Err(WtmError::Network("shot stream ended".to_string()))
    }

    /// [`Session::get_random_shot`] with an overall deadline.
    pub async fn get_random_shot_within(
        &self,
        require_solution: bool,
        deadline: Duration,
    ) -> WtmResult<Shot> {
        tokio::time::timeout(deadline, self.get_random_shot(require_solution))
            .await
            .map_err(|_| WtmError::Timeout(format!("no acceptable shot within {deadline:?}")))?
    }

    /// Lazy, infinite stream of shots accepted by `filter`.
    ///
    /// Rejected candidates are skipped inside the stream. The first error
    /// is yielded and ends the stream.
    pub fn shots<'a>(&'a self, filter: &'a ShotFilter) -> impl Stream<Item = WtmResult<Shot>> + 'a {
        async_stream::stream! {
            loop {
                match self.next_candidate(filter).await {
                    Ok(Some(shot)) => {
                        yield Ok(shot);
                    }
                    Ok(None) => continue,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        }
    }

    /// One acquisition attempt. `Ok(None)` means the candidate was filtered out.
    async fn next_candidate(&self, filter: &ShotFilter) -> WtmResult<Option<Shot>> {
        let random_url = self.config.url(RANDOM_SHOT_PATH)?;
        let response = self.transport.get(&random_url, &self.auth_headers).await?;
        let page = ShotPage::parse(&response.text(), &response.final_url)?;

        if let Verdict::Reject(reason) = filter.verdict(&page) {
            debug!(page = %page.page_url, ?reason, "shot rejected");
            return Ok(None);
        }

        let page_url = Url::parse(&page.page_url)?;

        let movie_name = match &page.solution {
            SolutionLink::Link(href) => self.fetch_solution(&page, &page_url, href).await?,
            SolutionLink::NotSolved => None,
        };

        let image_url = page_url.join(&page.image_src)?;
        let mut headers = self.auth_headers.clone();
        headers.insert(REFERER, header_value(&page.page_url)?);
        let image = self.transport.get(&image_url, &headers).await?;

        let shot = Shot::new(image.body, image_url.as_str(), movie_name)?;
        debug!(
            page = %page.page_url,
            image = shot.image_url(),
            solved = shot.is_solved(),
            "shot accepted"
        );
        Ok(Some(shot))
    }

    /// Ask the solution endpoint for the movie title of `page`.
    async fn fetch_solution(
        &self,
        page: &ShotPage,
        page_url: &Url,
        href: &str,
    ) -> WtmResult<Option<String>> {
        let solution_url = page_url.join(href)?;

        // the page's own token wins over the one captured at login
        let csrf = match &page.csrf_token {
            Some(token) => header_value(token)?,
            None => match self.auth_headers.get(CSRF_HEADER) {
                Some(value) => value.clone(),
                None => HeaderValue::from_static(""),
            },
        };

        let mut headers = self.auth_headers.clone();
        headers.insert(REFERER, header_value(&page.page_url)?);
        headers.insert(CSRF_HEADER, csrf);
        headers.insert(
            REQUESTED_WITH_HEADER,
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let response = self.transport.get(&solution_url, &headers).await?;
        let movie_name = decode_solution(&response.text())?;
        if movie_name.is_none() {
            warn!(url = %solution_url, "solution response has no movie name");
        }
        Ok(movie_name)
    }
}

impl<T> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.config.base_url.as_str())
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

fn header_value(value: &str) -> WtmResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| WtmError::InvalidHeader(format!("{value:?}: {e}")))
}
