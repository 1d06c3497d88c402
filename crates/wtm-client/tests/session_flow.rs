//! End-to-end session tests against a local mock of the site.
//!
//! Exercises the reqwest transport for real: redirects, cookies, form
//! encoding and request headers.

use std::time::Duration;

use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wtm_client::{ClientConfig, Difficulty, HttpClient, Session, Transport, WtmError};

// ─────────────────────── helpers ───────────────────────

const LOGIN_FORM: &str = r#"<html><body><form action="/user/login" method="post">
    <input type="hidden" name="authenticity_token" value="form-token">
    <input name="name"><input name="upassword" type="password">
</form></body></html>"#;

const HOME: &str = r#"<html><head><meta name="csrf-token" content="session-token"></head>
<body>Welcome back</body></html>"#;

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

fn shot_page(id: u32, nsfw: bool, tags: &[&str], solved: bool) -> String {
    let nsfw = if nsfw { r#"<div class="nsfw"></div>"# } else { "" };
    let solution = if solved {
        format!(r#"<a id="solucebutton" href="/shot/{id}/showsolution">show</a>"#)
    } else {
        String::new()
    };
    let tags: String = tags
        .iter()
        .map(|t| format!(r#"<li><a href="/search?t={t}">{t}</a></li>"#))
        .collect();
    format!(
        r#"<html><head><meta name="csrf-token" content="page-token-{id}"></head><body>
        {nsfw}<img id="still_shot" src="/images/shots/{id}.jpg" alt="shot">
        {solution}<ul id="shot_tag_list">{tags}</ul></body></html>"#
    )
}

/// Serve `/shot/random` as a redirect to `/shot/{id}`, once.
async fn mount_random_redirect(server: &MockServer, id: u32) {
    Mock::given(method("GET"))
        .and(path("/shot/random"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", format!("/shot/{id}")))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

async fn mount_shot(server: &MockServer, id: u32, page: String) {
    mount_random_redirect(server, id).await;
    Mock::given(method("GET"))
        .and(path(format!("/shot/{id}")))
        .respond_with(html(&page))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, id: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/images/shots/{id}.jpg")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![0xff, 0xd8, 0xff, id as u8]),
        )
        .mount(server)
        .await;
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user/login"))
        .respond_with(html(LOGIN_FORM))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .and(body_string_contains("authenticity_token=form-token"))
        .respond_with(html(HOME).insert_header("set-cookie", "_wtm_session=s3cr3t; Path=/"))
        .expect(1)
        .mount(server)
        .await;
}

fn session_for(server: &MockServer) -> Session {
    let config = ClientConfig::resolve(Some(&server.uri()), Some(5_000)).unwrap();
    Session::new(config).unwrap()
}

// ─────────────────────── transport ───────────────────────

#[tokio::test]
async fn test_response_carries_post_redirect_url() {
    let server = MockServer::start().await;
    mount_shot(&server, 10, shot_page(10, false, &[], false)).await;

    let config = ClientConfig::resolve(Some(&server.uri()), Some(5_000)).unwrap();
    let client = HttpClient::new(&config).unwrap();
    let url = config.url("/shot/random").unwrap();
    let resp = client.get(&url, &Default::default()).await.unwrap();

    assert_eq!(resp.final_url, format!("{}/shot/10", server.uri()));
    assert!(resp.text().contains("page-token-10"));
}

// ─────────────────────── login ───────────────────────

#[tokio::test]
async fn test_login_posts_credentials_with_token() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let mut session = session_for(&server);
    session.login("neo", "hunter2").await.unwrap();
    assert!(session.is_authenticated());

    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .expect("login POST");
    let body = String::from_utf8(post.body.clone()).unwrap();
    assert!(body.contains("name=neo"));
    assert!(body.contains("upassword=hunter2"));
    assert!(body.contains("utf8=%E2%9C%93"));
}

#[tokio::test]
async fn test_login_without_token_makes_no_post() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/login"))
        .respond_with(html("<html><body>Down for maintenance</body></html>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(html(HOME))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let err = session.login("neo", "hunter2").await.unwrap_err();
    assert!(matches!(err, WtmError::AuthExtraction { .. }));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_login_server_error_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let err = session.login("neo", "hunter2").await.unwrap_err();
    assert!(matches!(err, WtmError::HttpStatus { status: 503, .. }));
    assert!(err.is_network());
}

// ─────────────────────── configure ───────────────────────

#[tokio::test]
async fn test_configure_is_repeatable_and_authenticated() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/shot/setrandomoptions"))
        .and(header("x-csrf-token", "session-token"))
        .and(header("cookie", "_wtm_session=s3cr3t"))
        .and(body_string(
            "difficulty=medium&keyword=&include_archive=1&include_solved=1",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    session.login("neo", "hunter2").await.unwrap();
    session.configure(Difficulty::Medium).await.unwrap();
    session.configure(Difficulty::Medium).await.unwrap();

    let options: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/shot/setrandomoptions")
        .collect();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].body, options[1].body);
    assert_eq!(options[0].headers, options[1].headers);
}

// ─────────────────────── random shots ───────────────────────

#[tokio::test]
async fn test_random_shot_skips_nsfw_and_fetches_image() {
    let server = MockServer::start().await;
    mount_shot(&server, 1, shot_page(1, true, &[], false)).await;
    mount_shot(&server, 2, shot_page(2, true, &[], false)).await;
    mount_shot(&server, 3, shot_page(3, false, &["car"], false)).await;
    mount_image(&server, 3).await;

    let session = session_for(&server);
    let shot = session.get_random_shot(false).await.unwrap();

    assert_eq!(shot.image_url(), format!("{}/images/shots/3.jpg", server.uri()));
    assert_eq!(shot.image_data(), &[0xff, 0xd8, 0xff, 3]);
    assert_eq!(shot.movie_name(), None);

    let fetched_images = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path().starts_with("/images/"))
        .count();
    assert_eq!(fetched_images, 1);
}

#[tokio::test]
async fn test_random_shot_skips_excluded_tags() {
    let server = MockServer::start().await;
    mount_shot(&server, 4, shot_page(4, false, &["beach", "nude"], false)).await;
    mount_shot(&server, 5, shot_page(5, false, &["beach"], false)).await;
    mount_image(&server, 5).await;

    let session = session_for(&server);
    let shot = session.get_random_shot(false).await.unwrap();
    assert_eq!(shot.file_name(), "5.jpg");
}

#[tokio::test]
async fn test_required_solution_is_resolved() {
    let server = MockServer::start().await;
    mount_shot(&server, 6, shot_page(6, false, &[], false)).await;
    mount_image(&server, 6).await;
    mount_shot(&server, 7, shot_page(7, false, &[], true)).await;
    mount_image(&server, 7).await;

    let referer = format!("{}/shot/7", server.uri());
    Mock::given(method("GET"))
        .and(path("/shot/7/showsolution"))
        .and(header("referer", referer.as_str()))
        .and(header("x-csrf-token", "page-token-7"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/javascript")
                .set_body_string(
                    r##"$("#solution").html("solved"); setAmazonMovieName("A\u0042C");"##,
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let shot = session.get_random_shot(true).await.unwrap();
    assert_eq!(shot.movie_name(), Some("ABC"));
    assert_eq!(shot.file_name(), "7.jpg");
}

#[tokio::test]
async fn test_image_request_carries_referer() {
    let server = MockServer::start().await;
    mount_shot(&server, 8, shot_page(8, false, &[], false)).await;
    let referer = format!("{}/shot/8", server.uri());
    Mock::given(method("GET"))
        .and(path("/images/shots/8.jpg"))
        .and(header("referer", referer.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    session.get_random_shot(false).await.unwrap();
}

#[tokio::test]
async fn test_missing_image_is_an_error() {
    let server = MockServer::start().await;
    mount_shot(&server, 9, shot_page(9, false, &[], false)).await;
    Mock::given(method("GET"))
        .and(path("/images/shots/9.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let err = session.get_random_shot(false).await.unwrap_err();
    assert!(matches!(err, WtmError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_request_timeout_maps_to_timeout_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shot/random"))
        .respond_with(html("<p>slow</p>").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = ClientConfig::resolve(Some(&server.uri()), Some(200)).unwrap();
    let session = Session::new(config).unwrap();
    let err = session.get_random_shot(false).await.unwrap_err();
    assert!(matches!(err, WtmError::Timeout(_)), "got {err:?}");
}
