//! HTTP-level tests that stop before the database: rendering of public
//! pages, CSRF rejection, the login redirect of member pages and the
//! landing page of logged-in sessions.

mod common;

use actix_session::{Session, SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpResponse, test, web};
use sqlx::postgres::PgPoolOptions;

use quadmembers::auth::rate_limit::LoginThrottle;
use quadmembers::auth::session as member_session;
use quadmembers::handlers;
use common::*;

/// Stands in for a successful `/login` so sessions can be set up without a
/// database.
async fn sign_in(session: Session, who: web::Path<String>) -> HttpResponse {
    let user = match who.as_str() {
        "admin" => bootstrap_admin("admin"),
        _ => ldap_user("jdoe"),
    };
    member_session::log_in(&session, &user).expect("Failed to log in");
    HttpResponse::Ok().finish()
}

macro_rules! app {
    () => {{
        // Never connected: these requests do not reach a query.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://members@localhost/members_test")
            .expect("Failed to build lazy pool");
        let (directory, _) = FakeDirectory::accepting(LDAP_PASSWORD).into_directory();
        test::init_service(
            App::new()
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_secure(false)
                        .build(),
                )
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(directory))
                .app_data(web::Data::new(LoginThrottle::default()))
                .route("/test/sign-in/{who}", web::get().to(sign_in))
                .configure(handlers::configure),
        )
        .await
    }};
}

#[actix_rt::test]
async fn test_subscribe_page_renders() {
    let app = app!();
    let req = test::TestRequest::get().uri("/subscribe").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).expect("utf-8 body");
    assert!(body.contains("name=\"csrf_token\""));
    assert!(body.contains("name=\"first_name\""));
    assert!(body.contains("type=\"radio\" name=\"is_student\" value=\"Yes\""));
    assert!(body.contains("name=\"ensure_subscribe\" value=\"True\""));
}

#[actix_rt::test]
async fn test_subscribe_post_without_token_is_forbidden() {
    let app = app!();
    let body = serde_urlencoded::to_string([("first_name", "Anna"), ("last_name", "de Vries")])
        .expect("Failed to encode body");
    let req = test::TestRequest::post()
        .uri("/subscribe")
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_login_page_renders() {
    let app = app!();
    let req = test::TestRequest::get().uri("/login?next=/password").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).expect("utf-8 body");
    assert!(body.contains("name=\"next\" value=\"/password\""));
}

#[actix_rt::test]
async fn test_member_pages_redirect_to_login() {
    let app = app!();
    for (path, location) in [
        ("/profile", "/login?next=/profile"),
        ("/password", "/login?next=/password"),
        ("/admin/membership-requests", "/login?next=/admin/membership-requests"),
    ] {
        let req = test::TestRequest::get().uri(path).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(
            resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some(location),
            "{path}"
        );
    }
}

#[actix_rt::test]
async fn test_root_redirects_to_profile() {
    let app = app!();
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/profile")
    );
}

#[actix_rt::test]
async fn test_login_post_without_token_is_forbidden() {
    let app = app!();
    let body = serde_urlencoded::to_string([("username", "jdoe"), ("password", LDAP_PASSWORD)])
        .expect("Failed to encode body");
    let req = test::TestRequest::post()
        .uri("/login")
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_logout_without_token_is_forbidden() {
    let app = app!();
    let req = test::TestRequest::get().uri("/test/sign-in/member").to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::post()
        .uri("/logout")
        .cookie(cookie)
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

fn session_cookie<B>(resp: &actix_web::dev::ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .next()
        .map(|c| c.into_owned())
        .expect("session cookie set")
}

#[actix_rt::test]
async fn test_logged_in_sessions_land_by_account() {
    let app = app!();
    for (who, landing) in [("member", "/profile"), ("admin", "/admin/membership-requests")] {
        let req = test::TestRequest::get().uri(&format!("/test/sign-in/{who}")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session_cookie(&resp);

        for path in ["/", "/login"] {
            let req = test::TestRequest::get().uri(path).cookie(cookie.clone()).to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{who} {path}");
            assert_eq!(
                resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
                Some(landing),
                "{who} {path}"
            );
        }
    }
}
