use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use quadmembers::auth::ldap::{Directory, LdapConnector};
use quadmembers::auth::password;
use quadmembers::auth::rate_limit::LoginThrottle;
use quadmembers::config::Config;
use quadmembers::{db, handlers, models};

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(io_error)?;

    let pool = db::init_pool(&config.database_url).await.map_err(io_error)?;
    db::run_migrations(&pool).await.map_err(io_error)?;

    if let Some(admin) = &config.admin {
        let hash = password::hash_password(&admin.password).map_err(io_error)?;
        if models::user::ensure_staff_account(&pool, &admin.username, &hash)
            .await
            .map_err(io_error)?
        {
            log::info!("Created staff account '{}'", admin.username);
        }
    }

    let connector = LdapConnector::new(&config.ldap_url, config.ldap_starttls, config.ldap_timeout);
    let directory = web::Data::new(Directory::new(Box::new(connector), &config.ldap_people_base));
    log::info!("Member passwords are checked against {}", config.ldap_url);

    // Load from SESSION_KEY for sessions that survive restarts
    let secret_key = match &config.session_key {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need 64+), generating random key",
                val.len()
            );
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    log::info!("Starting server at http://{}", config.bind_addr);

    let throttle = web::Data::new(LoginThrottle::default());
    let static_dir = config.static_dir.clone();
    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(directory.clone())
            .app_data(throttle.clone())
            .service(actix_files::Files::new("/static", &static_dir))
            .configure(handlers::configure)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
