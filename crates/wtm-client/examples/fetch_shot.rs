//! Log in, pick a difficulty and download a few solved random shots.
//!
//! ```text
//! WTM_USER=me WTM_PASSWORD=secret cargo run -p wtm-client --example fetch_shot -- 3
//! ```
//!
//! Images are written to `WTM_OUT` (default `shots/`). `WTM_DIFFICULTY`
//! selects the difficulty (default `all`).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use wtm_client::{ClientConfig, Credentials, Difficulty, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_level = std::env::var("WTM_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let count: usize = match std::env::args().nth(1) {
        Some(raw) => raw.parse().context("shot count must be a number")?,
        None => 1,
    };
    let difficulty: Difficulty = std::env::var("WTM_DIFFICULTY")
        .unwrap_or_else(|_| "all".to_string())
        .parse()?;
    let out_dir = PathBuf::from(std::env::var("WTM_OUT").unwrap_or_else(|_| "shots".to_string()));

    let credentials = Credentials::from_env()?;
    let mut session = Session::new(ClientConfig::from_env()?)?;
    session
        .login(&credentials.username, &credentials.password)
        .await?;
    session.configure(difficulty).await?;

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("cannot create {}", out_dir.display()))?;

    for n in 1..=count {
        let shot = session
            .get_random_shot_within(true, Duration::from_secs(120))
            .await?;
        let path = out_dir.join(shot.file_name());
        std::fs::write(&path, shot.image_data())
            .with_context(|| format!("cannot write {}", path.display()))?;
        println!(
            "#{n} {} -> {}",
            shot.movie_name().unwrap_or("?"),
            path.display()
        );
    }

    Ok(())
}
