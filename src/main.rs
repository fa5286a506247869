use users_api::{app, config::AppConfig, state::AppState, telemetry, users::repo::UserRepo};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let config = AppConfig::from_env()?;
    let state = AppState::new(config, UserRepo::new());

    app::serve(state).await
}
