use anyhow::Result;
use common::{ServiceKind, DEFAULT_SERVICE_URL};
use tempfile::TempDir;
use terminal::app::{App, AppCommand, AppState, TerminalConfig};
use tokio::runtime::Handle;

fn offline_config(dir: &TempDir) -> TerminalConfig {
    TerminalConfig {
        service_url: DEFAULT_SERVICE_URL.to_string(),
        service_kind: ServiceKind::Proxy,
        fallback_url: None,
        data_dir: dir.path().join("data"),
        offline: true,
    }
}

#[tokio::test]
async fn test_unsaved_player_name_does_not_stop_the_game() -> Result<()> {
    let dir = TempDir::new()?;
    let config = offline_config(&dir);
    let mut app = App::new(&config, Handle::current())?;

    // Storage can no longer be written
    std::fs::remove_dir_all(&config.data_dir)?;

    app.handle_command(AppCommand::ShowLeaderboard)?;
    app.handle_command(AppCommand::SetPlayerName("Luz".to_string()))?;
    assert_eq!(app.game().store().player_name(), "Luz");

    app.handle_command(AppCommand::BackToGame)?;
    assert!(matches!(app.state, AppState::Game));
    Ok(())
}

#[tokio::test]
async fn test_player_name_is_saved() -> Result<()> {
    let dir = TempDir::new()?;
    let config = offline_config(&dir);

    let mut app = App::new(&config, Handle::current())?;
    app.handle_command(AppCommand::SetPlayerName("  Pablo ".to_string()))?;
    drop(app);

    let app = App::new(&config, Handle::current())?;
    assert_eq!(app.game().store().player_name(), "Pablo");
    Ok(())
}
