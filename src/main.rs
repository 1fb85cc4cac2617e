use std::{io::stdout, sync::Arc};

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
};
use termtable::{app::App, config::Config, logging};
use termtable_auth::Keyring;
use termtable_db::{ConnectionRegistry, MetadataStore, postgres::PostgresConnector};

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let config = Config::load()?;
    logging::init(&config.log_path())?;

    let metadata = MetadataStore::open(config.metadata_path())?;
    let registry = ConnectionRegistry::new(metadata, Box::new(Keyring::new()));
    let app = App::new(registry, Arc::new(PostgresConnector), &config);

    let terminal = ratatui::init();
    // Pasted text arrives as one event instead of a burst of key presses.
    execute!(stdout(), EnableBracketedPaste)?;
    let result = app.run(terminal).await;
    let disabled = execute!(stdout(), DisableBracketedPaste);
    ratatui::restore();
    result?;
    Ok(disabled?)
}
