// Interactive history browser
mod app;
mod events;
mod layout;
mod rendering;
mod terminal;
mod timestamps;

use anyhow::Result;
pub use app::App;
pub use timestamps::{format_timestamp, format_timestamp_at};

use self::terminal::TerminalManager;
use crate::store::{Histories, KeyValueStore};

/// Run the interactive browser until the user quits
pub fn run_interactive<S: KeyValueStore>(histories: Histories<S>) -> Result<()> {
    let mut manager = TerminalManager::new()?;
    let mut app = App::new(histories);

    let res = app.run(manager.terminal_mut());

    manager.restore()?;
    res
}
