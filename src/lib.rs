//! View synchronization, cell editing and undo/redo history for the DungeonDB table editor.
//!
//! The store holding the tables is reached only through [`frontend::query::Backend`]. Reads
//! stream their results through single-use [`frontend::channel::Channel`]s into the
//! [`frontend::view::TableView`]; edits become [`frontend::action::Action`]s recorded by the
//! [`frontend::history::History`]; change notifications from the store are turned into
//! serialized reloads by the [`frontend::refresh::RefreshController`].
//! [`frontend::Editor`] ties these together for one session.

pub mod frontend;
pub mod util;

pub use frontend::Editor;
pub use util::config::Config;
pub use util::error::Error;

/// Loads the configuration and installs logging for a session.
pub fn init() -> Result<Config, Error> {
    let config = Config::load()?;
    util::logging::init(&config.logging);
    tracing::info!(page_size = config.view.page_size, "configuration loaded");
    return Ok(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_reads_the_environment() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DUNGEON_DB_VIEW__PAGE_SIZE", "20");
            let config = init().map_err(|e| e.to_string())?;
            assert_eq!(config.view.page_size, 20);
            Ok(())
        });
    }
}
