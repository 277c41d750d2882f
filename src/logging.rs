use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Cli { verbose: bool },
    Server { verbose: bool },
}

impl LogMode {
    fn max_level(self) -> Option<Level> {
        match self {
            LogMode::Cli { verbose: false } => None,
            LogMode::Cli { verbose: true } | LogMode::Server { verbose: true } => {
                Some(Level::DEBUG)
            }
            LogMode::Server { verbose: false } => Some(Level::INFO),
        }
    }
}

pub fn init(mode: LogMode) -> Result<()> {
    let Some(level) = mode.max_level() else {
        return Ok(());
    };
    let _ = fmt()
        .with_max_level(level)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_always_logs_at_info() {
        assert_eq!(LogMode::Server { verbose: false }.max_level(), Some(Level::INFO));
        assert_eq!(LogMode::Cli { verbose: false }.max_level(), None);
        assert_eq!(LogMode::Cli { verbose: true }.max_level(), Some(Level::DEBUG));
    }
}
