use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

/// Path to the user config file: `$HOME/.config/modelsort.json`
///
/// Returns `None` if the home directory cannot be determined.
pub static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join(".config").join(format!("{PROJECT_NAME}.json")))
});

/// Path to a config file next to the executable: `<exe dir>/modelsort.json`
///
/// Checked before the home config.
/// Returns `None` if the executable path cannot be determined.
pub static EXE_CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let exe = env::current_exe().ok()?;
    let dir = exe.parent()?;
    Some(dir.join(format!("{PROJECT_NAME}.json")))
});
