use anyhow::Result;
use clap::Parser;
use gamedeck::core::backend::LocalBackend;
use gamedeck::core::dialog::DialogInit;
use gamedeck::core::language::preferred_locales;
use gamedeck::core::model::{Platform, Runner};
use gamedeck::core::paths::LauncherPaths;
use gamedeck::core::services::Services;
use gamedeck::logging;
use gamedeck::ui::install_dialog::{InstallDialog, InstallDialogInit};
use relm4::{set_global_css, RelmApp};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "gamedeck")]
#[command(version)]
#[command(about = "Choose install options for a game and hand it to the installer")]
struct Cli {
    /// Store identifier of the game
    app_name: String,

    /// Store backend of the game (epic or gog)
    #[arg(short, long, default_value = "legendary")]
    runner: Runner,

    /// Folder the library already tracks for this game
    #[arg(long)]
    library_folder: Option<PathBuf>,

    /// Launcher data directory
    #[arg(long, env = "GAMEDECK_HOME")]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging (use RUST_LOG for finer control)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let paths = LauncherPaths::discover(cli.data_dir)?;
    info!("Using data directory {}", paths.root().display());
    let backend = Arc::new(LocalBackend::new(paths));
    let services = Services::from_backend(backend);

    let previous_progress = services.progress.previous_progress(&cli.app_name);
    let init = InstallDialogInit {
        dialog: DialogInit {
            app_name: cli.app_name,
            runner: cli.runner,
            platform: Platform::current(),
            preferred_locales: preferred_locales(),
            previous_progress,
            library_folder: cli.library_folder,
        },
        services,
        standalone: true,
    };

    // GTK would otherwise try to parse our arguments.
    let app = RelmApp::new("com.gamedeck.install").with_args(Vec::new());
    set_global_css(include_str!("ui/style.css"));
    app.run::<InstallDialog>(init);
    Ok(())
}
