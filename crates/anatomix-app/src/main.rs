//! Main application entry point (native).

use anatomix_app::{App, AppConfig, AppResult, Autoplay, MenuAction, ShortcutRegistry};

fn main() {
    #[cfg(feature = "native")]
    env_logger::init();
    log::info!("Starting Anatomix");

    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> AppResult<()> {
    let config = AppConfig::from_args(std::env::args().skip(1))?;
    if config.show_help {
        println!("{}", AppConfig::USAGE);
        ShortcutRegistry::print_all(&anatomix_core::KeyBindings::default());
        return Ok(());
    }

    let (puzzle, layout) = config.load_puzzle()?;
    ShortcutRegistry::print_all(&puzzle.bindings);

    let json_summary = config.json_summary;
    let mut app = App::new(config, puzzle, &layout)?;
    let mut driver = Autoplay::new(app.puzzle().bindings.clone());
    app.menu_action(MenuAction::Start);
    let summary = app.run(&mut driver);

    if json_summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary);
    }
    log::info!("{}", summary);
    Ok(())
}
