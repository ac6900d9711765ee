#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    // Set up logging for development
    env_logger::init();

    // Run the map application; file dialogs are spawned onto this runtime
    netmap_tool::run_app()
}
