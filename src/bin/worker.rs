use pengguna_explorer::config::LOG_LEVEL;
use pengguna_explorer::worker_agent::PageFetchTask;
use yew_agent::Registrable;

fn main() {
    // Panics and log records go to the worker's console
    pengguna_explorer::logging::init(LOG_LEVEL);
    PageFetchTask::registrar().register();
}
