use actix_web::{web, App, HttpServer};
use clap::Parser;
use hmmtag::{config::Settings, ModelState};

mod api;

/// Serve the HMM tagger and answer scorer over HTTP
#[derive(Debug, Parser)]
struct Argv {
    #[command(flatten)]
    settings: Settings,
    /// address to listen on
    #[arg(short, long, env = "HMMTAG_BIND", default_value = "127.0.0.1:8080")]
    bind: String,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let argv = Argv::parse();
    log::info!("{:?}", argv);

    let state = web::Data::new(api::AppState {
        model: ModelState::open(&argv.settings.corpus),
        workers: argv.settings.workers,
    });
    log::info!("listening on {}", argv.bind);
    HttpServer::new(move || App::new().wrap(api::cors()).app_data(state.clone()).configure(api::configure))
        .bind(argv.bind.as_str())?
        .run()
        .await
}
