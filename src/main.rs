use rac_backend::config::Config;
use rac_backend::logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env().map_err(std::io::Error::other)?;
    logging::init(&config);

    rac_backend::run(config).await
}
