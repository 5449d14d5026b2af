#[actix_web::main]
async fn main() {
    if let Err(err) = dogtor_lib::run().await {
        eprintln!("dogtor: {}", err);
        std::process::exit(1);
    }
}
