use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    procurement_client::frameworks::cli::run().await
}
