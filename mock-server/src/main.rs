use tokio::net::TcpListener;

/// Serves the canned Cureat API. `HOST` defaults to 127.0.0.1 and `PORT` to
/// 8000, the port the app's candidate list expects.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("mock Cureat API on http://{}", listener.local_addr()?);
    println!("  GET  /health");
    println!("  POST /token  /users/signup  /recommendations  /date-course  /search-log");
    mock_server::run(listener).await
}
