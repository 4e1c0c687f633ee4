//! Takes a screenshot of a website and saves it to disk.

use ciberedev::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // This is just for seeing the logs, you may remove it if you wish.
    simple_logger::init_with_level(log::Level::Info)?;

    let client = Client::new();

    // wait one second on the page before capturing it
    let screenshot = client.take_screenshot("https://cibere.dev", 1).await?;
    screenshot.save("screenshot.png").await?;

    println!("saved {} to screenshot.png", screenshot.url());
    Ok(())
}
