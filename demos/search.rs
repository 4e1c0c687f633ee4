//! Searches the web and prints a few random words.

use ciberedev::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    simple_logger::init_with_level(log::Level::Info)?;

    let client = Client::new();

    for result in client.get_search_results("rust async", 5).await? {
        println!("{}\n  {}\n  {}\n", result.title(), result.description(), result.url());
    }

    let words = client.get_random_words(5).await?;
    println!("{}", words.join("\n"));

    let paste = client.create_paste(&words.join(" ")).await?;
    println!("pasted to {}", paste.url());

    println!("{} requests made", client.requests());
    Ok(())
}
