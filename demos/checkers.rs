//! Plays a couple of checkers moves and renders the board.

use ciberedev::{checkers::Board, Client};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    simple_logger::init_with_level(log::Level::Info)?;

    let client = Client::new();

    // r = red piece, b = black piece, q = black queen, k = red queen, _ = empty
    let mut board: Board = "bbbbbbbb________________rrrrrrrr".parse()?;
    board.move_piece(7, 11)?;
    board.move_piece(24, 20)?;
    board.promote(11)?;
    println!("pattern: {board}");

    let image = client.generate_checkers_board(&board).await?;
    image.save("generated_board.png").await?;
    Ok(())
}
