//! A checkers board is 32 playable squares, indexed `0..32`.
//!
//! Boards travel as 32 character patterns, one character per square:
//!
//! | Char | Square |
//! |---|---|
//! | `b` | black piece |
//! | `r` | red piece |
//! | `q` | black queen |
//! | `k` | red queen |
//! | `_` | empty |
//!
//! ```
//! use ciberedev::checkers::{Board, Piece};
//!
//! let mut board = Board::new();
//! board.move_piece(7, 12).unwrap();
//! board.promote(12).unwrap();
//!
//! assert_eq!(board.piece_at(12), Some(Piece::BlackQueen));
//! assert_eq!(board.to_pattern(), "bbbbbbb_____q___________rrrrrrrr");
//! ```

use std::{fmt, str::FromStr};

use crate::{error::Error, models::image::Image, result::Result, route::Route, Client};

/// Number of playable squares.
pub const SQUARES: usize = 32;

/// A piece standing on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    /// A regular black piece.
    Black,
    /// A regular red piece.
    Red,
    /// A promoted black piece.
    BlackQueen,
    /// A promoted red piece.
    RedQueen,
}

impl Piece {
    /// Pattern character of the piece.
    pub fn as_char(self) -> char {
        match self {
            Piece::Black => 'b',
            Piece::Red => 'r',
            Piece::BlackQueen => 'q',
            Piece::RedQueen => 'k',
        }
    }

    /// Piece for a pattern character; `None` for `_` and unknown characters.
    pub fn from_char(c: char) -> Option<Piece> {
        match c {
            'b' => Some(Piece::Black),
            'r' => Some(Piece::Red),
            'q' => Some(Piece::BlackQueen),
            'k' => Some(Piece::RedQueen),
            _ => None,
        }
    }

    /// Whether the piece has been promoted.
    pub fn is_queen(self) -> bool {
        matches!(self, Piece::BlackQueen | Piece::RedQueen)
    }

    fn promoted(self) -> Option<Piece> {
        match self {
            Piece::Black => Some(Piece::BlackQueen),
            Piece::Red => Some(Piece::RedQueen),
            Piece::BlackQueen | Piece::RedQueen => None,
        }
    }

    fn demoted(self) -> Option<Piece> {
        match self {
            Piece::BlackQueen => Some(Piece::Black),
            Piece::RedQueen => Some(Piece::Red),
            Piece::Black | Piece::Red => None,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Piece::Black => "black",
            Piece::Red => "red",
            Piece::BlackQueen => "black queen",
            Piece::RedQueen => "red queen",
        })
    }
}

/// State of a checkers game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Piece>; SQUARES],
}

impl Board {
    /// The starting layout: black on `0..8`, red on `24..32`.
    pub fn new() -> Self {
        let mut squares = [None; SQUARES];
        for (index, square) in squares.iter_mut().enumerate() {
            *square = match index {
                0..=7 => Some(Piece::Black),
                24..=31 => Some(Piece::Red),
                _ => None,
            };
        }
        Self { squares }
    }

    /// A board without pieces.
    pub fn empty() -> Self {
        Self {
            squares: [None; SQUARES],
        }
    }

    /// Decodes a 32 character pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern has the wrong length
    /// or contains a character outside of `brqk_`.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPattern {
            reason: reason.to_string(),
            pattern: pattern.to_string(),
        };

        if pattern.chars().count() != SQUARES {
            return Err(invalid("Pattern must be 32 characters long"));
        }

        let mut board = Board::empty();
        for (square, c) in board.squares.iter_mut().zip(pattern.chars()) {
            *square = match c {
                '_' => None,
                c => Some(
                    Piece::from_char(c).ok_or_else(|| invalid("Invalid Character in pattern"))?,
                ),
            };
        }
        Ok(board)
    }

    /// Encodes the board as a pattern.
    pub fn to_pattern(&self) -> String {
        self.squares
            .iter()
            .map(|square| square.map_or('_', Piece::as_char))
            .collect()
    }

    /// The piece at `index`, if any.
    pub fn piece_at(&self, index: usize) -> Option<Piece> {
        self.squares.get(index).copied().flatten()
    }

    /// Iterates over every square.
    pub fn squares(&self) -> impl Iterator<Item = Option<Piece>> + '_ {
        self.squares.iter().copied()
    }

    /// Puts `piece` on the empty square `index`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLocation`] or [`Error::LocationAlreadyTaken`].
    pub fn place(&mut self, index: usize, piece: Piece) -> Result<()> {
        let square = self.square_mut(index)?;
        if square.is_some() {
            return Err(Error::LocationAlreadyTaken(index));
        }
        *square = Some(piece);
        Ok(())
    }

    /// Takes the piece off square `index`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLocation`] if `index` is off the board.
    pub fn remove(&mut self, index: usize) -> Result<Option<Piece>> {
        Ok(self.square_mut(index)?.take())
    }

    /// Moves the piece on `from` to the empty square `to`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLocation`], [`Error::EmptyLocation`] or
    /// [`Error::LocationAlreadyTaken`]. The board is unchanged on error.
    pub fn move_piece(&mut self, from: usize, to: usize) -> Result<()> {
        let piece = self
            .piece_at(Self::check(from)?)
            .ok_or(Error::EmptyLocation(from))?;
        if self.piece_at(Self::check(to)?).is_some() {
            return Err(Error::LocationAlreadyTaken(to));
        }
        self.squares[from] = None;
        self.squares[to] = Some(piece);
        Ok(())
    }

    /// Turns the piece on `index` into a queen.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLocation`], [`Error::EmptyLocation`], or
    /// [`Error::UnableToPromote`] if it already is one.
    pub fn promote(&mut self, index: usize) -> Result<Piece> {
        self.replace(index, Piece::promoted, Error::UnableToPromote)
    }

    /// Turns the queen on `index` back into a regular piece.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLocation`], [`Error::EmptyLocation`], or
    /// [`Error::UnableToDemote`] if it is not a queen.
    pub fn demote(&mut self, index: usize) -> Result<Piece> {
        self.replace(index, Piece::demoted, Error::UnableToDemote)
    }

    fn replace(
        &mut self,
        index: usize,
        f: fn(Piece) -> Option<Piece>,
        err: Error,
    ) -> Result<Piece> {
        let square = self.square_mut(index)?;
        let piece = square.ok_or(Error::EmptyLocation(index))?;
        let replaced = f(piece).ok_or(err)?;
        *square = Some(replaced);
        Ok(replaced)
    }

    fn check(index: usize) -> Result<usize> {
        if index < SQUARES {
            Ok(index)
        } else {
            Err(Error::InvalidLocation(index))
        }
    }

    fn square_mut(&mut self, index: usize) -> Result<&mut Option<Piece>> {
        self.squares
            .get_mut(index)
            .ok_or(Error::InvalidLocation(index))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Board {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_pattern(s)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pattern())
    }
}

impl Client {
    /// Renders `board` to an image.
    ///
    /// # Errors
    ///
    /// Any error of [`HttpClient::request`](crate::http::HttpClient::request), or
    /// [`Error::UnknownDataReturned`] if the answer carries no image link.
    pub async fn generate_checkers_board(&self, board: &Board) -> Result<Image> {
        let pattern = board.to_pattern();
        let invalid = pattern.clone();
        let route = Route::get(self.api_endpoint("checkers"))
            .query("pattern", &pattern)
            .on_error("Invalid Pattern", move || Error::InvalidPattern {
                reason: "Invalid Pattern".to_string(),
                pattern: invalid.clone(),
            });

        let response = self.http.request(&route).await?;
        let link = response.str_field("link")?;
        self.fetch_image(link).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "bbbbbbbb________________rrrrrrrr";

    #[test]
    fn default_layout() {
        let board = Board::default();
        assert_eq!(board.to_pattern(), START);
        assert_eq!(board.piece_at(0), Some(Piece::Black));
        assert_eq!(board.piece_at(12), None);
        assert_eq!(board.piece_at(31), Some(Piece::Red));
        assert_eq!(board.piece_at(32), None);
        assert_eq!(board.squares().flatten().count(), 16);
    }

    #[test]
    fn patterns_decode_and_encode() {
        let pattern = "rrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrq";
        let board: Board = pattern.parse().unwrap();
        assert_eq!(board.piece_at(31), Some(Piece::BlackQueen));
        assert_eq!(board.to_string(), pattern);

        let board = Board::from_pattern("k_______________________________").unwrap();
        assert_eq!(board.piece_at(0), Some(Piece::RedQueen));
        assert!(board.piece_at(0).unwrap().is_queen());
    }

    #[test]
    fn bad_patterns_are_rejected() {
        let err = Board::from_pattern("bbb").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "bbb"));
        assert_eq!(err.to_string(), "Pattern must be 32 characters long");

        let err = Board::from_pattern("bbbbbbbb________________rrrrrrrx").unwrap_err();
        assert_eq!(err.to_string(), "Invalid Character in pattern");
    }

    #[test]
    fn moving_pieces() {
        let mut board = Board::new();
        board.move_piece(7, 12).unwrap();
        assert_eq!(board.piece_at(7), None);
        assert_eq!(board.piece_at(12), Some(Piece::Black));

        assert!(matches!(board.move_piece(0, 1), Err(Error::LocationAlreadyTaken(1))));
        assert!(matches!(board.move_piece(7, 8), Err(Error::EmptyLocation(7))));
        assert!(matches!(board.move_piece(0, 32), Err(Error::InvalidLocation(32))));
        assert!(matches!(board.move_piece(40, 8), Err(Error::InvalidLocation(40))));
        assert_eq!(board.piece_at(0), Some(Piece::Black));
    }

    #[test]
    fn promotion_and_demotion() {
        let mut board = Board::new();
        assert_eq!(board.promote(0).unwrap(), Piece::BlackQueen);
        assert!(matches!(board.promote(0), Err(Error::UnableToPromote)));
        assert_eq!(board.demote(0).unwrap(), Piece::Black);
        assert!(matches!(board.demote(0), Err(Error::UnableToDemote)));

        assert_eq!(board.promote(31).unwrap(), Piece::RedQueen);
        assert!(matches!(board.promote(15), Err(Error::EmptyLocation(15))));
        assert!(matches!(board.demote(99), Err(Error::InvalidLocation(99))));
    }

    #[test]
    fn place_and_remove() {
        let mut board = Board::empty();
        board.place(5, Piece::Red).unwrap();
        assert!(matches!(board.place(5, Piece::Black), Err(Error::LocationAlreadyTaken(5))));
        assert_eq!(board.remove(5).unwrap(), Some(Piece::Red));
        assert_eq!(board.remove(5).unwrap(), None);
        assert!(board.remove(32).is_err());
    }

    #[test]
    fn pieces_display_their_names() {
        assert_eq!(Piece::BlackQueen.to_string(), "black queen");
        assert_eq!(Piece::from_char('_'), None);
        assert_eq!(Piece::from_char('r').map(Piece::as_char), Some('r'));
    }
}
